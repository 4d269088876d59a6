// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The frame renderer.  Every pixel is independent of every other, so
//! the raster is cut into row-sized chunks and handed out to a fixed
//! pool of scoped worker threads through a shared queue.  Workers pull
//! chunks until the queue is dry; the join at the end of the scope is
//! the only synchronisation the raster ever needs.

use std::sync::{Arc, Mutex};

use colour::Colour;
use crossbeam;
use errors::{Error, Result};
use kernel::Kernel;
use planes::PlaneMapper;
use zoom::ZoomSchedule;

/// A row-major RGBA raster of fixed dimensions.  Pixel `(x, y)` lives
/// at offset `y * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    pixels: Vec<Colour>,
}

impl Frame {
    /// A black frame.
    pub fn new(width: usize, height: usize) -> Frame {
        Frame {
            width,
            height,
            pixels: vec![Colour::BLACK; width * height],
        }
    }

    /// Wrap an existing pixel buffer, which must hold exactly
    /// `width * height` colours.
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Colour>) -> Result<Frame> {
        if pixels.len() != width * height {
            return Err(Error::PixelCount {
                expected: width * height,
                found: pixels.len(),
            });
        }
        Ok(Frame {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// The raster, row-major.
    pub fn pixels(&self) -> &[Colour] {
        &self.pixels
    }

    /// The raster, row-major and writable.
    pub fn pixels_mut(&mut self) -> &mut [Colour] {
        &mut self.pixels
    }

    /// The colour at column `x`, row `y`.
    pub fn get(&self, x: usize, y: usize) -> Option<Colour> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }
}

/// Run `kernel` once for every offset of `buffer` and store the result
/// there.  Offsets are handed out in chunks of `grain` to `threads`
/// workers, in no particular order.  The kernel sees nothing but its
/// offset and whatever it captured by reference, so it must be `Sync`.
pub fn parallel_for<T, F>(buffer: &mut [T], threads: usize, grain: usize, kernel: F) -> Result<()>
where
    T: Send,
    F: Fn(usize) -> T + Sync,
{
    if buffer.is_empty() {
        return Ok(());
    }
    let grain = grain.max(1);
    let threads = threads.max(1);
    let kernel = &kernel;
    let chunks = Arc::new(Mutex::new(buffer.chunks_mut(grain).enumerate()));

    crossbeam::scope(|spawner| {
        for _ in 0..threads {
            let chunks = chunks.clone();
            spawner.spawn(move |_| loop {
                let chunk = match chunks.lock() {
                    Ok(mut queue) => queue.next(),
                    Err(_) => None,
                };
                match chunk {
                    Some((n, region)) => {
                        let base = n * grain;
                        for (i, cell) in region.iter_mut().enumerate() {
                            *cell = kernel(base + i);
                        }
                    }
                    None => {
                        break;
                    }
                }
            });
        }
    })
    .map_err(|_| Error::WorkerPanic)
}

/// Renders frames of a fixed size with a fixed kernel.  Once built,
/// this object should not be mutable.
#[derive(Clone, Debug)]
pub struct FrameRenderer {
    kernel: Kernel,
    width: usize,
    height: usize,
    max_iterations: usize,
    threads: usize,
}

impl FrameRenderer {
    /// Requires the raster size, the kernel, the iteration cap, and
    /// the number of worker threads.
    pub fn new(
        kernel: Kernel,
        width: usize,
        height: usize,
        max_iterations: usize,
        threads: usize,
    ) -> Result<FrameRenderer> {
        if width == 0 || height == 0 {
            return Err(Error::NumericDomain(format!(
                "Cannot render a {}x{} frame",
                width, height
            )));
        }
        if max_iterations == 0 {
            return Err(Error::NumericDomain(
                "The iteration cap must be at least 1".to_string(),
            ));
        }
        if threads == 0 {
            return Err(Error::NumericDomain(
                "Rendering needs at least one thread".to_string(),
            ));
        }
        Ok(FrameRenderer {
            kernel,
            width,
            height,
            max_iterations,
            threads,
        })
    }

    /// `(width, height)` of the frames this renderer produces.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Overwrite every pixel of `frame` with the view through `window`.
    pub fn render_into(&self, window: &PlaneMapper, frame: &mut Frame) -> Result<()> {
        let expected = (self.width, self.height);
        if frame.dimensions() != expected || window.integral_plane.0 != self.width
            || window.integral_plane.1 != self.height
        {
            return Err(Error::FrameMismatch {
                expected,
                found: frame.dimensions(),
            });
        }
        let window = *window;
        let kernel = &self.kernel;
        let max_iterations = self.max_iterations;
        parallel_for(frame.pixels_mut(), self.threads, self.width, move |offset| {
            kernel.colour_at(window.offset_to_point(offset), max_iterations)
        })
    }

    /// A freshly allocated frame showing `window`.
    pub fn render(&self, window: &PlaneMapper) -> Result<Frame> {
        let mut frame = Frame::new(self.width, self.height);
        self.render_into(window, &mut frame)?;
        Ok(frame)
    }

    /// Frame number `frame` of `schedule`.
    pub fn render_frame(&self, schedule: &ZoomSchedule, frame: usize) -> Result<Frame> {
        let window = schedule.window(frame, self.width, self.height)?;
        self.render(&window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;

    fn renderer(width: usize, height: usize, threads: usize) -> FrameRenderer {
        FrameRenderer::new(Kernel::default(), width, height, 600, threads).unwrap()
    }

    #[test]
    fn parallel_for_visits_every_offset_once() {
        let mut buffer = vec![0usize; 1031];
        parallel_for(&mut buffer, 7, 10, |i| i * 2).unwrap();
        for (i, v) in buffer.iter().enumerate() {
            assert_eq!(*v, i * 2);
        }
    }

    #[test]
    fn parallel_for_accepts_empty_buffers() {
        let mut buffer: Vec<u8> = vec![];
        assert!(parallel_for(&mut buffer, 4, 16, |_| 1).is_ok());
    }

    #[test]
    fn renderer_refuses_bad_shapes() {
        assert!(FrameRenderer::new(Kernel::default(), 0, 4, 600, 1).is_err());
        assert!(FrameRenderer::new(Kernel::default(), 4, 4, 0, 1).is_err());
        assert!(FrameRenderer::new(Kernel::default(), 4, 4, 600, 0).is_err());
    }

    #[test]
    fn frame_has_width_times_height_pixels() {
        let frame = renderer(16, 8, 3)
            .render_frame(&ZoomSchedule::default(), 0)
            .unwrap();
        assert_eq!(frame.pixels().len(), 16 * 8);
        assert_eq!(frame.dimensions(), (16, 8));
    }

    #[test]
    fn every_pixel_matches_the_kernel() {
        let window = PlaneMapper::centred(24, 12, Complex::new(-0.5, 0.0), 1.5).unwrap();
        let frame = renderer(24, 12, 4).render(&window).unwrap();
        let kernel = Kernel::default();
        for y in 0..12 {
            for x in 0..24 {
                let c = window.offset_to_point(y * 24 + x);
                assert_eq!(frame.get(x, y), Some(kernel.colour_at(c, 600)));
            }
        }
    }

    #[test]
    fn thread_count_does_not_change_the_result() {
        let schedule = ZoomSchedule::default();
        let one = renderer(32, 32, 1).render_frame(&schedule, 42).unwrap();
        let many = renderer(32, 32, 8).render_frame(&schedule, 42).unwrap();
        assert_eq!(one, many);
    }

    #[test]
    fn mismatched_frame_is_refused() {
        let window = PlaneMapper::centred(8, 8, Complex::new(0.0, 0.0), 2.0).unwrap();
        let mut frame = Frame::new(4, 4);
        assert!(renderer(8, 8, 1).render_into(&window, &mut frame).is_err());
    }

    #[test]
    fn interior_window_is_black() {
        let window = PlaneMapper::centred(8, 8, Complex::new(-0.1, 0.0), 0.05).unwrap();
        let frame = renderer(8, 8, 2).render(&window).unwrap();
        assert!(frame.pixels().iter().all(|c| *c == Colour::BLACK));
    }

    #[test]
    fn extreme_zoom_renders_kernel_colours() {
        let schedule = ZoomSchedule {
            frames: 2,
            scale_start: 1.0e8,
            scale_end: 2.0e8,
            ..ZoomSchedule::default()
        };
        let window = schedule.window(0, 8, 8).unwrap();
        let frame = renderer(8, 8, 2).render(&window).unwrap();
        let kernel = Kernel::default();
        for (offset, colour) in frame.pixels().iter().enumerate() {
            let c = window.offset_to_point(offset);
            let escape = kernel.escape(c, 600);
            assert!(!escape.z.re.is_nan() && !escape.z.im.is_nan());
            assert_eq!(*colour, kernel.colour_at(c, 600));
        }
    }

    #[test]
    fn from_pixels_checks_length() {
        match Frame::from_pixels(2, 2, vec![Colour::BLACK; 3]) {
            Err(Error::PixelCount { expected, found }) => {
                assert_eq!((expected, found), (4, 3));
            }
            other => panic!("expected a pixel count error, got {:?}", other),
        }
        assert!(Frame::from_pixels(2, 2, vec![Colour::BLACK; 4]).is_ok());
    }
}
