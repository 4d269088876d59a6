// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The top-level run: walk the zoom schedule frame by frame, render
//! each frame, and feed it to the GIF writer in order.
//!
//! Frames are either streamed (rendered, encoded, dropped; one raster
//! alive at a time) or retained (all rendered first, then encoded),
//! which keeps the rasters around for anyone who wants to reuse them.

use std::io::Write;
use std::time::{Duration, Instant};

use errors::{Error, Result};
use kernel::{Kernel, DEFAULT_BAILOUT};
use planes::Num;
use render::{Frame, FrameRenderer};
use writer::GifWriter;
use zoom::ZoomSchedule;

/// What happens to a frame once it is rendered.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameRetention {
    /// Encode each frame as soon as it is rendered.
    Stream,
    /// Render every frame, then encode them all.
    Retain,
}

/// Every knob of a run.  The default reproduces the reference
/// animation: 300 frames of 256x256, scale 200 to 20000, 600
/// iterations, 6/100 s per frame, looping forever.
#[derive(Clone, Debug)]
pub struct Config {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Iteration cap per pixel.
    pub max_iterations: usize,
    /// Bailout radius of the kernel.
    pub bailout: Num,
    /// Where the zoom goes and how fast.
    pub schedule: ZoomSchedule,
    /// Delay per frame, in hundredths of a second.
    pub delay: u16,
    /// Number of repetitions; 0 loops forever.
    pub loops: u16,
    /// Render worker threads.
    pub threads: usize,
    /// Stream or retain frames.
    pub retention: FrameRetention,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 256,
            height: 256,
            max_iterations: 600,
            bailout: DEFAULT_BAILOUT,
            schedule: ZoomSchedule::default(),
            delay: 6,
            loops: 0,
            threads: ::num_cpus::get(),
            retention: FrameRetention::Stream,
        }
    }
}

impl Config {
    /// Refuse anything the renderer or the writer would choke on,
    /// before a single byte is written.
    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;
        self.renderer()?;
        if self.width > usize::from(::std::u16::MAX) || self.height > usize::from(::std::u16::MAX) {
            return Err(Error::NumericDomain(format!(
                "A GIF cannot hold a {}x{} frame",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// The frame renderer this configuration describes.
    pub fn renderer(&self) -> Result<FrameRenderer> {
        FrameRenderer::new(
            Kernel::new(self.bailout)?,
            self.width,
            self.height,
            self.max_iterations,
            self.threads,
        )
    }
}

/// What a run did and how long it took.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunStats {
    /// Frames written.
    pub frames: usize,
    /// Time spent rendering.
    pub render_time: Duration,
    /// Time spent quantising and encoding.
    pub encode_time: Duration,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

fn render_timed(
    renderer: &FrameRenderer,
    schedule: &ZoomSchedule,
    index: usize,
    frame: &mut Frame,
) -> Result<Duration> {
    let begin = Instant::now();
    let window = schedule.window(index, frame.width(), frame.height())?;
    renderer.render_into(&window, frame)?;
    let elapsed = begin.elapsed();
    debug!(
        "frame {} @ {}x: {:.3} ms",
        index,
        schedule.scale(index),
        millis(elapsed)
    );
    Ok(elapsed)
}

/// Render every frame of the schedule into memory, in order.
pub fn render_all(config: &Config) -> Result<Vec<Frame>> {
    config.validate()?;
    let renderer = config.renderer()?;
    let mut frames = Vec::with_capacity(config.schedule.frames);
    let mut total = Duration::from_secs(0);
    for index in 0..config.schedule.frames {
        let mut frame = Frame::new(config.width, config.height);
        total += render_timed(&renderer, &config.schedule, index, &mut frame)?;
        frames.push(frame);
    }
    info!(
        "rendered {} frame(s) in {:.3} ms",
        frames.len(),
        millis(total)
    );
    Ok(frames)
}

/// Encode already rendered frames, in order, to `sink`.
pub fn encode_all<W: Write>(config: &Config, frames: &[Frame], sink: W) -> Result<(W, Duration)> {
    let begin = Instant::now();
    let mut writer = GifWriter::new(sink, config.width, config.height, config.delay, config.loops)?;
    for (index, frame) in frames.iter().enumerate() {
        writer.write_frame(frame)?;
        trace!("encoded frame {} of {}", index + 1, frames.len());
    }
    let sink = writer.finish()?;
    let elapsed = begin.elapsed();
    info!("encoded {} frame(s) in {:.3} ms", frames.len(), millis(elapsed));
    Ok((sink, elapsed))
}

/// Produce the whole animation on `sink` and hand the sink back.
pub fn run<W: Write>(config: &Config, sink: W) -> Result<(W, RunStats)> {
    config.validate()?;
    info!(
        "zooming on {} over {} frame(s) of {}x{}, {} threads, {:?}",
        config.schedule.poi,
        config.schedule.frames,
        config.width,
        config.height,
        config.threads,
        config.retention
    );
    match config.retention {
        FrameRetention::Stream => stream(config, sink),
        FrameRetention::Retain => {
            let begin = Instant::now();
            let frames = render_all(config)?;
            let render_time = begin.elapsed();
            let (sink, encode_time) = encode_all(config, &frames, sink)?;
            Ok((
                sink,
                RunStats {
                    frames: frames.len(),
                    render_time,
                    encode_time,
                },
            ))
        }
    }
}

fn stream<W: Write>(config: &Config, sink: W) -> Result<(W, RunStats)> {
    let renderer = config.renderer()?;
    let mut writer = GifWriter::new(sink, config.width, config.height, config.delay, config.loops)?;
    let mut frame = Frame::new(config.width, config.height);
    let mut render_time = Duration::from_secs(0);
    let mut encode_time = Duration::from_secs(0);

    for index in 0..config.schedule.frames {
        render_time += render_timed(&renderer, &config.schedule, index, &mut frame)?;
        let begin = Instant::now();
        writer.write_frame(&frame)?;
        encode_time += begin.elapsed();
        trace!("encoded frame {} of {}", index + 1, config.schedule.frames);
    }

    let frames = writer.frames();
    let sink = writer.finish()?;
    info!(
        "rendered {} frame(s) in {:.3} ms, encoded in {:.3} ms",
        frames,
        millis(render_time),
        millis(encode_time)
    );
    Ok((
        sink,
        RunStats {
            frames,
            render_time,
            encode_time,
        },
    ))
}
