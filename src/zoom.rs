// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The zoom schedule: which window of the complex plane each frame
//! shows.  The scale grows linearly from `scale_start` to `scale_end`
//! over the run, and the half-width of the window is its reciprocal,
//! so the window shrinks hyperbolically toward the point of interest.

use errors::{Error, Result};
use num::Complex;
use planes::{lerp, Num, PlaneMapper};

/// Real part of the default point of interest.
pub const DEFAULT_POI_RE: f64 = 0.286_931_868_895_045_13 - 0.000_011_5;
/// Imaginary part of the default point of interest.
pub const DEFAULT_POI_IM: f64 = 0.014_286_693_904_085_048 - 0.000_048;

/// A point of interest and a linear scale ramp across a fixed number
/// of frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ZoomSchedule {
    /// The point the zoom converges on.
    pub poi: Complex<Num>,
    /// Number of frames in the run.
    pub frames: usize,
    /// Scale at frame 0.
    pub scale_start: Num,
    /// Scale the ramp reaches at frame `frames` (one past the last).
    pub scale_end: Num,
}

impl Default for ZoomSchedule {
    fn default() -> Self {
        ZoomSchedule {
            poi: Complex::new(DEFAULT_POI_RE as Num, DEFAULT_POI_IM as Num),
            frames: 300,
            scale_start: 200.0,
            scale_end: 20000.0,
        }
    }
}

impl ZoomSchedule {
    /// Build and validate a schedule.
    pub fn new(
        poi: Complex<Num>,
        frames: usize,
        scale_start: Num,
        scale_end: Num,
    ) -> Result<ZoomSchedule> {
        let schedule = ZoomSchedule {
            poi,
            frames,
            scale_start,
            scale_end,
        };
        schedule.validate()?;
        Ok(schedule)
    }

    /// Refuse schedules that would divide by zero or walk through a
    /// zero scale.
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            return Err(Error::NumericDomain(
                "A zoom needs at least one frame".to_string(),
            ));
        }
        if !self.poi.re.is_finite() || !self.poi.im.is_finite() {
            return Err(Error::NumericDomain(format!(
                "Point of interest {} is not finite",
                self.poi
            )));
        }
        if !(self.scale_start > 0.0 && self.scale_end > 0.0)
            || !self.scale_start.is_finite()
            || !self.scale_end.is_finite()
        {
            return Err(Error::NumericDomain(format!(
                "Scales must be finite and positive, got {} and {}",
                self.scale_start, self.scale_end
            )));
        }
        if self.scale_start == self.scale_end {
            return Err(Error::NumericDomain(format!(
                "Start and end scale are both {}; there is nothing to zoom",
                self.scale_start
            )));
        }
        Ok(())
    }

    /// The scale at frame `frame`.
    pub fn scale(&self, frame: usize) -> Num {
        lerp(
            frame as Num,
            0.0,
            self.frames as Num,
            self.scale_start,
            self.scale_end,
        )
    }

    /// Half the width of the window at frame `frame`.
    pub fn half_width(&self, frame: usize) -> Num {
        1.0 / self.scale(frame)
    }

    /// The window frame `frame` shows on a `width` x `height` raster.
    pub fn window(&self, frame: usize, width: usize, height: usize) -> Result<PlaneMapper> {
        PlaneMapper::centred(width, height, self.poi, self.half_width(frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_is_valid() {
        let zoom = ZoomSchedule::default();
        assert!(zoom.validate().is_ok());
        assert_eq!(zoom.frames, 300);
    }

    #[test]
    fn half_width_at_frame_150() {
        let zoom = ZoomSchedule::default();
        assert_eq!(zoom.scale(150), 10100.0);
        assert_eq!(zoom.half_width(150), 1.0 / 10100.0);
    }

    #[test]
    fn first_frame_starts_at_scale_start() {
        let zoom = ZoomSchedule::default();
        assert_eq!(zoom.half_width(0), 1.0 / 200.0);
        let window = zoom.window(0, 256, 256).unwrap();
        let corner = window.offset_to_point(0);
        assert_eq!(corner.re, zoom.poi.re - 1.0 / 200.0);
        assert_eq!(corner.im, zoom.poi.im - 1.0 / 200.0);
    }

    #[test]
    fn windows_shrink_monotonically() {
        let zoom = ZoomSchedule::default();
        let widths: Vec<Num> = (0..zoom.frames).map(|f| zoom.half_width(f)).collect();
        assert!(widths.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn zero_frames_are_refused() {
        let zoom = ZoomSchedule::new(Complex::new(0.0, 0.0), 0, 1.0, 2.0);
        assert!(zoom.is_err());
    }

    #[test]
    fn equal_scales_are_refused() {
        let zoom = ZoomSchedule::new(Complex::new(0.0, 0.0), 10, 5.0, 5.0);
        assert!(zoom.is_err());
    }

    #[test]
    fn non_positive_scales_are_refused() {
        assert!(ZoomSchedule::new(Complex::new(0.0, 0.0), 10, -5.0, 5.0).is_err());
        assert!(ZoomSchedule::new(Complex::new(0.0, 0.0), 10, 0.0, 5.0).is_err());
    }

    #[test]
    fn single_frame_schedule_is_fine() {
        let zoom = ZoomSchedule::new(Complex::new(-0.5, 0.0), 1, 1.0, 2.0).unwrap();
        assert_eq!(zoom.half_width(0), 1.0);
    }
}
