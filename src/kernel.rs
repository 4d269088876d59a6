// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The one-pixel Mandelbrot kernel: escape-time iteration followed by
//! smooth (continuous) colouring.
//!
//! The plain escape count produces visible bands wherever the count
//! steps by one.  Smooth colouring takes the magnitude of the final
//! `z` into account: the further past the bailout radius the orbit
//! landed, the earlier in its last step it "really" escaped.  That
//! fractional escape time, `mu`, picks two neighbouring entries of the
//! palette and blends between them.

use colour::{Colour, ULTRA_FRACTAL};
use errors::{Error, Result};
use num::Complex;
use planes::Num;

/// The default bailout radius.  2 is enough to prove divergence; 4
/// makes the smooth colouring noticeably more stable.
pub const DEFAULT_BAILOUT: Num = 4.0;

/// The result of iterating a single point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Escape {
    /// The last value of `z`.
    pub z: Complex<Num>,
    /// How many times `z <- z^2 + c` ran.
    pub iterations: usize,
}

/// The per-pixel kernel.  Immutable once built, so it can be shared
/// freely between render workers.
#[derive(Clone, Debug)]
pub struct Kernel {
    bailout: Num,
    palette: Vec<Colour>,
}

impl Default for Kernel {
    fn default() -> Self {
        Kernel {
            bailout: DEFAULT_BAILOUT,
            palette: ULTRA_FRACTAL.to_vec(),
        }
    }
}

impl Kernel {
    /// A kernel with the Ultra Fractal palette and the given bailout
    /// radius.  A radius of 1 or less cannot separate escaping orbits
    /// from bounded ones, and is refused.
    pub fn new(bailout: Num) -> Result<Kernel> {
        Kernel::with_palette(bailout, ULTRA_FRACTAL.to_vec())
    }

    /// A kernel with a caller-supplied colour cycle.
    pub fn with_palette(bailout: Num, palette: Vec<Colour>) -> Result<Kernel> {
        if !(bailout > 1.0) || !bailout.is_finite() {
            return Err(Error::NumericDomain(format!(
                "Bailout radius must be a finite number above 1, got {}",
                bailout
            )));
        }
        if palette.is_empty() {
            return Err(Error::NumericDomain(
                "The colour cycle needs at least one colour".to_string(),
            ));
        }
        Ok(Kernel { bailout, palette })
    }

    /// The bailout radius.
    pub fn bailout(&self) -> Num {
        self.bailout
    }

    /// Iterate `z <- z^2 + c` from zero while `|z| <= bailout` and
    /// fewer than `max_iterations` steps have run.
    pub fn escape(&self, c: Complex<Num>, max_iterations: usize) -> Escape {
        let mut z = Complex::new(0.0, 0.0);
        let mut iterations = 0;
        while z.norm() <= self.bailout && iterations < max_iterations {
            z = z * z + c;
            iterations += 1;
        }
        Escape { z, iterations }
    }

    /// Colour of an orbit that escaped.  `mu = i + 1 - nu` where
    /// `nu = log2(ln|z| / 2 / ln 2)`; the palette entries at
    /// `floor(mu - 1)` and `floor(mu)` are blended by `frac(mu)`.
    pub fn smooth_colour(&self, escape: &Escape) -> Colour {
        let ln2 = ::std::f32::consts::LN_2;
        let log_zn = escape.z.norm().ln() / 2.0;
        let nu = (log_zn / ln2).ln() / ln2;
        let mu = escape.iterations as Num + 1.0 - nu;
        let lower = self.entry(mu - 1.0);
        let upper = self.entry(mu);
        upper.mix(lower, mu - mu.floor())
    }

    /// The full pixel: black inside the set, smooth colour outside.
    #[inline]
    pub fn colour_at(&self, c: Complex<Num>, max_iterations: usize) -> Colour {
        let escape = self.escape(c, max_iterations);
        if escape.iterations < max_iterations {
            self.smooth_colour(&escape)
        } else {
            Colour::BLACK
        }
    }

    // Points escaping on the first step far outside the set can put
    // `mu - 1` just below zero, hence the Euclidean remainder.
    fn entry(&self, position: Num) -> Colour {
        let n = self.palette.len() as i64;
        self.palette[(position.floor() as i64).rem_euclid(n) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bailout_of_one_is_refused() {
        assert!(Kernel::new(1.0).is_err());
        assert!(Kernel::new(0.5).is_err());
        assert!(Kernel::new(2.0).is_ok());
    }

    #[test]
    fn empty_palette_is_refused() {
        assert!(Kernel::with_palette(4.0, vec![]).is_err());
    }

    #[test]
    fn origin_never_escapes() {
        let kernel = Kernel::default();
        let escape = kernel.escape(Complex::new(0.0, 0.0), 600);
        assert_eq!(escape.iterations, 600);
        assert_eq!(escape.z, Complex::new(0.0, 0.0));
        assert_eq!(kernel.colour_at(Complex::new(0.0, 0.0), 600), Colour::BLACK);
    }

    #[test]
    fn one_escapes_quickly() {
        let kernel = Kernel::default();
        let escape = kernel.escape(Complex::new(1.0, 0.0), 600);
        assert!(escape.iterations >= 1);
        assert!(escape.iterations < 600);
        assert!(escape.z.norm() > kernel.bailout());
    }

    #[test]
    fn escaped_pixels_are_opaque_colours() {
        let kernel = Kernel::default();
        for &(re, im) in &[(1.0, 0.0), (-2.5, 0.3), (3.9, -3.9), (0.3, 0.6)] {
            let escape = kernel.escape(Complex::new(re, im), 600);
            assert!(escape.iterations <= 600);
            let colour = kernel.colour_at(Complex::new(re, im), 600);
            assert_eq!(colour.a, 0xFF);
        }
    }

    #[test]
    fn far_points_wrap_the_palette() {
        // Escapes on the very first step with |z| well past the radius.
        let kernel = Kernel::default();
        let escape = kernel.escape(Complex::new(16.0, 16.0), 600);
        assert_eq!(escape.iterations, 1);

        let ln2 = ::std::f32::consts::LN_2;
        let nu = ((escape.z.norm().ln() / 2.0) / ln2).ln() / ln2;
        let mu = 2.0 - nu;
        assert!(mu - 1.0 < 0.0 && mu > 0.0);

        assert_eq!(kernel.entry(mu - 1.0), ULTRA_FRACTAL[15]);
        assert_eq!(kernel.entry(mu), ULTRA_FRACTAL[0]);
        let expected = ULTRA_FRACTAL[0].mix(ULTRA_FRACTAL[15], mu);
        assert_eq!(kernel.smooth_colour(&escape), expected);
    }

    #[test]
    fn kernel_is_deterministic() {
        let kernel = Kernel::default();
        let c = Complex::new(0.2869, 0.0142);
        assert_eq!(kernel.colour_at(c, 600), kernel.colour_at(c, 600));
    }

    #[test]
    fn tiny_windows_do_not_produce_nan() {
        let kernel = Kernel::default();
        let c = Complex::new(0.28692037, 0.014238694);
        let near = Complex::new(c.re + ::std::f32::EPSILON, c.im);
        for &p in &[c, near] {
            let escape = kernel.escape(p, 600);
            assert!(!escape.z.re.is_nan() && !escape.z.im.is_nan());
        }
    }
}
