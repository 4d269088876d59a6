// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0
//! (the frame raster) and a rectangle on the complex plane (the
//! current zoom window).
use errors::{Error, Result};
use num::Complex;

/// The scalar type the whole renderer works in.  Single precision is
/// enough for the zoom depths we publish.
pub type Num = f32;

/// Linear map of `input` from `[i_min, i_max]` onto `[o_min, o_max]`.
/// The operation order is fixed so that renders are reproducible to
/// the bit.
#[inline]
pub fn lerp(input: Num, i_min: Num, i_max: Num, o_min: Num, o_max: Num) -> Num {
    ((o_max - o_min) * (input - i_min) / (i_max - i_min)) + o_min
}

/// Describes the width and height of an integral plane that is assumed to start at
/// 0,0 and all values are assumed to be non-negative integers.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegralPlane(pub usize, pub usize);

/// Describes the lower-left corner and upper-right corner of the
/// Complex plane, treating the real part of each value as the
/// x-component and the imaginary part of each value as the
/// y-component.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ComplexPlane(pub Complex<Num>, pub Complex<Num>);

/// Describes the x, y of a pixel in the raster.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps pixels of a raster onto points of a complex window.  Raster
/// offsets are row-major: offset `i` is column `i % width`, row
/// `i / width`.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    /// The right-upper hand corner of the integral cartesian plane.
    /// The left-lower is assumed to be at 0,0
    pub integral_plane: IntegralPlane,
    /// The two coordinates defining the complex cartesian plane,
    /// left-lower and right-upper
    pub complex_plane: ComplexPlane,
}

impl PlaneMapper {
    /// Takes the raster dimensions and two points describing the
    /// complex window.
    pub fn new(
        width: usize,
        height: usize,
        leftlower: Complex<Num>,
        rightupper: Complex<Num>,
    ) -> Result<PlaneMapper> {
        if width == 0 || height == 0 {
            return Err(Error::NumericDomain(format!(
                "The raster {}x{} has no pixels",
                width, height
            )));
        }

        if rightupper.re < leftlower.re {
            return Err(Error::NumericDomain(
                "The left lower corner is not to the left of the right upper corner.".to_string(),
            ));
        }

        if rightupper.im < leftlower.im {
            return Err(Error::NumericDomain(
                "The left lower corner is not lower than the right upper corner".to_string(),
            ));
        }

        Ok(PlaneMapper {
            integral_plane: IntegralPlane(width, height),
            complex_plane: ComplexPlane(leftlower, rightupper),
        })
    }

    /// A square window of half-width `radius` centred on `centre`.
    pub fn centred(
        width: usize,
        height: usize,
        centre: Complex<Num>,
        radius: Num,
    ) -> Result<PlaneMapper> {
        PlaneMapper::new(
            width,
            height,
            Complex::new(centre.re - radius, centre.im - radius),
            Complex::new(centre.re + radius, centre.im + radius),
        )
    }

    /// The total number of points in the integral grid.
    pub fn len(&self) -> usize {
        self.integral_plane.0 * self.integral_plane.1
    }

    /// Describes that the integral plane is of a size.
    pub fn is_empty(&self) -> bool {
        self.integral_plane.0 == 0 || self.integral_plane.1 == 0
    }

    /// Row-major offset to pixel.
    #[inline]
    pub fn offset_to_pixel(&self, offset: usize) -> Pixel {
        Pixel(offset % self.integral_plane.0, offset / self.integral_plane.0)
    }

    /// Given a pixel on the integral cartesian plane, map it onto the
    /// complex window.  Pixel (0, 0) lands exactly on the left-lower
    /// corner; the right-upper corner is the (exclusive) far edge.
    #[inline]
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<Num> {
        let ComplexPlane(ll, ru) = self.complex_plane;
        Complex::new(
            lerp(pixel.0 as Num, 0.0, self.integral_plane.0 as Num, ll.re, ru.re),
            lerp(pixel.1 as Num, 0.0, self.integral_plane.1 as Num, ll.im, ru.im),
        )
    }

    /// The complex point under a row-major raster offset.
    #[inline]
    pub fn offset_to_point(&self, offset: usize) -> Complex<Num> {
        self.pixel_to_point(self.offset_to_pixel(offset))
    }
}
