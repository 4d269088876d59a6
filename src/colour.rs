// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Colours as they live in the frame raster: four bytes, RGBA8888,
//! with the alpha channel pinned to opaque.  The renderer never
//! produces transparent pixels, so alpha is dropped the moment a
//! colour heads for the quantiser.

use num::clamp;

/// An opaque 8-bit RGBA colour.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Colour {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha; always 0xFF.
    pub a: u8,
}

impl Colour {
    /// Build an opaque colour out of three channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Colour {
        Colour { r, g, b, a: 0xFF }
    }

    /// Solid black, the colour of every point inside the set.
    pub const BLACK: Colour = Colour::new(0, 0, 0);

    /// Affine blend of `self` toward `other`: `(self - other) * t + other`
    /// per channel, clamped to a byte.  `t == 0` yields `other`,
    /// `t == 1` yields `self`.  Outside `[0, 1]` this extrapolates,
    /// which the renderer never asks for.
    pub fn mix(self, other: Colour, t: f32) -> Colour {
        debug_assert!(t >= 0.0 && t <= 1.0, "mix factor {} outside [0, 1]", t);
        let channel = |from: u8, to: u8| {
            let to = f32::from(to);
            clamp((f32::from(from) - to) * t + to, 0.0, 255.0) as u8
        };
        Colour::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    /// The colour with its alpha channel dropped.
    pub fn to_rgb(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// The sixteen-colour cycle popularised by Ultra Fractal.  The smooth
/// colouring walks this cycle as the escape time grows.
pub const ULTRA_FRACTAL: [Colour; 16] = [
    Colour::new(66, 30, 15),
    Colour::new(25, 7, 26),
    Colour::new(9, 1, 47),
    Colour::new(4, 4, 73),
    Colour::new(0, 7, 100),
    Colour::new(12, 44, 138),
    Colour::new(24, 82, 177),
    Colour::new(57, 125, 209),
    Colour::new(134, 181, 229),
    Colour::new(211, 236, 248),
    Colour::new(241, 233, 191),
    Colour::new(248, 201, 95),
    Colour::new(255, 170, 0),
    Colour::new(204, 128, 0),
    Colour::new(153, 87, 0),
    Colour::new(106, 52, 3),
];
