#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom renderer
//!
//! Renders an animated zoom into the Mandelbrot set and writes it out
//! as a looping GIF89a, with no image library in between.
//!
//! There are two stages.  The renderer walks a zoom schedule one
//! frame at a time; for each frame it maps every pixel onto a window
//! of the complex plane, runs the escape-time iteration there, and
//! turns the escape time into a smooth colour from a sixteen-colour
//! cycle.  Pixels are independent, so a frame is spread across a pool
//! of scoped threads.  The encoder then reduces each frame to at most
//! 256 colours with a median cut, LZW-compresses the palette indices,
//! and appends the image record to the GIF stream.

extern crate crossbeam;
extern crate failure;
extern crate itertools;
extern crate num;
extern crate num_cpus;
#[macro_use]
extern crate tracing;

#[cfg(test)]
extern crate rand;

pub mod animation;
pub mod colour;
pub mod errors;
pub mod kernel;
pub mod lzw;
pub mod planes;
pub mod quantize;
pub mod render;
pub mod writer;
pub mod zoom;

pub use animation::{run, Config, FrameRetention, RunStats};
pub use colour::Colour;
pub use errors::{Error, Result};
pub use kernel::Kernel;
pub use render::{Frame, FrameRenderer};
pub use writer::GifWriter;
pub use zoom::ZoomSchedule;
