// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single error type shared by the renderer, the quantiser, and
//! the GIF encoder.  Only `Io` is something a caller can reasonably
//! react to; everything else is either a configuration we refuse to
//! start with or a broken internal invariant.

use failure::Fail;
use std::io;

/// Everything that can go wrong between the zoom schedule and the
/// byte sink.
#[derive(Debug, Fail)]
pub enum Error {
    /// The sink could not be created or written to.
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),

    /// A numeric parameter is outside the domain the kernel or the
    /// zoom schedule can work with.
    #[fail(display = "Numeric configuration error: {}", _0)]
    NumericDomain(String),

    /// The quantiser handed back more colours than a GIF colour table
    /// can hold.
    #[fail(display = "Palette overflow: {} colours (at most 256 allowed)", _0)]
    PaletteOverflow(usize),

    /// The LZW coder or the sub-block framer was about to emit
    /// something the container format forbids.
    #[fail(display = "Encoder invariant violated: {}", _0)]
    EncoderInvariant(String),

    /// A frame does not have the dimensions of the logical screen.
    #[fail(display = "Frame is {:?}, logical screen is {:?}", found, expected)]
    FrameMismatch {
        /// Width and height of the logical screen.
        expected: (usize, usize),
        /// Width and height of the offending frame.
        found: (usize, usize),
    },

    /// A pixel buffer does not hold one entry per pixel.
    #[fail(display = "Expected {} pixels, got {}", expected, found)]
    PixelCount {
        /// `width * height`
        expected: usize,
        /// Length of the buffer actually supplied.
        found: usize,
    },

    /// The reference LZW decoder met a malformed stream.
    #[fail(display = "Malformed LZW stream: {}", _0)]
    Decode(String),

    /// A render worker thread panicked before the join.
    #[fail(display = "A render worker panicked")]
    WorkerPanic,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// Crate-wide result alias.
pub type Result<T> = ::std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        let err: Error = io::Error::new(io::ErrorKind::Other, "disk full").into();
        match err {
            Error::Io(ref inner) => assert_eq!(inner.kind(), io::ErrorKind::Other),
            _ => panic!("expected an I/O error"),
        }
        assert_eq!(format!("{}", err), "I/O error: disk full");
    }

    #[test]
    fn frame_mismatch_reports_both_shapes() {
        let err = Error::FrameMismatch {
            expected: (256, 256),
            found: (4, 2),
        };
        assert_eq!(
            format!("{}", err),
            "Frame is (4, 2), logical screen is (256, 256)"
        );
    }

    #[test]
    fn pixel_count_reports_both_lengths() {
        let err = Error::PixelCount {
            expected: 16,
            found: 15,
        };
        assert_eq!(format!("{}", err), "Expected 16 pixels, got 15");
    }
}
