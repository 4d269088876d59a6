// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The GIF89a stream writer.  It owns the sink for the whole run:
//! header, logical screen descriptor and looping extension on
//! creation, one graphics control extension plus image record per
//! frame, and the trailer on `finish`.  Every frame carries its own
//! colour table; there is no global one.

use std::io::Write;

use errors::{Error, Result};
use lzw;
use quantize::{self, Quantized, Rgb};
use render::Frame;

/// Every image is LZW-coded over an 8-bit alphabet.
pub const MIN_CODE_SIZE: u8 = 8;

const EXTENSION_INTRODUCER: u8 = 0x21;
const APPLICATION_LABEL: u8 = 0xFF;
const GRAPHIC_CONTROL_LABEL: u8 = 0xF9;
const IMAGE_SEPARATOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;

/// Disposal method 1, "do not dispose", in the graphic control
/// packed field.
const DISPOSAL_KEEP: u8 = 1 << 2;
/// Colour resolution of 8 bits, no global colour table.
const SCREEN_PACKED: u8 = 0b0111_0000;
const LOCAL_TABLE_FLAG: u8 = 0x80;

fn put_u16<W: Write>(sink: &mut W, value: u16) -> Result<()> {
    sink.write_all(&value.to_le_bytes())?;
    Ok(())
}

fn dimension(value: usize) -> Result<u16> {
    if value == 0 || value > usize::from(::std::u16::MAX) {
        return Err(Error::NumericDomain(format!(
            "GIF dimensions must lie in 1..=65535, got {}",
            value
        )));
    }
    Ok(value as u16)
}

/// Number of bits needed to address `len` palette entries; never
/// less than 1, the smallest table the format can express.
pub fn table_bits(len: usize) -> u8 {
    let mut bits = 1;
    while (1usize << bits) < len {
        bits += 1;
    }
    bits
}

/// Writes an animated GIF to `W`, one frame at a time.
pub struct GifWriter<W: Write> {
    sink: W,
    width: u16,
    height: u16,
    delay: u16,
    frames: usize,
}

impl<W: Write> GifWriter<W> {
    /// Write the signature, the logical screen descriptor, and the
    /// Netscape looping extension.  `delay` is in hundredths of a
    /// second; a `loops` of 0 repeats forever.
    pub fn new(
        mut sink: W,
        width: usize,
        height: usize,
        delay: u16,
        loops: u16,
    ) -> Result<GifWriter<W>> {
        let (w, h) = (dimension(width)?, dimension(height)?);

        sink.write_all(b"GIF89a")?;
        put_u16(&mut sink, w)?;
        put_u16(&mut sink, h)?;
        sink.write_all(&[SCREEN_PACKED, 0, 0])?;

        sink.write_all(&[EXTENSION_INTRODUCER, APPLICATION_LABEL, 11])?;
        sink.write_all(b"NETSCAPE2.0")?;
        sink.write_all(&[3, 1])?;
        put_u16(&mut sink, loops)?;
        sink.write_all(&[0])?;

        Ok(GifWriter {
            sink,
            width: w,
            height: h,
            delay,
            frames: 0,
        })
    }

    /// Frames written so far.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Quantise `frame` and append it.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let quantized = quantize::quantize(frame)?;
        self.write_indexed(frame.width(), frame.height(), &quantized)
    }

    /// Append an image that is already reduced to a palette.
    pub fn write_indexed(&mut self, width: usize, height: usize, image: &Quantized) -> Result<()> {
        let expected = (usize::from(self.width), usize::from(self.height));
        if (width, height) != expected {
            return Err(Error::FrameMismatch {
                expected,
                found: (width, height),
            });
        }
        if image.indices.len() != width * height {
            return Err(Error::PixelCount {
                expected: width * height,
                found: image.indices.len(),
            });
        }
        if image.palette.is_empty() || image.palette.len() > quantize::MAX_COLOURS {
            return Err(Error::PaletteOverflow(image.palette.len()));
        }

        self.sink.write_all(&[EXTENSION_INTRODUCER, GRAPHIC_CONTROL_LABEL, 4, DISPOSAL_KEEP])?;
        put_u16(&mut self.sink, self.delay)?;
        self.sink.write_all(&[0, 0])?;

        let bits = table_bits(image.palette.len());
        self.sink.write_all(&[IMAGE_SEPARATOR])?;
        put_u16(&mut self.sink, 0)?;
        put_u16(&mut self.sink, 0)?;
        put_u16(&mut self.sink, self.width)?;
        put_u16(&mut self.sink, self.height)?;
        self.sink.write_all(&[LOCAL_TABLE_FLAG | (bits - 1)])?;
        self.write_palette(&image.palette, 1usize << bits)?;

        self.sink.write_all(&[MIN_CODE_SIZE])?;
        lzw::compress(&image.indices, MIN_CODE_SIZE, &mut self.sink)?;

        self.frames += 1;
        Ok(())
    }

    fn write_palette(&mut self, palette: &[Rgb], entries: usize) -> Result<()> {
        let mut table = Vec::with_capacity(entries * 3);
        for rgb in palette {
            table.extend_from_slice(rgb);
        }
        table.resize(entries * 3, 0);
        self.sink.write_all(&table)?;
        Ok(())
    }

    /// Write the trailer and hand the sink back.
    pub fn finish(mut self) -> Result<W> {
        self.sink.write_all(&[TRAILER])?;
        self.sink.flush()?;
        Ok(self.sink)
    }
}
