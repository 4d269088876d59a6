// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Variable-width LZW as the GIF container wants it.
//!
//! The alphabet is `2^m` symbols.  Two codes are reserved right after
//! it: the Clear Code at `2^m` and End-of-Information at `2^m + 1`.
//! Codes start `m + 1` bits wide and grow by one bit each time the
//! dictionary outgrows the current width, up to 12 bits.  When the
//! dictionary reaches 4096 entries the encoder emits a Clear Code and
//! starts over.  Codes are packed least-significant bit first and
//! the resulting bytes are framed into sub-blocks of at most 255
//! bytes, closed by an empty sub-block.

use std::collections::HashMap;
use std::io::Write;

use errors::{Error, Result};

/// The widest code the container allows.
pub const MAX_CODE_WIDTH: u8 = 12;

/// Number of codes a 12-bit dictionary can hold.
pub const DICTIONARY_LIMIT: u16 = 1 << MAX_CODE_WIDTH;

/// The longest sub-block the container allows.
pub const MAX_SUB_BLOCK: usize = 255;

/// Whatever consumes the codes the encoder produces.
pub trait CodeSink {
    /// Accept `code`, to be written `width` bits wide.
    fn put(&mut self, code: u16, width: u8) -> Result<()>;
}

/// Records the raw code stream.  Handy for inspecting what the encoder
/// decided without unpacking bits.
impl CodeSink for Vec<(u16, u8)> {
    fn put(&mut self, code: u16, width: u8) -> Result<()> {
        self.push((code, width));
        Ok(())
    }
}

/// Packs codes LSB-first and frames the bytes into sub-blocks on the
/// way to the underlying writer.
pub struct SubBlockWriter<W: Write> {
    sink: W,
    bits: u32,
    pending: u8,
    block: Vec<u8>,
}

impl<W: Write> SubBlockWriter<W> {
    /// Start a fresh stream on `sink`.
    pub fn new(sink: W) -> SubBlockWriter<W> {
        SubBlockWriter {
            sink,
            bits: 0,
            pending: 0,
            block: Vec::with_capacity(MAX_SUB_BLOCK),
        }
    }

    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.block.push(byte);
        if self.block.len() == MAX_SUB_BLOCK {
            self.flush_block()?;
        }
        Ok(())
    }

    fn flush_block(&mut self) -> Result<()> {
        if self.block.is_empty() {
            return Ok(());
        }
        if self.block.len() > MAX_SUB_BLOCK {
            return Err(Error::EncoderInvariant(format!(
                "sub-block of {} bytes",
                self.block.len()
            )));
        }
        self.sink.write_all(&[self.block.len() as u8])?;
        self.sink.write_all(&self.block)?;
        self.block.clear();
        Ok(())
    }

    /// Pad the last byte with zeros, flush the last sub-block, write
    /// the empty terminating sub-block, and hand the writer back.
    pub fn finish(mut self) -> Result<W> {
        if self.pending > 0 {
            let byte = (self.bits & 0xFF) as u8;
            self.bits = 0;
            self.pending = 0;
            self.push_byte(byte)?;
        }
        self.flush_block()?;
        self.sink.write_all(&[0])?;
        Ok(self.sink)
    }
}

impl<W: Write> CodeSink for SubBlockWriter<W> {
    fn put(&mut self, code: u16, width: u8) -> Result<()> {
        self.bits |= u32::from(code) << self.pending;
        self.pending += width;
        while self.pending >= 8 {
            let byte = (self.bits & 0xFF) as u8;
            self.bits >>= 8;
            self.pending -= 8;
            self.push_byte(byte)?;
        }
        Ok(())
    }
}

fn check_min_code_size(min_code_size: u8) -> Result<()> {
    if min_code_size < 2 || min_code_size > 8 {
        return Err(Error::EncoderInvariant(format!(
            "minimum code size {} outside 2..=8",
            min_code_size
        )));
    }
    Ok(())
}

/// Dictionary and code width of one LZW stream.
struct Dictionary {
    min_code_size: u8,
    width: u8,
    next_code: u16,
    strings: HashMap<(u16, u8), u16>,
}

impl Dictionary {
    fn new(min_code_size: u8) -> Dictionary {
        Dictionary {
            min_code_size,
            width: min_code_size + 1,
            next_code: (1u16 << min_code_size) + 2,
            strings: HashMap::with_capacity(usize::from(DICTIONARY_LIMIT)),
        }
    }

    fn clear_code(&self) -> u16 {
        1u16 << self.min_code_size
    }

    fn reset(&mut self) {
        self.width = self.min_code_size + 1;
        self.next_code = self.clear_code() + 2;
        self.strings.clear();
    }

    fn emit<S: CodeSink>(&self, code: u16, sink: &mut S) -> Result<()> {
        if u32::from(code) >= 1u32 << self.width {
            return Err(Error::EncoderInvariant(format!(
                "code {} does not fit in {} bits",
                code, self.width
            )));
        }
        sink.put(code, self.width)
    }

    /// Add `prefix . suffix`; true when the dictionary is now full and
    /// has to be cleared.
    fn insert(&mut self, prefix: u16, suffix: u8) -> bool {
        self.strings.insert((prefix, suffix), self.next_code);
        self.next_code += 1;
        if u32::from(self.next_code) > 1u32 << self.width && self.width < MAX_CODE_WIDTH {
            self.width += 1;
        }
        self.next_code == DICTIONARY_LIMIT
    }
}

/// Run LZW over `indices` and hand every code to `sink`, starting with
/// a Clear Code and ending with End-of-Information.  Every index must
/// be below `2^min_code_size`.
pub fn encode<S: CodeSink>(indices: &[u8], min_code_size: u8, sink: &mut S) -> Result<()> {
    check_min_code_size(min_code_size)?;
    let mut dictionary = Dictionary::new(min_code_size);
    let clear = dictionary.clear_code();
    let eoi = clear + 1;
    let symbol = |k: u8| {
        if u16::from(k) < clear {
            Ok(k)
        } else {
            Err(Error::EncoderInvariant(format!(
                "index {} outside a {}-bit alphabet",
                k, min_code_size
            )))
        }
    };

    dictionary.emit(clear, sink)?;
    let mut rest = indices.iter();
    let mut prefix = match rest.next() {
        Some(&k) => u16::from(symbol(k)?),
        None => return dictionary.emit(eoi, sink),
    };

    for &k in rest {
        let k = symbol(k)?;
        if let Some(&code) = dictionary.strings.get(&(prefix, k)) {
            prefix = code;
            continue;
        }
        dictionary.emit(prefix, sink)?;
        if dictionary.insert(prefix, k) {
            dictionary.emit(clear, sink)?;
            dictionary.reset();
        }
        prefix = u16::from(k);
    }

    dictionary.emit(prefix, sink)?;
    dictionary.emit(eoi, sink)
}

/// The code stream for `indices`, without bit packing.
pub fn encode_codes(indices: &[u8], min_code_size: u8) -> Result<Vec<(u16, u8)>> {
    let mut codes = Vec::new();
    encode(indices, min_code_size, &mut codes)?;
    Ok(codes)
}

/// Compress `indices` into sub-blocks written to `sink`, including the
/// terminating empty sub-block.  The minimum-code-size byte that
/// precedes the stream in a GIF is the caller's business.
pub fn compress<W: Write>(indices: &[u8], min_code_size: u8, sink: W) -> Result<W> {
    let mut writer = SubBlockWriter::new(sink);
    encode(indices, min_code_size, &mut writer)?;
    writer.finish()
}

/// Strip the sub-block framing off `data`, stopping at the empty
/// terminator.
pub fn unframe(data: &[u8]) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(data.len());
    let mut cursor = 0;
    loop {
        let len = match data.get(cursor) {
            Some(&len) => usize::from(len),
            None => return Err(Error::Decode("sub-blocks end without a terminator".to_string())),
        };
        cursor += 1;
        if len == 0 {
            return Ok(bytes);
        }
        match data.get(cursor..cursor + len) {
            Some(block) => bytes.extend_from_slice(block),
            None => return Err(Error::Decode("truncated sub-block".to_string())),
        }
        cursor += len;
    }
}

struct BitReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> BitReader<'a> {
    fn read(&mut self, width: u8) -> Option<u16> {
        let width = usize::from(width);
        if self.position + width > self.bytes.len() * 8 {
            return None;
        }
        let mut code = 0u16;
        for bit in 0..width {
            let at = self.position + bit;
            if (self.bytes[at / 8] >> (at % 8)) & 1 != 0 {
                code |= 1u16 << bit;
            }
        }
        self.position += width;
        Some(code)
    }
}

/// The reference decoder: undo [`compress`], framing included.
pub fn decompress(data: &[u8], min_code_size: u8) -> Result<Vec<u8>> {
    check_min_code_size(min_code_size)?;
    let bytes = unframe(data)?;
    let mut reader = BitReader {
        bytes: &bytes,
        position: 0,
    };

    let clear = 1u16 << min_code_size;
    let eoi = clear + 1;
    let initial: Vec<Vec<u8>> = (0..clear)
        .map(|k| vec![k as u8])
        .chain(vec![vec![], vec![]])
        .collect();

    let mut table = initial.clone();
    let mut width = min_code_size + 1;
    let mut previous: Option<Vec<u8>> = None;
    let mut output = Vec::new();

    loop {
        let code = match reader.read(width) {
            Some(code) => code,
            None => return Err(Error::Decode("stream ends before End-of-Information".to_string())),
        };
        if code == clear {
            table = initial.clone();
            width = min_code_size + 1;
            previous = None;
            continue;
        }
        if code == eoi {
            return Ok(output);
        }

        let entry = match previous {
            _ if usize::from(code) < table.len() => table[usize::from(code)].clone(),
            Some(ref p) if usize::from(code) == table.len() => {
                let mut entry = p.clone();
                entry.push(p[0]);
                entry
            }
            _ => return Err(Error::Decode(format!("code {} is not in the dictionary", code))),
        };
        output.extend_from_slice(&entry);

        if let Some(mut p) = previous.take() {
            if table.len() < usize::from(DICTIONARY_LIMIT) {
                p.push(entry[0]);
                table.push(p);
            }
        }
        if table.len() == 1usize << width && width < MAX_CODE_WIDTH {
            width += 1;
        }
        previous = Some(entry);
    }
}
