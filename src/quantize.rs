// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Palette quantisation: reduce a frame to at most 256 colours plus
//! one palette index per pixel.
//!
//! Frames with 256 distinct colours or fewer are reproduced exactly.
//! Anything richer goes through a median cut over the colour
//! histogram: the box with the largest squared error is split at the
//! weighted median of its widest channel until there are 256 boxes,
//! each box contributes its weighted mean, and every colour is then
//! mapped to its nearest palette entry.  All orderings are total, so
//! the result depends on nothing but the input raster.

use std::collections::HashMap;

use colour::Colour;
use errors::{Error, Result};
use itertools::{Itertools, MinMaxResult};
use render::Frame;

/// The largest colour table a GIF image can carry.
pub const MAX_COLOURS: usize = 256;

/// A colour with its alpha channel dropped.
pub type Rgb = [u8; 3];

/// A palette and the per-pixel indices into it.
#[derive(Clone, Debug, PartialEq)]
pub struct Quantized {
    /// At most 256 entries.
    pub palette: Vec<Rgb>,
    /// One entry per pixel, row-major, same shape as the source frame.
    pub indices: Vec<u8>,
}

impl Quantized {
    /// The raster as the palette reproduces it.
    pub fn reconstruct(&self) -> Vec<Rgb> {
        self.indices
            .iter()
            .map(|&i| self.palette[i as usize])
            .collect()
    }
}

/// Quantise a frame to at most 256 colours.
pub fn quantize(frame: &Frame) -> Result<Quantized> {
    quantize_pixels(frame.pixels(), MAX_COLOURS)
}

/// Quantise a run of pixels to at most `max_colours` colours.
pub fn quantize_pixels(pixels: &[Colour], max_colours: usize) -> Result<Quantized> {
    if max_colours == 0 || max_colours > MAX_COLOURS {
        return Err(Error::NumericDomain(format!(
            "A palette holds between 1 and {} colours, asked for {}",
            MAX_COLOURS, max_colours
        )));
    }

    let histogram = histogram(pixels);
    let palette: Vec<Rgb> = if histogram.len() <= max_colours {
        histogram.iter().map(|&(rgb, _)| rgb).collect()
    } else {
        median_cut(histogram.clone(), max_colours)
    };

    if palette.len() > MAX_COLOURS {
        return Err(Error::PaletteOverflow(palette.len()));
    }

    let mut lookup: HashMap<Rgb, u8> = HashMap::with_capacity(histogram.len());
    for &(rgb, _) in &histogram {
        lookup.insert(rgb, nearest(&palette, rgb));
    }

    let mut indices = Vec::with_capacity(pixels.len());
    for pixel in pixels {
        match lookup.get(&pixel.to_rgb()) {
            Some(&index) => indices.push(index),
            None => return Err(Error::PaletteOverflow(palette.len())),
        }
    }

    Ok(Quantized { palette, indices })
}

/// Distinct colours and their pixel counts, sorted by colour.
fn histogram(pixels: &[Colour]) -> Vec<(Rgb, u32)> {
    let mut counts: HashMap<Rgb, u32> = HashMap::new();
    for pixel in pixels {
        *counts.entry(pixel.to_rgb()).or_insert(0) += 1;
    }
    let mut histogram: Vec<(Rgb, u32)> = counts.into_iter().collect();
    histogram.sort_unstable_by_key(|&(rgb, _)| rgb);
    histogram
}

#[inline]
fn distance(a: Rgb, b: Rgb) -> u32 {
    (0..3)
        .map(|ch| {
            let d = i32::from(a[ch]) - i32::from(b[ch]);
            (d * d) as u32
        })
        .sum()
}

/// Index of the palette entry closest to `rgb`; the lowest index wins
/// a tie.
fn nearest(palette: &[Rgb], rgb: Rgb) -> u8 {
    let mut best = (0, ::std::u32::MAX);
    for (i, &entry) in palette.iter().enumerate() {
        let d = distance(entry, rgb);
        if d < best.1 {
            best = (i, d);
            if d == 0 {
                break;
            }
        }
    }
    best.0 as u8
}

/// A contiguous run of the histogram.
struct ColourBox {
    start: usize,
    end: usize,
    error: u64,
}

impl ColourBox {
    fn new(entries: &[(Rgb, u32)], start: usize, end: usize) -> ColourBox {
        let mean = weighted_mean(&entries[start..end]);
        let error = entries[start..end]
            .iter()
            .map(|&(rgb, count)| {
                let d: f64 = (0..3)
                    .map(|ch| {
                        let delta = f64::from(rgb[ch]) - mean[ch];
                        delta * delta
                    })
                    .sum();
                d * f64::from(count)
            })
            .sum::<f64>() as u64;
        ColourBox { start, end, error }
    }

    fn splittable(&self) -> bool {
        self.end - self.start > 1
    }
}

fn weighted_mean(entries: &[(Rgb, u32)]) -> [f64; 3] {
    let mut sums = [0f64; 3];
    let mut total = 0f64;
    for &(rgb, count) in entries {
        let count = f64::from(count);
        for ch in 0..3 {
            sums[ch] += f64::from(rgb[ch]) * count;
        }
        total += count;
    }
    [sums[0] / total, sums[1] / total, sums[2] / total]
}

fn widest_channel(entries: &[(Rgb, u32)]) -> usize {
    let mut widest = (0, 0);
    for ch in 0..3 {
        let range = match entries.iter().map(|&(rgb, _)| rgb[ch]).minmax() {
            MinMaxResult::MinMax(lo, hi) => hi - lo,
            _ => 0,
        };
        if range > widest.1 {
            widest = (ch, range);
        }
    }
    widest.0
}

fn median_cut(mut entries: Vec<(Rgb, u32)>, max_colours: usize) -> Vec<Rgb> {
    let mut boxes = vec![ColourBox::new(&entries, 0, entries.len())];

    while boxes.len() < max_colours {
        // Worst box first; the earliest box wins a tie.
        let target = boxes
            .iter()
            .enumerate()
            .filter(|&(_, b)| b.splittable())
            .fold(None, |best: Option<(usize, u64)>, (i, b)| match best {
                Some((_, error)) if error >= b.error => best,
                _ => Some((i, b.error)),
            });
        let index = match target {
            Some((index, _)) => index,
            None => break,
        };

        let (start, end) = (boxes[index].start, boxes[index].end);
        let channel = widest_channel(&entries[start..end]);
        entries[start..end].sort_unstable_by_key(|&(rgb, _)| {
            let mut key = [rgb[channel], 0, 0];
            key[1] = rgb[(channel + 1) % 3];
            key[2] = rgb[(channel + 2) % 3];
            key
        });

        let total: u64 = entries[start..end]
            .iter()
            .map(|&(_, count)| u64::from(count))
            .sum();
        let mut running = 0u64;
        let mut split = start + 1;
        for (i, &(_, count)) in entries[start..end].iter().enumerate() {
            running += u64::from(count);
            if running * 2 >= total {
                split = start + i + 1;
                break;
            }
        }
        let split = split.max(start + 1).min(end - 1);

        boxes[index] = ColourBox::new(&entries, start, split);
        boxes.push(ColourBox::new(&entries, split, end));
    }

    boxes
        .iter()
        .map(|b| {
            let mean = weighted_mean(&entries[b.start..b.end]);
            [
                mean[0].round() as u8,
                mean[1].round() as u8,
                mean[2].round() as u8,
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Frame {
        let pixels = (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                Colour::new((x * 255 / width) as u8, (y * 255 / height) as u8, ((x ^ y) & 0xFF) as u8)
            })
            .collect();
        Frame::from_pixels(width, height, pixels).unwrap()
    }

    #[test]
    fn uniform_frame_has_one_entry() {
        let frame = Frame::from_pixels(4, 4, vec![Colour::new(9, 1, 47); 16]).unwrap();
        let q = quantize(&frame).unwrap();
        assert_eq!(q.palette, vec![[9, 1, 47]]);
        assert!(q.indices.iter().all(|&i| i == 0));
    }

    #[test]
    fn few_colours_are_lossless() {
        let frame = gradient(16, 16);
        let q = quantize(&frame).unwrap();
        let original: Vec<Rgb> = frame.pixels().iter().map(|c| c.to_rgb()).collect();
        assert!(q.palette.len() <= MAX_COLOURS);
        assert_eq!(q.reconstruct(), original);
    }

    #[test]
    fn rich_frames_reduce_to_256_colours() {
        let frame = gradient(128, 128);
        let q = quantize(&frame).unwrap();
        assert_eq!(q.palette.len(), MAX_COLOURS);
        assert_eq!(q.indices.len(), 128 * 128);
    }

    #[test]
    fn pixels_map_to_their_nearest_entry() {
        let frame = gradient(64, 64);
        let q = quantize(&frame).unwrap();
        for (pixel, &index) in frame.pixels().iter().zip(q.indices.iter()) {
            let rgb = pixel.to_rgb();
            let chosen = distance(q.palette[index as usize], rgb);
            assert!(q.palette.iter().all(|&p| distance(p, rgb) >= chosen));
        }
    }

    #[test]
    fn quantisation_is_deterministic() {
        let frame = gradient(96, 80);
        assert_eq!(quantize(&frame).unwrap(), quantize(&frame).unwrap());
    }

    #[test]
    fn median_cut_beats_a_single_mean() {
        let frame = gradient(64, 64);
        let q = quantize_pixels(frame.pixels(), 16).unwrap();
        assert_eq!(q.palette.len(), 16);
        let error: u64 = frame
            .pixels()
            .iter()
            .zip(q.reconstruct())
            .map(|(p, r)| u64::from(distance(p.to_rgb(), r)))
            .sum();
        let one = quantize_pixels(frame.pixels(), 1).unwrap();
        let baseline: u64 = frame
            .pixels()
            .iter()
            .zip(one.reconstruct())
            .map(|(p, r)| u64::from(distance(p.to_rgb(), r)))
            .sum();
        assert!(error < baseline);
    }

    #[test]
    fn palette_size_is_bounded() {
        for &max in &[0, 257] {
            match quantize_pixels(&[Colour::BLACK], max) {
                Err(Error::NumericDomain(_)) => {}
                other => panic!("expected a domain error for {}, got {:?}", max, other),
            }
        }
    }
}
