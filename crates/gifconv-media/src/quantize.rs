// crates/gifconv-media/src/quantize.rs
//
// Palette reduction for one RGBA frame: 256 colours, no dithering, alpha
// ignored.
//
//   • Frames with ≤ 256 distinct colours get an exact palette regardless of
//     method; nothing to reduce.
//   • MedianCut: recursive split of the colour population along its widest
//     channel at the median; each box's mean becomes a palette entry.
//   • NeuQuant: color_quant's neural-net quantizer, sample factor 10.
//   • `refine_passes` k-means passes then pull every palette entry to the
//     mean of the pixels mapped to it, stopping early once stable.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use gifconv_core::job::QuantizeMethod;

pub const PALETTE_SIZE: usize = 256;

/// NeuQuant sample factor: 1 = best quality, 30 = fastest.
const NEUQUANT_SAMPLE: i32 = 10;

type Rgb = [u8; 3];

/// Reduce `rgba` to a flat RGB palette plus one index per pixel.
/// Returns `None` for `QuantizeMethod::None`.
pub fn quantize(rgba: &[u8], method: QuantizeMethod, refine_passes: u32) -> Option<(Vec<u8>, Vec<u8>)> {
    if method == QuantizeMethod::None {
        return None;
    }
    let pixels: Vec<Rgb> = rgba.chunks_exact(4).map(|p| [p[0], p[1], p[2]]).collect();

    let mut palette = match exact_palette(&pixels) {
        Some(exact) => exact,
        None => match method {
            QuantizeMethod::NeuQuant => neuquant(rgba),
            _                        => median_cut(&pixels, PALETTE_SIZE),
        },
    };
    refine(&pixels, &mut palette, refine_passes);

    let mut lookup = NearestLookup::new(&palette);
    let indices = pixels.iter().map(|&c| lookup.index_of(c)).collect();
    let flat = palette.iter().flat_map(|c| c.iter().copied()).collect();
    Some((flat, indices))
}

/// Distinct colours in first-seen order, or `None` if there are more than
/// `PALETTE_SIZE`.
fn exact_palette(pixels: &[Rgb]) -> Option<Vec<Rgb>> {
    let mut seen: HashSet<Rgb> = HashSet::new();
    let mut palette = Vec::new();
    for &c in pixels {
        if seen.insert(c) {
            if palette.len() == PALETTE_SIZE {
                return None;
            }
            palette.push(c);
        }
    }
    if palette.is_empty() {
        palette.push([0, 0, 0]);
    }
    Some(palette)
}

struct ColorBox {
    range:   Range<usize>,
    channel: usize,
    span:    u8,
}

impl ColorBox {
    fn new(colors: &[Rgb], range: Range<usize>) -> Self {
        let mut lo = [u8::MAX; 3];
        let mut hi = [u8::MIN; 3];
        for c in &colors[range.clone()] {
            for ch in 0..3 {
                lo[ch] = lo[ch].min(c[ch]);
                hi[ch] = hi[ch].max(c[ch]);
            }
        }
        let (channel, span) = (0..3)
            .map(|ch| (ch, hi[ch].saturating_sub(lo[ch])))
            .max_by_key(|&(_, span)| span)
            .unwrap_or((0, 0));
        Self { range, channel, span }
    }
}

fn median_cut(pixels: &[Rgb], max_colors: usize) -> Vec<Rgb> {
    let mut colors = pixels.to_vec();
    let mut boxes = vec![ColorBox::new(&colors, 0..colors.len())];

    while boxes.len() < max_colors {
        let Some(pick) = boxes.iter()
            .enumerate()
            .filter(|(_, b)| b.span > 0 && b.range.len() >= 2)
            .max_by_key(|(_, b)| (b.span, b.range.len()))
            .map(|(i, _)| i)
        else { break };

        let ColorBox { range, channel, .. } = boxes.swap_remove(pick);
        colors[range.clone()].sort_unstable_by_key(|c| c[channel]);
        let mid = range.start + range.len() / 2;
        boxes.push(ColorBox::new(&colors, range.start..mid));
        boxes.push(ColorBox::new(&colors, mid..range.end));
    }

    boxes.iter().map(|b| mean(&colors[b.range.clone()])).collect()
}

fn mean(colors: &[Rgb]) -> Rgb {
    let n = colors.len().max(1) as u64;
    let mut sum = [0u64; 3];
    for c in colors {
        for ch in 0..3 {
            sum[ch] += c[ch] as u64;
        }
    }
    [(sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8]
}

fn neuquant(rgba: &[u8]) -> Vec<Rgb> {
    let nq = color_quant::NeuQuant::new(NEUQUANT_SAMPLE, PALETTE_SIZE, rgba);
    nq.color_map_rgb()
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect()
}

fn refine(pixels: &[Rgb], palette: &mut [Rgb], passes: u32) {
    for pass in 0..passes {
        let mut sums = vec![[0u64; 4]; palette.len()];
        {
            let mut lookup = NearestLookup::new(palette);
            for &c in pixels {
                let s = &mut sums[lookup.index_of(c) as usize];
                s[0] += c[0] as u64;
                s[1] += c[1] as u64;
                s[2] += c[2] as u64;
                s[3] += 1;
            }
        }
        let mut changed = false;
        for (entry, s) in palette.iter_mut().zip(&sums) {
            if s[3] == 0 { continue; }
            let m = [(s[0] / s[3]) as u8, (s[1] / s[3]) as u8, (s[2] / s[3]) as u8];
            if m != *entry {
                *entry = m;
                changed = true;
            }
        }
        if !changed {
            log::trace!("[quantize] k-means converged after {} passes", pass + 1);
            break;
        }
    }
}

/// Nearest palette entry by squared RGB distance, memoised per colour.
struct NearestLookup<'a> {
    palette: &'a [Rgb],
    cache:   HashMap<Rgb, u8>,
}

impl<'a> NearestLookup<'a> {
    fn new(palette: &'a [Rgb]) -> Self {
        Self { palette, cache: HashMap::new() }
    }

    fn index_of(&mut self, c: Rgb) -> u8 {
        let palette = self.palette;
        *self.cache.entry(c).or_insert_with(|| {
            palette.iter()
                .enumerate()
                .min_by_key(|(_, p)| {
                    (0..3).map(|ch| {
                        let d = p[ch] as i32 - c[ch] as i32;
                        (d * d) as u32
                    }).sum::<u32>()
                })
                .map(|(i, _)| i as u8)
                .unwrap_or(0)
        })
    }
}
