//! Built-in perceptual hash.
//!
//! The frame is split into an 8x8 grid and each block is reduced to its mean
//! colour. A block contributes a set bit when its luma is above the grid mean
//! by more than `LUMA_MARGIN`, which gives 64 bits that only depend on the
//! picture's layout, not its resolution. The mean colour of the grid,
//! quantised to 4 bits per channel, is appended so flat images of different
//! colours do not collide.

use std::path::Path;

use image::{ImageReader, RgbImage};
use log::{debug, error};

use super::image_hasher::ImageHasher;
use crate::error_handling::types::StorageError;

const GRID: u64 = 8;
const CELLS: usize = (GRID * GRID) as usize;
/// Dead band above the grid mean, 2% of full-scale luma (255 * 1000).
/// Keeps near-flat images at all-zero layout bits.
const LUMA_MARGIN: u64 = 5_100;

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockMeanHasher;

impl BlockMeanHasher {
    pub fn new() -> Self {
        Self
    }

    /// Hash an already decoded RGB frame.
    pub fn hash_rgb(&self, img: &RgbImage) -> Result<String, StorageError> {
        let (w, h) = (img.width() as u64, img.height() as u64);
        if w == 0 || h == 0 {
            return Err(StorageError::HashFailed("image has no pixels".to_string()));
        }

        let mut cells = [[0u64; 3]; CELLS];
        for cy in 0..GRID {
            let (y0, y1) = block_span(cy, h);
            for cx in 0..GRID {
                let (x0, x1) = block_span(cx, w);
                let mut sum = [0u64; 3];
                for y in y0..y1 {
                    for x in x0..x1 {
                        let px = img.get_pixel(x as u32, y as u32);
                        sum[0] += px[0] as u64;
                        sum[1] += px[1] as u64;
                        sum[2] += px[2] as u64;
                    }
                }
                let count = (x1 - x0) * (y1 - y0);
                cells[(cy * GRID + cx) as usize] = [sum[0] / count, sum[1] / count, sum[2] / count];
            }
        }

        let lumas: Vec<u64> = cells.iter().map(|c| 299 * c[0] + 587 * c[1] + 114 * c[2]).collect();
        let total: u64 = lumas.iter().sum();
        let threshold = total + CELLS as u64 * LUMA_MARGIN;
        let bits = lumas
            .iter()
            .fold(0u64, |acc, &l| (acc << 1) | u64::from(l * CELLS as u64 > threshold));

        let mut colour = [0u64; 3];
        for c in &cells {
            colour[0] += c[0];
            colour[1] += c[1];
            colour[2] += c[2];
        }
        let quantise = |v: u64| (v / CELLS as u64) >> 4;

        Ok(format!(
            "{:016x}{:x}{:x}{:x}",
            bits,
            quantise(colour[0]),
            quantise(colour[1]),
            quantise(colour[2])
        ))
    }
}

/// Pixel range covered by grid block `i` along an axis of `len` pixels.
/// Blocks on images smaller than the grid still cover at least one pixel.
fn block_span(i: u64, len: u64) -> (u64, u64) {
    let start = i * len / GRID;
    let end = ((i + 1) * len / GRID).max(start + 1);
    (start, end)
}

impl ImageHasher for BlockMeanHasher {
    fn hash_image(&self, path: &Path) -> Result<String, StorageError> {
        // Format is sniffed from the content, so the extension is never consulted here.
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| {
                error!("Failed to open image {}: {}", path.display(), e);
                StorageError::HashFailed(format!("cannot open {}: {}", path.display(), e))
            })?;
        let img = reader.decode().map_err(|e| {
            error!("Failed to decode image {}: {}", path.display(), e);
            StorageError::HashFailed(format!("cannot decode {}: {}", path.display(), e))
        })?;
        let rgb = img.to_rgb8();
        let hash = self.hash_rgb(&rgb)?;
        debug!("Hashed {} ({}x{}) to {}", path.display(), rgb.width(), rgb.height(), hash);
        Ok(hash)
    }
}
