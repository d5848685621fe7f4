/// The shared image plane every worker merges its tile into.
/// `add_tile` is lock-free: each destination pixel's color and weight are
/// added independently through the atomic-float CAS loop, and distinct
/// pixels never contend, so any number of workers may call it concurrently
/// with no external synchronization.
use super::atomic_spectrum::AtomicSpectrum;
use super::{Film, Filter, Pixel};

struct AtomicPixel<const N: usize> {
    color: AtomicSpectrum<N>,
    weight: super::atomic_float::AtomicFloat,
}

impl<const N: usize> Default for AtomicPixel<N> {
    fn default() -> Self {
        AtomicPixel {
            color: AtomicSpectrum::default(),
            weight: super::atomic_float::AtomicFloat::default(),
        }
    }
}

pub struct AtomicFilm<const N: usize> {
    x_res: u32,
    y_res: u32,
    pixels: Vec<AtomicPixel<N>>,
}

impl<const N: usize> AtomicFilm<N> {
    pub fn new(x_res: u32, y_res: u32) -> Self {
        let mut pixels = Vec::with_capacity((x_res * y_res) as usize);
        pixels.resize_with((x_res * y_res) as usize, AtomicPixel::default);
        AtomicFilm { x_res, y_res, pixels }
    }

    fn pixel_idx(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.x_res && y < self.y_res);
        (self.x_res * y + x) as usize
    }

    /// Adds `tile`'s pixels into this film, offset by `pos`. Only the part
    /// of the tile that lands within film bounds is merged; the rest is
    /// silently clipped, matching a render driver handing in tiles that
    /// straddle the image edge.
    pub fn add_tile<F: Filter>(&self, pos: (i32, i32), tile: &Film<N, F>) {
        let x_min = (-pos.0).max(0) as u32;
        let y_min = (-pos.1).max(0) as u32;
        let x_max = ((self.x_res as i32 - pos.0).min(tile.x_res as i32)).max(0) as u32;
        let y_max = ((self.y_res as i32 - pos.1).min(tile.y_res as i32)).max(0) as u32;

        for y in y_min..y_max {
            for x in x_min..x_max {
                let dst_idx = self.pixel_idx((pos.0 + x as i32) as u32, (pos.1 + y as i32) as u32);
                let src = tile.pixel(x as i32, y as i32);
                let dst = &self.pixels[dst_idx];
                dst.color.add(src.color);
                dst.weight.add(src.weight);
            }
        }
    }

    /// Drains the accumulated image into a plain [`Film`]. Callers must
    /// join every worker before calling this - there is no synchronization
    /// between `into_film` and a concurrent `add_tile`.
    pub fn into_film<F: Filter>(&self, filter: F) -> Film<N, F> {
        let mut film = Film::new(self.x_res, self.y_res, filter);
        for y in 0..self.y_res {
            for x in 0..self.x_res {
                let idx = self.pixel_idx(x, y);
                let src = &self.pixels[idx];
                let pixel = Pixel {
                    color: src.color.load(),
                    weight: src.weight.load(),
                };
                film.set_pixel(x as i32, y as i32, pixel);
            }
        }
        film
    }
}
