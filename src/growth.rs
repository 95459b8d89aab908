//! Quad-subdivision growth of small id grids.
//!
//! Each doubling step maps an `n×n` grid to `(2n-1)×(2n-1)`: old cells land on
//! even coordinates and every new cell copies one of its existing neighbours
//! at random. Ids are never averaged, so the output only contains ids that
//! were present in the input.

use log::debug;

use crate::error::GenError;
use crate::rng::HashRng;
use crate::tilemap::Tilemap;

/// Grow a square grid to `target`×`target`.
///
/// The source is first snapped to the next size of the form `2^k + 1`, doubled
/// until it reaches `target`, then resampled down to the exact size.
pub fn grow<T: Copy + Default>(
    src: &Tilemap<T>,
    target: usize,
    rng: &mut HashRng,
) -> Result<Tilemap<T>, GenError> {
    if !src.is_square() {
        return Err(GenError::NonSquareGrid {
            width: src.width,
            height: src.height,
        });
    }
    if src.width == 0 || target == 0 {
        return Err(GenError::InvalidConfig(format!(
            "cannot grow a {}x{} grid to {}",
            src.width, src.height, target
        )));
    }

    let start = next_growing_size(src.width);
    let mut grid = src.resample_nearest(start, start);
    while grid.width < target {
        grid = double(&grid, rng);
    }
    debug!("grew {}x{} grid to {} before resampling to {}", src.width, src.height, grid.width, target);
    Ok(grid.resample_nearest(target, target))
}

/// Smallest size in 2, 3, 5, 9, 17, ... that is at least `size`.
fn next_growing_size(size: usize) -> usize {
    let mut valid = 2;
    while valid < size {
        valid = valid * 2 - 1;
    }
    valid
}

/// Pick `a` or `b` with equal odds.
fn pick<T>(rng: &mut HashRng, a: T, b: T) -> T {
    if rng.white_noise() < 0.5 {
        a
    } else {
        b
    }
}

/// One subdivision step.
fn double<T: Copy + Default>(src: &Tilemap<T>, rng: &mut HashRng) -> Tilemap<T> {
    let size = src.width * 2 - 1;
    let mut dst = Tilemap::new(size, size);
    for (x, y, &v) in src.iter() {
        dst.set(x * 2, y * 2, v);
    }

    // Edge midpoints sit between two existing cells on one axis.
    for y in 0..size {
        for x in 0..size {
            let value = match (x % 2, y % 2) {
                (1, 0) => pick(rng, *dst.get(x - 1, y), *dst.get(x + 1, y)),
                (0, 1) => pick(rng, *dst.get(x, y - 1), *dst.get(x, y + 1)),
                _ => continue,
            };
            dst.set(x, y, value);
        }
    }

    // Centres choose between a horizontal and a vertical candidate.
    for y in (1..size).step_by(2) {
        for x in (1..size).step_by(2) {
            let horizontal = pick(rng, *dst.get(x - 1, y), *dst.get(x + 1, y));
            let vertical = pick(rng, *dst.get(x, y - 1), *dst.get(x, y + 1));
            let value = pick(rng, horizontal, vertical);
            dst.set(x, y, value);
        }
    }
    dst
}
