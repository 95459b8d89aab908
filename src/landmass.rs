//! Landmass synthesis with overlapping-pattern wave function collapse.
//!
//! The model learns every n×n window of a small land/sea exemplar (read
//! periodically) together with its frequency. Output cells start superposed
//! over all windows; the lowest-entropy cell is collapsed by a weighted draw
//! and the overlap constraints are propagated until everything is decided.
//!
//! The exemplar and output size are fixed values that do not hit a
//! contradiction in practice. A contradiction or an exhausted iteration budget
//! is reported as an error and never retried.

use log::debug;

use crate::error::GenError;
use crate::rng::HashRng;
use crate::tilemap::Tilemap;

/// Land (1) / sea (0) training pattern.
pub const LANDMASS_EXEMPLAR: [[u8; 9]; 9] = [
    [0, 0, 0, 0, 1, 1, 0, 0, 0],
    [0, 1, 1, 0, 1, 1, 1, 0, 0],
    [0, 1, 1, 1, 1, 1, 0, 0, 0],
    [0, 1, 1, 1, 1, 1, 1, 0, 0],
    [0, 0, 1, 1, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 1, 1],
    [0, 1, 1, 1, 1, 1, 1, 1, 0],
    [0, 0, 1, 0, 1, 1, 1, 1, 0],
    [1, 1, 1, 0, 1, 0, 0, 0, 0],
];

/// Neighbour directions used by propagation (dx, dy).
const DIRECTIONS: [(i32, i32); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Breaks entropy ties without disturbing real differences.
const ENTROPY_JITTER: f64 = 1e-6;

/// The exemplar as a tilemap.
pub fn landmass_exemplar() -> Tilemap<u8> {
    let rows: Vec<Vec<u8>> = LANDMASS_EXEMPLAR.iter().map(|r| r.to_vec()).collect();
    Tilemap::from_rows(&rows)
}

/// Learned pattern statistics.
pub struct WfcModel {
    n: usize,
    patterns: Vec<Vec<u8>>,
    weights: Vec<f64>,
    /// `propagator[d][p]`: patterns that may sit one step in direction `d` from `p`
    propagator: [Vec<Vec<usize>>; 4],
}

impl WfcModel {
    /// Learn all n×n windows of `exemplar`, wrapping at its edges.
    pub fn learn(exemplar: &Tilemap<u8>, n: usize) -> Self {
        let mut patterns: Vec<Vec<u8>> = Vec::new();
        let mut weights: Vec<f64> = Vec::new();

        for y in 0..exemplar.height {
            for x in 0..exemplar.width {
                let mut window = Vec::with_capacity(n * n);
                for dy in 0..n {
                    for dx in 0..n {
                        let sx = (x + dx) % exemplar.width;
                        let sy = (y + dy) % exemplar.height;
                        window.push(*exemplar.get(sx, sy));
                    }
                }
                match patterns.iter().position(|p| *p == window) {
                    Some(i) => weights[i] += 1.0,
                    None => {
                        patterns.push(window);
                        weights.push(1.0);
                    }
                }
            }
        }

        let propagator = DIRECTIONS.map(|(dx, dy)| {
            (0..patterns.len())
                .map(|p| {
                    (0..patterns.len())
                        .filter(|&q| overlaps(&patterns[p], &patterns[q], dx, dy, n))
                        .collect()
                })
                .collect()
        });

        Self {
            n,
            patterns,
            weights,
            propagator,
        }
    }

    pub fn patterns(&self) -> &[Vec<u8>] {
        &self.patterns
    }

    /// Collapse a `width`×`height` output. Each loop iteration observes and
    /// propagates one cell; running out of iterations is an error.
    pub fn generate(
        &self,
        width: usize,
        height: usize,
        rng: &mut HashRng,
        max_iterations: usize,
    ) -> Result<Tilemap<u8>, GenError> {
        if width < self.n || height < self.n || self.patterns.is_empty() {
            return Err(GenError::InvalidConfig(format!(
                "landmass output {}x{} is smaller than the {}x{} pattern size",
                width, height, self.n, self.n
            )));
        }

        let mut wave = Wave::new(width - self.n + 1, height - self.n + 1, self.patterns.len());

        for iteration in 0..max_iterations {
            match self.observe(&mut wave, rng) {
                Some(cell) => self.propagate(&mut wave, cell)?,
                None => {
                    debug!("Landmass collapsed after {} iterations", iteration);
                    return Ok(self.render(&wave, width, height));
                }
            }
        }

        Err(GenError::IterationBudget(max_iterations))
    }

    fn entropy(&self, options: &[bool]) -> f64 {
        let mut sum = 0.0;
        let mut sum_log = 0.0;
        for (p, &allowed) in options.iter().enumerate() {
            if allowed {
                let w = self.weights[p];
                sum += w;
                sum_log += w * w.ln();
            }
        }
        sum.ln() - sum_log / sum
    }

    /// Collapse the lowest-entropy undecided cell. Returns its index, or
    /// `None` once every cell is decided.
    fn observe(&self, wave: &mut Wave, rng: &mut HashRng) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_entropy = f64::MAX;
        for i in 0..wave.counts.len() {
            if wave.counts[i] <= 1 {
                continue;
            }
            let entropy = self.entropy(&wave.options[i]) + ENTROPY_JITTER * rng.white_noise() as f64;
            if entropy < best_entropy {
                best_entropy = entropy;
                best = Some(i);
            }
        }

        let cell = best?;
        let total: f64 = wave.options[cell]
            .iter()
            .enumerate()
            .filter(|(_, allowed)| **allowed)
            .map(|(p, _)| self.weights[p])
            .sum();

        let mut remaining = rng.white_noise() as f64 * total;
        let mut chosen = None;
        for (p, &allowed) in wave.options[cell].iter().enumerate() {
            if !allowed {
                continue;
            }
            chosen = Some(p);
            remaining -= self.weights[p];
            if remaining < 0.0 {
                break;
            }
        }

        if let Some(chosen) = chosen {
            for (p, allowed) in wave.options[cell].iter_mut().enumerate() {
                *allowed = p == chosen;
            }
            wave.counts[cell] = 1;
        }
        Some(cell)
    }

    fn propagate(&self, wave: &mut Wave, start: usize) -> Result<(), GenError> {
        let mut stack = vec![start];
        let pattern_count = self.patterns.len();
        let mut supported = vec![false; pattern_count];

        while let Some(cell) = stack.pop() {
            let x = (cell % wave.width) as i32;
            let y = (cell / wave.width) as i32;

            for (d, &(dx, dy)) in DIRECTIONS.iter().enumerate() {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= wave.width as i32 || ny >= wave.height as i32 {
                    continue;
                }
                let neighbor = ny as usize * wave.width + nx as usize;

                supported.fill(false);
                for p in 0..pattern_count {
                    if wave.options[cell][p] {
                        for &q in &self.propagator[d][p] {
                            supported[q] = true;
                        }
                    }
                }

                let mut changed = false;
                for q in 0..pattern_count {
                    if wave.options[neighbor][q] && !supported[q] {
                        wave.options[neighbor][q] = false;
                        wave.counts[neighbor] -= 1;
                        changed = true;
                    }
                }

                if wave.counts[neighbor] == 0 {
                    return Err(GenError::Contradiction {
                        x: nx as usize,
                        y: ny as usize,
                    });
                }
                if changed {
                    stack.push(neighbor);
                }
            }
        }
        Ok(())
    }

    fn render(&self, wave: &Wave, width: usize, height: usize) -> Tilemap<u8> {
        let mut output = Tilemap::new_with(width, height, 0u8);
        for y in 0..height {
            let py = y.min(wave.height - 1);
            for x in 0..width {
                let px = x.min(wave.width - 1);
                let pattern = wave.options[py * wave.width + px]
                    .iter()
                    .position(|&allowed| allowed)
                    .unwrap_or(0);
                let value = self.patterns[pattern][(y - py) * self.n + (x - px)];
                output.set(x, y, value);
            }
        }
        output
    }
}

struct Wave {
    width: usize,
    height: usize,
    options: Vec<Vec<bool>>,
    counts: Vec<usize>,
}

impl Wave {
    fn new(width: usize, height: usize, pattern_count: usize) -> Self {
        Self {
            width,
            height,
            options: vec![vec![true; pattern_count]; width * height],
            counts: vec![pattern_count; width * height],
        }
    }
}

/// Whether `q`, placed at offset (dx, dy) from `p`, agrees on the overlap.
fn overlaps(p: &[u8], q: &[u8], dx: i32, dy: i32, n: usize) -> bool {
    let n = n as i32;
    for y in dy.max(0)..(n + dy).min(n) {
        for x in dx.max(0)..(n + dx).min(n) {
            let a = p[(y * n + x) as usize];
            let b = q[((y - dy) * n + (x - dx)) as usize];
            if a != b {
                return false;
            }
        }
    }
    true
}

/// Synthesise a binary landmass grid from the built-in exemplar.
pub fn generate_landmass(
    size: usize,
    pattern_size: usize,
    rng: &mut HashRng,
    max_iterations: usize,
) -> Result<Tilemap<u8>, GenError> {
    let model = WfcModel::learn(&landmass_exemplar(), pattern_size);
    model.generate(size, size, rng, max_iterations)
}
