//! Deterministic positional hash RNG.
//!
//! Every random value in the generator is a pure function of `(position, seed)`.
//! [`HashRng`] walks a cursor through positions so a sequence of draws can be
//! replayed exactly, and can checkpoint/restore that cursor.

/// Scatters the y coordinate before combining it with x.
const Y_PRIME: i32 = 0x0BD4_BCB5;

/// Integer avalanche hash of `value` under `seed`.
pub fn hash(value: i32, seed: i32) -> i32 {
    let mut m = value as u32 as i64;
    m = m.wrapping_mul(0xB529_7AADu32 as i32 as i64);
    m = m.wrapping_add(seed as i64);
    m ^= m >> 8;
    m = m.wrapping_add(0x68E3_1DA4);
    m ^= m << 8;
    m = m.wrapping_mul(0x1B56_C4E9);
    m ^= m >> 8;
    m as i32
}

/// Maps a hash to [0, 1) using its top 24 non-sign bits.
fn unit(h: i32) -> f32 {
    (((h as u32) & 0x7FFF_FFFF) >> 7) as f32 / (1u32 << 24) as f32
}

/// White noise in [0, 1) for a 1D position.
pub fn white_noise(position: i32, seed: i32) -> f32 {
    unit(hash(position, seed))
}

/// White noise in [0, 1) for a 2D lattice point.
pub fn white_noise_2d(x: i32, y: i32, seed: i32) -> f32 {
    white_noise(x.wrapping_add(Y_PRIME.wrapping_mul(y)), seed)
}

fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Smoothly interpolated 2D value noise in [0, 1].
pub fn noise_2d(x: f32, y: f32, seed: i32, frequency: f32) -> f32 {
    let sx = (x * frequency) as f64;
    let sy = (y * frequency) as f64;
    let ix = sx.floor();
    let iy = sy.floor();
    let fx = smooth((sx - ix) as f32);
    let fy = smooth((sy - iy) as f32);
    let ix = ix as i32;
    let iy = iy as i32;
    let bottom = mix(
        white_noise_2d(ix, iy, seed),
        white_noise_2d(ix.wrapping_add(1), iy, seed),
        fx,
    );
    let top = mix(
        white_noise_2d(ix, iy.wrapping_add(1), seed),
        white_noise_2d(ix.wrapping_add(1), iy.wrapping_add(1), seed),
        fx,
    );
    mix(bottom, top, fy)
}

/// Fractal sum of [`noise_2d`] octaves: each octave uses the next seed,
/// multiplies frequency by `lacunarity` and halves the amplitude.
/// Normalised by accumulated amplitude, so the result stays in [0, 1].
pub fn noise_2d_layered(
    x: f32,
    y: f32,
    seed: i32,
    frequency: f32,
    octaves: u32,
    lacunarity: f32,
) -> f32 {
    let mut total = 0.0;
    let mut amplitude = 1.0;
    let mut accumulated = 0.0;
    let mut frequency = frequency;
    let mut seed = seed;

    for _ in 0..octaves {
        total += noise_2d(x, y, seed, frequency) * amplitude;
        accumulated += amplitude;
        amplitude *= 0.5;
        frequency *= lacunarity;
        seed = seed.wrapping_add(1);
    }

    if accumulated == 0.0 {
        0.0
    } else {
        total / accumulated
    }
}

/// Cursor-based wrapper around [`hash`]. Each draw consumes one position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashRng {
    seed: i32,
    position: i32,
    saved_position: i32,
}

impl HashRng {
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            position: 0,
            saved_position: 0,
        }
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Change the seed without touching the cursor or checkpoint.
    pub fn set_seed(&mut self, seed: i32) {
        self.seed = seed;
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }

    /// Checkpoint the current cursor.
    pub fn save_position(&mut self) {
        self.saved_position = self.position;
    }

    /// Rewind the cursor to the last checkpoint.
    pub fn load_position(&mut self) {
        self.position = self.saved_position;
    }

    fn advance(&mut self) -> i32 {
        let h = hash(self.position, self.seed);
        self.position = self.position.wrapping_add(1);
        h
    }

    /// Raw hash at the cursor (full i32 range).
    pub fn next_int(&mut self) -> i32 {
        self.advance()
    }

    /// Non-negative integer in `0..=max`.
    pub fn next_int_max(&mut self, max: u32) -> u32 {
        let h = self.advance() as i64;
        h.rem_euclid(max as i64 + 1) as u32
    }

    /// White noise in [0, 1) at the cursor.
    pub fn white_noise(&mut self) -> f32 {
        unit(self.advance())
    }

    /// In-place Fisher–Yates shuffle driven by the cursor.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int_max(i as u32) as usize;
            items.swap(i, j);
        }
    }
}
