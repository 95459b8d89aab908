/// A 2D grid of cells stored row-major. Edges are hard boundaries (no wrapping).
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// 8-neighbour offsets (dx, dy), orthogonal first then diagonal.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (1, -1),
    (1, 1),
    (-1, 1),
    (-1, -1),
];

/// 3x3 offsets in kernel order (row by row, top to bottom).
const KERNEL_OFFSETS: [(i32, i32); 9] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (0, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// Gaussian-like blur weights (sum = 1).
const SMOOTH_KERNEL: [f32; 9] = [
    0.0778, 0.1233, 0.0778,
    0.1233, 0.1953, 0.1233,
    0.0778, 0.1233, 0.0778,
];

/// Edge-enhancing weights (sum = 1).
const SHARPEN_KERNEL: [f32; 9] = [
    -0.25, -1.0, -0.25,
    -1.0, 6.0, -1.0,
    -0.25, -1.0, -0.25,
];

impl<T: Clone + Default> Tilemap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a tilemap from row-major rows. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<T>]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(width * height);
        for row in rows {
            assert_eq!(row.len(), width, "ragged rows");
            data.extend(row.iter().cloned());
        }
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "({}, {}) out of bounds for {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    /// Iterate mutably over all cells with their coordinates.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, usize, &mut T)> {
        let width = self.width;
        self.data.iter_mut().enumerate().map(move |(idx, val)| (idx % width, idx / width, val))
    }

    pub fn values(&self) -> &[T] {
        &self.data
    }

    /// Nearest-neighbour resample to a new size. Never invents values.
    pub fn resample_nearest(&self, width: usize, height: usize) -> Self {
        let x_ratio = self.width as f64 / width as f64;
        let y_ratio = self.height as f64 / height as f64;
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            let sy = ((y as f64 * y_ratio) as usize).min(self.height - 1);
            for x in 0..width {
                let sx = ((x as f64 * x_ratio) as usize).min(self.width - 1);
                data.push(self.get(sx, sy).clone());
            }
        }
        Self { width, height, data }
    }
}

impl Tilemap<f32> {
    /// Smallest and largest value in the map.
    pub fn min_max(&self) -> (f32, f32) {
        let mut min_v = f32::MAX;
        let mut max_v = f32::MIN;
        for &v in &self.data {
            min_v = min_v.min(v);
            max_v = max_v.max(v);
        }
        (min_v, max_v)
    }

    /// Stretch values to the full 0..1 range. A flat map is left untouched.
    pub fn normalize(&mut self) {
        let (min_v, max_v) = self.min_max();
        if max_v > min_v {
            let range = max_v - min_v;
            for v in self.data.iter_mut() {
                *v = (*v - min_v) / range;
            }
        }
    }

    /// Linear blend towards `other` by `weight` (0 keeps self, 1 takes other).
    pub fn mix(&mut self, other: &Tilemap<f32>, weight: f32) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (v, &o) in self.data.iter_mut().zip(other.data.iter()) {
            *v += (o - *v) * weight;
        }
    }

    /// Multiply by `other`, blended in by `influence`.
    pub fn multiply(&mut self, other: &Tilemap<f32>, influence: f32) {
        debug_assert_eq!(self.data.len(), other.data.len());
        for (v, &o) in self.data.iter_mut().zip(other.data.iter()) {
            let product = *v * o;
            *v += (product - *v) * influence;
        }
    }

    pub fn clamp01(&mut self) {
        for v in self.data.iter_mut() {
            *v = v.clamp(0.0, 1.0);
        }
    }

    /// Run `passes` rounds of the 3x3 blur kernel.
    pub fn smoothed(&self, passes: usize) -> Tilemap<f32> {
        let mut result = self.clone();
        for _ in 0..passes {
            result = result.convolve(&SMOOTH_KERNEL);
        }
        result
    }

    /// Apply the 3x3 edge-enhancing kernel, clamping the result to 0..1.
    pub fn sharpened(&self) -> Tilemap<f32> {
        let mut result = self.convolve(&SHARPEN_KERNEL);
        result.clamp01();
        result
    }

    /// 3x3 convolution. Out-of-bounds samples take the centre cell's value.
    fn convolve(&self, kernel: &[f32; 9]) -> Tilemap<f32> {
        let mut result = Tilemap::new_with(self.width, self.height, 0.0f32);
        for y in 0..self.height {
            for x in 0..self.width {
                let center = *self.get(x, y);
                let mut sum = 0.0;
                for (i, &(dx, dy)) in KERNEL_OFFSETS.iter().enumerate() {
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    let v = if self.in_bounds(nx, ny) {
                        *self.get(nx as usize, ny as usize)
                    } else {
                        center
                    };
                    sum += v * kernel[i];
                }
                result.set(x, y, sum);
            }
        }
        result
    }

    /// Cells strictly lower than all 8 neighbours. Border cells are excluded.
    pub fn local_minima(&self) -> Vec<(usize, usize)> {
        let mut minima = Vec::new();
        if self.width < 3 || self.height < 3 {
            return minima;
        }
        for y in 1..self.height - 1 {
            for x in 1..self.width - 1 {
                let h = *self.get(x, y);
                let is_min = NEIGHBORS_8.iter().all(|&(dx, dy)| {
                    let nx = (x as i32 + dx) as usize;
                    let ny = (y as i32 + dy) as usize;
                    h < *self.get(nx, ny)
                });
                if is_min {
                    minima.push((x, y));
                }
            }
        }
        minima
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_bounds() {
        let map = Tilemap::new_with(4, 3, 0u8);
        assert!(map.in_bounds(0, 0));
        assert!(map.in_bounds(3, 2));
        assert!(!map.in_bounds(4, 0));
        assert!(!map.in_bounds(0, 3));
        assert!(!map.in_bounds(-1, 1));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_past_row_end_panics() {
        let map = Tilemap::new_with(4, 4, 0u8);
        map.get(4, 0);
    }

    #[test]
    fn test_smoothing_preserves_flat_map() {
        let map = Tilemap::new_with(6, 6, 0.4f32);
        let smooth = map.smoothed(3);
        for (_, _, &v) in smooth.iter() {
            assert!((v - 0.4).abs() < 1e-3, "flat map drifted to {}", v);
        }
    }

    #[test]
    fn test_smoothing_flattens_spike() {
        let mut map = Tilemap::new_with(5, 5, 0.0f32);
        map.set(2, 2, 1.0);
        let smooth = map.smoothed(1);
        assert!(*smooth.get(2, 2) < 0.25);
        assert!(*smooth.get(1, 2) > 0.0);
    }

    #[test]
    fn test_sharpen_output_in_unit_range() {
        let mut map = Tilemap::new_with(5, 5, 0.2f32);
        map.set(2, 2, 0.9);
        map.set(0, 4, 0.0);
        let sharp = map.sharpened();
        for (_, _, &v) in sharp.iter() {
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(*sharp.get(2, 2), 1.0);
    }

    #[test]
    fn test_normalize_stretches_range() {
        let mut map = Tilemap::new_with(3, 1, 0.0f32);
        map.set(0, 0, 2.0);
        map.set(1, 0, 3.0);
        map.set(2, 0, 4.0);
        map.normalize();
        assert_eq!(map.values(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_local_minima_strict() {
        let mut map = Tilemap::new_with(5, 5, 1.0f32);
        map.set(2, 2, 0.2);
        map.set(1, 3, 0.5);
        assert_eq!(map.local_minima(), vec![(2, 2)]);

        // A plateau is not a minimum.
        let flat = Tilemap::new_with(5, 5, 0.0f32);
        assert!(flat.local_minima().is_empty());
    }

    #[test]
    fn test_resample_nearest_keeps_values() {
        let src = Tilemap::from_rows(&[vec![1, 2], vec![3, 4]]);
        let up = src.resample_nearest(4, 4);
        assert_eq!(*up.get(0, 0), 1);
        assert_eq!(*up.get(3, 0), 2);
        assert_eq!(*up.get(0, 3), 3);
        assert_eq!(*up.get(3, 3), 4);
    }
}
