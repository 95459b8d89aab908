//! River carving.
//!
//! Rivers run from local minima of the elevation field to nearby sea cells
//! (elevation exactly 0). Each river is an 8-connected A* path that prefers
//! low ground; every cell on it is zeroed.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::config::WorldConfig;
use crate::noise_field::remap;
use crate::rng::HashRng;
use crate::tilemap::{Tilemap, NEIGHBORS_8};

/// Grid coordinate (x, y).
pub type Cell = (usize, usize);

/// Elevation below which a cell costs nothing to cross.
const MOVE_COST_FLOOR: f32 = 0.1;
/// Cost of crossing the highest ground.
const MOVE_COST_SCALE: f32 = 1000.0;

/// Chebyshev (king-move) distance.
pub fn grid_distance(a: Cell, b: Cell) -> u32 {
    let dx = a.0.abs_diff(b.0);
    let dy = a.1.abs_diff(b.1);
    dx.max(dy) as u32
}

// =============================================================================
// OPEN SET
// =============================================================================

/// A* search node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchNode {
    pub cell: Cell,
    pub g_cost: u32,
    pub h_cost: u32,
    pub parent: Option<Cell>,
}

impl SearchNode {
    pub fn f_cost(&self) -> u32 {
        self.g_cost.saturating_add(self.h_cost)
    }

    /// Lower total cost first, then closer to the goal.
    fn precedes(&self, other: &SearchNode) -> bool {
        (self.f_cost(), self.h_cost) < (other.f_cost(), other.h_cost)
    }
}

/// Binary min-heap of search nodes with a coordinate index, so a node can be
/// looked up and have its cost decreased in place.
#[derive(Debug, Default)]
pub struct HeapSet {
    heap: Vec<SearchNode>,
    index: HashMap<Cell, usize>,
}

impl HeapSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn get(&self, cell: Cell) -> Option<&SearchNode> {
        self.index.get(&cell).map(|&i| &self.heap[i])
    }

    /// Insert a node, or replace the node already stored for its cell.
    pub fn upsert(&mut self, node: SearchNode) {
        match self.index.get(&node.cell) {
            Some(&i) => {
                self.heap[i] = node;
                let i = self.sift_up(i);
                self.sift_down(i);
            }
            None => {
                self.heap.push(node);
                let i = self.heap.len() - 1;
                self.index.insert(node.cell, i);
                self.sift_up(i);
            }
        }
    }

    /// Remove and return the node with the lowest total cost.
    pub fn pop(&mut self) -> Option<SearchNode> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.swap(0, last);
        let node = self.heap.pop()?;
        self.index.remove(&node.cell);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Some(node)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.index.insert(self.heap[i].cell, i);
        self.index.insert(self.heap[j].cell, j);
    }

    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.heap[i].precedes(&self.heap[parent]) {
                break;
            }
            self.swap(i, parent);
            i = parent;
        }
        i
    }

    fn sift_down(&mut self, mut i: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut best = i;
            if left < len && self.heap[left].precedes(&self.heap[best]) {
                best = left;
            }
            if right < len && self.heap[right].precedes(&self.heap[best]) {
                best = right;
            }
            if best == i {
                break;
            }
            self.swap(i, best);
            i = best;
        }
    }
}

// =============================================================================
// PATHFINDING
// =============================================================================

fn move_cost(elevation: f32) -> u32 {
    (remap(elevation, MOVE_COST_FLOOR, 1.0) * MOVE_COST_SCALE).round() as u32
}

/// Least-cost 8-connected path from `start` to `end`, both inclusive.
///
/// Stepping onto a cell costs one grid step plus a remap of its elevation,
/// so paths hug low terrain. Returns an empty path when either end is out of
/// bounds or the two ends coincide.
pub fn find_path(elevation: &Tilemap<f32>, start: Cell, end: Cell) -> Vec<Cell> {
    let in_bounds = |c: Cell| c.0 < elevation.width && c.1 < elevation.height;
    let distance = grid_distance(start, end);
    if !in_bounds(start) || !in_bounds(end) || distance == 0 {
        return Vec::new();
    }

    let capacity = (distance as usize * 4).next_power_of_two();
    let mut open = HeapSet::with_capacity(capacity);
    let mut closed: HashSet<Cell> = HashSet::with_capacity(capacity);
    let mut came_from: HashMap<Cell, Cell> = HashMap::with_capacity(capacity);

    open.upsert(SearchNode {
        cell: start,
        g_cost: 0,
        h_cost: distance,
        parent: None,
    });

    while let Some(current) = open.pop() {
        if let Some(parent) = current.parent {
            came_from.insert(current.cell, parent);
        }
        if current.cell == end {
            let mut path = vec![end];
            let mut cell = end;
            while let Some(&prev) = came_from.get(&cell) {
                path.push(prev);
                cell = prev;
            }
            path.reverse();
            return path;
        }
        closed.insert(current.cell);

        for &(dx, dy) in NEIGHBORS_8.iter() {
            let nx = current.cell.0 as i32 + dx;
            let ny = current.cell.1 as i32 + dy;
            if !elevation.in_bounds(nx, ny) {
                continue;
            }
            let next = (nx as usize, ny as usize);
            if closed.contains(&next) {
                continue;
            }
            let g_cost = current.g_cost
                + grid_distance(current.cell, next)
                + move_cost(*elevation.get(next.0, next.1));
            let improves = open.get(next).map_or(true, |known| g_cost < known.g_cost);
            if improves {
                open.upsert(SearchNode {
                    cell: next,
                    g_cost,
                    h_cost: grid_distance(next, end),
                    parent: Some(current.cell),
                });
            }
        }
    }

    Vec::new()
}

// =============================================================================
// CARVING
// =============================================================================

/// Sea cells sampled on a coarse `resolution`×`resolution` lattice. A
/// lattice finer than the map samples every cell once.
pub fn river_endpoints(elevation: &Tilemap<f32>, resolution: usize) -> Vec<Cell> {
    let cols = resolution.min(elevation.width);
    let rows = resolution.min(elevation.height);
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let dx = elevation.width as f32 / cols as f32;
    let dy = elevation.height as f32 / rows as f32;
    let mut endpoints = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let x = ((c as f32 * dx) as usize).min(elevation.width - 1);
            let y = ((r as f32 * dy) as usize).min(elevation.height - 1);
            if *elevation.get(x, y) == 0.0 {
                endpoints.push((x, y));
            }
        }
    }
    endpoints
}

/// Nearest endpoint to `origin`, if it is closer than `max_length`.
pub fn nearest_endpoint(endpoints: &[Cell], origin: Cell, max_length: usize) -> Option<Cell> {
    let mut best: Option<(Cell, u32)> = None;
    for &candidate in endpoints {
        let d = grid_distance(origin, candidate);
        if best.map_or(true, |(_, best_d)| d < best_d) {
            best = Some((candidate, d));
        }
    }
    best.filter(|&(_, d)| d > 0 && (d as usize) < max_length)
        .map(|(cell, _)| cell)
}

/// Carve rivers into `elevation` in place and return the carved paths.
///
/// Minima are shuffled with `rng` and at most `river_count_max` of them are
/// tried. Minima already at sea level are skipped.
pub fn carve_rivers(
    elevation: &mut Tilemap<f32>,
    rng: &mut HashRng,
    config: &WorldConfig,
) -> Vec<Vec<Cell>> {
    let mut origins = elevation.local_minima();
    let endpoints = river_endpoints(elevation, config.river_endpoint_resolution);
    rng.shuffle(&mut origins);
    debug!(
        "river carving: {} minima, {} sea endpoints",
        origins.len(),
        endpoints.len()
    );

    let mut rivers = Vec::new();
    for &origin in origins.iter().take(config.river_count_max) {
        if *elevation.get(origin.0, origin.1) <= 0.0 {
            continue;
        }
        let Some(end) = nearest_endpoint(&endpoints, origin, config.river_length_max) else {
            continue;
        };
        let path = find_path(elevation, origin, end);
        for &(x, y) in &path {
            elevation.set(x, y, 0.0);
        }
        if !path.is_empty() {
            rivers.push(path);
        }
    }
    debug!("carved {} rivers", rivers.len());
    rivers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(cell: Cell, g_cost: u32, h_cost: u32) -> SearchNode {
        SearchNode {
            cell,
            g_cost,
            h_cost,
            parent: None,
        }
    }

    fn assert_contiguous(path: &[Cell]) {
        for pair in path.windows(2) {
            assert_eq!(
                grid_distance(pair[0], pair[1]),
                1,
                "path jumps from {:?} to {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_heap_set_pops_lowest_cost() {
        let mut open = HeapSet::default();
        open.upsert(node((0, 0), 10, 5));
        open.upsert(node((1, 0), 3, 1));
        open.upsert(node((2, 0), 7, 0));
        open.upsert(node((3, 0), 3, 0));
        let order: Vec<Cell> = std::iter::from_fn(|| open.pop()).map(|n| n.cell).collect();
        assert_eq!(order, vec![(3, 0), (1, 0), (2, 0), (0, 0)]);
        assert!(open.is_empty());
    }

    #[test]
    fn test_heap_set_decrease_key() {
        let mut open = HeapSet::default();
        for i in 0..10 {
            open.upsert(node((i, 0), 100 + i as u32, 0));
        }
        open.upsert(node((7, 0), 1, 0));
        assert_eq!(open.len(), 10);
        assert_eq!(open.get((7, 0)).map(|n| n.g_cost), Some(1));
        assert_eq!(open.pop().map(|n| n.cell), Some((7, 0)));
        assert!(open.get((7, 0)).is_none());
        assert_eq!(open.pop().map(|n| n.cell), Some((0, 0)));
    }

    #[test]
    fn test_path_on_flat_ground_is_straight() {
        let map = Tilemap::new_with(10, 10, 0.0f32);
        let path = find_path(&map, (1, 1), (6, 4));
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(6, 4)));
        assert_eq!(path.len(), 6);
        assert_contiguous(&path);
    }

    #[test]
    fn test_path_prefers_low_ground() {
        // A ridge across the middle with a single low gap at x = 8.
        let mut map = Tilemap::new_with(10, 9, 0.0f32);
        for x in 0..10 {
            map.set(x, 4, 1.0);
        }
        map.set(8, 4, 0.0);
        let path = find_path(&map, (1, 1), (1, 7));
        assert_contiguous(&path);
        assert!(path.contains(&(8, 4)), "path {:?} crossed the ridge", path);
    }

    #[test]
    fn test_degenerate_queries_are_empty() {
        let map = Tilemap::new_with(5, 5, 0.5f32);
        assert!(find_path(&map, (2, 2), (2, 2)).is_empty());
        assert!(find_path(&map, (2, 2), (9, 2)).is_empty());
        assert!(find_path(&map, (7, 0), (1, 1)).is_empty());
    }

    #[test]
    fn test_nearest_endpoint_respects_max_length() {
        let endpoints = vec![(0, 0), (20, 20)];
        assert_eq!(nearest_endpoint(&endpoints, (3, 4), 14), Some((0, 0)));
        assert_eq!(nearest_endpoint(&endpoints, (10, 10), 10), None);
        assert_eq!(nearest_endpoint(&[], (1, 1), 14), None);
    }

    #[test]
    fn test_endpoint_lattice_finer_than_map() {
        let mut map = Tilemap::new_with(16, 16, 0.5f32);
        for y in 0..16 {
            map.set(0, y, 0.0);
        }
        let endpoints = river_endpoints(&map, 64);
        assert_eq!(endpoints.len(), 16);
        assert!(endpoints.iter().all(|&(x, _)| x == 0));

        let coarse = river_endpoints(&map, 4);
        assert_eq!(coarse, vec![(0, 0), (0, 4), (0, 8), (0, 12)]);
    }

    #[test]
    fn test_carved_rivers_are_contiguous_and_zeroed() {
        // Sea along the west edge, ground rising eastwards, one basin inland.
        let mut map = Tilemap::new_with(32, 32, 0.0f32);
        for y in 0..32 {
            for x in 1..32 {
                map.set(x, y, 0.5 + 0.01 * x as f32);
            }
        }
        map.set(6, 16, 0.3);

        let config = WorldConfig {
            size: 32,
            river_endpoint_resolution: 32,
            ..Default::default()
        };
        let mut rng = HashRng::new(12999);
        let rivers = carve_rivers(&mut map, &mut rng, &config);

        assert_eq!(rivers.len(), 1);
        let river = &rivers[0];
        assert_eq!(river.first(), Some(&(6, 16)));
        assert_eq!(river.last().map(|c| c.0), Some(0));
        assert_contiguous(river);
        for &(x, y) in river {
            assert_eq!(*map.get(x, y), 0.0, "({}, {}) not carved", x, y);
        }
    }
}
