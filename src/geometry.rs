/// A unit step on the lattice, `(dx, dy)`.
pub type Offset = (i32, i32);

/// The four orthogonal neighbor offsets, in the order cells are visited
/// during diffusion.
pub const NEIGHBORHOOD: [Offset; 4] = [(-1, 0), (1, 0), (0, 1), (0, -1)];

/// Fixed-capacity list of up to four neighbor entries.
///
/// Neighbor surveys run for every cell on every tick, so they live on the
/// stack instead of allocating a `Vec` per cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors<T> {
    items: [T; 4],
    len: usize,
}

impl<T: Copy + Default> Neighbors<T> {
    pub fn new() -> Self {
        Self {
            items: [T::default(); 4],
            len: 0,
        }
    }

    /// Append an entry. Entries beyond the fourth are dropped.
    pub fn push(&mut self, item: T) {
        if self.len < self.items.len() {
            self.items[self.len] = item;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T: Copy + Default> Default for Neighbors<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy + Default> std::ops::Deref for Neighbors<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Copy + Default> FromIterator<T> for Neighbors<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut neighbors = Self::new();
        for item in iter {
            neighbors.push(item);
        }
        neighbors
    }
}

/// Grid extents plus the two boundary policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub width: usize,
    pub height: usize,
}

impl Bounds {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Row-major index of an in-range coordinate
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// True iff `(x + dx, y + dy)` lies on the grid.
    pub fn is_in_bounds(&self, x: usize, y: usize, offset: Offset) -> bool {
        let nx = x as i64 + offset.0 as i64;
        let ny = y as i64 + offset.1 as i64;
        nx >= 0 && nx < self.width as i64 && ny >= 0 && ny < self.height as i64
    }

    /// Destination of `offset` from `(x, y)`.
    ///
    /// Wrapping is toroidal. Without wrapping the destination is clamped to
    /// the grid rather than rejected, so a read past an edge samples the
    /// edge cell itself.
    pub fn resolve(&self, x: usize, y: usize, offset: Offset, wraparound: bool) -> (usize, usize) {
        let nx = x as i64 + offset.0 as i64;
        let ny = y as i64 + offset.1 as i64;
        let (w, h) = (self.width as i64, self.height as i64);
        if wraparound {
            (nx.rem_euclid(w) as usize, ny.rem_euclid(h) as usize)
        } else {
            (nx.clamp(0, w - 1) as usize, ny.clamp(0, h - 1) as usize)
        }
    }

    /// Neighbor coordinates of `(x, y)`: all four when wrapping, only the
    /// in-bounds ones otherwise.
    pub fn neighbor_coords(&self, x: usize, y: usize, wraparound: bool) -> Neighbors<(usize, usize)> {
        NEIGHBORHOOD
            .iter()
            .filter(|&&offset| wraparound || self.is_in_bounds(x, y, offset))
            .map(|&offset| self.resolve(x, y, offset, wraparound))
            .collect()
    }
}
