//! Grid, block and thread coordinates.

/// Three-component launch dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dim3 {
    /// X extent.
    pub x: u32,
    /// Y extent.
    pub y: u32,
    /// Z extent.
    pub z: u32,
}

impl Dim3 {
    /// Create a 3D dimension.
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Create a 1D dimension.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// Total number of elements.
    pub const fn linear(&self) -> u32 {
        self.x * self.y * self.z
    }
}

impl Default for Dim3 {
    fn default() -> Self {
        Self::new_1d(1)
    }
}

/// Block index within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockId {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl BlockId {
    /// Create a 1D block index.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 0, z: 0 }
    }

    /// Linear index for a grid of the given dimension.
    pub const fn linear_for_dim(&self, dim: Dim3) -> u32 {
        self.x + self.y * dim.x + self.z * dim.x * dim.y
    }
}

/// Thread index within a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ThreadId {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

impl ThreadId {
    /// Create a 1D thread index.
    pub const fn new_1d(x: u32) -> Self {
        Self { x, y: 0, z: 0 }
    }

    /// Linear index for a block of the given x/y extents.
    pub const fn linear_for_dim(&self, dim_x: u32, dim_y: u32) -> u32 {
        self.x + self.y * dim_x + self.z * dim_x * dim_y
    }

    /// Linear index as `usize`, for a 1D block.
    #[inline]
    pub const fn index(&self) -> usize {
        self.x as usize
    }
}
