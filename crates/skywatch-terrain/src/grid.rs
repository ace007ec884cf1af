//! TerrainGrid: heightmap with elevation queries.

use serde::{Deserialize, Serialize};

use skywatch_core::types::Position;

/// Terrain grid header metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainHeader {
    /// West edge of the grid in sim-space meters (x).
    pub origin_x: f64,
    /// South edge of the grid in sim-space meters (y).
    pub origin_y: f64,
    /// Meters per grid cell.
    pub cell_size: f64,
    /// Number of columns (west to east).
    pub width: u32,
    /// Number of rows (north to south).
    pub height: u32,
}

impl TerrainHeader {
    /// North edge (y) in meters.
    pub fn north_y(&self) -> f64 {
        self.origin_y + self.height as f64 * self.cell_size
    }

    /// East edge (x) in meters.
    pub fn east_x(&self) -> f64 {
        self.origin_x + self.width as f64 * self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Heightmap grid. Positions outside the grid read as sea level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainGrid {
    pub header: TerrainHeader,
    /// Elevation values in meters, row-major (north-to-south, west-to-east).
    pub elevations: Vec<i16>,
}

impl TerrainGrid {
    pub fn new(header: TerrainHeader, elevations: Vec<i16>) -> Self {
        Self { header, elevations }
    }

    /// Flat grid at sea level, centered on the origin.
    pub fn flat(width: u32, height: u32, cell_size: f64) -> Self {
        let header = TerrainHeader {
            origin_x: -(width as f64 * cell_size) / 2.0,
            origin_y: -(height as f64 * cell_size) / 2.0,
            cell_size,
            width,
            height,
        };
        let elevations = vec![0; header.cell_count()];
        Self::new(header, elevations)
    }

    /// Whether the elevation buffer matches the header dimensions.
    pub fn is_consistent(&self) -> bool {
        self.header.cell_size > 0.0 && self.elevations.len() == self.header.cell_count()
    }

    /// Mutable access to one cell, for building test and scenario terrain.
    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut i16> {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return None;
        }
        self.elevations.get_mut(row * h.width as usize + col)
    }

    /// Convert a sim-space position to grid row/col (fractional).
    /// Returns None if outside grid bounds.
    fn sim_to_grid(&self, pos: &Position) -> Option<(f64, f64)> {
        let h = &self.header;

        let col = (pos.x - h.origin_x) / h.cell_size;
        // Row 0 is the north edge.
        let row = (h.north_y() - pos.y) / h.cell_size;

        if col < 0.0 || row < 0.0 || col >= h.width as f64 || row >= h.height as f64 {
            return None;
        }

        Some((row, col))
    }

    /// Get raw elevation at integer grid coordinates.
    fn raw_elevation(&self, row: usize, col: usize) -> i16 {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return 0;
        }
        self.elevations
            .get(row * h.width as usize + col)
            .copied()
            .unwrap_or(0)
    }

    /// Elevation at a sim-space position with bilinear interpolation.
    /// Returns None if the position is outside the grid.
    pub fn elevation_at(&self, pos: &Position) -> Option<f32> {
        let (row, col) = self.sim_to_grid(pos)?;
        Some(self.bilinear(row, col))
    }

    /// Bilinear interpolation at fractional row/col.
    fn bilinear(&self, row: f64, col: f64) -> f32 {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.height as usize - 1);
        let c1 = (c0 + 1).min(self.header.width as usize - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw_elevation(r0, c0) as f64;
        let e01 = self.raw_elevation(r0, c1) as f64;
        let e10 = self.raw_elevation(r1, c0) as f64;
        let e11 = self.raw_elevation(r1, c1) as f64;

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        let val = top * (1.0 - fr) + bot * fr;

        val as f32
    }
}
