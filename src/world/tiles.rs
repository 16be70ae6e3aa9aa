//! Tile occupancy and static wall extraction.

use bevy::prelude::*;

/// Read-only view of which tiles are walls.
pub trait TileOccupancy {
    fn is_wall_tile(&self, col: i32, row: i32) -> bool;
    fn columns(&self) -> usize;
    fn rows(&self) -> usize;
}

/// Dense wall/floor grid.
///
/// Anything outside the grid counts as wall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    columns: usize,
    rows: usize,
    walls: Vec<bool>,
}

impl TileGrid {
    /// All-floor grid.
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            walls: vec![false; columns * rows],
        }
    }

    /// Build from text rows. Short rows are padded with floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], is_wall: impl Fn(char) -> bool) -> Self {
        let columns = rows
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(0);
        let mut grid = Self::new(columns, rows.len());
        for (row, line) in rows.iter().enumerate() {
            for (col, c) in line.as_ref().chars().enumerate() {
                grid.walls[row * columns + col] = is_wall(c);
            }
        }
        grid
    }

    pub fn set_wall(&mut self, col: usize, row: usize, wall: bool) {
        if col < self.columns && row < self.rows {
            self.walls[row * self.columns + col] = wall;
        }
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|w| **w).count()
    }
}

impl TileOccupancy for TileGrid {
    fn is_wall_tile(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 {
            return true;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.columns || row >= self.rows {
            return true;
        }
        self.walls[row * self.columns + col]
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn rows(&self) -> usize {
        self.rows
    }
}

/// Collapse each horizontal run of wall tiles into one rectangle.
///
/// Rows are never merged with each other.
pub fn extract_wall_rectangles(grid: &impl TileOccupancy, tile_size: f32) -> Vec<Rect> {
    let mut rects = Vec::new();
    for row in 0..grid.rows() as i32 {
        let mut run_start: Option<i32> = None;
        for col in 0..=grid.columns() as i32 {
            let is_wall = col < grid.columns() as i32 && grid.is_wall_tile(col, row);
            match (is_wall, run_start) {
                (true, None) => run_start = Some(col),
                (false, Some(start)) => {
                    rects.push(Rect::new(
                        start as f32 * tile_size,
                        row as f32 * tile_size,
                        col as f32 * tile_size,
                        (row + 1) as f32 * tile_size,
                    ));
                    run_start = None;
                }
                _ => {}
            }
        }
    }
    rects
}
