//! Maze grid and wall collision
//!
//! The maze is a static rectangular tile map (wall/open) with horizontal
//! wraparound tunnels at the rows whose edge columns are open. Wall
//! collision is a linear scan over precomputed wall rectangles; at maze
//! scale (a couple hundred walls) that beats maintaining a spatial index.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::{ENTITY_MARGIN, cell_spawn_pos};

/// One grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Wall,
    Open,
}

/// Axis-aligned bounding box, origin at top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    /// Square box of the given side length.
    pub fn square(min: Vec2, side: f32) -> Self {
        Self::new(min, Vec2::splat(side))
    }

    /// Strict overlap test (shared edges do not collide).
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.min.x + other.size.x
            && other.min.x < self.min.x + self.size.x
            && self.min.y < other.min.y + other.size.y
            && other.min.y < self.min.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }
}

/// Maze construction failures. All fatal: a session cannot start from a
/// malformed layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// No rows, or rows of zero width.
    Empty,
    /// A row's width disagrees with the first row's.
    NotRectangular {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// Every cell is a wall; nothing can spawn or move.
    NoOpenCells,
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MazeError::Empty => write!(f, "maze layout is empty"),
            MazeError::NotRectangular {
                row,
                expected,
                found,
            } => write!(
                f,
                "maze row {row} has {found} cells, expected {expected}"
            ),
            MazeError::NoOpenCells => write!(f, "maze has no open cells"),
        }
    }
}

impl std::error::Error for MazeError {}

/// Immutable tile map plus the derived lookups the simulation needs:
/// flat wall-rectangle list for box collision, open-cell spawn cache,
/// and the wraparound tunnel rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MazeGrid {
    width: usize,
    height: usize,
    tile: f32,
    cells: Vec<Cell>,
    wall_rects: Vec<Aabb>,
    open_cells: Vec<IVec2>,
    tunnel_rows: Vec<i32>,
}

impl MazeGrid {
    /// Build a grid from layout rows (1 = wall, anything else = open).
    pub fn from_rows(rows: &[&[u8]], tile: f32) -> Result<Self, MazeError> {
        if rows.is_empty() || rows[0].is_empty() {
            return Err(MazeError::Empty);
        }
        let width = rows[0].len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(MazeError::NotRectangular {
                    row: i,
                    expected: width,
                    found: row.len(),
                });
            }
        }

        let height = rows.len();
        let mut cells = Vec::with_capacity(width * height);
        let mut wall_rects = Vec::new();
        let mut open_cells = Vec::new();
        let mut tunnel_rows = Vec::new();

        for (r, row) in rows.iter().enumerate() {
            for (c, &v) in row.iter().enumerate() {
                let cell = if v == 1 { Cell::Wall } else { Cell::Open };
                cells.push(cell);
                match cell {
                    Cell::Wall => wall_rects.push(Aabb::square(
                        Vec2::new(c as f32 * tile, r as f32 * tile),
                        tile,
                    )),
                    Cell::Open => open_cells.push(IVec2::new(c as i32, r as i32)),
                }
            }
            // A row open at both edge columns wraps horizontally.
            if row[0] != 1 && row[width - 1] != 1 {
                tunnel_rows.push(r as i32);
            }
        }

        if open_cells.is_empty() {
            return Err(MazeError::NoOpenCells);
        }

        Ok(Self {
            width,
            height,
            tile,
            cells,
            wall_rects,
            open_cells,
            tunnel_rows,
        })
    }

    /// The classic 21x15 dungeon: fully walled border except the
    /// wraparound tunnel at row 7, symmetric inner corridors.
    pub fn default_layout() -> Self {
        #[rustfmt::skip]
        const ROWS: [[u8; 21]; 15] = [
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 0, 1, 1, 1, 0, 0, 1, 0, 0, 1, 1, 1, 0, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 0, 1],
            [0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0],
            [1, 0, 1, 1, 0, 1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 1, 1, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 0, 1, 1, 0, 1, 1, 1, 0, 0, 1, 0, 0, 1, 1, 1, 0, 1, 1, 0, 1],
            [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
            [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
        ];
        let rows: Vec<&[u8]> = ROWS.iter().map(|r| r.as_slice()).collect();
        // The constant above is rectangular and has open cells.
        Self::from_rows(&rows, 41.0).expect("classic layout is valid")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Length of one tile edge.
    pub fn tile(&self) -> f32 {
        self.tile
    }

    /// Playfield width in length units.
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * self.tile
    }

    /// Playfield height in length units.
    pub fn pixel_height(&self) -> f32 {
        self.height as f32 * self.tile
    }

    /// Side length of an entity bounding box on this grid.
    pub fn entity_size(&self) -> f32 {
        self.tile - 2.0 * ENTITY_MARGIN
    }

    /// Out-of-bounds counts as wall; wraparound is the mover's concern.
    pub fn is_wall(&self, col: i32, row: i32) -> bool {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return true;
        }
        self.cells[row as usize * self.width + col as usize] == Cell::Wall
    }

    /// Box-vs-walls test over the precomputed rectangle list.
    pub fn collides(&self, bbox: &Aabb) -> bool {
        self.wall_rects.iter().any(|w| w.intersects(bbox))
    }

    /// Open cells, in row-major order. Spawn positions derive from these.
    pub fn open_cells(&self) -> &[IVec2] {
        &self.open_cells
    }

    /// Rows that wrap horizontally at the playfield edges.
    pub fn tunnel_rows(&self) -> &[i32] {
        &self.tunnel_rows
    }

    /// Open cells whose spawn box is clear of every wall. With boxes
    /// smaller than a tile this is every open cell, but the check keeps
    /// the cache honest for unusual tile sizes.
    pub fn spawn_cells(&self) -> Vec<IVec2> {
        let size = self.entity_size();
        self.open_cells
            .iter()
            .copied()
            .filter(|&cell| !self.collides(&Aabb::square(cell_spawn_pos(cell, self.tile), size)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_shape() {
        let maze = MazeGrid::default_layout();
        assert_eq!(maze.width(), 21);
        assert_eq!(maze.height(), 15);
        assert_eq!(maze.tunnel_rows(), &[7]);
        // Border is walled except the tunnel row.
        for row in 0..15 {
            let open_edge = row == 7;
            assert_eq!(!maze.is_wall(0, row), open_edge, "row {row} left edge");
            assert_eq!(!maze.is_wall(20, row), open_edge, "row {row} right edge");
        }
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let maze = MazeGrid::default_layout();
        assert!(maze.is_wall(-1, 7));
        assert!(maze.is_wall(21, 7));
        assert!(maze.is_wall(5, -1));
        assert!(maze.is_wall(5, 15));
    }

    #[test]
    fn test_collides_against_wall_rect() {
        let maze = MazeGrid::default_layout();
        let tile = maze.tile();
        // Box inside open cell (1,1) - clear.
        let clear = Aabb::square(cell_spawn_pos(IVec2::new(1, 1), tile), maze.entity_size());
        assert!(!maze.collides(&clear));
        // Box overlapping the wall at (0,0).
        let hit = Aabb::square(Vec2::new(tile - 10.0, tile - 10.0), maze.entity_size());
        assert!(maze.collides(&hit));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            MazeGrid::from_rows(&[], 41.0),
            Err(MazeError::Empty)
        ));
        let ragged: [&[u8]; 2] = [&[1, 1, 1], &[1, 0]];
        assert!(matches!(
            MazeGrid::from_rows(&ragged, 41.0),
            Err(MazeError::NotRectangular {
                row: 1,
                expected: 3,
                found: 2
            })
        ));
        let solid: [&[u8]; 2] = [&[1, 1], &[1, 1]];
        assert!(matches!(
            MazeGrid::from_rows(&solid, 41.0),
            Err(MazeError::NoOpenCells)
        ));
    }

    #[test]
    fn test_spawn_cells_cover_open_cells() {
        let maze = MazeGrid::default_layout();
        assert_eq!(maze.spawn_cells().len(), maze.open_cells().len());
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::square(Vec2::ZERO, 10.0);
        let b = Aabb::square(Vec2::new(9.0, 9.0), 10.0);
        let c = Aabb::square(Vec2::new(10.0, 0.0), 10.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c)); // shared edge is not overlap
    }
}
