use std::fmt;

use crate::cells::{Cell, CompassPrimary};
use crate::grid::Grid;

pub trait GridDisplay {
    /// Render the contents of a grid cell as text.
    /// The String should be 3 glyphs long, padded if required.
    fn render_cell_body(&self, _: &Cell) -> String {
        String::from("   ")
    }
}

/// Empty cell bodies.
#[derive(Debug, Copy, Clone, Default)]
pub struct BlankDisplay;

impl GridDisplay for BlankDisplay {}

/// Shades cells that have not been visited, so the carved region stands out
/// while a maze is being generated.
#[derive(Debug, Copy, Clone, Default)]
pub struct VisitedDisplay;

impl GridDisplay for VisitedDisplay {
    fn render_cell_body(&self, cell: &Cell) -> String {
        if cell.is_visited() {
            String::from("   ")
        } else {
            String::from("░░░")
        }
    }
}

/// A grid paired with the cell body renderer to draw it with.
pub struct DisplayWith<'a, D: GridDisplay + ?Sized> {
    grid: &'a Grid,
    display: &'a D,
}

impl Grid {
    pub fn display_with<'a, D: GridDisplay + ?Sized>(&'a self, display: &'a D) -> DisplayWith<'a, D> {
        DisplayWith { grid: self, display }
    }
}

impl<'a, D: GridDisplay + ?Sized> fmt::Display for DisplayWith<'a, D> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_grid(self.grid, self.display, f)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_grid(self, &BlankDisplay, f)
    }
}

const WALL_L: &str = "╴";
const WALL_R: &str = "╶";
const WALL_U: &str = "╵";
const WALL_D: &str = "╷";
const WALL_LR_3: &str = "───";
const WALL_LR: &str = "─";
const WALL_UD: &str = "│";
const WALL_LD: &str = "┐";
const WALL_RU: &str = "└";
const WALL_LU: &str = "┘";
const WALL_RD: &str = "┌";
const WALL_LRU: &str = "┴";
const WALL_LRD: &str = "┬";
const WALL_LRUD: &str = "┼";
const WALL_RUD: &str = "├";
const WALL_LUD: &str = "┤";

// The drawing is a lattice of (width + 1) x (height + 1) corner points. Between
// two horizontally adjacent points runs the wall above/below a cell, between two
// vertically adjacent points the wall left/right of a cell. Each corner glyph is
// picked from which of its four arms are walls.
fn write_grid<D: GridDisplay + ?Sized>(grid: &Grid, display: &D, f: &mut fmt::Formatter) -> fmt::Result {
    let (width, height) = (grid.width(), grid.height());

    // Horizontal wall along the top edge of row `y`, above column `x`.
    let horizontal_wall = |x: usize, y: usize| -> bool {
        if y == 0 || y == height {
            true
        } else {
            cell(grid, x, y - 1).map_or(true, |c| c.has_wall(CompassPrimary::South))
        }
    };
    // Vertical wall along the left edge of column `x`, in row `y`.
    let vertical_wall = |x: usize, y: usize| -> bool {
        if x == 0 || x == width {
            true
        } else {
            cell(grid, x - 1, y).map_or(true, |c| c.has_wall(CompassPrimary::East))
        }
    };

    for corner_y in 0..=height {
        let mut corners_line = String::new();
        for corner_x in 0..=width {
            let left = corner_x > 0 && horizontal_wall(corner_x - 1, corner_y);
            let right = corner_x < width && horizontal_wall(corner_x, corner_y);
            let up = corner_y > 0 && vertical_wall(corner_x, corner_y - 1);
            let down = corner_y < height && vertical_wall(corner_x, corner_y);
            corners_line.push_str(corner_glyph(left, right, up, down));

            if corner_x < width {
                corners_line.push_str(if right { WALL_LR_3 } else { "   " });
            }
        }
        writeln!(f, "{}", corners_line)?;

        if corner_y < height {
            let mut bodies_line = String::new();
            for x in 0..=width {
                bodies_line.push_str(if vertical_wall(x, corner_y) { WALL_UD } else { " " });
                if let Some(c) = cell(grid, x, corner_y) {
                    bodies_line.push_str(&display.render_cell_body(c));
                }
            }
            writeln!(f, "{}", bodies_line)?;
        }
    }

    Ok(())
}

fn cell(grid: &Grid, x: usize, y: usize) -> Option<&Cell> {
    grid.cell_at(x as u32, y as u32).ok()
}

fn corner_glyph(left: bool, right: bool, up: bool, down: bool) -> &'static str {
    match (left, right, up, down) {
        (true, true, true, true) => WALL_LRUD,
        (true, true, true, false) => WALL_LRU,
        (true, true, false, true) => WALL_LRD,
        (true, false, true, true) => WALL_LUD,
        (false, true, true, true) => WALL_RUD,
        (true, true, false, false) => WALL_LR,
        (false, false, true, true) => WALL_UD,
        (false, true, true, false) => WALL_RU,
        (true, false, false, true) => WALL_LD,
        (true, false, true, false) => WALL_LU,
        (false, true, false, true) => WALL_RD,
        (true, false, false, false) => WALL_L,
        (false, true, false, false) => WALL_R,
        (false, false, true, false) => WALL_U,
        (false, false, false, true) => WALL_D,
        (false, false, false, false) => " ",
    }
}
