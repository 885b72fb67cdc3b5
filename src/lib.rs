//! **mazes** generates perfect mazes on rectangular grids with a randomised
//! depth first search (the recursive backtracker), optionally showing every
//! carving step to a renderer as the maze is built.

pub mod analysis;
pub mod cells;
pub mod errors;
pub mod generators;
pub mod grid;
pub mod grid_displays;
pub mod logging;
pub mod renderers;
pub mod units;
