use smallvec::SmallVec;
use std::convert::From;
use std::fmt;

use crate::grid::Grid;

pub type CoordinateSmallVec = SmallVec<[Cartesian2DCoordinate; 4]>;

#[derive(Hash, Eq, PartialEq, Copy, Clone, Debug, Ord, PartialOrd)]
pub struct Cartesian2DCoordinate {
    pub x: u32,
    pub y: u32,
}

impl Cartesian2DCoordinate {
    pub fn new(x: u32, y: u32) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate { x, y }
    }

    /// Is `other` exactly one step north, east, south or west of this coordinate?
    pub fn is_adjacent(&self, other: Cartesian2DCoordinate) -> bool {
        self.direction_to(other).is_some()
    }

    /// The compass direction leading from this coordinate to an adjacent `other`.
    /// None if the coordinates are equal, diagonal or further apart.
    pub fn direction_to(&self, other: Cartesian2DCoordinate) -> Option<CompassPrimary> {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        match (dx, dy) {
            (0, -1) => Some(CompassPrimary::North),
            (1, 0) => Some(CompassPrimary::East),
            (0, 1) => Some(CompassPrimary::South),
            (-1, 0) => Some(CompassPrimary::West),
            _ => None,
        }
    }
}

impl From<(u32, u32)> for Cartesian2DCoordinate {
    fn from(x_y_pair: (u32, u32)) -> Cartesian2DCoordinate {
        Cartesian2DCoordinate::new(x_y_pair.0, x_y_pair.1)
    }
}

impl fmt::Display for Cartesian2DCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four sides of a square cell. The declaration order is the order
/// neighbours are reported in.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum CompassPrimary {
    North,
    East,
    South,
    West,
}

impl CompassPrimary {
    pub const ALL: [CompassPrimary; 4] = [CompassPrimary::North,
                                          CompassPrimary::East,
                                          CompassPrimary::South,
                                          CompassPrimary::West];

    /// The side of a neighbouring cell that faces this side.
    pub fn opposite(self) -> CompassPrimary {
        match self {
            CompassPrimary::North => CompassPrimary::South,
            CompassPrimary::East => CompassPrimary::West,
            CompassPrimary::South => CompassPrimary::North,
            CompassPrimary::West => CompassPrimary::East,
        }
    }

    #[inline]
    fn wall_index(self) -> usize {
        match self {
            CompassPrimary::North => 0,
            CompassPrimary::East => 1,
            CompassPrimary::South => 2,
            CompassPrimary::West => 3,
        }
    }

    /// Creates a new coordinate offset 1 cell away in this direction.
    /// Returns None if the coordinate is not representable, the grid bounds are not checked.
    pub fn offset(self, coord: Cartesian2DCoordinate) -> Option<Cartesian2DCoordinate> {
        let (x, y) = (coord.x, coord.y);
        match self {
            CompassPrimary::North => y.checked_sub(1).map(|y| Cartesian2DCoordinate::new(x, y)),
            CompassPrimary::East => x.checked_add(1).map(|x| Cartesian2DCoordinate::new(x, y)),
            CompassPrimary::South => y.checked_add(1).map(|y| Cartesian2DCoordinate::new(x, y)),
            CompassPrimary::West => x.checked_sub(1).map(|x| Cartesian2DCoordinate::new(x, y)),
        }
    }
}

/// One position in a maze grid.
///
/// A cell starts out enclosed by four walls and unvisited. Only the owning
/// `Grid` mutates a cell, walls are only ever removed.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Cell {
    coord: Cartesian2DCoordinate,
    visited: bool,
    walls: [bool; 4],
}

impl Cell {
    pub(crate) fn new(coord: Cartesian2DCoordinate) -> Cell {
        Cell {
            coord,
            visited: false,
            walls: [true; 4],
        }
    }

    #[inline]
    pub fn coordinate(&self) -> Cartesian2DCoordinate {
        self.coord
    }

    #[inline]
    pub fn x(&self) -> u32 {
        self.coord.x
    }

    #[inline]
    pub fn y(&self) -> u32 {
        self.coord.y
    }

    #[inline]
    pub fn is_visited(&self) -> bool {
        self.visited
    }

    #[inline]
    pub fn has_wall(&self, direction: CompassPrimary) -> bool {
        self.walls[direction.wall_index()]
    }

    #[inline]
    pub fn is_open(&self, direction: CompassPrimary) -> bool {
        !self.has_wall(direction)
    }

    /// Wall flags in North, East, South, West order.
    pub fn walls(&self) -> [bool; 4] {
        self.walls
    }

    /// How many of the four walls have been cleared.
    pub fn open_count(&self) -> usize {
        self.walls.iter().filter(|&&wall| !wall).count()
    }

    /// The in bounds, grid adjacent cells that have not been visited yet, in North, East, South, West order.
    pub fn neighbours(&self, grid: &Grid) -> CoordinateSmallVec {
        grid.neighbours(self.coord)
            .into_iter()
            .filter(|neighbour| grid.cell(*neighbour).map_or(false, |cell| !cell.visited))
            .collect()
    }

    pub(crate) fn mark_visited(&mut self) {
        self.visited = true;
    }

    pub(crate) fn clear_wall(&mut self, direction: CompassPrimary) {
        self.walls[direction.wall_index()] = false;
    }
}
