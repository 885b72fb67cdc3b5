use error_chain::bail;
use std::fmt;
use std::mem;

use crate::cells::{Cartesian2DCoordinate, Cell, CompassPrimary, CoordinateSmallVec};
use crate::errors::*;
use crate::generators::Chooser;
use crate::units::{Height, Width};

/// A rectangular maze grid owning `width * height` cells in row major order.
///
/// Walls are always cleared in pairs, so the wall on one cell facing a neighbour
/// is open exactly when the neighbour's wall facing back is open.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    width: Width,
    height: Height,
    cells: Vec<Cell>,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Grid :: width: {:?}, height: {:?}, passages: {:?}",
               self.width, self.height, self.passages_count())
    }
}

impl Grid {
    /// Creates a fully walled grid with no visited cells.
    pub fn new(width: Width, height: Height) -> Result<Grid> {
        let (Width(w), Height(h)) = (width, height);
        if w < 1 || h < 1 {
            bail!(ErrorKind::Configuration(format!("grid dimensions must be positive, got {}x{}", w, h)));
        }
        // Every coordinate component must fit a u32.
        if w > u32::MAX as usize || h > u32::MAX as usize {
            bail!(ErrorKind::Configuration(format!("grid dimensions {}x{} are too large", w, h)));
        }
        let size = w.checked_mul(h)
            .ok_or_else(|| ErrorKind::Configuration(format!("grid cell count for {}x{} overflows", w, h)))?;
        // A Vec cannot hold more than isize::MAX bytes.
        if size > isize::MAX as usize / mem::size_of::<Cell>() {
            bail!(ErrorKind::Configuration(format!("grid of {}x{} cells does not fit in memory", w, h)));
        }

        let mut cells = Vec::new();
        cells.try_reserve_exact(size)
            .map_err(|err| ErrorKind::Configuration(format!("cannot allocate a {}x{} grid: {}", w, h, err)))?;
        for y in 0..h {
            for x in 0..w {
                cells.push(Cell::new(Cartesian2DCoordinate::new(x as u32, y as u32)));
            }
        }

        Ok(Grid { width, height, cells })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width.0
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height.0
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// All cells, row major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Bounds checked cell access.
    pub fn cell_at(&self, x: u32, y: u32) -> Result<&Cell> {
        self.cell(Cartesian2DCoordinate::new(x, y))
    }

    pub fn cell(&self, coord: Cartesian2DCoordinate) -> Result<&Cell> {
        let index = self.checked_index(coord)?;
        Ok(&self.cells[index])
    }

    /// Is the grid coordinate valid for this grid - within the grid's dimensions
    #[inline]
    pub fn is_valid_coordinate(&self, coord: Cartesian2DCoordinate) -> bool {
        (coord.x as usize) < self.width.0 && (coord.y as usize) < self.height.0
    }

    /// Convert a grid coordinate to a one dimensional index in the range 0...grid.size().
    /// Returns None if the grid coordinate is invalid.
    #[inline]
    pub fn grid_coordinate_to_index(&self, coord: Cartesian2DCoordinate) -> Option<usize> {
        if self.is_valid_coordinate(coord) {
            Some(coord.y as usize * self.width.0 + coord.x as usize)
        } else {
            None
        }
    }

    pub fn random_cell<C: Chooser + ?Sized>(&self, chooser: &mut C) -> Cartesian2DCoordinate {
        let index = chooser.choose(self.size());
        Cartesian2DCoordinate::new((index % self.width.0) as u32, (index / self.width.0) as u32)
    }

    /// Cells that are to the North, East, South or West of a particular cell, but not
    /// necessarily linked by a passage.
    pub fn neighbours(&self, coord: Cartesian2DCoordinate) -> CoordinateSmallVec {
        CompassPrimary::ALL.iter()
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect()
    }

    /// Neighbours of a cell that have not been visited yet, in North, East, South, West order.
    pub fn unvisited_neighbours(&self, coord: Cartesian2DCoordinate) -> Result<CoordinateSmallVec> {
        Ok(self.cell(coord)?.neighbours(self))
    }

    pub fn neighbour_at_direction(&self,
                                  coord: Cartesian2DCoordinate,
                                  direction: CompassPrimary)
                                  -> Option<Cartesian2DCoordinate> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        direction.offset(coord).filter(|neighbour| self.is_valid_coordinate(*neighbour))
    }

    /// Marks a cell visited. Returns true if the cell was not visited before.
    pub fn mark_visited(&mut self, coord: Cartesian2DCoordinate) -> Result<bool> {
        let index = self.checked_index(coord)?;
        let cell = &mut self.cells[index];
        let newly_visited = !cell.is_visited();
        cell.mark_visited();
        Ok(newly_visited)
    }

    /// Clear the wall between two grid adjacent cells, on both sides at once.
    ///
    /// Fails with `AdjacencyViolation` when the cells do not share a wall.
    pub fn clear_wall_between(&mut self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> Result<()> {
        let a_index = self.checked_index(a)?;
        let b_index = self.checked_index(b)?;
        let direction = a.direction_to(b)
            .ok_or_else(|| Error::from(ErrorKind::AdjacencyViolation(a, b)))?;

        self.cells[a_index].clear_wall(direction);
        self.cells[b_index].clear_wall(direction.opposite());
        Ok(())
    }

    /// Are two cells in the grid linked by a passage?
    pub fn is_linked(&self, a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) -> bool {
        match (self.cell(a), a.direction_to(b)) {
            (Ok(cell), Some(direction)) => self.is_valid_coordinate(b) && cell.is_open(direction),
            _ => false,
        }
    }

    pub fn is_neighbour_linked(&self, coord: Cartesian2DCoordinate, direction: CompassPrimary) -> bool {
        self.neighbour_at_direction(coord, direction)
            .map_or(false, |neighbour_coord| self.is_linked(coord, neighbour_coord))
    }

    /// Cells that are linked to a particular cell by a passage.
    /// None if the coordinate is invalid.
    pub fn links(&self, coord: Cartesian2DCoordinate) -> Option<CoordinateSmallVec> {
        if !self.is_valid_coordinate(coord) {
            return None;
        }
        Some(CompassPrimary::ALL.iter()
            .filter(|dir| self.is_neighbour_linked(coord, **dir))
            .filter_map(|dir| self.neighbour_at_direction(coord, *dir))
            .collect())
    }

    /// Every passage once, as the pair (west or north cell, east or south cell), in row major order.
    pub fn passages<'a>(&'a self) -> impl Iterator<Item = (Cartesian2DCoordinate, Cartesian2DCoordinate)> + 'a {
        self.cells.iter().flat_map(move |cell| {
            let coord = cell.coordinate();
            [CompassPrimary::East, CompassPrimary::South]
                .iter()
                .filter(move |dir| cell.is_open(**dir))
                .filter_map(move |dir| self.neighbour_at_direction(coord, *dir))
                .map(move |neighbour| (coord, neighbour))
                .collect::<CoordinatePairs>()
        })
    }

    pub fn passages_count(&self) -> usize {
        self.passages().count()
    }

    pub fn visited_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_visited()).count()
    }

    pub fn iter(&self) -> CellIter {
        CellIter {
            current_cell_number: 0,
            width: self.width.0,
            cells_count: self.size(),
        }
    }

    pub fn iter_row(&self) -> RowIter {
        RowIter {
            current_index: 0,
            width: self.width.0,
            height: self.height.0,
        }
    }

    fn checked_index(&self, coord: Cartesian2DCoordinate) -> Result<usize> {
        self.grid_coordinate_to_index(coord)
            .ok_or_else(|| ErrorKind::OutOfBounds(coord, self.width.0, self.height.0).into())
    }
}

type CoordinatePairs = smallvec::SmallVec<[(Cartesian2DCoordinate, Cartesian2DCoordinate); 2]>;

#[derive(Debug, Copy, Clone)]
pub struct CellIter {
    current_cell_number: usize,
    width: usize,
    cells_count: usize,
}

impl ExactSizeIterator for CellIter {} // default impl using size_hint()
impl Iterator for CellIter {
    type Item = Cartesian2DCoordinate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_cell_number < self.cells_count {
            let (x, y) = (self.current_cell_number % self.width, self.current_cell_number / self.width);
            self.current_cell_number += 1;
            Some(Cartesian2DCoordinate::new(x as u32, y as u32))
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cells_count - self.current_cell_number;
        (remaining, Some(remaining))
    }
}

#[derive(Debug, Copy, Clone)]
pub struct RowIter {
    current_index: usize,
    width: usize,
    height: usize,
}

impl ExactSizeIterator for RowIter {}
impl Iterator for RowIter {
    type Item = Vec<Cartesian2DCoordinate>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index < self.height {
            let y = self.current_index as u32;
            let coords = (0..self.width)
                .map(|x| Cartesian2DCoordinate::new(x as u32, y))
                .collect();
            self.current_index += 1;
            Some(coords)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.height - self.current_index;
        (remaining, Some(remaining))
    }
}
