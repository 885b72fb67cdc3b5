//! Structural checks on a grid: are the walls consistent, and does the
//! passage graph form a perfect maze?

use petgraph::algo::{connected_components, is_cyclic_undirected};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::cells::{Cartesian2DCoordinate, CompassPrimary};
use crate::grid::Grid;

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct MazeReport {
    pub cells: usize,
    pub passages: usize,
    pub visited: usize,
    /// Cells with exactly one opening.
    pub dead_ends: usize,
    pub connected_components: usize,
    pub acyclic: bool,
    pub symmetric: bool,
}

impl MazeReport {
    /// A spanning tree over every cell: one component, no cycles, `cells - 1` passages.
    pub fn is_perfect(&self) -> bool {
        self.symmetric &&
        self.acyclic &&
        self.connected_components == 1 &&
        self.passages + 1 == self.cells
    }
}

pub fn analyse(grid: &Grid) -> MazeReport {
    let graph = passage_graph(grid);

    MazeReport {
        cells: grid.size(),
        passages: graph.edge_count(),
        visited: grid.visited_count(),
        dead_ends: grid.cells().iter().filter(|cell| cell.open_count() == 1).count(),
        connected_components: connected_components(&graph),
        acyclic: !is_cyclic_undirected(&graph),
        symmetric: wall_symmetry_violations(grid).is_empty(),
    }
}

/// The maze as an undirected graph: one node per cell in row major order, one
/// edge per passage. Node weights are the cell coordinates.
pub fn passage_graph(grid: &Grid) -> UnGraph<Cartesian2DCoordinate, ()> {
    // A perfect maze has one less passage than cells.
    let mut graph = UnGraph::with_capacity(grid.size(), grid.size().saturating_sub(1));
    for coord in grid.iter() {
        let _ = graph.add_node(coord);
    }

    for (a, b) in grid.passages() {
        if let (Some(a_index), Some(b_index)) = (grid.grid_coordinate_to_index(a),
                                                 grid.grid_coordinate_to_index(b)) {
            let _ = graph.add_edge(NodeIndex::new(a_index), NodeIndex::new(b_index), ());
        }
    }

    graph
}

/// Cell sides that are open while the side facing them is walled, or open onto
/// the outside of the grid. Empty for any grid only modified through `Grid`.
pub fn wall_symmetry_violations(grid: &Grid) -> Vec<(Cartesian2DCoordinate, CompassPrimary)> {
    let mut violations = vec![];
    for cell in grid.cells() {
        let coord = cell.coordinate();
        for &dir in &CompassPrimary::ALL {
            let consistent = match grid.neighbour_at_direction(coord, dir) {
                Some(neighbour) => grid.cell(neighbour)
                    .map_or(false, |other| other.is_open(dir.opposite()) == cell.is_open(dir)),
                None => cell.has_wall(dir),
            };
            if !consistent {
                violations.push((coord, dir));
            }
        }
    }
    violations
}
