//! Error types for grid construction and manipulation.
//!
//! Generation itself cannot fail on a valid grid, the kinds here describe
//! bad configuration or misuse of the grid API.

use error_chain::*;

use crate::cells::Cartesian2DCoordinate;

error_chain! {

    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }

    errors {
        Configuration(reason: String) {
            description("invalid maze configuration")
            display("invalid maze configuration: {}", reason)
        }

        OutOfBounds(coord: Cartesian2DCoordinate, width: usize, height: usize) {
            description("grid coordinate out of bounds")
            display("coordinate ({}, {}) is outside of the {}x{} grid", coord.x, coord.y, width, height)
        }

        AdjacencyViolation(a: Cartesian2DCoordinate, b: Cartesian2DCoordinate) {
            description("cells are not grid neighbours")
            display("cells ({}, {}) and ({}, {}) are not adjacent, there is no wall between them",
                    a.x, a.y, b.x, b.y)
        }
    }
}
