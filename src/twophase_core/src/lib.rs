#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::module_name_repetitions)]

//! Cube algebra for the two-phase solver: cubie-level states, the coordinate
//! codec and the face-turn move model.

pub mod coord;
pub mod cubie;
pub mod moves;

pub use coord::{Coordinate, CoordinateError, c_nk};
pub use cubie::{Corner, CubeError, CubieCube, Edge, ParseCubeError, ScrambleCoords};
pub use moves::{Face, Maneuver, Move, ParseMoveError};
