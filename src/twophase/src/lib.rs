#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation, clippy::module_name_repetitions)]

//! Kociemba's two-phase algorithm for the 3x3x3 cube: phase 1 brings the cube
//! into the subgroup `<U, D, R2, F2, L2, B2>`, phase 2 solves it from there.
//! Both phases are IDA* searches on precomputed move and pruning tables.

pub mod config;
mod phase1;
mod phase2;
pub mod pruning;
pub mod solver;
pub mod tables;

pub use config::{ConfigError, SolverConfig};
pub use solver::{Scramble, SearchStrategy, Solution, SolveError, Solver};
pub use tables::{DirectoryTables, InMemoryTables, TableError, TableName, TableProvider, Tables};
pub use twophase_core::{CubieCube, Maneuver, Move};

#[macro_export]
macro_rules! start {
    ($msg:expr) => {
        concat!("⏳ ", $msg)
    };
}

#[macro_export]
macro_rules! working {
    ($msg:expr) => {
        concat!("🛠  ", $msg)
    };
}

#[macro_export]
macro_rules! success {
    ($msg:expr) => {
        concat!("✅ ", $msg)
    };
}
