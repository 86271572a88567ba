use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use twophase_core::{
    CubeError, CubieCube, Maneuver, Move, ScrambleCoords, coord::N_PERM_4,
};

use crate::{
    config::SolverConfig,
    start, success,
    tables::{DirectoryTables, TableError, Tables},
    working,
};

/// When the search may stop.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Stop at the first solution found.
    #[default]
    FirstSolution,
    /// Keep looking for shorter solutions until one of at most this many
    /// moves turns up or phase 1 runs out of depth.
    TargetLength(usize),
}

/// A two-phase solution: the phase-1 moves followed by the phase-2 moves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Solution {
    pub maneuver: Maneuver,
    pub phase1_length: usize,
}

impl Solution {
    #[must_use]
    pub fn len(&self) -> usize {
        self.maneuver.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.maneuver.is_empty()
    }

    #[must_use]
    pub fn phase1(&self) -> &[Move] {
        &self.maneuver.moves()[..self.phase1_length]
    }

    #[must_use]
    pub fn phase2(&self) -> &[Move] {
        &self.maneuver.moves()[self.phase1_length..]
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.maneuver, self.len())
    }
}

/// A random cube together with a maneuver that produces it from the solved
/// cube.
#[derive(Debug, Clone)]
pub struct Scramble {
    pub maneuver: Maneuver,
    pub cube: CubieCube,
    pub coords: ScrambleCoords,
}

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("The cube cannot be solved: {0}")]
    InvalidCube(#[from] CubeError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error("No solution found with fewer than {0} phase-1 moves")]
    NoSolution(u8),
    #[error("Time limit exceeded before any solution was found")]
    TimedOut,
}

pub struct Solver {
    tables: Arc<Tables>,
    config: SolverConfig,
}

/// Everything a single solve mutates. The coordinates of the start cube that
/// phase 1 does not track are kept here so phase-1 leaves can derive the
/// phase-2 coordinates by replaying the phase-1 moves.
pub(crate) struct SearchContext {
    pub(crate) start_corners: u16,
    pub(crate) start_u_edges: u16,
    pub(crate) start_d_edges: u16,
    pub(crate) phase1_moves: Vec<Move>,
    pub(crate) phase2_moves: Vec<Move>,
    /// Corners at the last phase-1 leaf that computed them from scratch.
    pub(crate) corners_save: u16,
    pub(crate) best: Option<Solution>,
    pub(crate) shortest_length: usize,
    /// Set once the current phase-2 search produced a solution.
    pub(crate) phase2_done: bool,
    pub(crate) terminated: bool,
    pub(crate) timed_out: bool,
    deadline: Option<Instant>,
    pub(crate) nodes_visited: u64,
}

impl SearchContext {
    fn new(cube: &CubieCube, deadline: Option<Instant>) -> Self {
        SearchContext {
            start_corners: cube.get_corners(),
            start_u_edges: cube.get_u_edges(),
            start_d_edges: cube.get_d_edges(),
            phase1_moves: Vec::with_capacity(20),
            phase2_moves: Vec::with_capacity(20),
            corners_save: 0,
            best: None,
            shortest_length: usize::MAX,
            phase2_done: false,
            terminated: false,
            timed_out: false,
            deadline,
            nodes_visited: 0,
        }
    }

    /// Terminates the search once the deadline has passed. Returns whether
    /// the search is over.
    pub(crate) fn check_deadline(&mut self) -> bool {
        if self.terminated {
            return true;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.terminated = true;
            self.timed_out = self.best.is_none();
        }
        self.terminated
    }

    /// Stores the current phase-1 + phase-2 moves if they beat the best
    /// solution so far.
    pub(crate) fn record_solution(&mut self, strategy: SearchStrategy) {
        let length = self.phase1_moves.len() + self.phase2_moves.len();
        if self.best.as_ref().is_none_or(|best| best.len() > length) {
            let solution = Solution {
                maneuver: self
                    .phase1_moves
                    .iter()
                    .chain(&self.phase2_moves)
                    .copied()
                    .collect(),
                phase1_length: self.phase1_moves.len(),
            };
            trace!(working!("Found solution {}"), solution);
            self.best = Some(solution);
            self.shortest_length = length;
        }
        self.phase2_done = true;
        self.terminated = match strategy {
            SearchStrategy::FirstSolution => true,
            SearchStrategy::TargetLength(target) => self.shortest_length <= target,
        };
    }
}

impl Solver {
    #[must_use]
    pub fn new(tables: Arc<Tables>) -> Self {
        Self::with_config(tables, SolverConfig::default())
    }

    #[must_use]
    pub fn with_config(tables: Arc<Tables>, config: SolverConfig) -> Self {
        Solver { tables, config }
    }

    /// Loads the tables from the directory `config` resolves to.
    ///
    /// # Errors
    ///
    /// Fails if no directory can be determined or the tables do not load.
    pub fn from_config(config: SolverConfig) -> Result<Self, TableError> {
        let dir = config.resolve_tables_dir().ok_or(TableError::NoDirectory)?;
        let tables = Tables::load(&DirectoryTables::new(dir))?;
        Ok(Self::with_config(Arc::new(tables), config))
    }

    #[must_use]
    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    #[must_use]
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Finds a maneuver that solves `cube`.
    ///
    /// # Errors
    ///
    /// Fails if the cube is not solvable, if the tables turn out to be
    /// inconsistent, or if nothing is found within the depth or time limits.
    pub fn solve(&self, cube: &CubieCube) -> Result<Solution, SolveError> {
        cube.verify()?;

        info!(start!("Searching for a two-phase solution"));
        let start = Instant::now();

        let flip = cube.get_flip();
        let twist = cube.get_twist();
        let slice_sorted = cube.get_slice_sorted();
        let distance = self
            .tables
            .phase1_distance(flip, slice_sorted / N_PERM_4, twist)?;
        debug!(working!("Phase 1 needs at least {} moves"), distance);

        let deadline = self.config.timeout().map(|timeout| start + timeout);
        let mut ctx = SearchContext::new(cube, deadline);
        for depth in distance..self.config.max_depth {
            debug!(working!("Searching phase 1 depth {}..."), depth);
            let depth_start = Instant::now();
            ctx.phase1_moves.clear();
            self.search_phase1(&mut ctx, flip, twist, slice_sorted, distance, depth)?;
            debug!(
                working!("Traversed {} nodes in {:.3}s"),
                ctx.nodes_visited,
                depth_start.elapsed().as_secs_f64()
            );
            ctx.nodes_visited = 0;
            if ctx.terminated {
                break;
            }
        }

        if ctx.timed_out {
            warn!(
                "Time limit of {:.3}s exceeded without a solution",
                self.config.timeout().unwrap_or(Duration::ZERO).as_secs_f64()
            );
            return Err(SolveError::TimedOut);
        }
        let solution = ctx
            .best
            .ok_or(SolveError::NoSolution(self.config.max_depth))?;
        info!(
            success!("Found a {} move solution in {:.3}s"),
            solution.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(solution)
    }

    /// Draws a uniformly random cube and a maneuver that scrambles the solved
    /// cube into it.
    ///
    /// # Errors
    ///
    /// See [`Solver::solve`].
    pub fn generate_scramble(&self, rng: &mut fastrand::Rng) -> Result<Scramble, SolveError> {
        let mut cube = CubieCube::SOLVED;
        let coords = cube.scramble(rng);
        let solution = self.solve(&cube)?;
        Ok(Scramble {
            maneuver: solution.maneuver.reversed_inverse(),
            cube,
            coords,
        })
    }
}
