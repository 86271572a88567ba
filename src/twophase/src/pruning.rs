//! Distance estimates from the mod-3 pruning tables.
//!
//! The tables only store depths mod 3. Since one move changes the distance to
//! the goal by at most one, a known distance plus the mod-3 value of a
//! neighbour pins down the neighbour's distance.

use twophase_core::{
    Coordinate, CoordinateError, Move,
    coord::{N_FLIP, N_MOVE, N_PERM_4, N_TWIST, N_UD_EDGES},
};

use crate::tables::{TableError, TableName, Tables};

/// A phase-2 pruning entry of 3 marks a state at least this far from the
/// goal. It is also the exclusive bound on the phase-2 maneuver length.
pub const PHASE2_UNKNOWN_DISTANCE: u8 = 11;

/// No state needs more phase-1 moves than this; a deeper descent means the
/// tables disagree with each other.
const MAX_PHASE1_DEPTH: u8 = 12;

const fn corrected_distance(old_distance: u8, new_depth3: u8) -> u8 {
    let distance = old_distance / 3 * 3 + new_depth3;
    if old_distance % 3 == 2 && new_depth3 == 0 {
        distance + 3
    } else if old_distance % 3 == 0 && new_depth3 == 2 {
        distance.saturating_sub(3)
    } else {
        distance
    }
}

/// `DISTANCE_CORRECTION[old][new_mod3]` is the distance of a neighbour of a
/// state at distance `old` whose pruning entry is `new_mod3`.
pub const DISTANCE_CORRECTION: [[u8; 3]; 20] = {
    let mut table = [[0; 3]; 20];
    let mut old = 0;
    while old < table.len() {
        let mut new = 0;
        while new < 3 {
            table[old][new] = corrected_distance(old as u8, new as u8);
            new += 1;
        }
        old += 1;
    }
    table
};

/// Distance of a neighbour of a state at distance `dist`, given the
/// neighbour's pruning entry. An entry of 3 (only in the phase-2 table) means
/// the neighbour is out of reach.
#[inline]
#[must_use]
pub fn next_distance(dist: u8, depth3: u8) -> u8 {
    if depth3 == 3 {
        return PHASE2_UNKNOWN_DISTANCE;
    }
    DISTANCE_CORRECTION
        .get(usize::from(dist))
        .map_or_else(|| corrected_distance(dist, depth3), |row| row[usize::from(depth3)])
}

impl Tables {
    /// Phase-1 pruning entry of the state, `slice` being the unsorted slice
    /// coordinate. Arguments must be in range.
    #[inline]
    pub(crate) fn phase1_depth3(&self, flip: u16, slice: u16, twist: u16) -> u8 {
        let flipslice = usize::from(N_FLIP) * usize::from(slice) + usize::from(flip);
        let class = usize::from(self.flipslice_classidx[flipslice]);
        let sym = usize::from(self.flipslice_sym[flipslice]);
        let twist_conj = usize::from(self.twist_conj[(usize::from(twist) << 4) + sym]);
        self.flipslice_twist_depth3
            .get(usize::from(N_TWIST) * class + twist_conj)
    }

    /// Phase-2 pruning entry of the state. Arguments must be in range.
    #[inline]
    pub(crate) fn phase2_depth3(&self, corners: u16, ud_edges: u16) -> u8 {
        let class = usize::from(self.corner_classidx[usize::from(corners)]);
        let sym = usize::from(self.corner_sym[usize::from(corners)]);
        let ud_edges_conj = usize::from(self.ud_edges_conj[(usize::from(ud_edges) << 4) + sym]);
        self.corners_ud_edges_depth3
            .get(usize::from(N_UD_EDGES) * class + ud_edges_conj)
    }

    /// Lower bound on the moves needed to solve the corners and the slice
    /// edges. States outside the phase-2 subgroup have no entry and read as
    /// unreachable.
    #[inline]
    pub(crate) fn corner_slice_depth(&self, corners: u16, slice_sorted: u16) -> u8 {
        if slice_sorted >= N_PERM_4 {
            return u8::MAX;
        }
        self.corner_slice_depth[usize::from(N_PERM_4) * usize::from(corners)
            + usize::from(slice_sorted)]
    }

    /// The number of moves mod 3 needed to bring a state into the phase-2
    /// subgroup, exact.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is out of range.
    pub fn flipslice_twist_depth3(
        &self,
        flip: u16,
        slice: u16,
        twist: u16,
    ) -> Result<u8, CoordinateError> {
        Coordinate::Flip.check(flip.into())?;
        Coordinate::Slice.check(slice.into())?;
        Coordinate::Twist.check(twist.into())?;
        Ok(self.phase1_depth3(flip, slice, twist))
    }

    /// A lower bound mod 3 on the phase-2 moves needed to solve corners and
    /// U/D edges; 3 when the bound is at least 11.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is out of range.
    pub fn corners_ud_edges_depth3(
        &self,
        corners: u16,
        ud_edges: u16,
    ) -> Result<u8, CoordinateError> {
        Coordinate::Corners.check(corners.into())?;
        Coordinate::UdEdges.check(ud_edges.into())?;
        Ok(self.phase2_depth3(corners, ud_edges))
    }

    /// Exact number of moves needed to bring a state into the phase-2
    /// subgroup, found by walking down the pruning table.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is out of range or if no move lowers
    /// the distance, which only happens with mismatched tables.
    pub fn phase1_distance(&self, flip: u16, slice: u16, twist: u16) -> Result<u8, TableError> {
        let inconsistent = || TableError::Inconsistent(TableName::Phase1Prun);
        let (mut flip, mut slice, mut twist) = (flip, slice, twist);
        let mut depth3 = self.flipslice_twist_depth3(flip, slice, twist)?;
        let mut depth = 0;
        while flip != 0 || slice != 0 || twist != 0 {
            if depth == MAX_PHASE1_DEPTH {
                return Err(inconsistent());
            }
            if depth3 == 0 {
                depth3 = 3;
            }
            (flip, slice, twist) = Move::ALL
                .into_iter()
                .map(|mv| {
                    let m = mv.index();
                    let flip = self.flip_move[N_MOVE * usize::from(flip) + m];
                    let twist = self.twist_move[N_MOVE * usize::from(twist) + m];
                    let slice = self.slice_sorted_move
                        [N_MOVE * usize::from(slice) * usize::from(N_PERM_4) + m]
                        / N_PERM_4;
                    (flip, slice, twist)
                })
                .find(|&(flip, slice, twist)| self.phase1_depth3(flip, slice, twist) == depth3 - 1)
                .ok_or_else(inconsistent)?;
            depth += 1;
            depth3 -= 1;
        }
        Ok(depth)
    }

    /// Distance to the state with solved corners and U/D edges using phase-2
    /// moves only. Exact below 11; 11 stands for "11 or more".
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is out of range or if no move lowers
    /// the distance.
    pub fn phase2_distance(&self, corners: u16, ud_edges: u16) -> Result<u8, TableError> {
        let inconsistent = || TableError::Inconsistent(TableName::Phase2Prun);
        let (mut corners, mut ud_edges) = (corners, ud_edges);
        let mut depth3 = self.corners_ud_edges_depth3(corners, ud_edges)?;
        if depth3 == 3 {
            return Ok(PHASE2_UNKNOWN_DISTANCE);
        }
        let mut depth = 0;
        while corners != 0 || ud_edges != 0 {
            if depth == PHASE2_UNKNOWN_DISTANCE {
                return Err(inconsistent());
            }
            if depth3 == 0 {
                depth3 = 3;
            }
            (corners, ud_edges) = Move::PHASE2
                .into_iter()
                .map(|mv| {
                    let m = mv.index();
                    (
                        self.corners_move[N_MOVE * usize::from(corners) + m],
                        self.ud_edges_move[N_MOVE * usize::from(ud_edges) + m],
                    )
                })
                .find(|&(corners, ud_edges)| self.phase2_depth3(corners, ud_edges) == depth3 - 1)
                .ok_or_else(inconsistent)?;
            depth += 1;
            depth3 -= 1;
        }
        Ok(depth)
    }
}
