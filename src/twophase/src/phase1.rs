//! Phase 1: IDA* from the start cube into the subgroup H = <U, D, R2, F2, L2,
//! B2>, where twist, flip and the unsorted slice coordinate are all zero.

use log::{Level, log_enabled};
use twophase_core::{
    Move,
    coord::{N_MOVE, N_PERM_4},
};

use crate::{
    pruning::next_distance,
    solver::{SearchContext, Solver},
    tables::TableError,
};

impl Solver {
    /// Extends the phase-1 maneuver by exactly `togo` more moves that end in
    /// H, handing each such maneuver to phase 2. `dist` is the exact phase-1
    /// distance of the current state.
    pub(crate) fn search_phase1(
        &self,
        ctx: &mut SearchContext,
        flip: u16,
        twist: u16,
        slice_sorted: u16,
        dist: u8,
        togo: u8,
    ) -> Result<(), TableError> {
        if ctx.check_deadline() {
            return Ok(());
        }
        if log_enabled!(Level::Debug) {
            ctx.nodes_visited += 1;
        }

        if togo == 0 {
            return self.enter_phase2(ctx, slice_sorted);
        }

        let tables = &**self.tables();
        for mv in Move::ALL {
            // Already in H with fewer than 5 moves to go: the remaining moves
            // would have to be phase-2 moves, which phase 2 generates itself.
            if dist == 0 && togo < 5 && mv.is_phase2() {
                continue;
            }
            if ctx
                .phase1_moves
                .last()
                .is_some_and(|&prev| mv.is_redundant_after(prev))
            {
                continue;
            }

            let m = mv.index();
            let flip_new = tables.flip_move[N_MOVE * usize::from(flip) + m];
            let twist_new = tables.twist_move[N_MOVE * usize::from(twist) + m];
            let slice_sorted_new = tables.slice_sorted_move[N_MOVE * usize::from(slice_sorted) + m];

            let dist_new = next_distance(
                dist,
                tables.phase1_depth3(flip_new, slice_sorted_new / N_PERM_4, twist_new),
            );
            if dist_new >= togo {
                continue;
            }

            ctx.phase1_moves.push(mv);
            self.search_phase1(ctx, flip_new, twist_new, slice_sorted_new, dist_new, togo - 1)?;
            ctx.phase1_moves.pop();

            if ctx.terminated {
                break;
            }
        }
        Ok(())
    }
}
