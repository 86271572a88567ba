//! Phase 2: from a cube in H to the solved cube using only the moves that
//! keep it in H.

use log::{Level, log_enabled};
use twophase_core::{
    Face, Move,
    coord::{N_MOVE, N_PERM_4, N_U_EDGES_PHASE2},
};

use crate::{
    pruning::next_distance,
    solver::{SearchContext, Solver},
    tables::TableError,
};

impl Solver {
    /// Runs at the end of every phase-1 maneuver: derives the phase-2
    /// coordinates and searches phase 2 with increasing depth, bounded so the
    /// total beats the best solution so far.
    pub(crate) fn enter_phase2(
        &self,
        ctx: &mut SearchContext,
        slice_sorted: u16,
    ) -> Result<(), TableError> {
        let tables = &**self.tables();

        let corners = match ctx.phase1_moves.last() {
            // Phase-1 maneuvers ending in X and X' (X = R, F, L, B) both end
            // in H and X is always tried first, so X' is X followed by X2.
            Some(&last)
                if last.quarter_turns() == 3 && !matches!(last.face(), Face::U | Face::D) =>
            {
                tables.corners_move
                    [N_MOVE * usize::from(ctx.corners_save) + last.half_turn().index()]
            }
            _ => {
                let corners = ctx.phase1_moves.iter().fold(ctx.start_corners, |corners, mv| {
                    tables.corners_move[N_MOVE * usize::from(corners) + mv.index()]
                });
                ctx.corners_save = corners;
                corners
            }
        };

        let phase1_length = ctx.phase1_moves.len();
        let togo2_limit = ctx
            .shortest_length
            .saturating_sub(phase1_length)
            .min(usize::from(self.config().phase2_max_depth)) as u8;
        if tables.corner_slice_depth(corners, slice_sorted) >= togo2_limit {
            return Ok(());
        }

        let (u_edges, d_edges) = ctx.phase1_moves.iter().fold(
            (ctx.start_u_edges, ctx.start_d_edges),
            |(u_edges, d_edges), mv| {
                (
                    tables.u_edges_move[N_MOVE * usize::from(u_edges) + mv.index()],
                    tables.d_edges_move[N_MOVE * usize::from(d_edges) + mv.index()],
                )
            },
        );
        if u_edges >= N_U_EDGES_PHASE2 {
            // The U edges left the U and D layers, so the tables do not agree
            // that this state is in H.
            return Ok(());
        }
        let ud_edges = tables.edge_merge
            [usize::from(N_PERM_4) * usize::from(u_edges) + usize::from(d_edges % N_PERM_4)];

        let dist2 = tables.phase2_distance(corners, ud_edges)?;
        for togo2 in dist2..togo2_limit {
            ctx.phase2_moves.clear();
            ctx.phase2_done = false;
            self.search_phase2(ctx, corners, ud_edges, slice_sorted, dist2, togo2);
            if ctx.phase2_done {
                break;
            }
        }
        Ok(())
    }

    fn search_phase2(
        &self,
        ctx: &mut SearchContext,
        corners: u16,
        ud_edges: u16,
        slice_sorted: u16,
        dist: u8,
        togo: u8,
    ) {
        if log_enabled!(Level::Debug) {
            ctx.nodes_visited += 1;
        }

        if togo == 0 && slice_sorted == 0 {
            ctx.record_solution(self.config().strategy);
            return;
        }

        let tables = &**self.tables();
        for mv in Move::PHASE2 {
            let prev = ctx.phase2_moves.last().or(ctx.phase1_moves.last());
            if prev.is_some_and(|&prev| mv.is_redundant_after(prev)) {
                continue;
            }

            let m = mv.index();
            let corners_new = tables.corners_move[N_MOVE * usize::from(corners) + m];
            let ud_edges_new = tables.ud_edges_move[N_MOVE * usize::from(ud_edges) + m];
            let slice_sorted_new = tables.slice_sorted_move[N_MOVE * usize::from(slice_sorted) + m];

            let dist_new = next_distance(dist, tables.phase2_depth3(corners_new, ud_edges_new));
            let corner_slice_depth = tables.corner_slice_depth(corners_new, slice_sorted_new);
            if dist_new.max(corner_slice_depth) >= togo {
                continue;
            }

            ctx.phase2_moves.push(mv);
            self.search_phase2(
                ctx,
                corners_new,
                ud_edges_new,
                slice_sorted_new,
                dist_new,
                togo - 1,
            );
            ctx.phase2_moves.pop();

            // Later siblings can only tie the solution just recorded.
            if ctx.phase2_done {
                return;
            }
        }
    }
}
