//! Database for long clauses (size >= 3): the problem-clause list and the learned-lemma index.

use std::collections::HashMap;

use partial_ref::{partial, PartialRef};

use rsat_formula::Lit;

use super::{ClauseAlloc, ClauseRef, SCHEDULED_FOR_DELETION};
use crate::context::{
    AssignmentP, ClauseActivityP, ClauseAllocP, ClauseDbP, Context, ImplGraphP, WatchlistsP,
};
use crate::prop::Reason;
use crate::config::SolverConfig;

/// Tracks every long clause and the reduction schedule.
///
/// Problem clauses are never deleted. Lemmas (learned clauses) are candidates for
/// [`crate::clause::reduce::reduce`], which runs once every `conflicts_until_next_reduction`
/// conflicts, an interval that grows after each reduction (see the data model's reduction policy).
pub struct ClauseDb {
    problem: Vec<ClauseRef>,
    lemmas: Vec<ClauseRef>,
    conflicts_since_reduction: u64,
    conflicts_until_next_reduction: u64,
    reduction_count: u64,
    garbage_words: usize,
}

impl Default for ClauseDb {
    /// Not derived: `conflicts_until_next_reduction` has to start at
    /// `SolverConfig::default().reduction_base_interval` rather than at `0`, or the very first
    /// `reduction_due()` check would fire immediately instead of at the documented threshold.
    fn default() -> ClauseDb {
        ClauseDb {
            problem: Vec::new(),
            lemmas: Vec::new(),
            conflicts_since_reduction: 0,
            conflicts_until_next_reduction: SolverConfig::default().reduction_base_interval,
            reduction_count: 0,
            garbage_words: 0,
        }
    }
}

impl ClauseDb {
    pub fn problem_clauses(&self) -> &[ClauseRef] {
        &self.problem
    }

    pub fn lemmas(&self) -> &[ClauseRef] {
        &self.lemmas
    }

    pub fn add_problem_clause(
        mut ctx: partial!(Context, mut ClauseDbP, mut ClauseAllocP, mut WatchlistsP),
        lits: &[Lit],
    ) -> Option<ClauseRef> {
        let cref = ctx.part_mut(ClauseAllocP).create_clause(lits, false)?;
        ctx.part_mut(ClauseDbP).problem.push(cref);
        ctx.part_mut(WatchlistsP).watch_clause(cref, [lits[0], lits[1]]);
        Some(cref)
    }

    pub fn add_lemma(
        mut ctx: partial!(
            Context,
            mut ClauseDbP,
            mut ClauseAllocP,
            mut ClauseActivityP,
            mut WatchlistsP
        ),
        lits: &[Lit],
        lbd: usize,
    ) -> Option<ClauseRef> {
        let cref = ctx.part_mut(ClauseAllocP).create_clause(lits, true)?;
        ctx.part_mut(ClauseAllocP).clause_mut(cref).set_lbd(lbd);
        ctx.part_mut(ClauseDbP).lemmas.push(cref);
        ctx.part_mut(ClauseActivityP).register(cref);
        ctx.part_mut(WatchlistsP).watch_clause(cref, [lits[0], lits[1]]);
        Some(cref)
    }

    /// Whether enough conflicts have passed since the last reduction to run another one.
    pub fn reduction_due(&self) -> bool {
        self.conflicts_since_reduction >= self.conflicts_until_next_reduction
    }

    pub fn record_conflict(&mut self) {
        self.conflicts_since_reduction += 1;
    }

    pub fn schedule_next_reduction(&mut self, base_interval: u64, interval_increment: u64) {
        self.reduction_count += 1;
        self.conflicts_since_reduction = 0;
        self.conflicts_until_next_reduction = base_interval + self.reduction_count * interval_increment;
    }

    /// Whether scheduled-for-deletion clauses make up enough of the allocator to make a
    /// compaction pass worthwhile.
    ///
    /// Collecting only once a fixed fraction of the allocation is garbage amortizes the cost of
    /// compaction over many deletions instead of compacting after every single one.
    pub fn gc_due(alloc: &ClauseAlloc, garbage_words: usize) -> bool {
        garbage_words * 2 > alloc.buffer_words()
    }

    /// Marks a clause (problem or lemma) for deletion on the next compaction.
    pub fn delete_clause(
        mut ctx: partial!(Context, mut ClauseDbP, mut ClauseAllocP, mut ClauseActivityP),
        cref: ClauseRef,
    ) {
        let footprint = ctx.part(ClauseAllocP).clause(cref).footprint();
        ctx.part_mut(ClauseAllocP)
            .clause_mut(cref)
            .set_flag(SCHEDULED_FOR_DELETION, true);
        ctx.part_mut(ClauseActivityP).forget(cref);
        ctx.part_mut(ClauseDbP).garbage_words += footprint;
    }

    /// Deletes a long clause unless it is currently the reason an assigned variable is on the
    /// trail.
    ///
    /// The propagated literal of a long clause is always kept at index 0, so a clause is
    /// asserting exactly when that literal is true and its variable's reason is this clause.
    /// Deleting an asserting clause would leave the implication graph pointing at storage that
    /// compaction is free to reuse for something else. Returns whether the clause was deleted.
    pub fn try_delete_clause(
        mut ctx: partial!(
            Context,
            mut ClauseDbP,
            mut ClauseAllocP,
            mut ClauseActivityP,
            AssignmentP,
            ImplGraphP,
        ),
        cref: ClauseRef,
    ) -> bool {
        let initial_lit = ctx.part(ClauseAllocP).clause(cref).lits()[0];
        let asserting = ctx.part(AssignmentP).lit_is_true(initial_lit)
            && *ctx.part(ImplGraphP).reason(initial_lit.var()) == Reason::Long(cref);

        if !asserting {
            Self::delete_clause(ctx.borrow(), cref);
        }
        !asserting
    }

    /// Compacts clause storage and remaps every `ClauseRef` this database (and clause activity)
    /// holds. The caller is responsible for remapping its own watch lists using the same mapping
    /// before the old refs go out of scope.
    pub fn collect_garbage(
        mut ctx: partial!(Context, mut ClauseDbP, mut ClauseAllocP, mut ClauseActivityP),
    ) -> HashMap<ClauseRef, ClauseRef> {
        let mapping: HashMap<ClauseRef, ClauseRef> =
            ctx.part_mut(ClauseAllocP).compress().into_iter().collect();

        ctx.part_mut(ClauseActivityP).remap(&mapping);

        let db = ctx.part_mut(ClauseDbP);
        db.problem = db
            .problem
            .iter()
            .filter_map(|cref| mapping.get(cref).copied())
            .collect();
        db.lemmas = db
            .lemmas
            .iter()
            .filter_map(|cref| mapping.get(cref).copied())
            .collect();
        db.garbage_words = 0;

        mapping
    }

    /// Compacts clause storage if enough of it is garbage, remapping watch lists to match.
    ///
    /// Checked opportunistically outside the regular reduction schedule (§4.7 only compacts as
    /// part of reducing the lemma set) so that a long run of deletions from simplification never
    /// lets garbage accumulate until the next scheduled reduction.
    pub fn collect_garbage_if_due(
        mut ctx: partial!(
            Context,
            mut ClauseDbP,
            mut ClauseAllocP,
            mut ClauseActivityP,
            mut WatchlistsP,
        ),
    ) {
        let due = Self::gc_due(ctx.part(ClauseAllocP), ctx.part(ClauseDbP).garbage_words);

        if due {
            let mapping = Self::collect_garbage(ctx.borrow());
            ctx.part_mut(WatchlistsP).remap(&mapping);
        }
    }
}
