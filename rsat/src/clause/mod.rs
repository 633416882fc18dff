//! Clause storage: region-backed allocation, compaction, and the lemma index.
//!
//! The clause database boundary described in the data model (a type-erased container wrapping a
//! concrete iterable region allocator) has exactly one implementation here, so it is kept as a
//! concrete `ClauseAlloc` rather than a trait with a single implementor.

pub mod activity;
pub mod assess;
pub mod db;
pub mod reduce;
pub mod region;

pub use activity::{bump_clause_activity, decay_clause_activities, ClauseActivity};
pub use assess::assess_learned_clause;
pub use db::ClauseDb;
pub use region::{ClauseView, ClauseViewMut, MODIFIED, REDUNDANT, SCHEDULED_FOR_DELETION};

use region::{ClauseOffset, Region};
use rsat_formula::Lit;

/// A stable handle to a clause stored in a [`ClauseAlloc`].
///
/// Valid only until the next [`ClauseAlloc::compress`] call; every structure that caches a
/// `ClauseRef` (watch lists, the lemma index) must be rebuilt from the mapping `compress` returns.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub struct ClauseRef {
    region: u32,
    offset: ClauseOffset,
}

/// Active and spare regions backing all long (size >= 3) clauses.
///
/// Binary and unit clauses never go through this allocator (see [`crate::binary::BinaryClauses`]).
pub struct ClauseAlloc {
    active: Vec<Region>,
    spare: Vec<Region>,
    region_words: usize,
    memory_limit_words: Option<usize>,
}

impl Default for ClauseAlloc {
    fn default() -> ClauseAlloc {
        ClauseAlloc::with_region_words(1 << 16)
    }
}

impl ClauseAlloc {
    pub fn with_region_words(region_words: usize) -> ClauseAlloc {
        ClauseAlloc {
            active: vec![Region::with_capacity(region_words)],
            spare: vec![],
            region_words,
            memory_limit_words: None,
        }
    }

    /// Caps the total word capacity this allocator may hold across all regions. `create_clause`
    /// returns `None` once growing would exceed the limit.
    pub fn set_memory_limit_words(&mut self, limit: Option<usize>) {
        self.memory_limit_words = limit;
    }

    fn total_words(&self) -> usize {
        self.active.iter().map(Region::capacity_words).sum::<usize>()
            + self.spare.iter().map(Region::capacity_words).sum::<usize>()
    }

    /// Allocates a new clause. Returns `None` on resource exhaustion.
    pub fn create_clause(&mut self, lits: &[Lit], redundant: bool) -> Option<ClauseRef> {
        loop {
            if let Some(offset) = self
                .active
                .last_mut()
                .and_then(|region| region.allocate(lits, redundant))
            {
                return Some(ClauseRef {
                    region: (self.active.len() - 1) as u32,
                    offset,
                });
            }

            if let Some(region) = self.spare.pop() {
                self.active.push(region);
                continue;
            }

            if let Some(limit) = self.memory_limit_words {
                if self.total_words() + self.region_words > limit {
                    return None;
                }
            }

            self.active.push(Region::with_capacity(self.region_words));
        }
    }

    pub fn clause(&self, cref: ClauseRef) -> ClauseView<'_> {
        self.active[cref.region as usize].clause(cref.offset)
    }

    pub fn clause_mut(&mut self, cref: ClauseRef) -> ClauseViewMut<'_> {
        self.active[cref.region as usize].clause_mut(cref.offset)
    }

    /// Visits every stored clause (including ones scheduled for deletion) in an unspecified but
    /// stable order.
    pub fn for_each_clause(&self, mut visit: impl FnMut(ClauseRef, ClauseView<'_>)) {
        for (region_idx, region) in self.active.iter().enumerate() {
            for offset in region.offsets() {
                visit(
                    ClauseRef {
                        region: region_idx as u32,
                        offset,
                    },
                    region.clause(offset),
                );
            }
        }
    }

    /// Total words reachable in a single pass, used to decide when opportunistic compaction is
    /// worthwhile.
    pub fn buffer_words(&self) -> usize {
        self.active.iter().map(Region::len_words).sum()
    }

    /// Copies every surviving (not `SCHEDULED_FOR_DELETION`) clause into a compacted set of
    /// regions, following the multi-region compaction algorithm: pop a spare region `S`, walk the
    /// active regions in order copying survivors into `S`, and whenever `S` runs out of room swap
    /// it with the active region at the current `swap_in_idx` (a region already fully read, so it
    /// is safe to overwrite) and advance `swap_in_idx` before retrying.
    ///
    /// Every active region's surviving clauses are snapshotted (offsets, literals, redundancy, and
    /// LBD) before any copying for that region begins. This sidesteps a subtle hazard in the
    /// pointer-chasing version of the algorithm: `swap_in_idx` can reach the index of the region
    /// currently being read (when earlier regions contained little or no garbage), and without the
    /// snapshot a swap at that moment would alias the very region whose remaining clauses are still
    /// being walked.
    ///
    /// Returns the `(old, new)` `ClauseRef` mapping for every surviving clause; callers must rebuild
    /// every structure that caches a `ClauseRef` (watch lists, lemma index) from this mapping.
    pub fn compress(&mut self) -> Vec<(ClauseRef, ClauseRef)> {
        let mut mapping = Vec::new();
        let mut spare = self
            .spare
            .pop()
            .unwrap_or_else(|| Region::with_capacity(self.region_words));
        let mut swap_in_idx = 0usize;

        let active_len = self.active.len();
        for r in 0..active_len {
            let survivors: Vec<(ClauseOffset, Vec<Lit>, bool, usize)> = {
                let region = &self.active[r];
                region
                    .offsets()
                    .filter_map(|offset| {
                        let view = region.clause(offset);
                        if view.is_scheduled_for_deletion() {
                            None
                        } else {
                            Some((offset, view.to_vec(), view.is_redundant(), view.lbd()))
                        }
                    })
                    .collect()
            };

            for (offset, lits, redundant, lbd) in survivors {
                loop {
                    if let Some(new_offset) = spare.allocate(&lits, redundant) {
                        spare.clause_mut(new_offset).set_lbd(lbd);
                        mapping.push((
                            ClauseRef {
                                region: r as u32,
                                offset,
                            },
                            ClauseRef {
                                region: swap_in_idx as u32,
                                offset: new_offset,
                            },
                        ));
                        break;
                    } else {
                        debug_assert!(swap_in_idx < self.active.len());
                        std::mem::swap(&mut spare, &mut self.active[swap_in_idx]);
                        swap_in_idx += 1;
                    }
                }
            }
        }

        debug_assert!(swap_in_idx < self.active.len());
        std::mem::swap(&mut spare, &mut self.active[swap_in_idx]);
        spare.clear();
        self.spare.push(spare);
        swap_in_idx += 1;

        while self.active.len() > swap_in_idx {
            let mut region = self.active.pop().expect("active.len() > swap_in_idx");
            region.clear();
            self.spare.push(region);
        }

        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsat_formula::lit;
    use std::collections::HashMap;

    fn header_words() -> usize {
        5
    }

    #[test]
    fn compress_preserves_survivors_and_drops_deleted() {
        // Small regions so the test drives multiple active regions and several swap events.
        let mut alloc = ClauseAlloc::with_region_words(header_words() + 3 + 1);

        let mut refs = vec![];
        for i in 0..6u32 {
            let lits = [lit!(i as isize + 1), lit!(-(i as isize + 2)), lit!(i as isize + 3)];
            refs.push(alloc.create_clause(&lits, false).unwrap());
        }

        // Delete every other clause.
        for (i, &cref) in refs.iter().enumerate() {
            if i % 2 == 0 {
                alloc.clause_mut(cref).set_flag(SCHEDULED_FOR_DELETION, true);
            }
        }

        let expected: HashMap<ClauseRef, Vec<Lit>> = refs
            .iter()
            .enumerate()
            .filter(|(i, _)| i % 2 == 1)
            .map(|(_, &cref)| (cref, alloc.clause(cref).to_vec()))
            .collect();

        let mapping = alloc.compress();
        assert_eq!(mapping.len(), expected.len());

        for (old, new) in &mapping {
            let expected_lits = &expected[old];
            assert_eq!(&alloc.clause(*new).to_vec(), expected_lits);
        }

        let mut remaining = 0;
        alloc.for_each_clause(|_, _| remaining += 1);
        assert_eq!(remaining, expected.len());
    }
}
