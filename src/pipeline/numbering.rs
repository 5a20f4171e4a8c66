//! Channel number assignment.
//!
//! Two passes over the final, already sorted sequence: reserve every valid
//! pre-existing number, then walk in order handing out numbers. Entries with
//! a usable `tvg-chno` keep it; everything else receives the smallest unused
//! number at or above the fresh floor. Position in the sequence is the only
//! tie-break, so the same sequence always produces the same assignment.
//!
//! If two surviving entries claim the same pre-existing number (dedup only
//! collapses URL/id duplicates, so this can happen), the first claimant
//! keeps it and later ones are treated as having no number. Output numbers
//! are always collision-free.

use std::collections::HashSet;
use tracing::debug;

use crate::models::PlaylistEntry;

/// Fresh assignments start here; numbers below are only ever pre-existing.
pub const FIRST_FRESH_NUMBER: u32 = 101;

/// Assign a final channel number to every entry, in sequence order.
///
/// Returned vector is parallel to `entries`. Recompute this whenever the
/// sequence changes; assignments are never carried over from input.
pub fn assign_channel_numbers(entries: &[PlaylistEntry]) -> Vec<u32> {
    // Pass 1: reserve all usable pre-existing numbers so fresh assignments
    // can never land on one, even before its owner is reached.
    let reserved: HashSet<u32> = entries
        .iter()
        .filter_map(|e| e.valid_channel_number())
        .collect();

    // Pass 2: hand out numbers in order.
    let mut issued: HashSet<u32> = HashSet::new();
    let mut assignments = Vec::with_capacity(entries.len());
    let mut next_fresh = FIRST_FRESH_NUMBER;
    let mut kept = 0usize;
    let mut fresh = 0usize;

    for entry in entries {
        let number = match entry.valid_channel_number() {
            Some(existing) if !issued.contains(&existing) => {
                kept += 1;
                existing
            }
            _ => {
                while reserved.contains(&next_fresh) || issued.contains(&next_fresh) {
                    next_fresh += 1;
                }
                fresh += 1;
                next_fresh
            }
        };
        issued.insert(number);
        assignments.push(number);
    }

    debug!(
        "Channel numbers assigned: {} kept pre-existing, {} fresh",
        kept, fresh
    );
    assignments
}
