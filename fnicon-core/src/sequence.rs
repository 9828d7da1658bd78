//! Sequence-number allocation for catalog records.
//!
//! Identifiers stay dense: a deleted record leaves a gap that the next
//! insertion fills before the catalog grows past its maximum.

use crate::models::CatalogRecord;

/// Returns the sequence number for a record added to `records`.
pub fn next_sequence(records: &[CatalogRecord]) -> u32 {
    next_sequence_from(records.iter().map(|r| r.sequence_number))
}

/// Returns the smallest positive integer not contained in `taken`.
///
/// Zero is ignored, so an empty or all-zero input yields 1.
pub fn next_sequence_from(taken: impl IntoIterator<Item = u32>) -> u32 {
    let mut used: Vec<u32> = taken.into_iter().filter(|&n| n > 0).collect();
    if used.is_empty() {
        return 1;
    }
    used.sort_unstable();
    used.dedup();

    let mut candidate = 1;
    for n in used {
        if n != candidate {
            break;
        }
        candidate += 1;
    }
    candidate
}
