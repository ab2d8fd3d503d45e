//! Fingerprint-based duplicate gate in front of the store.

use std::collections::HashSet;

use ledgerlens_core::RawTransaction;

#[derive(Debug, Clone, PartialEq)]
pub struct DedupOutcome {
    /// Admitted candidates, in input order
    pub to_upload: Vec<RawTransaction>,
    pub skipped: usize,
}

/// Drop candidates whose fingerprint is already in `existing` or was admitted
/// earlier in this pass.
pub fn dedupe(candidates: &[RawTransaction], existing: &[RawTransaction]) -> DedupOutcome {
    let mut seen: HashSet<String> = existing.iter().map(RawTransaction::fingerprint).collect();
    let mut to_upload = Vec::with_capacity(candidates.len());
    let mut skipped = 0;

    for candidate in candidates {
        if seen.insert(candidate.fingerprint()) {
            to_upload.push(candidate.clone());
        } else {
            skipped += 1;
        }
    }

    DedupOutcome { to_upload, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerlens_core::Category;

    fn tx(day: u32, desc: &str, amount: f64) -> RawTransaction {
        RawTransaction::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            desc,
            amount,
            Category::Others,
        )
    }

    #[test]
    fn test_skips_existing_and_in_batch_repeats() {
        let existing = vec![tx(1, "Zomato", -500.0)];
        let candidates = vec![
            tx(1, "ZOMATO", -500.0),
            tx(2, "Uber", -120.0),
            tx(2, "Uber", -120.0),
            tx(2, "Uber", -121.0),
        ];
        let out = dedupe(&candidates, &existing);
        assert_eq!(out.skipped, 2);
        assert_eq!(out.to_upload, vec![tx(2, "Uber", -120.0), tx(2, "Uber", -121.0)]);
    }

    #[test]
    fn test_dedupe_is_idempotent() {
        let existing = vec![tx(1, "Rent", -15000.0)];
        let candidates = vec![tx(1, "Rent", -15000.0), tx(3, "Salary", 50000.0), tx(4, "Coffee", -90.0)];

        let first = dedupe(&candidates, &existing);
        let second = dedupe(&candidates, &existing);
        assert_eq!(first, second);

        let mut known = existing.clone();
        known.extend(first.to_upload.iter().cloned());
        let third = dedupe(&candidates, &known);
        assert!(third.to_upload.is_empty());
        assert_eq!(third.skipped, candidates.len());
    }

    #[test]
    fn test_preserves_order() {
        let candidates: Vec<_> = (1..=9).rev().map(|d| tx(d, "Tea", -10.0)).collect();
        let out = dedupe(&candidates, &[]);
        assert_eq!(out.to_upload, candidates);
    }
}
