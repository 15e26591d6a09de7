use serde::Serialize;
use std::collections::HashMap;

use crate::ledger::DonationRecord;

/// Derived, never stored: recomputed from the full ledger on every read.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub total_points: u64,
}

/// Sums points per user and returns the `n` highest totals, descending.
/// Ties keep first-encountered order, so the ranking is stable across reads
/// of the same ledger.
pub fn top_n(records: &[DonationRecord], n: usize) -> Vec<LeaderboardEntry> {
    let mut totals: Vec<LeaderboardEntry> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match index.get(record.user_id.as_str()) {
            Some(&i) => totals[i].total_points += u64::from(record.points_earned),
            None => {
                index.insert(record.user_id.as_str(), totals.len());
                totals.push(LeaderboardEntry {
                    user_id: record.user_id.clone(),
                    total_points: u64::from(record.points_earned),
                });
            }
        }
    }

    totals.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    totals.truncate(n);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{DonationRecord, DonationType};
    use chrono::Utc;

    fn record(user_id: &str, points: u32) -> DonationRecord {
        DonationRecord {
            user_id: user_id.to_string(),
            timestamp: Utc::now(),
            food_items: vec!["rice".to_string()],
            donation_type: DonationType::DropOff,
            points_earned: points,
        }
    }

    #[test]
    fn empty_ledger_yields_empty_leaderboard() {
        assert!(top_n(&[], 5).is_empty());
    }

    #[test]
    fn single_user_yields_one_entry_with_their_total() {
        let records = vec![record("only", 30), record("only", 10)];
        let board = top_n(&records, 5);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].user_id, "only");
        assert_eq!(board[0].total_points, 40);
    }

    #[test]
    fn totals_are_summed_per_user_and_ranked_descending() {
        let records = vec![
            record("a", 10),
            record("b", 50),
            record("a", 30),
            record("c", 20),
        ];
        let board = top_n(&records, 5);
        assert_eq!(board[0].user_id, "b");
        assert_eq!(board[1].user_id, "a");
        assert_eq!(board[1].total_points, 40);
        assert_eq!(board[2].user_id, "c");
    }

    #[test]
    fn ties_keep_first_encountered_order() {
        let records = vec![record("late", 20), record("early", 20)];
        let board = top_n(&records, 5);
        assert_eq!(board[0].user_id, "late");
        assert_eq!(board[1].user_id, "early");
    }

    #[test]
    fn truncates_to_n() {
        let records: Vec<_> = (0..10).map(|i| record(&format!("u{i}"), 10)).collect();
        assert_eq!(top_n(&records, 5).len(), 5);
        assert_eq!(top_n(&records, 0).len(), 0);
    }
}
