use crate::models::VoteLedger;
use crate::rating::RatingSnapshot;

/// Compute the live aggregate for a ledger. Nothing is cached; callers
/// recompute after every mutation.
pub fn compute_snapshot(ledger: &VoteLedger) -> RatingSnapshot {
    let vote_count = ledger.vote_count();
    let average = if vote_count == 0 {
        0.0
    } else {
        ledger.ratings().map(f64::from).sum::<f64>() / vote_count as f64
    };

    RatingSnapshot {
        average,
        vote_count,
        stars: star_bar(average),
    }
}

/// Five-symbol bar tracking the average with quarter-star granularity.
/// Position i (1..=5) shows a full star at average >= i - 0.25 and a
/// glowing half star at average >= i - 0.75.
fn star_bar(average: f64) -> String {
    let mut bar = String::new();
    for i in 1..=5 {
        if average >= i as f64 - 0.25 {
            bar.push_str("⭐");
        } else if average >= i as f64 - 0.75 {
            bar.push_str("🌟");
        } else {
            bar.push_str("⚫");
        }
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_of(votes: &[(&str, i32)]) -> VoteLedger {
        let mut ledger = VoteLedger::new();
        for (voter, rating) in votes {
            ledger.cast(voter.to_string(), *rating);
        }
        ledger
    }

    #[test]
    fn empty_ledger_has_zero_average() {
        let snapshot = compute_snapshot(&VoteLedger::new());
        assert_eq!(snapshot.average, 0.0);
        assert_eq!(snapshot.vote_count, 0);
        assert_eq!(snapshot.stars, "⚫⚫⚫⚫⚫");
    }

    #[test]
    fn average_is_the_plain_mean() {
        let snapshot = compute_snapshot(&ledger_of(&[("a", 5), ("b", 1)]));
        assert_eq!(snapshot.average, 3.0);
        assert_eq!(snapshot.vote_count, 2);
    }

    #[test]
    fn fifth_star_fills_at_4_75() {
        // 4.80 clears the 4.75 threshold for position 5; 4.70 only
        // clears the 4.25 half-star threshold.
        assert_eq!(star_bar(4.80), "⭐⭐⭐⭐⭐");
        assert_eq!(star_bar(4.70), "⭐⭐⭐⭐🌟");
    }

    #[test]
    fn bar_tracks_the_average_across_positions() {
        assert_eq!(star_bar(3.0), "⭐⭐⭐⚫⚫");
        assert_eq!(star_bar(3.3), "⭐⭐⭐🌟⚫");
        assert_eq!(star_bar(3.8), "⭐⭐⭐⭐⚫");
        assert_eq!(star_bar(1.0), "⭐⚫⚫⚫⚫");
        assert_eq!(star_bar(0.3), "🌟⚫⚫⚫⚫");
    }
}
