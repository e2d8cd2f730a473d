use crate::rating::RatingSnapshot;

/// Render the poll message content for the current snapshot.
pub fn poll_message(item_name: &str, snapshot: &RatingSnapshot) -> String {
    if snapshot.vote_count == 0 {
        format!("📊 **React to rate: {}**\n\nNo ratings yet.", item_name)
    } else {
        format!(
            "📊 **React to rate: {}**\n\n**Average Rating:** {:.2} / 5.00 ({})\n**Total Votes:** {}",
            item_name, snapshot.average, snapshot.stars, snapshot.vote_count,
        )
    }
}
