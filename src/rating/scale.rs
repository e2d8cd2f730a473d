//! The fixed five-emoji rating scale.
//!
//! Reactions carrying any other emoji are not ratings and must be
//! filtered out before they reach a poll's ledger.

/// Rating emojis in scale order; position + 1 is the rating value.
pub const RATING_EMOJIS: [&str; 5] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣", "5️⃣"];

/// Map a reaction emoji to its rating, or `None` for anything that is
/// not one of the five scale emojis.
pub fn rating_for(emoji: &str) -> Option<i32> {
    RATING_EMOJIS
        .iter()
        .position(|e| *e == emoji)
        .map(|pos| pos as i32 + 1)
}

pub fn emoji_for(rating: i32) -> Option<&'static str> {
    if (1..=5).contains(&rating) {
        Some(RATING_EMOJIS[(rating - 1) as usize])
    } else {
        None
    }
}
