pub mod aggregate;
pub mod leaderboard;

use thiserror::Error;

pub use aggregate::{fold_rating, validate_submission};
pub use leaderboard::{RankBy, RankedEntry, DEFAULT_LEADERBOARD_SIZE};

/// Reasons a rating or ranking request is refused. Nothing is applied when
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("no subject with id '{subject_id}'")]
    UnknownSubject { subject_id: String },

    #[error("rating for '{subject_id}' is missing category '{category}'")]
    IncompleteSubmission { subject_id: String, category: String },

    #[error("score {value} for '{category}' is outside 0..=10")]
    OutOfRangeValue { category: String, value: i32 },

    #[error("'{category}' is not a recognized category")]
    UnknownCategory { category: String },

    #[error("invalid category name '{name}' (must be a letter followed by letters, digits or '_', unreserved and unique)")]
    InvalidCategorySet { name: String },

    #[error("'{subject_id}' cannot take more ratings")]
    RatingCountExhausted { subject_id: String },

    #[error("still confirming the last rating, try again in a moment")]
    AwaitingConfirmation,
}

/// Label shown next to a raw slider value.
pub fn rating_label(value: i32) -> &'static str {
    match value {
        v if v <= 2 => "Poor",
        v if v <= 4 => "Below Average",
        v if v <= 6 => "Average",
        v if v <= 8 => "Good",
        _ => "Excellent",
    }
}
