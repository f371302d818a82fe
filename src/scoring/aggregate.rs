use crate::models::{mean_of, CategorySet, RatingSubmission, ScoreBoardEntry, MAX_SCORE, MIN_SCORE};
use crate::scoring::RatingError;
use chrono::Utc;
use log::debug;
use std::collections::BTreeMap;

/// Checks that `submission` carries exactly one in-range value per
/// recognized category.
pub fn validate_submission(
    subject_id: &str,
    submission: &RatingSubmission,
    categories: &CategorySet,
) -> Result<(), RatingError> {
    for category in categories.iter() {
        let value = submission
            .get(category)
            .ok_or_else(|| RatingError::IncompleteSubmission {
                subject_id: subject_id.to_string(),
                category: category.to_string(),
            })?;
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(RatingError::OutOfRangeValue {
                category: category.to_string(),
                value,
            });
        }
    }

    // Report the alphabetically first stray so errors are reproducible
    let stray = submission
        .categories()
        .filter(|c| !categories.contains(c))
        .min();
    if let Some(category) = stray {
        return Err(RatingError::UnknownCategory {
            category: category.to_string(),
        });
    }

    Ok(())
}

/// Folds one submission into the running means of `entry`.
///
/// Every category mean becomes `(mean * n + value) / (n + 1)` and the total is
/// recomputed as the unweighted mean of the new category means. The input
/// entry is never modified; on error nothing is produced.
pub fn fold_rating(
    entry: &ScoreBoardEntry,
    submission: &RatingSubmission,
    categories: &CategorySet,
) -> Result<ScoreBoardEntry, RatingError> {
    validate_submission(&entry.subject_id, submission, categories)?;

    let new_count = entry
        .ratings_count
        .checked_add(1)
        .ok_or_else(|| RatingError::RatingCountExhausted {
            subject_id: entry.subject_id.clone(),
        })?;
    let previous_count = entry.ratings_count as f64;

    let mut category_scores = BTreeMap::new();
    for category in categories.iter() {
        // Seeded entries always carry every category; a fresh one starts at zero
        let previous_mean = entry.score(category).unwrap_or(0.0);
        let value = submission.get(category).unwrap_or_default() as f64;
        let new_mean = (previous_mean * previous_count + value) / new_count as f64;
        category_scores.insert(category.to_string(), new_mean);
    }

    let total_score = mean_of(category_scores.values().copied());
    debug!(
        "Folded rating #{} into '{}': total {:.3} -> {:.3}",
        new_count, entry.subject_id, entry.total_score, total_score
    );

    Ok(ScoreBoardEntry {
        subject_id: entry.subject_id.clone(),
        category_scores,
        total_score,
        ratings_count: new_count,
        last_rated_at: Some(Utc::now()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn alex() -> ScoreBoardEntry {
        let scores = [
            ("humour", 8.2),
            ("appearance", 7.1),
            ("intelligence", 7.3),
            ("girlfriendMaterial", 7.4),
        ]
        .into_iter()
        .map(|(c, v)| (c.to_string(), v))
        .collect();
        ScoreBoardEntry::from_scores("1".to_string(), scores, 15)
    }

    #[test]
    fn perfect_rating_moves_every_mean_up() {
        let categories = CategorySet::classic();
        let updated = fold_rating(&alex(), &RatingSubmission::uniform(&categories, 10), &categories)
            .expect("complete submission");

        assert_eq!(updated.ratings_count, 16);
        let expected = [
            ("humour", (8.2 * 15.0 + 10.0) / 16.0),
            ("appearance", (7.1 * 15.0 + 10.0) / 16.0),
            ("intelligence", (7.3 * 15.0 + 10.0) / 16.0),
            ("girlfriendMaterial", (7.4 * 15.0 + 10.0) / 16.0),
        ];
        for (category, mean) in expected {
            let got = updated.score(category).expect("category present");
            assert!((got - mean).abs() < 1e-9, "{category}: {got} != {mean}");
        }
        let total = expected.iter().map(|(_, m)| m).sum::<f64>() / 4.0;
        assert!((updated.total_score - total).abs() < 1e-9);
        assert!(updated.last_rated_at.is_some());
    }

    #[test]
    fn sequential_folds_equal_the_plain_mean() {
        let categories = CategorySet::new(["humour"]).expect("valid set");
        let values = [3, 10, 0, 7, 7, 9, 1, 5, 8, 2, 6, 10, 4];
        let mut entry = ScoreBoardEntry::new("s".to_string(), &categories);
        for value in values {
            let submission = RatingSubmission::new().with("humour", value);
            entry = fold_rating(&entry, &submission, &categories).expect("valid value");
        }

        let expected = values.iter().sum::<i32>() as f64 / values.len() as f64;
        assert_eq!(entry.ratings_count as usize, values.len());
        assert!((entry.score("humour").unwrap_or_default() - expected).abs() < 1e-9);
    }

    #[test]
    fn total_matches_category_mean_after_each_fold() {
        let categories = CategorySet::compact();
        let mut entry = ScoreBoardEntry::new("s".to_string(), &categories);
        for (h, a, i) in [(1, 9, 4), (10, 10, 2), (0, 3, 7)] {
            let submission = RatingSubmission::new()
                .with("humour", h)
                .with("appearance", a)
                .with("intelligence", i);
            entry = fold_rating(&entry, &submission, &categories).expect("valid");
            assert_eq!(entry.total_score, mean_of(entry.category_scores.values().copied()));
        }
    }

    #[test]
    fn missing_category_is_rejected() {
        let categories = CategorySet::classic();
        let submission = RatingSubmission::new()
            .with("humour", 5)
            .with("appearance", 5)
            .with("girlfriendMaterial", 5);

        let err = fold_rating(&alex(), &submission, &categories).unwrap_err();
        assert_eq!(
            err,
            RatingError::IncompleteSubmission {
                subject_id: "1".to_string(),
                category: "intelligence".to_string(),
            }
        );
    }

    #[rstest]
    #[case(-1)]
    #[case(11)]
    fn out_of_range_values_are_rejected(#[case] value: i32) {
        let categories = CategorySet::classic();
        let submission = RatingSubmission::uniform(&categories, 5).with("appearance", value);
        let err = fold_rating(&alex(), &submission, &categories).unwrap_err();
        assert_eq!(
            err,
            RatingError::OutOfRangeValue {
                category: "appearance".to_string(),
                value,
            }
        );
    }

    #[test]
    fn unrecognized_category_is_rejected() {
        let categories = CategorySet::compact();
        let submission = RatingSubmission::uniform(&categories, 5).with("charm", 4);
        assert_eq!(
            validate_submission("x", &submission, &categories),
            Err(RatingError::UnknownCategory { category: "charm".to_string() })
        );
    }

    #[test]
    fn saturated_count_is_refused_instead_of_wrapping() {
        let categories = CategorySet::compact();
        let mut entry = ScoreBoardEntry::new("full".to_string(), &categories);
        entry.ratings_count = u32::MAX;

        let err = fold_rating(&entry, &RatingSubmission::uniform(&categories, 10), &categories)
            .unwrap_err();
        assert_eq!(
            err,
            RatingError::RatingCountExhausted { subject_id: "full".to_string() }
        );
    }

    #[rstest]
    #[case(0)]
    #[case(10)]
    fn bounds_are_inclusive(#[case] value: i32) {
        let categories = CategorySet::compact();
        let submission = RatingSubmission::uniform(&categories, value);
        assert!(validate_submission("x", &submission, &categories).is_ok());
    }
}
