use crate::models::{CategorySet, ScoreBoardEntry, Subject, TOTAL_CATEGORY};
use crate::scoring::RatingError;
use std::cmp::Ordering;

pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// Which score a leaderboard is ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RankBy {
    Total,
    Category(String),
}

impl RankBy {
    /// Accepts `total`/`overall` in any case, or a recognized category name
    /// spelled exactly as configured (the same rule submissions follow).
    pub fn parse(name: &str, categories: &CategorySet) -> Result<Self, RatingError> {
        let name = name.trim();
        if name.eq_ignore_ascii_case(TOTAL_CATEGORY) || name.eq_ignore_ascii_case("overall") {
            return Ok(RankBy::Total);
        }
        if categories.contains(name) {
            Ok(RankBy::Category(name.to_string()))
        } else {
            Err(RatingError::UnknownCategory {
                category: name.to_string(),
            })
        }
    }

    pub fn label(&self) -> &str {
        match self {
            RankBy::Total => TOTAL_CATEGORY,
            RankBy::Category(name) => name,
        }
    }

    fn score_of(&self, entry: &ScoreBoardEntry) -> f64 {
        match self {
            RankBy::Total => entry.total_score,
            RankBy::Category(name) => entry.score(name).unwrap_or(0.0),
        }
    }
}

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: usize,
    pub subject_id: String,
    pub display_name: String,
    pub thumbnail: Option<String>,
    pub score: f64,
    pub ratings_count: u32,
}

/// Orders `entries` by descending score and keeps the first `limit`.
///
/// The sort is stable, so entries with equal scores stay in the order they
/// appear in `entries`.
pub fn rank_entries(
    subjects: &[Subject],
    entries: &[ScoreBoardEntry],
    by: &RankBy,
    limit: usize,
) -> Vec<RankedEntry> {
    let mut sorted: Vec<(&ScoreBoardEntry, f64)> =
        entries.iter().map(|entry| (entry, by.score_of(entry))).collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (entry, score))| {
            let subject = subjects.iter().find(|s| s.id == entry.subject_id);
            RankedEntry {
                rank: index + 1,
                subject_id: entry.subject_id.clone(),
                display_name: subject
                    .map(|s| s.display_name.clone())
                    .unwrap_or_else(|| "Unknown Subject".to_string()),
                thumbnail: subject.and_then(|s| s.images.first().cloned()),
                score,
                ratings_count: entry.ratings_count,
            }
        })
        .collect()
}

/// Plain-text leaderboard, one line per row.
pub fn format_board(rows: &[RankedEntry], by: &RankBy) -> String {
    if rows.is_empty() {
        return "Nobody has been rated yet.".to_string();
    }

    let mut summary = format!("Leaderboard ({})\n", by.label());
    for row in rows {
        let medal = match row.rank {
            1 => "[gold]  ",
            2 => "[silver]",
            3 => "[bronze]",
            _ => "        ",
        };
        summary.push_str(&format!(
            "{} #{:<2} {:<24} {:>4.1}/10.0  ({} rating{})\n",
            medal,
            row.rank,
            row.display_name,
            row.score,
            row.ratings_count,
            if row.ratings_count == 1 { "" } else { "s" }
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn subject(id: &str, name: &str) -> Subject {
        Subject::new(Some(id.to_string()), name.to_string(), vec![format!("{id}.jpg")])
    }

    fn entry_with_total(id: &str, total: f64) -> ScoreBoardEntry {
        let mut entry = ScoreBoardEntry::from_scores(id.to_string(), BTreeMap::new(), 1);
        entry.total_score = total;
        entry
    }

    #[test]
    fn ranks_by_descending_total() {
        let subjects = vec![subject("1", "Alex"), subject("2", "Sam"), subject("3", "Riley")];
        let entries = vec![
            entry_with_total("1", 7.5),
            entry_with_total("2", 8.1),
            entry_with_total("3", 7.9),
        ];

        let rows = rank_entries(&subjects, &entries, &RankBy::Total, DEFAULT_LEADERBOARD_SIZE);
        let ids: Vec<&str> = rows.iter().map(|r| r.subject_id.as_str()).collect();
        assert_eq!(ids, ["2", "3", "1"]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].display_name, "Sam");
        assert_eq!(rows[0].thumbnail.as_deref(), Some("2.jpg"));
    }

    #[test]
    fn ties_keep_store_order() {
        let entries = vec![
            entry_with_total("a", 5.0),
            entry_with_total("b", 6.0),
            entry_with_total("c", 5.0),
            entry_with_total("d", 5.0),
        ];
        let rows = rank_entries(&[], &entries, &RankBy::Total, 10);
        let ids: Vec<&str> = rows.iter().map(|r| r.subject_id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c", "d"]);
        assert_eq!(rows[1].display_name, "Unknown Subject");
    }

    #[test]
    fn truncates_to_limit() {
        let entries: Vec<ScoreBoardEntry> = (0..15)
            .map(|i| entry_with_total(&i.to_string(), i as f64 / 2.0))
            .collect();
        let rows = rank_entries(&[], &entries, &RankBy::Total, DEFAULT_LEADERBOARD_SIZE);
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].subject_id, "14");
        assert_eq!(rows[9].subject_id, "5");
    }

    #[test]
    fn ranks_by_single_category() {
        let categories = CategorySet::compact();
        let mut high = ScoreBoardEntry::new("high".to_string(), &categories);
        high.category_scores.insert("humour".to_string(), 9.0);
        let low = ScoreBoardEntry::new("low".to_string(), &categories);

        let by = RankBy::parse("humour", &categories).expect("known category");
        let rows = rank_entries(&[], &[low, high], &by, 10);
        assert_eq!(rows[0].subject_id, "high");
        assert_eq!(rows[0].score, 9.0);
    }

    #[test]
    fn parse_accepts_total_aliases_and_rejects_unknown() {
        let categories = CategorySet::classic();
        assert_eq!(RankBy::parse("overall", &categories), Ok(RankBy::Total));
        assert_eq!(RankBy::parse("TOTAL", &categories), Ok(RankBy::Total));
        assert_eq!(
            RankBy::parse("charm", &categories),
            Err(RatingError::UnknownCategory { category: "charm".to_string() })
        );
    }

    #[test]
    fn category_lookup_is_as_strict_as_submissions() {
        let categories = CategorySet::classic();
        assert_eq!(
            RankBy::parse("girlfriendMaterial", &categories),
            Ok(RankBy::Category("girlfriendMaterial".to_string()))
        );
        assert_eq!(
            RankBy::parse("Humour", &categories),
            Err(RatingError::UnknownCategory { category: "Humour".to_string() })
        );
    }

    #[test]
    fn board_pluralises_rating_counts() {
        let rows = vec![
            RankedEntry {
                rank: 1,
                subject_id: "1".to_string(),
                display_name: "Alex".to_string(),
                thumbnail: None,
                score: 7.55,
                ratings_count: 1,
            },
            RankedEntry {
                rank: 2,
                subject_id: "2".to_string(),
                display_name: "Sam".to_string(),
                thumbnail: None,
                score: 7.0,
                ratings_count: 12,
            },
        ];
        let text = format_board(&rows, &RankBy::Total);
        assert!(text.contains("(1 rating)"));
        assert!(text.contains("(12 ratings)"));
        assert!(text.contains("/10.0"));
    }
}
