//! Start-up data: the ordered subject list and the matching scoreboard
//! entries. Loaded once; nothing is written back.

use crate::models::{CategorySet, ScoreBoardEntry, Subject, MAX_SCORE, MIN_SCORE};
use log::{info, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("subject id '{id}' appears more than once")]
    DuplicateId { id: String },
    #[error("subject '{id}' has an empty name")]
    EmptyName { id: String },
    #[error("subject '{id}' has no images")]
    NoImages { id: String },
    #[error("subject '{id}' has {ratings_count} ratings but no score for '{category}'")]
    IncompleteScores {
        id: String,
        category: String,
        ratings_count: u32,
    },
    #[error("subject '{id}' has score {value} for '{category}', outside 0..=10")]
    ScoreOutOfRange {
        id: String,
        category: String,
        value: f64,
    },
    #[error("subject '{id}' has a score for unknown category '{category}'")]
    UnknownCategory { id: String, category: String },
}

/// One record of a seed file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub photos: Vec<String>,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    #[serde(default)]
    pub ratings_count: u32,
    #[serde(default)]
    pub total_score: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SeedData {
    subjects: Vec<Subject>,
    entries: Vec<ScoreBoardEntry>,
}

impl SeedData {
    /// Validates `records` against `categories`.
    ///
    /// A record with no ratings may omit its scores and starts at zero. Any
    /// supplied total is ignored in favour of the mean of the category scores.
    pub fn from_records(
        records: Vec<SeedRecord>,
        categories: &CategorySet,
    ) -> Result<Self, SeedError> {
        let mut seen = HashSet::new();
        let mut seed = SeedData::default();

        for record in records {
            let subject = Subject::new(record.id, record.name.trim().to_string(), record.photos);
            if !seen.insert(subject.id.clone()) {
                return Err(SeedError::DuplicateId { id: subject.id });
            }
            if subject.display_name.is_empty() {
                return Err(SeedError::EmptyName { id: subject.id });
            }
            if subject.images.is_empty() {
                return Err(SeedError::NoImages { id: subject.id });
            }

            let entry = build_entry(&subject.id, &record.scores, record.ratings_count, categories)?;
            if let Some(supplied) = record.total_score {
                if (supplied - entry.total_score).abs() > 0.05 {
                    warn!(
                        "Seed total {:.2} for '{}' disagrees with its category mean {:.2}; using the mean",
                        supplied, subject.id, entry.total_score
                    );
                }
            }

            seed.subjects.push(subject);
            seed.entries.push(entry);
        }

        Ok(seed)
    }

    pub fn from_json_str(json: &str, categories: &CategorySet) -> Result<Self, SeedError> {
        let records: Vec<SeedRecord> = serde_json::from_str(json)?;
        Self::from_records(records, categories)
    }

    pub fn load(path: &Path, categories: &CategorySet) -> Result<Self, SeedError> {
        let json = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let seed = Self::from_json_str(&json, categories)?;
        info!("Loaded {} subjects from {}", seed.subjects.len(), path.display());
        Ok(seed)
    }

    /// The three demo people. Scores for categories outside `categories` are
    /// dropped; if a configured category has no demo score the person starts
    /// unrated.
    pub fn demo(categories: &CategorySet) -> Self {
        let people = [
            ("1", "Alex Johnson", &["person1.jpg", "person1-alt.jpg"][..], [8.2, 7.1, 7.3, 7.4], 15),
            ("2", "Sam Wilson", &["person2.jpg", "person2-alt.jpg"][..], [7.8, 8.5, 7.9, 8.2], 12),
            ("3", "Riley Chen", &["person3.jpg"][..], [8.8, 7.2, 7.7, 7.5], 18),
        ];

        let mut seed = SeedData::default();
        for (id, name, photos, means, count) in people {
            let known: BTreeMap<&str, f64> = crate::models::CLASSIC_CATEGORIES
                .iter()
                .copied()
                .zip(means)
                .collect();
            let scores: Option<BTreeMap<String, f64>> = categories
                .iter()
                .map(|c| known.get(c).map(|v| (c.to_string(), *v)))
                .collect();

            let entry = match scores {
                Some(scores) => ScoreBoardEntry::from_scores(id.to_string(), scores, count),
                None => ScoreBoardEntry::new(id.to_string(), categories),
            };
            seed.subjects.push(Subject::new(
                Some(id.to_string()),
                name.to_string(),
                photos.iter().map(|p| p.to_string()).collect(),
            ));
            seed.entries.push(entry);
        }
        seed
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn entries(&self) -> &[ScoreBoardEntry] {
        &self.entries
    }

    pub fn into_parts(self) -> (Vec<Subject>, Vec<ScoreBoardEntry>) {
        (self.subjects, self.entries)
    }
}

fn build_entry(
    id: &str,
    scores: &BTreeMap<String, f64>,
    ratings_count: u32,
    categories: &CategorySet,
) -> Result<ScoreBoardEntry, SeedError> {
    if let Some(category) = scores.keys().find(|c| !categories.contains(c)) {
        return Err(SeedError::UnknownCategory {
            id: id.to_string(),
            category: category.clone(),
        });
    }
    if scores.is_empty() && ratings_count == 0 {
        return Ok(ScoreBoardEntry::new(id.to_string(), categories));
    }

    let mut category_scores = BTreeMap::new();
    for category in categories.iter() {
        let value = *scores.get(category).ok_or_else(|| SeedError::IncompleteScores {
            id: id.to_string(),
            category: category.to_string(),
            ratings_count,
        })?;
        if !(MIN_SCORE as f64..=MAX_SCORE as f64).contains(&value) {
            return Err(SeedError::ScoreOutOfRange {
                id: id.to_string(),
                category: category.to_string(),
                value,
            });
        }
        category_scores.insert(category.to_string(), value);
    }

    Ok(ScoreBoardEntry::from_scores(id.to_string(), category_scores, ratings_count))
}
