use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::scoring::RatingError;

pub const MIN_SCORE: i32 = 0;
pub const MAX_SCORE: i32 = 10;

/// Shape of a category name, shared with the `rate` command grammar.
pub const CATEGORY_NAME_PATTERN: &str = "[A-Za-z][A-Za-z0-9_]*";

lazy_static! {
    static ref CATEGORY_NAME: Regex = Regex::new(&format!("^{}$", CATEGORY_NAME_PATTERN)).unwrap();
}

/// A person on the rating card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    pub display_name: String,
    pub images: Vec<String>,
}

impl Subject {
    pub fn new(id: Option<String>, display_name: String, images: Vec<String>) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            display_name,
            images,
        }
    }
}

/// Running aggregate for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBoardEntry {
    pub subject_id: String,
    pub category_scores: BTreeMap<String, f64>,
    pub total_score: f64,
    pub ratings_count: u32,
    pub last_rated_at: Option<DateTime<Utc>>,
}

impl ScoreBoardEntry {
    /// Fresh entry with every category at zero and no ratings.
    pub fn new(subject_id: String, categories: &CategorySet) -> Self {
        let category_scores = categories.iter().map(|c| (c.to_string(), 0.0)).collect();
        Self::from_scores(subject_id, category_scores, 0)
    }

    /// Builds an entry whose total is derived from `category_scores`.
    pub fn from_scores(
        subject_id: String,
        category_scores: BTreeMap<String, f64>,
        ratings_count: u32,
    ) -> Self {
        let total_score = mean_of(category_scores.values().copied());
        Self {
            subject_id,
            category_scores,
            total_score,
            ratings_count,
            last_rated_at: None,
        }
    }

    pub fn score(&self, category: &str) -> Option<f64> {
        self.category_scores.get(category).copied()
    }
}

/// Unweighted mean, zero for an empty input.
pub fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// One user's raw scores for one subject. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RatingSubmission {
    scores: HashMap<String, i32>,
}

impl RatingSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, category: &str, value: i32) -> Self {
        self.scores.insert(category.to_string(), value);
        self
    }

    pub fn get(&self, category: &str) -> Option<i32> {
        self.scores.get(category).copied()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.scores.keys().map(String::as_str)
    }

    /// Same value for every category in `categories`.
    pub fn uniform(categories: &CategorySet, value: i32) -> Self {
        categories
            .iter()
            .fold(Self::new(), |submission, c| submission.with(c, value))
    }
}

pub const CLASSIC_CATEGORIES: [&str; 4] = ["humour", "appearance", "intelligence", "girlfriendMaterial"];
pub const COMPACT_CATEGORIES: [&str; 3] = ["humour", "appearance", "intelligence"];

/// Ordered, closed set of recognized categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn new<I, S>(names: I) -> Result<Self, RatingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut collected: Vec<String> = Vec::new();
        for name in names {
            let name: String = name.into();
            let name = name.trim().to_string();
            let reserved = name.eq_ignore_ascii_case(TOTAL_CATEGORY) || name.eq_ignore_ascii_case("overall");
            // Names differing only in case would be indistinguishable to a reader
            let duplicate = collected.iter().any(|c| c.eq_ignore_ascii_case(&name));
            if !CATEGORY_NAME.is_match(&name) || reserved || duplicate {
                return Err(RatingError::InvalidCategorySet { name });
            }
            collected.push(name);
        }
        if collected.is_empty() {
            return Err(RatingError::InvalidCategorySet { name: String::new() });
        }
        Ok(Self { names: collected })
    }

    pub fn classic() -> Self {
        Self {
            names: CLASSIC_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn compact() -> Self {
        Self {
            names: COMPACT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.names.iter().any(|c| c == category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Name of the synthetic leaderboard category.
pub const TOTAL_CATEGORY: &str = "total";
