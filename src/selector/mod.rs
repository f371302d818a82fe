pub mod cyclic;
pub mod rotation;

use crate::models::Subject;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub use cyclic::CyclicRotation;
pub use rotation::{ResolvedRotation, RotationState};

/// How the next subject is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Walk the store skipping resolved subjects, then start a new pass.
    Rotation,
    /// Step through the store forever, one subject per rating.
    Cyclic,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotation" | "skip-aware" => Ok(SelectionPolicy::Rotation),
            "cyclic" | "fixed" => Ok(SelectionPolicy::Cyclic),
            other => Err(format!("unknown selection policy '{}'", other)),
        }
    }
}

/// The active selector, one per session.
#[derive(Debug, Clone)]
pub enum Selector {
    Rotation(ResolvedRotation),
    Cyclic(CyclicRotation),
}

impl Selector {
    pub fn new(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::Rotation => Selector::Rotation(ResolvedRotation::new()),
            SelectionPolicy::Cyclic => Selector::Cyclic(CyclicRotation::new()),
        }
    }

    pub fn policy(&self) -> SelectionPolicy {
        match self {
            Selector::Rotation(_) => SelectionPolicy::Rotation,
            Selector::Cyclic(_) => SelectionPolicy::Cyclic,
        }
    }

    /// Subject to present now. Only `None` when the store is empty.
    pub fn current<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        match self {
            Selector::Rotation(rotation) => rotation.next(subjects),
            Selector::Cyclic(cyclic) => cyclic.current(subjects),
        }
    }

    pub fn reset(&mut self) {
        match self {
            Selector::Rotation(rotation) => rotation.reset(),
            Selector::Cyclic(cyclic) => cyclic.reset(),
        }
    }
}
