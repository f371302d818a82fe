use crate::models::Subject;
use log::info;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// Some subjects are still unresolved in this pass.
    Active { resolved: usize },
    /// Every subject has been rated or skipped.
    AllResolved,
}

/// Skip-aware rotation: hands out subjects in store order, skipping any that
/// were already rated or skipped during the current pass.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRotation {
    resolved: HashSet<String>,
}

impl ResolvedRotation {
    pub fn new() -> Self {
        Self::default()
    }

    /// First unresolved subject. When everyone is resolved the pass restarts
    /// and the first subject in the store comes back.
    pub fn next<'a>(&mut self, subjects: &'a [Subject]) -> Option<&'a Subject> {
        if let Some(subject) = subjects.iter().find(|s| !self.resolved.contains(&s.id)) {
            return Some(subject);
        }
        if !self.resolved.is_empty() {
            info!("All {} subjects resolved, starting a new pass", subjects.len());
            self.resolved.clear();
        }
        subjects.first()
    }

    /// Returns false when `id` was already resolved.
    pub fn mark_resolved(&mut self, id: &str) -> bool {
        self.resolved.insert(id.to_string())
    }

    pub fn is_resolved(&self, id: &str) -> bool {
        self.resolved.contains(id)
    }

    pub fn resolved_count(&self) -> usize {
        self.resolved.len()
    }

    pub fn state(&self, total: usize) -> RotationState {
        if total > 0 && self.resolved.len() >= total {
            RotationState::AllResolved
        } else {
            RotationState::Active {
                resolved: self.resolved.len(),
            }
        }
    }

    pub fn reset(&mut self) {
        self.resolved.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects() -> Vec<Subject> {
        ["1", "2", "3"]
            .iter()
            .map(|id| Subject::new(Some(id.to_string()), format!("Person {id}"), vec![]))
            .collect()
    }

    #[test]
    fn never_repeats_while_unresolved_remain() {
        let subjects = subjects();
        let mut rotation = ResolvedRotation::new();
        let first = rotation.next(&subjects).map(|s| s.id.clone());
        assert_eq!(first.as_deref(), Some("1"));

        let mut seen = Vec::new();
        for _ in 0..3 {
            let current = rotation.next(&subjects).map(|s| s.id.clone()).unwrap_or_default();
            assert!(!rotation.is_resolved(&current));
            seen.push(current.clone());
            rotation.mark_resolved(&current);
        }
        assert_eq!(seen, ["1", "2", "3"]);
        assert_eq!(rotation.state(subjects.len()), RotationState::AllResolved);

        assert_eq!(rotation.next(&subjects).map(|s| s.id.clone()), first);
        assert_eq!(rotation.state(subjects.len()), RotationState::Active { resolved: 0 });
    }

    #[test]
    fn resolving_out_of_order_skips_that_subject() {
        let subjects = subjects();
        let mut rotation = ResolvedRotation::new();
        rotation.mark_resolved("1");
        rotation.mark_resolved("3");
        assert_eq!(rotation.next(&subjects).map(|s| s.id.as_str()), Some("2"));
    }

    #[test]
    fn mark_resolved_is_idempotent() {
        let mut once = ResolvedRotation::new();
        once.mark_resolved("2");

        let mut twice = ResolvedRotation::new();
        assert!(twice.mark_resolved("2"));
        assert!(!twice.mark_resolved("2"));

        assert_eq!(once.resolved_count(), twice.resolved_count());
        assert_eq!(once.state(3), twice.state(3));
    }

    #[test]
    fn empty_store_yields_nothing() {
        let mut rotation = ResolvedRotation::new();
        assert!(rotation.next(&[]).is_none());
        assert_eq!(rotation.state(0), RotationState::Active { resolved: 0 });
    }
}
