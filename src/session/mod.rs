use crate::models::{CategorySet, RatingSubmission, ScoreBoardEntry, Subject};
use crate::scoring::leaderboard::rank_entries;
use crate::scoring::{fold_rating, RankBy, RankedEntry, RatingError};
use crate::seed::SeedData;
use crate::selector::{RotationState, SelectionPolicy, Selector};
use log::{debug, info};
use std::time::Duration;

/// Default pause before the rotation policy clears its "submitted" flag.
pub const ROTATION_CONFIRM_DELAY: Duration = Duration::from_millis(2000);
/// Default pause before the cyclic policy moves to the next subject.
pub const CYCLIC_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub policy: SelectionPolicy,
    pub leaderboard_size: usize,
    pub delay: Duration,
}

impl SessionOptions {
    pub fn for_policy(policy: SelectionPolicy) -> Self {
        let delay = match policy {
            SelectionPolicy::Rotation => ROTATION_CONFIRM_DELAY,
            SelectionPolicy::Cyclic => CYCLIC_ADVANCE_DELAY,
        };
        Self {
            policy,
            leaderboard_size: crate::scoring::DEFAULT_LEADERBOARD_SIZE,
            delay,
        }
    }
}

/// What a deferred action does once its delay has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    ClearConfirmation,
    Advance,
}

/// A deferred action the caller should schedule. Only the most recent ticket
/// is honoured by [`Session::apply_deferred`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowUp {
    pub ticket: u64,
    pub delay: Duration,
    pub pacing: Pacing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub entry: ScoreBoardEntry,
    pub follow_up: FollowUp,
}

/// All mutable rating state for one viewer.
///
/// `entries[i]` always belongs to `subjects[i]`.
#[derive(Debug)]
pub struct Session {
    categories: CategorySet,
    subjects: Vec<Subject>,
    entries: Vec<ScoreBoardEntry>,
    selector: Selector,
    options: SessionOptions,
    photo: PhotoCursor,
    confirming: bool,
    next_ticket: u64,
    pending: Option<(u64, Pacing)>,
}

#[derive(Debug, Default)]
struct PhotoCursor {
    subject_id: Option<String>,
    index: usize,
}

impl Session {
    pub fn new(categories: CategorySet, seed: SeedData, options: SessionOptions) -> Self {
        let (subjects, entries) = seed.into_parts();
        info!(
            "Session ready: {} subjects, {} categories, {:?} policy",
            subjects.len(),
            categories.len(),
            options.policy
        );
        Self {
            categories,
            subjects,
            entries,
            selector: Selector::new(options.policy),
            options,
            photo: PhotoCursor::default(),
            confirming: false,
            next_ticket: 0,
            pending: None,
        }
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn entries(&self) -> &[ScoreBoardEntry] {
        &self.entries
    }

    pub fn policy(&self) -> SelectionPolicy {
        self.selector.policy()
    }

    pub fn entry(&self, subject_id: &str) -> Option<&ScoreBoardEntry> {
        self.entries.iter().find(|e| e.subject_id == subject_id)
    }

    /// Subject to show now; `None` only when the store is empty.
    pub fn current_subject(&mut self) -> Option<&Subject> {
        let id = self.selector.current(&self.subjects)?.id.clone();
        if self.photo.subject_id.as_deref() != Some(id.as_str()) {
            self.photo = PhotoCursor {
                subject_id: Some(id.clone()),
                index: 0,
            };
        }
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Resolution progress under the rotation policy, `None` for cyclic.
    pub fn rotation_state(&self) -> Option<RotationState> {
        match &self.selector {
            Selector::Rotation(rotation) => Some(rotation.state(self.subjects.len())),
            Selector::Cyclic(_) => None,
        }
    }

    /// True between a submission and its deferred follow-up.
    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    pub fn pending_ticket(&self) -> Option<u64> {
        self.pending.map(|(ticket, _)| ticket)
    }

    /// Folds `submission` into the subject's entry.
    ///
    /// Refused while a previous submission's follow-up is still pending. On
    /// error the entry and the selector are left untouched.
    pub fn submit_rating(
        &mut self,
        subject_id: &str,
        submission: &RatingSubmission,
    ) -> Result<SubmitOutcome, RatingError> {
        if self.pending.is_some() {
            return Err(RatingError::AwaitingConfirmation);
        }
        let position = self.position_of(subject_id)?;
        let updated = fold_rating(&self.entries[position], submission, &self.categories)?;
        self.entries[position] = updated.clone();

        // Rotation moves on now and only clears the flag later; cyclic waits to advance
        let pacing = match &mut self.selector {
            Selector::Rotation(rotation) => {
                rotation.mark_resolved(subject_id);
                Pacing::ClearConfirmation
            }
            Selector::Cyclic(_) => Pacing::Advance,
        };
        self.confirming = true;
        let follow_up = self.schedule(pacing);

        info!(
            "Rated '{}': total {:.2} over {} ratings",
            subject_id, updated.total_score, updated.ratings_count
        );
        Ok(SubmitOutcome {
            entry: updated,
            follow_up,
        })
    }

    /// Passes over a subject without rating it.
    ///
    /// Under the cyclic policy only skipping the subject currently shown has
    /// an effect: the index advances immediately and any pending advance is
    /// dropped.
    pub fn skip(&mut self, subject_id: &str) -> Result<(), RatingError> {
        self.position_of(subject_id)?;
        let count = self.subjects.len();
        match &mut self.selector {
            Selector::Rotation(rotation) => {
                rotation.mark_resolved(subject_id);
            }
            Selector::Cyclic(cyclic) => {
                let is_current = cyclic
                    .current(&self.subjects)
                    .is_some_and(|s| s.id == subject_id);
                if is_current {
                    // The skip replaces the advance the last rating was waiting on
                    self.pending = None;
                    self.confirming = false;
                    cyclic.advance(count);
                }
            }
        }
        info!("Skipped '{}'", subject_id);
        Ok(())
    }

    /// Starts over: clears the resolved set or rewinds the index, and drops
    /// any pending deferred action.
    pub fn reset_session(&mut self) {
        self.selector.reset();
        self.pending = None;
        self.confirming = false;
        self.photo = PhotoCursor::default();
        info!("Session reset");
    }

    pub fn ranked_entries(&self, category: &str) -> Result<Vec<RankedEntry>, RatingError> {
        let by = RankBy::parse(category, &self.categories)?;
        Ok(rank_entries(
            &self.subjects,
            &self.entries,
            &by,
            self.options.leaderboard_size,
        ))
    }

    /// Applies a deferred action if `ticket` is still the pending one.
    /// Returns false for cancelled or superseded tickets.
    pub fn apply_deferred(&mut self, ticket: u64) -> bool {
        match self.pending {
            Some((pending, pacing)) if pending == ticket => {
                self.pending = None;
                self.confirming = false;
                if pacing == Pacing::Advance {
                    let count = self.subjects.len();
                    if let Selector::Cyclic(cyclic) = &mut self.selector {
                        cyclic.advance(count);
                    }
                }
                debug!("Applied deferred {:?} (ticket {})", pacing, ticket);
                true
            }
            _ => {
                debug!("Ignoring stale deferred ticket {}", ticket);
                false
            }
        }
    }

    /// Drops the pending deferred action, returning its ticket.
    pub fn cancel_pending(&mut self) -> Option<u64> {
        self.pending.take().map(|(ticket, _)| ticket)
    }

    pub fn current_photo(&mut self) -> Option<(&str, usize, usize)> {
        let index = self.photo_index()?;
        let subject = self.current_subject()?;
        let total = subject.images.len();
        subject.images.get(index).map(|img| (img.as_str(), index, total))
    }

    pub fn next_photo(&mut self) -> Option<usize> {
        self.step_photo(1)
    }

    pub fn previous_photo(&mut self) -> Option<usize> {
        self.step_photo(-1)
    }

    fn photo_index(&mut self) -> Option<usize> {
        self.current_subject()?;
        Some(self.photo.index)
    }

    fn step_photo(&mut self, step: isize) -> Option<usize> {
        let total = self.current_subject()?.images.len();
        if total == 0 {
            return None;
        }
        let index = (self.photo.index as isize + step).rem_euclid(total as isize) as usize;
        self.photo.index = index;
        Some(index)
    }

    fn schedule(&mut self, pacing: Pacing) -> FollowUp {
        // Tickets only grow, so an event from an older follow-up can never match
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some((ticket, pacing));
        FollowUp {
            ticket,
            delay: self.options.delay,
            pacing,
        }
    }

    fn position_of(&self, subject_id: &str) -> Result<usize, RatingError> {
        self.entries
            .iter()
            .position(|e| e.subject_id == subject_id)
            .ok_or_else(|| RatingError::UnknownSubject {
                subject_id: subject_id.to_string(),
            })
    }
}
