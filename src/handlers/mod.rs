use crate::commands::{parse_command, Command, PhotoStep, RateInput, HELP};
use crate::models::{RatingSubmission, TOTAL_CATEGORY};
use crate::scoring::leaderboard::format_board;
use crate::scoring::{rating_label, RankBy};
use crate::selector::{RotationState, SelectionPolicy};
use crate::session::Session;
use crate::tasks::{DeferredAction, SessionEvent};
use log::{error, info, warn};
use tokio::sync::mpsc::UnboundedSender;

type HandlerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Owns the session and its one pending deferred action. Every mutation goes
/// through here, so the session has a single writer.
pub struct SessionController {
    session: Session,
    pending: Option<DeferredAction>,
    events: UnboundedSender<SessionEvent>,
}

impl SessionController {
    pub fn new(session: Session, events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            session,
            pending: None,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles one line of input. Failures become a message for the user.
    pub fn handle_line(&mut self, line: &str) -> Reply {
        let command = match parse_command(line) {
            Ok(command) => command,
            // Typos are answered directly, not logged
            Err(e) => return Reply::Text(e.to_string()),
        };
        match self.handle_command(command) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Command '{}' refused: {}", line.trim(), e);
                Reply::Text(format!("Sorry, that didn't work: {}", e))
            }
        }
    }

    pub fn handle_command(&mut self, command: Command) -> HandlerResult<Reply> {
        let text = match command {
            Command::Show => {
                // Asking for the current subject starts a new pass once everyone is resolved
                self.session.current_subject();
                self.render_card()
            }
            Command::Rate(input) => self.handle_rate(input)?,
            Command::Skip => self.handle_skip()?,
            Command::Board(category) => self.render_board(category.as_deref())?,
            Command::Reset => {
                self.session.reset_session();
                self.sync_pending();
                format!("Starting over.\n\n{}", self.render_card())
            }
            Command::Photo(step) => {
                let moved = match step {
                    PhotoStep::Next => self.session.next_photo(),
                    PhotoStep::Previous => self.session.previous_photo(),
                };
                if moved.is_none() {
                    return Err("no one to show".into());
                }
                self.render_card()
            }
            Command::Categories => self
                .session
                .categories()
                .iter()
                .collect::<Vec<_>>()
                .join(", "),
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Reply::Quit),
        };
        Ok(Reply::Text(text))
    }

    /// Applies a deferred event from the runtime. Returns text to show when
    /// the view changed.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<String> {
        match event {
            SessionEvent::DeferredDue { ticket } => {
                // The task has finished either way; forget its handle if it was ours
                if self.pending.as_ref().map(DeferredAction::ticket) == Some(ticket) {
                    self.pending = None;
                }
                if !self.session.apply_deferred(ticket) {
                    return None;
                }
                match self.session.policy() {
                    SelectionPolicy::Cyclic => Some(self.render_card()),
                    // Only the "submitted" flag changed; nothing worth reprinting
                    SelectionPolicy::Rotation => None,
                }
            }
        }
    }

    fn handle_rate(&mut self, input: RateInput) -> HandlerResult<String> {
        let (subject_id, name) = self
            .session
            .current_subject()
            .map(|s| (s.id.clone(), s.display_name.clone()))
            .ok_or("no one to rate")?;

        let submission = match input {
            RateInput::Uniform(value) => RatingSubmission::uniform(self.session.categories(), value),
            RateInput::PerCategory(pairs) => {
                pairs
                    .into_iter()
                    .fold(RatingSubmission::new(), |submission, (category, value)| {
                        submission.with(&category, value)
                    })
            }
        };

        let outcome = self.session.submit_rating(&subject_id, &submission)?;
        // The session refuses ratings while a follow-up is pending, so nothing is replaced here
        self.pending = Some(DeferredAction::schedule(outcome.follow_up, self.events.clone()));

        let mut text = format!("Rating submitted! Thanks for rating {}!\n", name);
        for category in self.session.categories().iter() {
            let value = submission.get(category).unwrap_or_default();
            text.push_str(&format!("  {:<20} {:>2} ({})\n", category, value, rating_label(value)));
        }
        text.push_str(&format!(
            "{} now averages {:.1}/10.0 over {} ratings.\n",
            name, outcome.entry.total_score, outcome.entry.ratings_count
        ));

        match self.session.policy() {
            // Rotation has already moved on, show who is next
            SelectionPolicy::Rotation => {
                text.push('\n');
                text.push_str(&self.render_card());
            }
            SelectionPolicy::Cyclic => {
                text.push_str(&format!(
                    "Next person in {:.1}s...",
                    outcome.follow_up.delay.as_secs_f64()
                ));
            }
        }
        Ok(text)
    }

    fn handle_skip(&mut self) -> HandlerResult<String> {
        let subject_id = self
            .session
            .current_subject()
            .map(|s| s.id.clone())
            .ok_or("no one to skip")?;
        self.session.skip(&subject_id)?;
        self.sync_pending();
        Ok(format!("Skipped! Moving to the next person...\n\n{}", self.render_card()))
    }

    fn render_board(&self, category: Option<&str>) -> HandlerResult<String> {
        let category = category.unwrap_or(TOTAL_CATEGORY);
        let by = RankBy::parse(category, self.session.categories())?;
        let rows = self.session.ranked_entries(by.label())?;
        Ok(format_board(&rows, &by))
    }

    fn render_card(&mut self) -> String {
        if self.session.rotation_state() == Some(RotationState::AllResolved) {
            return "You've rated everyone! Type 'show' for another pass or 'reset' to start over."
                .to_string();
        }

        let confirming = self.session.is_confirming();
        let (image, index, total) = match self.session.current_photo() {
            Some((image, index, total)) => (image.to_string(), index, total),
            None => return "There is no one to rate.".to_string(),
        };
        let Some(subject) = self.session.current_subject().cloned() else {
            error!("Photo available without a current subject");
            return "There is no one to rate.".to_string();
        };

        let mut card = format!("{}\n  photo {}/{}: {}\n", subject.display_name, index + 1, total, image);
        if let Some(entry) = self.session.entry(&subject.id) {
            card.push_str(&format!(
                "  {:.1}/10.0 overall from {} rating{}\n",
                entry.total_score,
                entry.ratings_count,
                if entry.ratings_count == 1 { "" } else { "s" }
            ));
        }
        if confirming {
            card.push_str("  (rating submitted)\n");
        }
        card.push_str(&format!(
            "  rate 0-10 on: {}",
            self.session.categories().iter().collect::<Vec<_>>().join(", ")
        ));
        card
    }

    /// Drops the scheduled task once the session no longer expects it.
    fn sync_pending(&mut self) {
        let expected = self.session.pending_ticket();
        if let Some(action) = self.pending.take() {
            if Some(action.ticket()) == expected {
                self.pending = Some(action);
            } else {
                info!("Cancelling deferred ticket {}", action.ticket());
                action.cancel();
            }
        }
    }
}
