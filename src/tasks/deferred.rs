use crate::session::FollowUp;
use log::debug;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;

/// Events posted back to the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The delay for `ticket` has elapsed.
    DeferredDue { ticket: u64 },
}

/// A scheduled follow-up running on the tokio runtime.
///
/// The task only posts an event; the session decides whether the ticket is
/// still current. Dropping the handle aborts the task.
#[derive(Debug)]
pub struct DeferredAction {
    ticket: u64,
    handle: JoinHandle<()>,
}

impl DeferredAction {
    /// Must be called from within a tokio runtime.
    pub fn schedule(follow_up: FollowUp, events: UnboundedSender<SessionEvent>) -> Self {
        let ticket = follow_up.ticket;
        let handle = tokio::spawn(async move {
            sleep(follow_up.delay).await;
            // Post the ticket back rather than touching the session from this task
            if events.send(SessionEvent::DeferredDue { ticket }).is_err() {
                debug!("Session loop gone before ticket {} fired", ticket);
            }
        });
        debug!("Scheduled {:?} (ticket {}) in {:?}", follow_up.pacing, ticket, follow_up.delay);
        Self { ticket, handle }
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn cancel(self) {
        debug!("Cancelled ticket {}", self.ticket);
        // Drop aborts the task
    }
}

impl Drop for DeferredAction {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
