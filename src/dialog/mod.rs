/// Dialog state machine
///
/// `DialogEngine` turns one inbound message into one reply. It locks the
/// user's session slot for the whole turn, classifies the text (cancel,
/// command, menu trigger), and otherwise hands it to the step function of
/// whichever flow the user is in. Flows live in their own modules and only
/// ever see a `&mut Session` and the storage trait.

pub mod input;
pub mod keyboards;
mod complete;
mod create;
mod delete;
mod stats;

pub use stats::render as render_stats;

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::domain::{DomainError, UserId};
use crate::gateway::{Inbound, Reply};
use crate::session::{DialogState, Session, SessionSlot, SessionStore};
use crate::storage::{HabitStorage, StorageError};

use input::{Command, MenuAction};

/// Errors raised by a flow step
///
/// Everything except `Storage` is recoverable: the engine repeats the
/// current step's prompt and keeps the session.
#[derive(Error, Debug)]
pub enum DialogError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    InvalidPeriod(String),
}

impl From<DomainError> for DialogError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidHabitName(message) | DomainError::InvalidCount(message) => {
                DialogError::Validation(format!("{}. Please try again:", message))
            }
            DomainError::InvalidPeriod(token) => DialogError::InvalidPeriod(format!(
                "Unknown period \"{}\". Please choose Today, Week, Month or Year:",
                token
            )),
        }
    }
}

/// Result of starting a flow from a menu trigger
pub(crate) enum Transition {
    /// Store the session and send the reply
    Continue(Session, Reply),
    /// The flow ended before it began (e.g. no habits)
    Finish(Reply),
}

/// Result of a successful step
pub(crate) enum Step {
    /// Keep the (advanced) session
    Continue(Reply),
    /// Flow is over; the session is dropped and the main menu shown
    Finish(Reply),
}

const GREETING: &str = "Hi! I will help you build good habits.\n\n\
    Create habits, mark them done and watch your statistics grow. \
    Choose an action below.";

const HELP: &str = "Available actions:\n\n\
    Create habit - add a new habit to track\n\
    Complete habit - record that you did it\n\
    Statistics - see progress for a period\n\
    Delete habit - remove a habit and its history\n\n\
    Send Cancel at any step to go back to the main menu.";

pub(crate) fn no_habits() -> Reply {
    Reply::new("You have no habits yet. Create one first with Create habit.")
        .with_options(keyboards::main_menu())
}

pub(crate) fn stale_habit() -> Step {
    Step::Finish(Reply::new("This habit no longer exists. Please start again."))
}

pub(crate) fn lost_draft() -> Step {
    Step::Finish(Reply::new("Something went wrong with this dialog. Please start again."))
}

fn storage_failure() -> Reply {
    Reply::new("Something went wrong while saving your data. Please try again later.")
        .with_options(keyboards::main_menu())
}

/// Conversation driver shared by every user
pub struct DialogEngine<S: HabitStorage> {
    storage: Arc<S>,
    sessions: SessionStore,
}

impl<S: HabitStorage> DialogEngine<S> {
    pub fn new(storage: Arc<S>, sessions: SessionStore) -> Self {
        Self { storage, sessions }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one inbound message and produce the reply
    ///
    /// Turns from the same user are serialized by the session lock; turns
    /// from different users run concurrently.
    pub async fn handle(&self, inbound: &Inbound) -> Reply {
        let user_id = inbound.user_id;
        let text = inbound.text.trim();
        let mut slot = self.sessions.lock(user_id).await;

        debug!(
            "User {} in state {}: {:?}",
            user_id,
            slot.get().map(|s| s.state.to_string()).unwrap_or_else(|| "idle".to_string()),
            text
        );

        if input::is_cancel(text) {
            return if slot.clear() {
                debug!("User {} cancelled the current flow", user_id);
                Reply::new("Action cancelled.").with_options(keyboards::main_menu())
            } else {
                Reply::new("Nothing to cancel.").with_options(keyboards::main_menu())
            };
        }

        if let Some(command) = Command::parse(text) {
            return match command {
                Command::Start => {
                    slot.clear();
                    Reply::new(GREETING).with_options(keyboards::main_menu())
                }
                Command::Help => {
                    let options = match slot.get() {
                        Some(session) => keyboards::for_state(session),
                        None => keyboards::main_menu(),
                    };
                    Reply::new(HELP).with_options(options)
                }
            };
        }

        if let Some(action) = MenuAction::parse(text) {
            return self.start_flow(&mut slot, action).await;
        }

        match slot.take() {
            Some(session) => self.advance(&mut slot, session, text).await,
            None if slot.expired() => {
                Reply::new("Your previous action timed out. Please choose an action again.")
                    .with_options(keyboards::main_menu())
            }
            None => Reply::new("Please use the menu buttons to choose an action.")
                .with_options(keyboards::main_menu()),
        }
    }

    async fn start_flow(&self, slot: &mut SessionSlot, action: MenuAction) -> Reply {
        let user_id = slot.user_id();
        if slot.clear() {
            debug!("User {} abandoned a flow to start {:?}", user_id, action);
        }

        let result = match action {
            MenuAction::Create => Ok(create::start(user_id)),
            MenuAction::Complete => complete::start(&*self.storage, user_id).await,
            MenuAction::Stats => stats::start(&*self.storage, user_id).await,
            MenuAction::Delete => delete::start(&*self.storage, user_id).await,
        };

        match result {
            Ok(Transition::Continue(session, reply)) => {
                debug!("User {} entered {}", user_id, session.state);
                slot.put(session);
                reply
            }
            Ok(Transition::Finish(reply)) => reply,
            Err(e) => self.fail(user_id, e),
        }
    }

    async fn advance(&self, slot: &mut SessionSlot, mut session: Session, text: &str) -> Reply {
        let user_id = session.user_id;
        let storage = &*self.storage;

        let result = match session.state {
            DialogState::Create(step) => create::step(storage, &mut session, step, text).await,
            DialogState::Delete(step) => delete::step(storage, &mut session, step, text).await,
            DialogState::Complete(step) => complete::step(storage, &mut session, step, text).await,
            DialogState::Stats(step) => stats::step(storage, &mut session, step, text).await,
        };

        match result {
            Ok(Step::Continue(reply)) => {
                debug!("User {} moved to {}", user_id, session.state);
                slot.put(session);
                reply
            }
            Ok(Step::Finish(reply)) => {
                debug!("User {} finished {} flow", user_id, session.state.flow());
                reply.with_options(keyboards::main_menu())
            }
            Err(
                DialogError::Validation(message)
                | DialogError::NotFound(message)
                | DialogError::InvalidPeriod(message),
            ) => {
                let reply = Reply::new(message).with_options(keyboards::for_state(&session));
                slot.put(session);
                reply
            }
            Err(e) => self.fail(user_id, e),
        }
    }

    fn fail(&self, user_id: UserId, err: DialogError) -> Reply {
        error!("Dialog for user {} aborted: {}", user_id, err);
        storage_failure()
    }

    /// Drop expired sessions; see `SessionStore::purge_expired`
    pub fn purge_sessions(&self) -> usize {
        let removed = self.sessions.purge_expired();
        if removed > 0 {
            info!("Removed {} idle session(s)", removed);
        }
        removed
    }
}
