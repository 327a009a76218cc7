//! Keyed store of dialog sessions with per-user mutual exclusion.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::UserId;
use crate::session::Session;

type Cell = Arc<AsyncMutex<Option<Session>>>;

/// Holder of every user's current dialog session
///
/// Each user gets an async mutex. `lock` hands out an owned guard, so one
/// user's turns are processed one at a time while different users never wait
/// on each other. The outer map lock is only held to find or create a cell.
pub struct SessionStore {
    cells: Mutex<HashMap<UserId, Cell>>,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    /// Create an empty store
    ///
    /// With `Some(timeout)`, a session left untouched for longer than the
    /// timeout is discarded the next time it is looked up.
    pub fn new(idle_timeout: Option<Duration>) -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    /// Acquire exclusive access to one user's session slot
    ///
    /// Waits while another turn for the same user is in progress.
    pub async fn lock(&self, user_id: UserId) -> SessionSlot {
        let cell = {
            let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cells.entry(user_id).or_default())
        };

        let mut guard = cell.lock_owned().await;

        let expired = self.is_expired(guard.as_ref());
        if expired {
            debug!("Session for user {} expired after idle timeout", user_id);
            *guard = None;
        }

        SessionSlot { user_id, guard, expired }
    }

    /// Drop idle cells and expired sessions
    ///
    /// Cells that are locked or referenced by an in-flight turn are left
    /// alone. Returns how many cells were removed.
    pub fn purge_expired(&self) -> usize {
        let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        let before = cells.len();

        cells.retain(|_, cell| {
            // Clones are only made under the map lock, so a count of one
            // means no turn can be about to use this cell
            if Arc::strong_count(cell) > 1 {
                return true;
            }
            match cell.try_lock() {
                Ok(slot) => !(slot.is_none() || self.is_expired(slot.as_ref())),
                Err(_) => true,
            }
        });

        let removed = before - cells.len();
        if removed > 0 {
            debug!("Purged {} idle session cell(s)", removed);
        }
        removed
    }

    /// Number of users currently inside a flow
    ///
    /// Slots busy with a turn are counted as active.
    pub fn active_sessions(&self) -> usize {
        let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
        cells
            .values()
            .filter(|cell| match cell.try_lock() {
                Ok(slot) => slot.is_some() && !self.is_expired(slot.as_ref()),
                Err(_) => true,
            })
            .count()
    }

    fn is_expired(&self, session: Option<&Session>) -> bool {
        match (self.idle_timeout, session) {
            (Some(timeout), Some(session)) => session.last_active.elapsed() >= timeout,
            _ => false,
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Exclusive handle to one user's session for the duration of a turn
///
/// Dropping the slot releases the user's lock.
pub struct SessionSlot {
    user_id: UserId,
    guard: OwnedMutexGuard<Option<Session>>,
    expired: bool,
}

impl SessionSlot {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn get(&self) -> Option<&Session> {
        self.guard.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut Session> {
        self.guard.as_mut()
    }

    /// Whether acquiring this slot discarded a session for being idle too long
    pub fn expired(&self) -> bool {
        self.expired
    }

    pub fn is_active(&self) -> bool {
        self.guard.is_some()
    }

    /// Store a session, replacing any previous one, and mark it active now
    pub fn put(&mut self, mut session: Session) {
        session.last_active = Instant::now();
        *self.guard = Some(session);
    }

    /// Remove and return the session, leaving the user idle
    pub fn take(&mut self) -> Option<Session> {
        self.guard.take()
    }

    /// Discard the session. Returns whether there was one.
    pub fn clear(&mut self) -> bool {
        self.guard.take().is_some()
    }
}
