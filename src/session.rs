use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::codec::content::{self, DecodeError};
use crate::codec::identity;
use crate::entities::item::{ActorId, ItemHandle, ItemId, Slot, StackEntry};
use crate::telemetry::logging;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotAContainer,
    NoOpenSession,
    IndexOutOfRange { index: usize, capacity: u8 },
    RecursionRejected,
    Decode(DecodeError),
    ItemUnavailable,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotAContainer => write!(f, "item is not a container"),
            SessionError::NoOpenSession => write!(f, "actor has no open session"),
            SessionError::IndexOutOfRange { index, capacity } => {
                write!(f, "slot {} out of range for capacity {}", index, capacity)
            }
            SessionError::RecursionRejected => {
                write!(f, "a container cannot be placed inside a container")
            }
            SessionError::Decode(err) => write!(f, "{}", err),
            SessionError::ItemUnavailable => write!(f, "item lock poisoned"),
        }
    }
}

/// Result of a close: the flush either landed on the source item or it did
/// not. Either way the session is gone; a failed flush is a warning, not a
/// stuck session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    Flushed,
    FlushFailed { detail: String },
}

#[derive(Debug)]
struct Session {
    source_item: ItemHandle,
    source_item_id: ItemId,
    capacity: u8,
    live_view: Vec<Slot>,
}

/// Per-actor open-container tracking. One explicitly owned instance is
/// shared by handle with every event adapter that needs it; a single lock
/// guards the whole mapping (one session per actor, contention is low).
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<ActorId, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    // The mapping stays usable even if a holder panicked mid-operation.
    fn sessions(&self) -> MutexGuard<'_, HashMap<ActorId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a session on the given item for the actor, decoding the item's
    /// current payload into a fresh live view. An existing session for the
    /// same actor is replaced without being flushed; the new view always
    /// comes from the new item's own payload, never from the abandoned one.
    /// On any error no entry is created and the item is untouched.
    pub fn open(&self, actor: ActorId, item: &ItemHandle) -> Result<Vec<Slot>, SessionError> {
        let (item_id, capacity, live_view) = {
            let guard = item.lock().map_err(|_| SessionError::ItemUnavailable)?;
            if !identity::is_container(Some(&guard)) {
                return Err(SessionError::NotAContainer);
            }
            let capacity =
                identity::read_capacity(&guard).map_err(|_| SessionError::NotAContainer)?;
            let slots = content::decode(&guard).map_err(SessionError::Decode)?;
            (guard.id, capacity, slots)
        };

        let snapshot = live_view.clone();
        let replaced = self
            .sessions()
            .insert(
                actor,
                Session {
                    source_item: Arc::clone(item),
                    source_item_id: item_id,
                    capacity,
                    live_view,
                },
            )
            .is_some();

        if replaced {
            logging::log_session(&format!(
                "actor {} replaced an open session with item {}",
                actor.0, item_id.0
            ));
        } else {
            logging::log_session(&format!(
                "actor {} opened item {} (capacity {})",
                actor.0, item_id.0, capacity
            ));
        }
        Ok(snapshot)
    }

    /// Applies a single-slot change to the actor's live view. This is the
    /// one chokepoint every mutation surface (direct place, shift-transfer,
    /// quick-slot swap, drag, hand-swap) normalizes into; the recursion
    /// guard lives here and nowhere else. A zero-quantity stack normalizes
    /// to an empty slot before any check.
    pub fn mutate(
        &self,
        actor: ActorId,
        slot_index: usize,
        value: Option<StackEntry>,
    ) -> Result<(), SessionError> {
        let mut sessions = self.sessions();
        let session = sessions
            .get_mut(&actor)
            .ok_or(SessionError::NoOpenSession)?;
        if slot_index >= session.capacity as usize {
            return Err(SessionError::IndexOutOfRange {
                index: slot_index,
                capacity: session.capacity,
            });
        }
        let value = match value {
            Some(entry) if entry.quantity == 0 => None,
            other => other,
        };
        if let Some(entry) = &value {
            if identity::is_container_stack(entry) {
                return Err(SessionError::RecursionRejected);
            }
        }
        session.live_view[slot_index] = value;
        Ok(())
    }

    /// Flushes the live view back onto the source item and removes the
    /// entry. Removal happens regardless: a session whose flush failed is
    /// torn down, not retried, and the failure is reported as a warning.
    pub fn close(&self, actor: ActorId) -> Result<CloseOutcome, SessionError> {
        let session = self
            .sessions()
            .remove(&actor)
            .ok_or(SessionError::NoOpenSession)?;

        let outcome = match session.source_item.lock() {
            Ok(mut item) => {
                content::write_to_item(&mut item, &session.live_view);
                logging::log_session(&format!(
                    "actor {} closed item {}, contents flushed",
                    actor.0, session.source_item_id.0
                ));
                Ok(CloseOutcome::Flushed)
            }
            Err(_) => {
                let detail = format!(
                    "flush to item {} failed: item lock poisoned",
                    session.source_item_id.0
                );
                logging::log_error(&detail);
                Ok(CloseOutcome::FlushFailed { detail })
            }
        };
        outcome
    }

    /// Removes the actor's entry without attempting a flush. Used when the
    /// actor becomes unreachable; idempotent, returns whether an entry
    /// existed.
    pub fn abort(&self, actor: ActorId) -> bool {
        let removed = self.sessions().remove(&actor);
        if let Some(session) = &removed {
            logging::log_session(&format!(
                "actor {} aborted, item {} dropped without flush",
                actor.0, session.source_item_id.0
            ));
        }
        removed.is_some()
    }

    pub fn is_session_open(&self, actor: ActorId) -> bool {
        self.sessions().contains_key(&actor)
    }

    /// The exact item instance the actor's open session was created from.
    pub fn peek_source_item(&self, actor: ActorId) -> Result<ItemHandle, SessionError> {
        self.sessions()
            .get(&actor)
            .map(|session| Arc::clone(&session.source_item))
            .ok_or(SessionError::NoOpenSession)
    }

    /// Snapshot of the actor's current live view.
    pub fn live_view(&self, actor: ActorId) -> Result<Vec<Slot>, SessionError> {
        self.sessions()
            .get(&actor)
            .map(|session| session.live_view.clone())
            .ok_or(SessionError::NoOpenSession)
    }

    pub fn open_session_count(&self) -> usize {
        self.sessions().len()
    }
}
