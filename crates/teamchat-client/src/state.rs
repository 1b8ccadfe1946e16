//! Application state shared between the command layer and the simulator.
//!
//! The [`AppState`] struct is wrapped in `Arc<Mutex<>>`; every caller goes
//! through [`lock`] so a poisoned mutex surfaces as a [`ClientError`]
//! instead of a panic.

use std::sync::{Arc, Mutex, MutexGuard};

use teamchat_store::Store;

use crate::error::{ClientError, Result};
use crate::events::EventBus;
use crate::session::Session;
use crate::simulator::Simulator;

pub type SharedState = Arc<Mutex<AppState>>;

/// Central application state.
pub struct AppState {
    /// Users, groups, messages and company settings.
    pub store: Store,

    /// Who is logged in and which conversation is open.
    pub session: Session,

    /// Outgoing notifications for the presentation layer.
    pub events: EventBus,

    /// Demo activity generator driven by the timer task.
    pub simulator: Simulator,
}

impl AppState {
    pub fn new(store: Store, simulator: Simulator) -> Self {
        Self {
            store,
            session: Session::new(),
            events: EventBus::default(),
            simulator,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }
}

pub fn lock(state: &SharedState) -> Result<MutexGuard<'_, AppState>> {
    state
        .lock()
        .map_err(|e| ClientError::LockPoisoned(format!("Lock poisoned: {e}")))
}
