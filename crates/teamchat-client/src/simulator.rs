//! Demo activity: synthetic incoming messages and presence shuffling.
//!
//! Two independent timers drive the [`Simulator`].  Each tick is a plain
//! synchronous call on the shared [`AppState`]; the lock is taken and
//! released inside the tick so it is never held across an `.await`.
//! Randomness comes from a [`RandomSource`] so tests can script it.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use teamchat_shared::{MessageId, Presence, UserId};
use teamchat_store::{Destination, NewMessage, Store};

use crate::config::SimulatorConfig;
use crate::events::{Change, ChatEvent};
use crate::session::Session;
use crate::state::{AppState, SharedState};

// ---------------------------------------------------------------------------
// Randomness
// ---------------------------------------------------------------------------

pub trait RandomSource: Send {
    /// `true` with the given probability.
    fn chance(&mut self, probability: f64) -> bool;

    /// A uniform index in `0..len`.  `len` is never zero.
    fn index(&mut self, len: usize) -> usize;
}

/// [`RandomSource`] backed by `rand`'s standard generator.
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn new() -> Self {
        Self(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn chance(&mut self, probability: f64) -> bool {
        if !probability.is_finite() {
            return false;
        }
        self.0.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn index(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len.max(1))
    }
}

/// Replays fixed answers.  Once a queue runs dry, `chance` answers `false`
/// and `index` answers `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    chances: VecDeque<bool>,
    indices: VecDeque<usize>,
}

impl ScriptedRandom {
    pub fn new(chances: impl IntoIterator<Item = bool>, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            chances: chances.into_iter().collect(),
            indices: indices.into_iter().collect(),
        }
    }
}

impl RandomSource for ScriptedRandom {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len.max(1)
    }
}

// ---------------------------------------------------------------------------
// Simulator
// ---------------------------------------------------------------------------

pub struct Simulator {
    config: SimulatorConfig,
    rng: Box<dyn RandomSource>,
}

impl Simulator {
    pub fn new(config: SimulatorConfig, rng: impl RandomSource + 'static) -> Self {
        Self {
            config,
            rng: Box::new(rng),
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Message trigger: with the configured probability, deliver a canned
    /// phrase to the logged-in user.  Does nothing while logged out.
    pub fn message_tick(
        &mut self,
        store: &mut Store,
        session: &Session,
        now: DateTime<Utc>,
    ) -> Option<MessageId> {
        let me = session.current_user_id()?;
        if !self.rng.chance(self.config.message_probability) {
            return None;
        }
        self.deliver_random_message(store, me, now)
    }

    /// Send one canned phrase from a random online user (other than
    /// `recipient`) to `recipient`.
    pub fn deliver_random_message(
        &mut self,
        store: &mut Store,
        recipient: UserId,
        now: DateTime<Utc>,
    ) -> Option<MessageId> {
        let online: Vec<UserId> = store
            .users()
            .iter()
            .filter(|u| u.id != recipient && u.status == Presence::Online)
            .map(|u| u.id)
            .collect();
        if online.is_empty() || self.config.phrases.is_empty() {
            debug!("no online sender available");
            return None;
        }

        let sender = online[self.rng.index(online.len())];
        let phrase = self.config.phrases[self.rng.index(self.config.phrases.len())].clone();

        match store.add_message(NewMessage::text(sender, Destination::User(recipient), phrase).at(now)) {
            Ok(id) => {
                debug!(msg_id = %id, from = %sender, to = %recipient, "simulated message");
                Some(id)
            }
            Err(e) => {
                warn!(error = %e, "failed to inject simulated message");
                None
            }
        }
    }

    /// Presence trigger: every user except the logged-in one gets a random
    /// status with the configured probability.  Returns who changed.
    pub fn presence_tick(
        &mut self,
        store: &mut Store,
        session: &Session,
        now: DateTime<Utc>,
    ) -> Vec<UserId> {
        let Some(me) = session.current_user_id() else {
            return Vec::new();
        };

        let others: Vec<UserId> = store
            .users()
            .iter()
            .map(|u| u.id)
            .filter(|id| *id != me)
            .collect();

        let mut rolled = Vec::new();
        for id in others {
            if self.rng.chance(self.config.presence_probability) {
                rolled.push((id, Presence::ALL[self.rng.index(Presence::ALL.len())]));
            }
        }

        let changed = store.set_presences(rolled, now);
        if !changed.is_empty() {
            debug!(count = changed.len(), "presence shuffled");
        }
        changed
    }
}

// ---------------------------------------------------------------------------
// Wiring into the application state
// ---------------------------------------------------------------------------

impl AppState {
    pub fn simulate_message_tick(&mut self, now: DateTime<Utc>) -> Option<MessageId> {
        let id = self
            .simulator
            .message_tick(&mut self.store, &self.session, now)?;

        if let Some(message) = self.store.message(id) {
            self.events.emit(ChatEvent::IncomingMessage {
                message: id,
                from: message.sender_id,
                preview: message.content.clone(),
            });
        }
        self.events.changed(Change::Messages);
        Some(id)
    }

    pub fn simulate_presence_tick(&mut self, now: DateTime<Utc>) -> Vec<UserId> {
        let changed = self
            .simulator
            .presence_tick(&mut self.store, &self.session, now);
        if !changed.is_empty() {
            self.events.changed(Change::Presence);
        }
        changed
    }
}

/// Owns the timer task.  Dropping the handle stops the timers.
pub struct SimulatorHandle {
    task: JoinHandle<()>,
}

impl SimulatorHandle {
    /// Abort the timer task now.
    pub fn stop(self) {
        self.task.abort();
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for SimulatorHandle {
    fn drop(&mut self) {
        self.task.abort();
        debug!("simulator stopped");
    }
}

/// Start both timers on the current tokio runtime.
pub fn spawn(state: SharedState, config: &SimulatorConfig) -> SimulatorHandle {
    let mut message_timer = interval(config.message_interval);
    let mut presence_timer = interval(config.presence_interval);
    message_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    presence_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        message_every = ?config.message_interval,
        presence_every = ?config.presence_interval,
        "simulator started"
    );

    let task = tokio::spawn(async move {
        // Both intervals complete their first tick immediately.
        message_timer.tick().await;
        presence_timer.tick().await;

        loop {
            let alive = tokio::select! {
                _ = message_timer.tick() => with_state(&state, |s| {
                    s.simulate_message_tick(Utc::now());
                }),
                _ = presence_timer.tick() => with_state(&state, |s| {
                    s.simulate_presence_tick(Utc::now());
                }),
            };
            if !alive {
                break;
            }
        }
    });

    SimulatorHandle { task }
}

fn with_state(state: &SharedState, f: impl FnOnce(&mut AppState)) -> bool {
    match state.lock() {
        Ok(mut guard) => {
            f(&mut guard);
            true
        }
        Err(e) => {
            error!(error = %e, "Lock poisoned, stopping simulator");
            false
        }
    }
}
