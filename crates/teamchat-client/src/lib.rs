pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod mentions;
pub mod projector;
pub mod session;
pub mod simulator;
pub mod state;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use teamchat_shared::constants::APP_NAME;
use teamchat_store::{MemoryStorage, SqliteStorage, Store};

use crate::config::ClientConfig;
use crate::events::ChatEvent;
use crate::simulator::{Simulator, SimulatorHandle, StdRandom};
use crate::state::AppState;

/// Install the global `tracing` subscriber.  `RUST_LOG` overrides the
/// default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("teamchat_client_lib=debug,teamchat_store=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Open the configured database, or fall back to the platform data dir.
fn open_store(config: &ClientConfig) -> Store {
    let db = match &config.db_path {
        Some(path) => SqliteStorage::open_at(path),
        None => SqliteStorage::new(),
    };

    match db {
        Ok(db) => {
            info!(path = ?db.path(), "Database opened");
            Store::load(db, &config.namespace)
        }
        Err(e) => {
            warn!(error = %e, "Database unavailable, data will not survive a restart");
            Store::load(MemoryStorage::new(), &config.namespace)
        }
    }
}

/// Run the headless client until Ctrl-C: load the store, optionally log in
/// the demo user, and keep the simulator running while someone is logged in.
/// Every published event is logged as JSON.
pub async fn run(config: ClientConfig) -> anyhow::Result<()> {
    info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));
    info!(?config, "Loaded configuration");

    let store = open_store(&config);
    let simulator = Simulator::new(config.simulator.clone(), StdRandom::new());
    let shared = AppState::new(store, simulator).shared();

    let mut events = state::lock(&shared)?.events.subscribe();

    if let Some(phone) = &config.demo_phone {
        let result = state::lock(&shared)?.login(phone);
        match result {
            Ok(user) => info!(user = %user, "Demo user logged in"),
            Err(e) => warn!(error = %e, phone = %phone, "Demo login failed"),
        }
    }

    let mut activity: Option<SimulatorHandle> = None;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            received = events.recv() => match received {
                Ok(event) => {
                    log_event(&event);
                    match event {
                        ChatEvent::LoggedIn { .. } if config.simulator.enabled => {
                            activity = Some(simulator::spawn(shared.clone(), &config.simulator));
                        }
                        ChatEvent::LoggedOut { .. } => activity = None,
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event listener lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    drop(activity);
    if let Some(user) = state::lock(&shared)?.logout() {
        info!(user = %user, "Logged out on shutdown");
    }
    Ok(())
}

fn log_event(event: &ChatEvent) {
    match serde_json::to_string(event) {
        Ok(json) => info!(event = %json, "Event"),
        Err(e) => warn!(error = %e, "Failed to serialize event"),
    }
}

#[cfg(test)]
mod tests {
    use teamchat_shared::{ContactRef, UserId};

    use super::*;
    use crate::simulator::ScriptedRandom;

    #[test]
    fn state_survives_restart_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig {
            db_path: Some(dir.path().join("nested").join("chat.db")),
            ..ClientConfig::default()
        };

        let mut state = AppState::new(
            open_store(&config),
            Simulator::new(config.simulator.clone(), ScriptedRandom::default()),
        );
        state.login("+1234567890").unwrap();
        state.open_conversation(ContactRef::User(UserId(4))).unwrap();
        state.send_message("persist me").unwrap();
        state.save_settings("Acme", None).unwrap();

        let users = state.store.users().to_vec();
        let groups = state.store.groups().to_vec();
        let messages = state.store.messages().to_vec();
        drop(state);

        let reopened = open_store(&config);
        assert_eq!(reopened.users(), users.as_slice());
        assert_eq!(reopened.groups(), groups.as_slice());
        assert_eq!(reopened.messages(), messages.as_slice());
        assert_eq!(reopened.company().name, "Acme");
        assert!(dir.path().join("nested").join("chat.db").exists());
    }
}
