//! Entry points driven by the presentation layer.
//!
//! Each sub-module adds methods to [`AppState`](crate::state::AppState) for
//! one area.  Every mutation goes through the [`Session`](crate::session::Session)
//! permission checks, is persisted by the store, and is followed by a
//! [`ChatEvent`](crate::events::ChatEvent) so subscribers can re-render.

pub mod admin;
pub mod auth;
pub mod messaging;
