//! Community resource directory and emergency-request coordination.
//!
//! The crate exposes the triage classifier and volunteer matcher under [`coordination`],
//! an SQLite-backed [`storage`] adapter, bearer-token admin [`auth`], and the live
//! dashboard [`events`] hub. `services/api` wires them into an HTTP service.

pub mod auth;
pub mod config;
pub mod coordination;
pub mod envelope;
pub mod error;
pub mod events;
pub mod storage;
pub mod telemetry;
