//! Résumé / job-description fit analysis.
//!
//! `builder` turns a `JobInput` into a prompt plus response schema, `client`
//! makes the single deterministic backend call and `models` holds the typed
//! result. `autofill` is the lightweight company/role detector.

pub mod autofill;
pub mod builder;
pub mod client;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod schema;
