//! interviewkit-core provides answer scoring, question banks, and the interview
//! state machine.
//!
//! This crate defines the data model, the deterministic scoring engine, the
//! collaborator traits, and the controller that drives a practice interview
//! from setup to completion.

pub mod bank;
pub mod controller;
pub mod error;
pub mod model;
pub mod parser;
pub mod scoring;
pub mod script;
pub mod session;
pub mod statistics;
pub mod traits;
pub mod usage;
