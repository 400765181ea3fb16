//! Conversational severity scoring (APACHE II/III style questionnaires).
//!
//! [`diagnosis`] holds the scoring core, [`catalog`] loads test definitions,
//! and [`conversation`] drives chats through a test one message at a time.

pub mod catalog;
pub mod config;
pub mod conversation;
pub mod diagnosis;
pub mod error;
pub mod telemetry;
