//! Shared types for TripChat: the error enum, configuration, the chat
//! data model, user notices, streaming events and trace events.

pub mod config;
pub mod error;
pub mod model;
pub mod notice;
pub mod stream;
pub mod trace;
