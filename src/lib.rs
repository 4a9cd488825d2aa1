//! Check whether handles are registered with the Mojang profile service.
//!
//! Candidates are read from a word list and validated ([`filter`]), looked
//! up one at a time with bounded exponential backoff ([`checker`]), and the
//! available ones are appended to a log ([`sink`]) while a [`batch`] run
//! reports progress to its caller.

pub mod batch;
pub mod checker;
pub mod config;
pub mod filter;
pub mod humanize;
pub mod lookup;
pub mod observability;
pub mod sink;
