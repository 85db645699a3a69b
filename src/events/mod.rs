// src/events/mod.rs
//
// Internal Event System - Public API

pub mod types;

pub use types::{QueryOutcome, ResolverEvent, ResolverEventKind};
