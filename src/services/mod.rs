// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod contact_query_service;
pub mod voicemail_resolver;


// Re-export all services and their types
pub use contact_query_service::ContactQueryService;

pub use voicemail_resolver::{ResolverState, ResolverStatus, VoicemailIdentityResolver};
