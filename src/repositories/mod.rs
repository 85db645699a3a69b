// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Repositories are DUMB data accessors
// - NO business logic
// - NO invariant enforcement
// - NO event emission
//
// The contact store itself lives outside this crate; only the query seam is
// defined here.

pub mod contact_repository;

pub use contact_repository::{Contact, ContactRepository};

#[cfg(test)]
pub use contact_repository::MockContactRepository;
