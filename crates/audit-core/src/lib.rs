//! # audit-core
//!
//! Core types, collaborator traits, and error types for field audit sync.
//!
//! This crate provides the foundational types shared across all audit crates:
//! - Entity structs for the audit aggregate (sessions, questions, answers, violations)
//! - The submission state machine
//! - Local ID generation
//! - Server timestamp normalization
//! - Collaborator traits (catalog, mutations, capture, draft store)
//! - Finalize result types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod ports;
pub mod responses;
pub mod time;
