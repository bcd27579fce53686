//! # sav-core
//!
//! Core types, ID prefixes, and error types for Savant.
//!
//! This crate provides the foundational types shared across all Savant crates:
//! - Entity structs for all domain objects (profiles, documents, venues, ...)
//! - Status enums with state machine transitions
//! - ID prefix constants
//! - Cross-cutting error types
//! - CLI response types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
pub mod responses;
