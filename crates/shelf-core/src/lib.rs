//! # shelf-core
//!
//! Core types for the Shelf circulation engine.
//!
//! This crate provides the foundational types shared across all Shelf crates:
//! - Entity structs for holdings, members, reservations, and loans
//! - Reservation and loan status enums with their allowed transitions
//! - The due-date policy (`LoanPeriod`) with the "unlimited" sentinel
//! - The status workflow capability (`Workflow`, `WorkflowDefinition`, `WorkflowRegistry`)
//! - Request/response shapes for the circulation request surface
//! - Cross-cutting error types
//! - An injectable time source

pub mod api;
pub mod clock;
pub mod due;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod workflow;
