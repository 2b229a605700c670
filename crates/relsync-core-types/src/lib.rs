//! Core types shared across relsync facilities
//!
//! This crate provides the foundational constants used by both the error
//! and logging facilities:
//!
//! - **Schema constants**: Canonical field keys and event names

pub mod schema;
