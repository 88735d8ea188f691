//! Shared domain types for Banterline.
//!
//! This crate holds the data shapes every other crate agrees on:
//! participant identifiers, conversation turns and content parts,
//! chat events and trigger decisions, configuration, and the error
//! taxonomy. It has no I/O dependencies.

pub mod config;
pub mod error;
pub mod event;
pub mod participant;
pub mod turn;
