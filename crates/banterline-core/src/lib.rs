//! Decision, memory, and assembly core for Banterline.
//!
//! This crate defines the "ports" (the [`store::ConversationStore`],
//! [`llm::provider::ModelProvider`], and [`image::ImageFetcher`] traits)
//! and the pure policy around them: when to engage, how to keep a
//! bounded time-expiring history per participant, and how to assemble
//! that history into one ordered prompt payload. It depends only on
//! `banterline-types` -- never on any database or HTTP crate.

pub mod clock;
pub mod engine;
pub mod gateway;
pub mod image;
pub mod llm;
pub mod pacing;
pub mod persona;
pub mod postprocess;
pub mod store;
pub mod trigger;
