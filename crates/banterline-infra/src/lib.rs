//! Infrastructure implementations for Banterline.
//!
//! Everything that talks to the outside world lives here: the SQLite
//! conversation store, the Gemini model adapter, the HTTP image
//! fetcher, and the configuration loader. Each implements a port
//! defined in `banterline-core`.

pub mod config;
pub mod image;
pub mod llm;
pub mod sqlite;
