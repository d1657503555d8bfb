//! Core types and error definitions for the Tourchat widget.
//!
//! This crate provides the foundational types shared across all Tourchat crates,
//! including error handling, conversation messages, and the rich-text renderer
//! that turns bot replies into displayable segments.
//!
//! # Main types
//!
//! - [`TourchatError`]: Unified error enum for all Tourchat subsystems.
//! - [`TourchatResult`]: Convenience alias for `Result<T, TourchatError>`.
//! - [`Role`]: Message author (user or bot).
//! - [`Message`]: A single turn within the widget transcript.
//! - [`Segment`]: One rendered piece of message content.

/// Error types shared across the workspace.
pub mod error;
/// Conversation messages.
pub mod message;
/// Tokenizer for bot reply text.
pub mod render;

pub use error::{TourchatError, TourchatResult};
pub use message::{Message, Role};
pub use render::{render, Segment, Segments, TourId};
