//! Session-aware chat widget for the Tourchat booking site.
//!
//! # Main types
//!
//! - [`ChatWidget`]: Open/close, history loading and message dispatch.
//! - [`ChatbotApi`]: Backend contract; [`HttpChatbotApi`] is the REST client.
//! - [`WidgetConfig`] / [`ApiConfig`]: Canned texts and backend location.
//! - [`WidgetSnapshot`]: Observable widget state.

/// Chatbot backend contract and REST client.
pub mod api;
/// Backend and presentation configuration.
pub mod config;
/// The widget state machine.
pub mod widget;

pub use api::{AskReply, ChatbotApi, HistoryRecord, HttpChatbotApi};
pub use config::{ApiConfig, WidgetConfig};
pub use widget::{ChatWidget, IgnoreReason, LoadOutcome, SendOutcome, WidgetSnapshot};
