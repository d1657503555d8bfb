//! Chat widget state machine.
//!
//! Three latches drive the widget: `open`, `is_loading_history` and
//! `is_typing`. Opening rebuilds the transcript from the backend (or a
//! canned greeting); sending appends the user's turn immediately and the
//! bot's turn once the ask call settles.
//!
//! All state lives in a [`tokio::sync::watch`] channel so a host UI can
//! redraw on every change. State is only touched between await points; no
//! lock is held while a request is in flight.

use crate::api::{AskReply, ChatbotApi, HistoryRecord};
use crate::config::WidgetConfig;
use std::sync::Arc;
use tokio::sync::watch;
use tourchat_core::Message;
use tourchat_session::{resolve_credential, SessionStore};

/// Everything a host needs to draw the widget.
#[derive(Debug, Clone, Default)]
pub struct WidgetSnapshot {
    /// The chat panel is visible.
    pub open: bool,
    /// A history load is in flight.
    pub is_loading_history: bool,
    /// An ask call is in flight.
    pub is_typing: bool,
    /// Contents of the input box.
    pub input: String,
    /// Oldest first.
    pub transcript: Vec<Message>,
    /// Bumped on every history load; only the newest load may settle.
    load_generation: u64,
    /// Bumped whenever the transcript is replaced wholesale.
    transcript_epoch: u64,
}

impl WidgetSnapshot {
    /// Whether the input box should accept a submission right now.
    pub fn can_submit(&self) -> bool {
        self.open && !self.is_loading_history && !self.is_typing
    }
}

/// How a history load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No credential; greeting shown without a network call.
    Anonymous,
    /// History restored from `records` backend records.
    Restored { records: usize },
    /// Signed in with no prior history; welcome-back shown.
    Empty,
    /// Credential rejected; both slots cleared, greeting shown.
    Unauthorized,
    /// Any other failure; greeting shown, credential kept.
    Failed,
    /// A newer load started before this one settled; result discarded.
    Superseded,
}

/// Why a submission was not dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Blank after trimming.
    Empty,
    /// The widget is closed.
    Closed,
    /// History is still loading.
    LoadingHistory,
    /// A previous message is still awaiting its reply.
    Busy,
    /// No quick reply at that index.
    UnknownSuggestion,
}

/// How a send ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing appended, no request issued.
    Ignored(IgnoreReason),
    /// The bot's reply was appended.
    Replied,
    /// The backend answered without a reply; the fallback text was appended.
    MissingReply,
    /// The call failed; the apology was appended.
    Failed,
}

/// Session-aware chat widget.
pub struct ChatWidget {
    api: Arc<dyn ChatbotApi>,
    sessions: Arc<dyn SessionStore>,
    config: WidgetConfig,
    state: watch::Sender<WidgetSnapshot>,
}

impl ChatWidget {
    /// Creates a closed widget with an empty transcript.
    pub fn new(
        api: Arc<dyn ChatbotApi>,
        sessions: Arc<dyn SessionStore>,
        config: WidgetConfig,
    ) -> Self {
        let (state, _) = watch::channel(WidgetSnapshot::default());
        Self {
            api,
            sessions,
            config,
            state,
        }
    }

    /// Canned texts and quick replies in use.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> WidgetSnapshot {
        self.state.borrow().clone()
    }

    /// Whether the panel is open.
    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    /// Whether a history load is in flight.
    pub fn is_loading_history(&self) -> bool {
        self.state.borrow().is_loading_history
    }

    /// Whether the bot is composing a reply.
    pub fn is_typing(&self) -> bool {
        self.state.borrow().is_typing
    }

    /// Copy of the transcript, oldest first.
    pub fn transcript(&self) -> Vec<Message> {
        self.state.borrow().transcript.clone()
    }

    /// Current contents of the input box.
    pub fn input(&self) -> String {
        self.state.borrow().input.clone()
    }

    /// Quick-reply labels offered under the transcript.
    pub fn suggestions(&self) -> &[String] {
        &self.config.suggestions
    }

    /// Replace the contents of the input box.
    pub fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.input = text);
    }

    // ── Open / close ───────────────────────────────────────────────────

    /// Open the widget and load history.
    ///
    /// Returns `None` when the widget was already open; history is only
    /// loaded on the closed -> open transition.
    pub async fn open(&self) -> Option<LoadOutcome> {
        let opened = self.state.send_if_modified(|s| {
            if s.open {
                return false;
            }
            s.open = true;
            true
        });
        if !opened {
            return None;
        }
        tracing::debug!("Widget opened");
        Some(self.load_history().await)
    }

    /// Close the widget. The transcript is kept until the next open.
    pub fn close(&self) {
        self.state.send_if_modified(|s| {
            let was_open = s.open;
            s.open = false;
            was_open
        });
    }

    // ── History loader ─────────────────────────────────────────────────

    /// Rebuild the transcript from scratch.
    ///
    /// Never fails: every error path ends in a canned bot message.
    pub async fn load_history(&self) -> LoadOutcome {
        let mut generation = 0;
        self.state.send_modify(|s| {
            s.load_generation += 1;
            s.is_loading_history = true;
            generation = s.load_generation;
        });
        let guard = LoadingGuard {
            state: &self.state,
            generation,
        };

        let (outcome, transcript) = self.fetch_transcript().await;

        if guard.settle(transcript) {
            tracing::info!(outcome = ?outcome, "History loaded");
            outcome
        } else {
            tracing::debug!(generation, "History load superseded");
            LoadOutcome::Superseded
        }
    }

    async fn fetch_transcript(&self) -> (LoadOutcome, Vec<Message>) {
        let Some(token) = resolve_credential(self.sessions.as_ref()).await else {
            return (LoadOutcome::Anonymous, vec![self.greeting()]);
        };

        match self.api.history(&token).await {
            Ok(records) if records.is_empty() => (
                LoadOutcome::Empty,
                vec![Message::bot(self.config.welcome_back.clone())],
            ),
            Ok(records) => (
                LoadOutcome::Restored {
                    records: records.len(),
                },
                flatten_history(records),
            ),
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("Stored credential rejected, signing out");
                if let Err(e) = self.sessions.clear_all().await {
                    tracing::warn!(error = %e, "Failed to clear stale credential");
                }
                (LoadOutcome::Unauthorized, vec![self.greeting()])
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load chat history");
                (LoadOutcome::Failed, vec![self.greeting()])
            }
        }
    }

    fn greeting(&self) -> Message {
        Message::bot(self.config.greeting.clone())
    }

    // ── Message dispatcher ─────────────────────────────────────────────

    /// Send whatever is in the input box.
    pub async fn submit(&self) -> SendOutcome {
        let text = self.input();
        self.send(&text).await
    }

    /// Send the quick-reply suggestion at `index`.
    pub async fn send_suggestion(&self, index: usize) -> SendOutcome {
        match self.config.suggestions.get(index) {
            Some(text) => self.send(text).await,
            None => SendOutcome::Ignored(IgnoreReason::UnknownSuggestion),
        }
    }

    /// Send `text` to the bot.
    ///
    /// The user's message is appended (and the input cleared) before the
    /// request starts; exactly one bot message follows once it settles.
    /// Ignored while closed, loading history, or already waiting on a reply.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored(IgnoreReason::Empty);
        }

        let mut rejected = None;
        let mut epoch = 0;
        self.state.send_if_modified(|s| {
            rejected = if !s.open {
                Some(IgnoreReason::Closed)
            } else if s.is_loading_history {
                Some(IgnoreReason::LoadingHistory)
            } else if s.is_typing {
                Some(IgnoreReason::Busy)
            } else {
                None
            };
            if rejected.is_some() {
                return false;
            }
            s.transcript.push(Message::user(text));
            s.input.clear();
            s.is_typing = true;
            epoch = s.transcript_epoch;
            true
        });
        if let Some(reason) = rejected {
            tracing::debug!(reason = ?reason, "Send ignored");
            return SendOutcome::Ignored(reason);
        }

        let guard = TypingGuard {
            state: &self.state,
            armed: true,
        };

        let token = resolve_credential(self.sessions.as_ref()).await;
        let (outcome, reply) = match self.api.ask(text, token.as_ref()).await {
            Ok(AskReply { reply: Some(reply) }) if !reply.is_empty() => {
                (SendOutcome::Replied, reply)
            }
            Ok(_) => (SendOutcome::MissingReply, self.config.missing_reply.clone()),
            Err(e) => {
                tracing::warn!(error = %e, "Ask request failed");
                (SendOutcome::Failed, self.config.apology.clone())
            }
        };

        if !guard.settle(epoch, Message::bot(reply)) {
            tracing::debug!("Transcript rebuilt while waiting; reply dropped");
        }
        outcome
    }
}

/// Each record becomes a user turn followed by a bot turn, in record order.
fn flatten_history(records: Vec<HistoryRecord>) -> Vec<Message> {
    records
        .into_iter()
        .flat_map(|r| [Message::user(r.user_message), Message::bot(r.bot_reply)])
        .collect()
}

/// Keeps `is_loading_history` honest if the load future is dropped.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<WidgetSnapshot>,
    generation: u64,
}

impl LoadingGuard<'_> {
    /// Install `transcript` if this is still the newest load.
    fn settle(self, transcript: Vec<Message>) -> bool {
        let generation = self.generation;
        self.state.send_if_modified(|s| {
            if s.load_generation != generation {
                return false;
            }
            s.transcript = transcript;
            s.transcript_epoch += 1;
            s.is_loading_history = false;
            true
        })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let generation = self.generation;
        self.state.send_if_modified(|s| {
            if s.load_generation == generation && s.is_loading_history {
                s.is_loading_history = false;
                true
            } else {
                false
            }
        });
    }
}

/// Clears `is_typing` on every exit path, including a dropped future.
struct TypingGuard<'a> {
    state: &'a watch::Sender<WidgetSnapshot>,
    armed: bool,
}

impl TypingGuard<'_> {
    /// Append the bot turn (unless the transcript was replaced) and clear
    /// the typing flag in one notification. Returns whether it was appended.
    fn settle(mut self, epoch: u64, reply: Message) -> bool {
        self.armed = false;
        let mut appended = false;
        self.state.send_modify(|s| {
            if s.transcript_epoch == epoch {
                s.transcript.push(reply);
                appended = true;
            }
            s.is_typing = false;
        });
        appended
    }
}

impl Drop for TypingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.state.send_modify(|s| s.is_typing = false);
        }
    }
}
