use crate::config::ApiConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tourchat_core::{TourchatError, TourchatResult};
use tourchat_session::Token;

/// One prior exchange as returned by the history endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// What the user asked.
    #[serde(alias = "message", alias = "question")]
    pub user_message: String,
    /// What the bot answered.
    #[serde(alias = "reply", alias = "answer")]
    pub bot_reply: String,
}

impl HistoryRecord {
    /// Builds a record from one question and its answer.
    pub fn new(user_message: impl Into<String>, bot_reply: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            bot_reply: bot_reply.into(),
        }
    }
}

/// Body of a successful ask call. `reply` may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AskReply {
    /// Bot text, or `None` when the backend sent nothing usable.
    #[serde(default)]
    pub reply: Option<String>,
}

impl AskReply {
    /// A reply carrying `reply` as its text.
    pub fn text(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
        }
    }
}

/// The chatbot backend as seen by the widget.
#[async_trait]
pub trait ChatbotApi: Send + Sync {
    /// Prior exchanges for the bearer of `token`, oldest first.
    ///
    /// A rejected credential must surface as [`TourchatError::Unauthorized`].
    async fn history(&self, token: &Token) -> TourchatResult<Vec<HistoryRecord>>;

    /// Ask the bot. Anonymous when `token` is `None`.
    async fn ask(&self, message: &str, token: Option<&Token>) -> TourchatResult<AskReply>;
}

// ── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HistoryBody {
    List(Vec<HistoryRecord>),
    Wrapped { history: Vec<HistoryRecord> },
}

impl HistoryBody {
    fn into_records(self) -> Vec<HistoryRecord> {
        match self {
            HistoryBody::List(records) | HistoryBody::Wrapped { history: records } => records,
        }
    }
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    message: &'a str,
}

// ── Implementation ──────────────────────────────────────────────────────────

/// REST client for the chatbot backend.
pub struct HttpChatbotApi {
    config: ApiConfig,
    http: reqwest::Client,
}

impl HttpChatbotApi {
    /// Validates `config` and builds the underlying HTTP client.
    pub fn new(config: ApiConfig) -> TourchatResult<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TourchatError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn with_auth(
        request: reqwest::RequestBuilder,
        token: Option<&Token>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => request.header("Authorization", token.bearer()),
            None => request,
        }
    }
}

#[async_trait]
impl ChatbotApi for HttpChatbotApi {
    async fn history(&self, token: &Token) -> TourchatResult<Vec<HistoryRecord>> {
        let url = self.config.history_url();
        let request = Self::with_auth(self.http.get(&url), Some(token));

        let resp = request
            .send()
            .await
            .map_err(|e| TourchatError::Http(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(TourchatError::Unauthorized(format!(
                "history endpoint returned {status}"
            )));
        }
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TourchatError::Http(format!(
                "History API error {status}: {error_body}"
            )));
        }

        let body: HistoryBody = resp
            .json()
            .await
            .map_err(|e| TourchatError::Http(format!("Malformed history response: {e}")))?;
        Ok(body.into_records())
    }

    async fn ask(&self, message: &str, token: Option<&Token>) -> TourchatResult<AskReply> {
        let url = self.config.ask_url();
        let request = Self::with_auth(self.http.post(&url), token);

        let resp = request
            .json(&AskRequest { message })
            .send()
            .await
            .map_err(|e| TourchatError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(TourchatError::Http(format!(
                "Ask API error {status}: {error_body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| TourchatError::Http(format!("Malformed ask response: {e}")))
    }
}
