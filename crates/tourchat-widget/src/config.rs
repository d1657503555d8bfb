use serde::{Deserialize, Serialize};
use std::time::Duration;
use tourchat_core::{TourId, TourchatError, TourchatResult};

/// Where the chatbot backend lives and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Root of the chatbot API, without a trailing path.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Path of the history endpoint, relative to `base_url`.
    #[serde(default = "default_history_path")]
    pub history_path: String,
    /// Path of the ask endpoint, relative to `base_url`.
    #[serde(default = "default_ask_path")]
    pub ask_path: String,
    /// Per-request timeout. A timeout counts as a transport failure.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/chatbot".to_string()
}

fn default_history_path() -> String {
    "/history".to_string()
}

fn default_ask_path() -> String {
    "/ask".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            history_path: default_history_path(),
            ask_path: default_ask_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Config pointing at `base_url` with default paths and timeout.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Full URL of the history endpoint.
    pub fn history_url(&self) -> String {
        join_url(&self.base_url, &self.history_path)
    }

    /// Full URL of the ask endpoint.
    pub fn ask_url(&self) -> String {
        join_url(&self.base_url, &self.ask_path)
    }

    /// Per-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Rejects an empty base URL or a zero timeout.
    pub fn validate(&self) -> TourchatResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(TourchatError::Config("api.base_url must not be empty".into()));
        }
        if self.timeout_secs == 0 {
            return Err(TourchatError::Config(
                "api.timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Canned texts and presentation settings for the widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Shown when there is no history to restore (anonymous or failed load).
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Shown to a signed-in user with an empty history.
    #[serde(default = "default_welcome_back")]
    pub welcome_back: String,
    /// Bot message appended when the ask call fails.
    #[serde(default = "default_apology")]
    pub apology: String,
    /// Bot message appended when the backend answers without a `reply`.
    #[serde(default = "default_missing_reply")]
    pub missing_reply: String,
    /// Quick-reply prompts offered next to the input box.
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<String>,
    /// Public site root used to build tour links.
    #[serde(default = "default_site_url")]
    pub site_url: String,
}

fn default_greeting() -> String {
    "Chào anh/chị! Em là trợ lý du lịch của Tourchat. Anh/chị muốn tìm tour đi đâu ạ?".to_string()
}

fn default_welcome_back() -> String {
    "Chào mừng anh/chị quay lại! Em có thể giúp gì cho chuyến đi sắp tới ạ?".to_string()
}

fn default_apology() -> String {
    "Xin lỗi, hệ thống đang gặp sự cố. Anh/chị vui lòng thử lại sau ít phút nhé!".to_string()
}

fn default_missing_reply() -> String {
    "Xin lỗi, em chưa có câu trả lời cho câu hỏi này.".to_string()
}

fn default_suggestions() -> Vec<String> {
    vec![
        "Tour dưới 5 triệu 💸".to_string(),
        "Tour biển mùa hè 🏖️".to_string(),
        "Tour nước ngoài ✈️".to_string(),
    ]
}

fn default_site_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            welcome_back: default_welcome_back(),
            apology: default_apology(),
            missing_reply: default_missing_reply(),
            suggestions: default_suggestions(),
            site_url: default_site_url(),
        }
    }
}

impl WidgetConfig {
    /// Absolute link to a tour detail page.
    pub fn tour_url(&self, id: TourId) -> String {
        join_url(&self.site_url, &id.path())
    }
}
