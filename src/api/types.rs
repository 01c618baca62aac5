use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

pub const WHATSAPP_USER_SUFFIX: &str = "@s.whatsapp.net";

/// Connection state as reported by the backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Connecting,
    WaitingQr,
    Close,
    #[default]
    #[serde(other)]
    Disconnected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Connecting => "connecting",
            SessionStatus::WaitingQr => "waiting_qr",
            SessionStatus::Close => "close",
            SessionStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    #[serde(default)]
    pub status: SessionStatus,
    #[serde(default)]
    pub is_connected: bool,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, rename = "hasQR")]
    pub has_qr: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QrResponse {
    pub success: bool,
    #[serde(default)]
    pub qr_image: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of every mutating endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Ack {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Ack {
    pub fn reason(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "Unknown error".to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatStats {
    pub jid: String,
    #[serde(default)]
    pub push_name: String,
    #[serde(default)]
    pub msg_count: u64,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_active: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalStats {
    #[serde(default)]
    pub requests: u64,
    #[serde(default)]
    pub responses: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub success: bool,
    #[serde(default)]
    pub stats: Vec<ChatStats>,
    #[serde(default)]
    pub global: GlobalStats,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    #[serde(other)]
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Model latency in milliseconds, assistant turns only
    #[serde(default)]
    pub latency: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKeyItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub key_value: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContactItem {
    pub jid: String,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default = "default_allowed")]
    pub is_allowed: bool,
}

fn default_allowed() -> bool {
    true
}

impl ContactItem {
    /// Phone number part of the jid
    pub fn number(&self) -> &str {
        self.jid.split('@').next().unwrap_or(&self.jid)
    }

    pub fn display_name(&self) -> &str {
        match self.push_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.number(),
        }
    }
}

/// Which senders the bot answers.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    #[default]
    All,
    Specific,
}

impl TargetMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetMode::All => "all",
            TargetMode::Specific => "specific",
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TargetMode::All),
            "specific" => Ok(TargetMode::Specific),
            other => Err(format!("unknown target mode '{}', expected 'all' or 'specific'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptsResponse {
    pub success: bool,
    #[serde(default)]
    pub prompts: Vec<PromptItem>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeysResponse {
    pub success: bool,
    #[serde(default)]
    pub keys: Vec<ApiKeyItem>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactsResponse {
    pub success: bool,
    #[serde(default)]
    pub contacts: Vec<ContactItem>,
    #[serde(default)]
    pub mode: TargetMode,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest<'a> {
    pub name: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyRequest<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_value: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRequest<'a> {
    pub jid: &'a str,
    pub push_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactRename<'a> {
    pub push_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeRequest {
    pub mode: TargetMode,
}

/// Accepts RFC 3339 strings, epoch milliseconds, or null.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(i64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Millis(ms)) => Utc.timestamp_millis_opt(ms).single(),
        Some(Raw::Text(text)) => DateTime::parse_from_rfc3339(&text)
            .map(|dt| dt.with_timezone(&Utc))
            .ok(),
        None => None,
    })
}
