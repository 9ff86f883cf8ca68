//! Expo push notification client.
//!
//! Talks to Expo's push HTTP/2 endpoint. Only tickets (acceptance
//! results) are handled here; receipt polling is left to whoever needs
//! delivery confirmation.

use std::fmt;

use serde::{Deserialize, Serialize};

use notify_core::SmsError;

/// Expo's push endpoint.
pub const DEFAULT_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Expo rejects requests with more messages than this.
pub const MAX_BATCH: usize = 100;

/// A validated Expo push token.
///
/// Expo issues tokens of the form `ExponentPushToken[...]` (classic) or
/// `ExpoPushToken[...]`; anything else is rejected before a request is made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PushToken(String);

impl PushToken {
    pub fn parse(raw: &str) -> Result<Self, SmsError> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix("ExponentPushToken[")
            .or_else(|| trimmed.strip_prefix("ExpoPushToken["))
            .and_then(|rest| rest.strip_suffix(']'));
        match inner {
            Some(body) if !body.is_empty() => Ok(Self(trimmed.to_string())),
            _ => Err(SmsError::Invalid(format!(
                "not an Expo push token: {}",
                raw
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PushToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PushToken {
    type Error = SmsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PushToken> for String {
    fn from(token: PushToken) -> String {
        token.0
    }
}

/// One push notification.
#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub to: PushToken,
    pub title: String,
    pub body: String,
    /// Arbitrary payload handed to the app.
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(rename = "channelId", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
}

impl PushMessage {
    /// Message with the defaults the app registers: default sound, high
    /// priority, the `default` Android channel.
    pub fn new(to: PushToken, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to,
            title: title.into(),
            body: body.into(),
            data: serde_json::json!({}),
            sound: Some("default".to_string()),
            badge: None,
            priority: Some("high".to_string()),
            channel_id: Some("default".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    data: Vec<PushTicket>,
}

/// Expo's per-message acceptance result.
#[derive(Debug, Clone, Deserialize)]
pub struct PushTicket {
    /// `"ok"` or `"error"`.
    pub status: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl PushTicket {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    /// Machine-readable error code, e.g. `DeviceNotRegistered`.
    pub fn error_code(&self) -> Option<&str> {
        self.details.as_ref()?.get("error")?.as_str()
    }
}

/// Expo push client.
#[derive(Clone, Debug)]
pub struct ExpoPushClient {
    push_url: String,
    access_token: Option<String>,
    http: reqwest::Client,
}

impl Default for ExpoPushClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpoPushClient {
    /// Client without an access token. Enough unless the Expo project
    /// has enhanced push security enabled.
    pub fn new() -> Self {
        Self::with_push_url(None, DEFAULT_PUSH_URL.to_string())
    }

    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self::with_push_url(Some(token.into()), DEFAULT_PUSH_URL.to_string())
    }

    /// Client against a custom endpoint; override for testing/mocking.
    pub fn with_push_url(access_token: Option<String>, push_url: String) -> Self {
        Self {
            push_url,
            access_token,
            http: reqwest::Client::new(),
        }
    }

    /// Sends a single notification and returns its ticket.
    ///
    /// An error ticket is turned into `SmsError::Provider`, so `Ok`
    /// means Expo accepted the message for delivery.
    pub async fn send(&self, message: &PushMessage) -> Result<PushTicket, SmsError> {
        let mut tickets = self.post_messages(std::slice::from_ref(message)).await?;
        let ticket = tickets
            .pop()
            .ok_or_else(|| SmsError::Unexpected("push response carried no ticket".into()))?;

        if !ticket.is_ok() {
            let reason = ticket
                .message
                .clone()
                .or_else(|| ticket.error_code().map(|c| c.to_string()))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(SmsError::Provider(format!("push ticket error: {}", reason)));
        }
        tracing::info!(
            "push accepted: ticket={} to={}",
            ticket.id.as_deref().unwrap_or("-"),
            message.to
        );
        Ok(ticket)
    }

    /// Sends up to [`MAX_BATCH`] notifications in one request.
    ///
    /// Returns one ticket per message, in order. Error tickets are
    /// returned, not raised, so a caller can tell which recipients need
    /// attention (e.g. `DeviceNotRegistered` means drop the token).
    pub async fn send_batch(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>, SmsError> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }
        if messages.len() > MAX_BATCH {
            return Err(SmsError::Invalid(format!(
                "batch of {} exceeds the {} message limit, split it",
                messages.len(),
                MAX_BATCH
            )));
        }

        let tickets = self.post_messages(messages).await?;
        let failed = tickets.iter().filter(|t| !t.is_ok()).count();
        if failed > 0 {
            tracing::warn!("push batch: {}/{} tickets failed", failed, tickets.len());
        }
        Ok(tickets)
    }

    /// The endpoint accepts one message or an array; we always send the
    /// array form so the response shape stays uniform.
    async fn post_messages(&self, messages: &[PushMessage]) -> Result<Vec<PushTicket>, SmsError> {
        let mut req = self
            .http
            .post(&self.push_url)
            .header("accept", "application/json")
            .header("accept-encoding", "gzip, deflate")
            .json(&messages);
        if let Some(token) = &self.access_token {
            req = req.bearer_auth(token);
        }

        let res = req.send().await.map_err(|e| SmsError::Http(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SmsError::Provider(format!("HTTP {}: {}", status, body)));
        }

        let parsed: PushResponse = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;
        Ok(parsed.data)
    }
}
