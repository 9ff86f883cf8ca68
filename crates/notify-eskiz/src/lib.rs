//! Eskiz.uz REST client.
//!
//! Covers the slice of the gateway API the Osonish tooling needs:
//! `/auth/login`, `/auth/user`, `/user/get-limit`, `/message/sms/send`
//! and `/message/sms/send-batch`. Bearer tokens are cached in-process
//! and renewed shortly before the gateway would expire them.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use notify_core::{fallback_id, normalize_phone, SendReport, SmsError};

const PROVIDER: &str = "eskiz";

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://notify.eskiz.uz/api";

/// Tokens are valid for 30 days; we renew after 29 to stay clear of the edge.
const TOKEN_LIFETIME: Duration = Duration::from_secs(29 * 24 * 60 * 60);

/// Renew this much before [`TOKEN_LIFETIME`] runs out.
const TOKEN_REFRESH_BUFFER: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CachedToken {
    token: String,
    acquired_at: Instant,
}

impl CachedToken {
    fn is_stale(&self) -> bool {
        self.acquired_at.elapsed() >= TOKEN_LIFETIME.saturating_sub(TOKEN_REFRESH_BUFFER)
    }
}

/// Eskiz.uz REST client.
///
/// Cloning is cheap; clones share the HTTP connection pool and the
/// cached token.
#[derive(Clone, Debug)]
pub struct EskizClient {
    /// Account email used for `/auth/login`.
    pub email: String,
    /// Account password used for `/auth/login`.
    pub password: String,
    /// API base URL; override for testing/mocking.
    pub base_url: String,
    http: reqwest::Client,
    token: Arc<Mutex<Option<CachedToken>>>,
}

impl EskizClient {
    pub fn new<S: Into<String>>(email: S, password: S) -> Self {
        Self::with_base_url(email, password, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url<S: Into<String>>(email: S, password: S, base_url: String) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            base_url,
            http: reqwest::Client::new(),
            token: Arc::new(Mutex::new(None)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Authenticates against `/auth/login` and caches the bearer token.
    ///
    /// Returns the fresh token. Most callers never need this directly;
    /// every authorized call obtains a token on demand.
    pub async fn login(&self) -> Result<String, SmsError> {
        let payload = LoginPayload {
            email: &self.email,
            password: &self.password,
        };
        let res = self
            .http
            .post(self.url("/auth/login"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SmsError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let raw: serde_json::Value = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;
        let token = raw
            .get("data")
            .and_then(|d| d.get("token"))
            .and_then(|t| t.as_str())
            .map(|t| t.to_string())
            .ok_or_else(|| SmsError::Auth(format!("login response carried no token: {}", raw)))?;

        tracing::debug!("eskiz token refreshed");
        *self.token.lock().await = Some(CachedToken {
            token: token.clone(),
            acquired_at: Instant::now(),
        });
        Ok(token)
    }

    /// Returns the cached token, logging in first when it is missing or stale.
    async fn ensure_token(&self) -> Result<String, SmsError> {
        {
            let cached = self.token.lock().await;
            if let Some(entry) = cached.as_ref() {
                if !entry.is_stale() {
                    return Ok(entry.token.clone());
                }
            }
        }
        tracing::debug!("eskiz token missing or stale, re-authenticating");
        self.login().await
    }

    /// Attaches a bearer token and sends the request.
    ///
    /// A 401 drops the cached token so the next call starts with a fresh
    /// login; the current call still fails, callers do not retry.
    async fn send_authorized(
        &self,
        req: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, SmsError> {
        let token = self.ensure_token().await?;
        let res = req
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| SmsError::Http(e.to_string()))?;

        if res.status() == reqwest::StatusCode::UNAUTHORIZED {
            self.token.lock().await.take();
            let body = res.text().await.unwrap_or_default();
            return Err(SmsError::Auth(format!("HTTP 401: {}", body)));
        }
        Ok(res)
    }

    /// Fetches the account profile from `/auth/user`.
    pub async fn user_info(&self) -> Result<UserInfo, SmsError> {
        let res = self
            .send_authorized(self.http.get(self.url("/auth/user")))
            .await?;

        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }
        res.json().await.map_err(|e| SmsError::Http(e.to_string()))
    }

    /// Fetches the remaining SMS balance from `/user/get-limit`.
    pub async fn balance(&self) -> Result<i64, SmsError> {
        let res = self
            .send_authorized(self.http.get(self.url("/user/get-limit")))
            .await?;

        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }

        let raw: serde_json::Value = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;
        raw.get("balance")
            .and_then(|v| v.as_i64())
            .or_else(|| {
                raw.get("data")
                    .and_then(|d| d.get("balance"))
                    .and_then(|v| v.as_i64())
            })
            .ok_or_else(|| SmsError::Unexpected(format!("no balance in response: {}", raw)))
    }

    /// Submits a single SMS via `/message/sms/send`.
    ///
    /// The recipient is normalized before the request goes out.
    pub async fn send(&self, req: SendSms<'_>) -> Result<SendReport, SmsError> {
        let to = normalize_phone(req.to);
        let payload = SendPayload {
            mobile_phone: &to,
            message: req.text,
            from: req.from,
            callback_url: req.callback_url,
        };
        let res = self
            .send_authorized(self.http.post(self.url("/message/sms/send")).json(&payload))
            .await?;

        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }

        let raw_text = res.text().await.map_err(|e| SmsError::Http(e.to_string()))?;
        let raw_json: serde_json::Value =
            serde_json::from_str(&raw_text).unwrap_or_else(|_| serde_json::json!({ "raw": raw_text }));

        // The gateway has answered with both numeric and string ids.
        let id = raw_json
            .get("id")
            .and_then(|v| {
                v.as_str()
                    .map(|s| s.to_string())
                    .or_else(|| v.as_i64().map(|n| n.to_string()))
            })
            .unwrap_or_else(fallback_id);

        tracing::info!("sms submitted: id={} to={}", id, to);
        Ok(SendReport {
            id,
            provider: PROVIDER,
            raw: raw_json,
        })
    }

    /// Submits a batch via `/message/sms/send-batch`.
    ///
    /// Recipients are normalized; `dispatch_id` groups the batch in the
    /// gateway's delivery reports.
    pub async fn send_batch(
        &self,
        messages: &[BatchMessage],
        from: Option<&str>,
        dispatch_id: &str,
    ) -> Result<BatchReport, SmsError> {
        if messages.is_empty() {
            return Err(SmsError::Invalid("batch contains no messages".into()));
        }

        let normalized: Vec<BatchMessage> = messages
            .iter()
            .map(|m| BatchMessage {
                user_sms_id: m.user_sms_id.clone(),
                to: normalize_phone(&m.to),
                text: m.text.clone(),
            })
            .collect();
        let payload = BatchPayload {
            messages: &normalized,
            from,
            dispatch_id,
        };
        let res = self
            .send_authorized(
                self.http
                    .post(self.url("/message/sms/send-batch"))
                    .json(&payload),
            )
            .await?;

        if !res.status().is_success() {
            return Err(provider_error(res).await);
        }

        let raw: serde_json::Value = res.json().await.map_err(|e| SmsError::Http(e.to_string()))?;
        tracing::info!(
            "sms batch submitted: dispatch_id={} messages={}",
            dispatch_id,
            normalized.len()
        );
        Ok(BatchReport {
            dispatch_id: dispatch_id.to_string(),
            provider: PROVIDER,
            raw,
        })
    }
}

async fn provider_error(res: reqwest::Response) -> SmsError {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    SmsError::Provider(format!("HTTP {}: {}", status, body))
}

/// A single outbound SMS.
#[derive(Debug, Clone, Serialize)]
pub struct SendSms<'a> {
    pub to: &'a str,
    pub text: &'a str,
    /// Registered sender name; the account default applies when absent.
    pub from: Option<&'a str>,
    /// Delivery status callback URL.
    pub callback_url: Option<&'a str>,
}

impl<'a> SendSms<'a> {
    pub fn new(to: &'a str, text: &'a str) -> Self {
        Self {
            to,
            text,
            from: None,
            callback_url: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SendPayload<'a> {
    mobile_phone: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<&'a str>,
}

/// One entry of a batch send.
#[derive(Debug, Clone, Serialize)]
pub struct BatchMessage {
    /// Client-side id, echoed back in delivery reports.
    pub user_sms_id: String,
    pub to: String,
    pub text: String,
}

impl BatchMessage {
    /// Batch entry with a generated `user_sms_id`.
    pub fn new(to: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_id(fallback_id(), to, text)
    }

    pub fn with_id(
        user_sms_id: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            user_sms_id: user_sms_id.into(),
            to: to.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchPayload<'a> {
    messages: &'a [BatchMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    dispatch_id: &'a str,
}

/// Result of a batch submission.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub dispatch_id: String,
    pub provider: &'static str,
    pub raw: serde_json::Value,
}

impl BatchReport {
    /// Gateway status message, when the response carries one.
    pub fn message(&self) -> Option<&str> {
        self.raw.get("message").and_then(|v| v.as_str())
    }
}

/// Account profile returned by `/auth/user`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Price per SMS to Uzbek networks, in so'm.
    #[serde(default)]
    pub uz_price: Option<f64>,
    #[serde(default)]
    pub ru_price: Option<f64>,
    #[serde(default)]
    pub test_phone: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn send_payload_uses_gateway_field_names() {
        let payload = SendPayload {
            mobile_phone: "998901234567",
            message: "hello",
            from: Some("OsonIsh"),
            callback_url: None,
        };
        let j = serde_json::to_value(&payload).unwrap();
        assert_eq!(j["mobile_phone"], "998901234567");
        assert_eq!(j["message"], "hello");
        assert_eq!(j["from"], "OsonIsh");
        assert!(j.get("callback_url").is_none());
    }

    #[test]
    fn batch_payload_shape() {
        let messages = vec![
            BatchMessage::with_id("a-1", "998901234567", "hi"),
            BatchMessage::with_id("a-2", "998907654321", "hi"),
        ];
        let payload = BatchPayload {
            messages: &messages,
            from: None,
            dispatch_id: "batch-7",
        };
        let j = serde_json::to_value(&payload).unwrap();
        assert_eq!(j["dispatch_id"], "batch-7");
        assert_eq!(j["messages"][0]["user_sms_id"], "a-1");
        assert_eq!(j["messages"][1]["to"], "998907654321");
        assert!(j.get("from").is_none());
    }

    #[test]
    fn batch_message_gets_distinct_ids() {
        let a = BatchMessage::new("998901234567", "hi");
        let b = BatchMessage::new("998901234567", "hi");
        assert_ne!(a.user_sms_id, b.user_sms_id);
    }

    #[test]
    fn parses_user_info_with_extra_fields() {
        let raw = json!({
            "id": 1234,
            "name": "Osonish LLC",
            "email": "ops@osonish.uz",
            "role": "user",
            "status": "active",
            "uz_price": 115.0,
            "test_phone": "998999999999",
            "sms_api_login": "ignored-by-us"
        });
        let info: UserInfo = serde_json::from_value(raw).unwrap();
        assert_eq!(info.id, 1234);
        assert_eq!(info.role.as_deref(), Some("user"));
        assert_eq!(info.uz_price, Some(115.0));
        assert_eq!(info.extra["sms_api_login"], "ignored-by-us");
    }

    #[test]
    fn extracts_numeric_and_string_ids() {
        for raw in [json!({"id": 4385062}), json!({"id": "4385062"})] {
            let id = raw
                .get("id")
                .and_then(|v| {
                    v.as_str()
                        .map(|s| s.to_string())
                        .or_else(|| v.as_i64().map(|n| n.to_string()))
                })
                .unwrap();
            assert_eq!(id, "4385062");
        }
    }

    #[test]
    fn stale_token_detection() {
        let fresh = CachedToken {
            token: "tok".into(),
            acquired_at: Instant::now(),
        };
        assert!(!fresh.is_stale());
    }
}
