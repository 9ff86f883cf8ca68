//! Phone verification flow: issue a code, deliver it, check the guess.
//!
//! Delivery depends on [`SmsMode`]: development logs the code locally so
//! no balance is spent, production renders the approved template and
//! sends it through the gateway. The reserved review number always gets
//! the fixed code and never reaches the gateway.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use notify_core::{
    generate_code, is_test_number, normalize_phone, CodeStore, CodeTemplate, SmsError, VerifyError,
    TEST_CODE,
};
use notify_eskiz::{EskizClient, SendSms};

use crate::config::{AppConfig, SmsMode};

/// How often the cleanup task drops expired codes.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(300);

/// Errors from the verification flow.
#[derive(Debug, thiserror::Error)]
pub enum CodeFlowError {
    /// Local policy refused, or the guess failed.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// Talking to the gateway failed.
    #[error(transparent)]
    Sms(#[from] SmsError),
}

/// How an issued code reached (or deliberately did not reach) the user.
#[derive(Debug, Clone)]
pub enum CodeDelivery {
    /// Development mode: the code was logged, nothing was sent.
    Logged { code: String },
    /// Reserved review number: the fixed code applies, nothing was sent.
    FixedTestCode,
    /// Delivered through the gateway.
    Sms { message_id: String },
}

/// Outcome of a successful [`VerificationService::send_code`].
#[derive(Debug, Clone)]
pub struct IssuedCode {
    /// Normalized recipient number.
    pub phone: String,
    pub delivery: CodeDelivery,
}

/// Issues verification codes and checks guesses against them.
///
/// Codes live in process memory; the service is meant to be shared
/// (one per process) rather than recreated per request.
pub struct VerificationService {
    client: EskizClient,
    store: CodeStore,
    template: CodeTemplate,
    sender: String,
    mode: SmsMode,
}

impl VerificationService {
    /// Service wired from configuration.
    pub fn new(config: &AppConfig) -> Self {
        let client = EskizClient::with_base_url(
            config.eskiz.email.clone(),
            config.eskiz.password.clone(),
            config.eskiz.base_url.clone(),
        );
        Self::with_parts(
            client,
            CodeStore::new(),
            config.sms.template.clone(),
            config.sms.sender.clone(),
            config.mode(),
        )
    }

    /// Fully explicit constructor, also the seam tests use.
    pub fn with_parts(
        client: EskizClient,
        store: CodeStore,
        template: CodeTemplate,
        sender: String,
        mode: SmsMode,
    ) -> Self {
        Self {
            client,
            store,
            template,
            sender,
            mode,
        }
    }

    pub fn mode(&self) -> SmsMode {
        self.mode
    }

    /// Issues a verification code for `raw_phone` and delivers it
    /// according to the current mode.
    pub async fn send_code(&self, raw_phone: &str) -> Result<IssuedCode, CodeFlowError> {
        let phone = normalize_phone(raw_phone);

        // Refuse up front so production mode cannot spend an SMS on a
        // code the store would then reject.
        if let Some(wait) = self.store.cooldown_remaining(&phone) {
            return Err(VerifyError::CooldownActive {
                wait_secs: wait.as_secs().max(1),
            }
            .into());
        }

        if is_test_number(&phone) {
            self.store.begin(&phone, TEST_CODE)?;
            info!("test number {}: fixed code active, no sms sent", phone);
            return Ok(IssuedCode {
                phone,
                delivery: CodeDelivery::FixedTestCode,
            });
        }

        let code = generate_code();
        match self.mode {
            SmsMode::Development => {
                self.store.begin(&phone, &code)?;
                info!("development mode: code for {} is {}", phone, code);
                Ok(IssuedCode {
                    phone,
                    delivery: CodeDelivery::Logged { code },
                })
            }
            SmsMode::Production => {
                let text = self.template.render(&code);
                let report = self
                    .client
                    .send(SendSms {
                        to: &phone,
                        text: &text,
                        from: Some(&self.sender),
                        callback_url: None,
                    })
                    .await?;
                // Only a delivered code becomes checkable.
                self.store.begin(&phone, &code)?;
                Ok(IssuedCode {
                    phone,
                    delivery: CodeDelivery::Sms {
                        message_id: report.id,
                    },
                })
            }
        }
    }

    /// Checks a user-supplied code for `raw_phone`.
    pub fn verify_code(&self, raw_phone: &str, input: &str) -> Result<(), VerifyError> {
        self.store.check(&normalize_phone(raw_phone), input)
    }

    /// Periodically drops expired codes. Runs until the task is aborted.
    pub async fn cleanup_task(&self) {
        loop {
            sleep(SWEEP_INTERVAL).await;
            let removed = self.store.sweep();
            if removed > 0 {
                debug!("dropped {} expired verification code(s)", removed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_service() -> VerificationService {
        // The client never sees traffic in development mode.
        let client = EskizClient::with_base_url("t@e.uz", "pw", "http://127.0.0.1:9".to_string());
        VerificationService::with_parts(
            client,
            CodeStore::new(),
            CodeTemplate::default(),
            "OsonIsh".to_string(),
            SmsMode::Development,
        )
    }

    #[tokio::test]
    async fn test_dev_mode_logs_code_instead_of_sending() {
        let service = dev_service();
        let issued = service.send_code("+998 90 123-45-67").await.unwrap();

        assert_eq!(issued.phone, "998901234567");
        let code = match issued.delivery {
            CodeDelivery::Logged { code } => code,
            other => panic!("expected logged delivery, got {:?}", other),
        };
        assert_eq!(code.len(), 6);
        assert_eq!(service.verify_code("998901234567", &code), Ok(()));
    }

    #[tokio::test]
    async fn test_raw_and_normalized_forms_are_the_same_number() {
        let service = dev_service();
        let issued = service.send_code("901234567").await.unwrap();
        let code = match issued.delivery {
            CodeDelivery::Logged { code } => code,
            other => panic!("expected logged delivery, got {:?}", other),
        };
        // Verification accepts any input form of the same number.
        assert_eq!(service.verify_code("+998 90 123 45 67", &code), Ok(()));
    }

    #[tokio::test]
    async fn test_review_number_uses_fixed_code() {
        let service = dev_service();
        let issued = service.send_code("998999999999").await.unwrap();

        assert!(matches!(issued.delivery, CodeDelivery::FixedTestCode));
        assert_eq!(service.verify_code("998999999999", TEST_CODE), Ok(()));
    }

    #[tokio::test]
    async fn test_resend_within_cooldown_is_refused() {
        let service = dev_service();
        service.send_code("998901234567").await.unwrap();

        let err = service.send_code("998901234567").await.unwrap_err();
        assert!(matches!(
            err,
            CodeFlowError::Verify(VerifyError::CooldownActive { .. })
        ));
    }

    #[tokio::test]
    async fn test_wrong_guesses_eventually_lock_out() {
        let service = dev_service();
        service.send_code("998901234567").await.unwrap();

        // Generated codes start at 100000, so this guess can never match.
        for remaining in [2u32, 1, 0] {
            assert_eq!(
                service.verify_code("998901234567", "000000"),
                Err(VerifyError::WrongCode { remaining })
            );
        }
        assert_eq!(
            service.verify_code("998901234567", "000000"),
            Err(VerifyError::TooManyAttempts)
        );
    }
}
