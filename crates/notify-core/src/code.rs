//! Verification code generation and the in-memory code store.
//!
//! The store keeps one outstanding code per normalized phone number and
//! enforces the rules the login flow depends on: a resend cooldown, a
//! validity window and a bounded number of guesses.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use rand::Rng;

/// How long an issued code stays valid.
pub const CODE_TTL: Duration = Duration::from_secs(10 * 60);

/// Minimum gap between two codes for the same number.
pub const RESEND_COOLDOWN: Duration = Duration::from_secs(60);

/// Wrong guesses allowed before the code is invalidated.
pub const MAX_ATTEMPTS: u32 = 3;

/// Fixed code issued to the reserved review number.
pub const TEST_CODE: &str = "123456";

/// Generates a uniformly random six-digit verification code.
pub fn generate_code() -> String {
    rand::thread_rng().gen_range(100_000u32..1_000_000).to_string()
}

/// Why a code could not be issued or verified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    /// No outstanding code for this number.
    #[error("no code found for this number, request a new one")]
    NotFound,

    /// The code outlived [`CODE_TTL`].
    #[error("code expired, request a new one")]
    Expired,

    /// All guesses were spent on an earlier call.
    #[error("too many attempts, request a new one")]
    TooManyAttempts,

    /// The guess did not match. `remaining` may be zero.
    #[error("wrong code, {remaining} attempt(s) left")]
    WrongCode { remaining: u32 },

    /// A code was issued less than the cooldown ago.
    #[error("a code was already sent, retry in {wait_secs}s")]
    CooldownActive { wait_secs: u64 },
}

#[derive(Debug)]
struct PendingCode {
    code: String,
    issued_at: Instant,
    attempts: u32,
}

/// In-memory store of outstanding verification codes, keyed by
/// normalized phone number. All methods are safe to call from
/// concurrent tasks.
#[derive(Debug)]
pub struct CodeStore {
    entries: Mutex<HashMap<String, PendingCode>>,
    ttl: Duration,
    cooldown: Duration,
    max_attempts: u32,
}

impl Default for CodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeStore {
    /// Store with the production windows.
    pub fn new() -> Self {
        Self::with_limits(CODE_TTL, RESEND_COOLDOWN, MAX_ATTEMPTS)
    }

    /// Store with custom windows, for tests that cannot wait out the real ones.
    pub fn with_limits(ttl: Duration, cooldown: Duration, max_attempts: u32) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            cooldown,
            max_attempts,
        }
    }

    /// Remaining cooldown for `phone`, if a code was issued recently.
    pub fn cooldown_remaining(&self, phone: &str) -> Option<Duration> {
        let entries = self.entries.lock().unwrap();
        let pending = entries.get(phone)?;
        let age = pending.issued_at.elapsed();
        (age < self.cooldown).then(|| self.cooldown - age)
    }

    /// Records a freshly issued code for `phone`, replacing any older one.
    ///
    /// Fails with `CooldownActive` when the previous code is younger than
    /// the cooldown. Expired entries do not block a new code.
    pub fn begin(&self, phone: &str, code: &str) -> Result<(), VerifyError> {
        let mut entries = self.entries.lock().unwrap();
        if let Some(pending) = entries.get(phone) {
            let age = pending.issued_at.elapsed();
            if age < self.cooldown {
                let wait = self.cooldown - age;
                return Err(VerifyError::CooldownActive {
                    wait_secs: wait.as_secs().max(1),
                });
            }
        }
        entries.insert(
            phone.to_string(),
            PendingCode {
                code: code.to_string(),
                issued_at: Instant::now(),
                attempts: 0,
            },
        );
        Ok(())
    }

    /// Checks `input` against the stored code for `phone`.
    ///
    /// A correct guess consumes the entry. Expiry and attempt exhaustion
    /// also remove it, so the caller has to request a fresh code.
    pub fn check(&self, phone: &str, input: &str) -> Result<(), VerifyError> {
        let mut entries = self.entries.lock().unwrap();
        let mut pending = entries.remove(phone).ok_or(VerifyError::NotFound)?;

        if pending.issued_at.elapsed() > self.ttl {
            return Err(VerifyError::Expired);
        }
        if pending.attempts >= self.max_attempts {
            return Err(VerifyError::TooManyAttempts);
        }

        pending.attempts += 1;
        if pending.code == input {
            return Ok(());
        }

        let remaining = self.max_attempts - pending.attempts;
        entries.insert(phone.to_string(), pending);
        Err(VerifyError::WrongCode { remaining })
    }

    /// Drops entries older than the validity window. Returns how many
    /// were removed.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|_, pending| pending.issued_at.elapsed() <= self.ttl);
        before - entries.len()
    }
}
