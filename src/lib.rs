//! # Osonish Notify
//!
//! SMS verification and push notification tooling for the Osonish app.
//!
//! ## Features
//!
//! - **Eskiz.uz gateway client**: login, token caching, account info, single and batch sends
//! - **Verification codes**: generation, delivery, guess checking, expiry
//! - **Development mode**: codes are logged locally so no SMS balance is spent
//! - **Expo push**: validated tokens, batched sends, ticket handling
//! - **Configuration**: layered files plus `OSONISH_`-prefixed environment variables
//! - **Observability**: structured logging via `tracing`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use osonish_notify::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = VerificationService::new(&config);
//!
//!     let issued = service.send_code("+998 90 123-45-67").await?;
//!     println!("code issued for {}", issued.phone);
//!
//!     // later, with the user's input:
//!     service.verify_code("+998 90 123-45-67", "123456")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Settings come from `config/default`, `config/{RUN_MODE}` and
//! `config/local` files, overridden by environment variables such as
//! `OSONISH_ESKIZ__EMAIL`:
//!
//! ```rust,ignore
//! use osonish_notify::config::AppConfig;
//!
//! let config = AppConfig::load()?;
//! println!("sms mode: {}", config.mode());
//! ```

pub mod config;
pub mod verify;

pub use config::*;

/// Common imports for Osonish Notify usage
pub mod prelude {
    pub use crate::config::{
        AppConfig, EskizConfig, ExpoConfig, LoggingConfig, SmsConfig, SmsMode,
    };
    pub use crate::verify::{
        CodeDelivery, CodeFlowError, IssuedCode, VerificationService, SWEEP_INTERVAL,
    };
    pub use notify_core::*;
    pub use notify_eskiz::{BatchMessage, BatchReport, EskizClient, SendSms, UserInfo};
    pub use notify_expo::{ExpoPushClient, PushMessage, PushTicket, PushToken};
}
