//! Command implementations

pub mod account;
pub mod check;
pub mod code;
pub mod doctor;
pub mod login;
pub mod mode;
pub mod push;
pub mod send;
pub mod template;

use osonish_notify::prelude::*;

/// Gateway client wired from configuration.
pub(crate) fn gateway_client(config: &AppConfig) -> EskizClient {
    EskizClient::with_base_url(
        config.eskiz.email.clone(),
        config.eskiz.password.clone(),
        config.eskiz.base_url.clone(),
    )
}

/// First characters of a token, enough to recognize it in the cabinet
/// without echoing the whole secret.
pub(crate) fn token_preview(token: &str) -> String {
    token.chars().take(20).collect()
}
