//! Credential test against the gateway.

use anyhow::Result;

use osonish_notify::prelude::*;

pub async fn run(config: &AppConfig) -> Result<()> {
    println!("testing credentials for {}", config.eskiz.email);
    println!("gateway: {}", config.eskiz.base_url);

    let client = super::gateway_client(config);
    match client.login().await {
        Ok(token) => {
            println!("✅ login ok, token {}…", super::token_preview(&token));
            Ok(())
        }
        Err(err) => {
            println!("❌ login failed: {}", err);
            println!("   check that the email and password match the Eskiz cabinet,");
            println!("   that the account is active, and that the password was not");
            println!("   changed recently without updating the configuration");
            Err(err.into())
        }
    }
}
