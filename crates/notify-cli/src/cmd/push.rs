//! Test push notifications through Expo.

use anyhow::{Context, Result};

use osonish_notify::prelude::*;

pub async fn run(
    config: &AppConfig,
    token: &str,
    title: &str,
    body: &str,
    data: Option<&str>,
) -> Result<()> {
    let token = PushToken::parse(token)?;
    let mut message = PushMessage::new(token, title, body);
    if let Some(raw) = data {
        message.data = serde_json::from_str(raw).context("--data must be valid JSON")?;
    }

    let client = match &config.expo.access_token {
        Some(access_token) => ExpoPushClient::with_access_token(access_token.clone()),
        None => ExpoPushClient::new(),
    };

    let ticket = client.send(&message).await?;
    println!(
        "✅ push accepted: ticket {}",
        ticket.id.as_deref().unwrap_or("-")
    );
    println!("   delivery is asynchronous; the device should show it within seconds");
    Ok(())
}
