//! One-off sends: a single SMS or one batch.

use anyhow::Result;

use osonish_notify::prelude::*;

pub async fn single(config: &AppConfig, to: &str, text: &str, from: Option<&str>) -> Result<()> {
    let sender = from.unwrap_or(&config.sms.sender);
    let normalized = normalize_phone(to);
    println!("sending to {} as {}", normalized, sender);

    let client = super::gateway_client(config);
    let report = client
        .send(SendSms {
            to,
            text,
            from: Some(sender),
            callback_url: None,
        })
        .await?;

    println!("✅ accepted: id={}", report.id);
    println!("{}", serde_json::to_string_pretty(&report.raw)?);

    let balance = client.balance().await?;
    println!("balance after send: {} sms", balance);
    Ok(())
}

pub async fn batch(config: &AppConfig, to: &[String], text: &str, from: Option<&str>) -> Result<()> {
    let sender = from.unwrap_or(&config.sms.sender);
    let messages: Vec<BatchMessage> = to
        .iter()
        .map(|recipient| BatchMessage::new(recipient.as_str(), text))
        .collect();
    let dispatch_id = format!(
        "cli-batch-{}",
        time::OffsetDateTime::now_utc().unix_timestamp()
    );

    println!(
        "submitting batch of {} as {} ({})",
        messages.len(),
        sender,
        dispatch_id
    );

    let client = super::gateway_client(config);
    let report = client.send_batch(&messages, Some(sender), &dispatch_id).await?;

    if let Some(message) = report.message() {
        println!("✅ gateway: {}", message);
    }
    println!("{}", serde_json::to_string_pretty(&report.raw)?);
    Ok(())
}
