//! Template moderation submissions.
//!
//! Eskiz moderation reviews wordings it has seen in real traffic, so
//! each candidate goes through the batch endpoint once, rendered with a
//! dummy code. Until a wording is approved, production sends using it
//! come back rejected.

use anyhow::Result;

use osonish_notify::prelude::*;

const MODERATION_CODE: &str = "123456";
const MODERATION_RECIPIENT: &str = "998901234567";

/// Wordings submitted for approval. The service template has to stay
/// in sync with whichever of these moderation accepts.
const CANDIDATES: [&str; 4] = [
    "Ваш код подтверждения для Oson Ish: {code}. Не сообщайте этот код никому.",
    "Код верификации Oson Ish: {code}",
    "Oson Ish verification code: {code}",
    "Ваш код: {code}. Oson Ish",
];

pub async fn submit(config: &AppConfig) -> Result<()> {
    let messages: Vec<BatchMessage> = CANDIDATES
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            BatchMessage::with_id(
                format!("template-{}", index + 1),
                MODERATION_RECIPIENT,
                candidate.replace(CODE_PLACEHOLDER, MODERATION_CODE),
            )
        })
        .collect();
    let dispatch_id = format!(
        "template-batch-{}",
        time::OffsetDateTime::now_utc().unix_timestamp()
    );

    println!("submitting {} template candidates for review:", messages.len());
    for candidate in CANDIDATES {
        println!("   - {}", candidate);
    }

    let client = super::gateway_client(config);
    let report = client
        .send_batch(&messages, Some(&config.sms.sender), &dispatch_id)
        .await?;

    println!("✅ {}", report.message().unwrap_or("batch accepted"));
    println!("{}", serde_json::to_string_pretty(&report.raw)?);
    println!();
    println!("watch the Eskiz cabinet for moderation results; put the approved");
    println!("wording into sms.template (config/local.toml or OSONISH_SMS__TEMPLATE)");
    Ok(())
}
