//! Verification code flow from the terminal.
//!
//! The code store lives in this process, so `--check` is the way to
//! exercise the verify side: issue and guess in one run.

use anyhow::Result;

use osonish_notify::prelude::*;

pub async fn run(config: &AppConfig, to: &str, check: Option<&str>) -> Result<()> {
    let service = VerificationService::new(config);
    let issued = service.send_code(to).await?;

    match &issued.delivery {
        CodeDelivery::Logged { code } => {
            println!(
                "🧪 development mode: code for {} is {}",
                issued.phone, code
            );
            println!("   nothing was sent, no balance was spent");
        }
        CodeDelivery::FixedTestCode => {
            println!(
                "🧪 review number {}: fixed code {} applies",
                issued.phone, TEST_CODE
            );
        }
        CodeDelivery::Sms { message_id } => {
            println!("✅ code sent to {} (message id {})", issued.phone, message_id);
        }
    }

    if let Some(guess) = check {
        match service.verify_code(to, guess) {
            Ok(()) => println!("✅ code accepted"),
            Err(err) => {
                println!("❌ {}", err);
                anyhow::bail!("verification failed");
            }
        }
    }
    Ok(())
}
