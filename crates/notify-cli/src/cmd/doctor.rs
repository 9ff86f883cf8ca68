//! End-to-end diagnostics for the notification setup.
//!
//! Walks the same path a release checklist would: configuration,
//! gateway access, account health, then the local sms settings.

use anyhow::Result;

use osonish_notify::prelude::*;

/// Below this the gateway balance is a release blocker.
const MIN_BALANCE: i64 = 100;

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut failures = 0usize;

    println!("1. configuration");
    let problems = config.validate();
    if problems.is_empty() {
        println!("   ✅ complete ({} mode)", config.mode());
    } else {
        failures += problems.len();
        for problem in &problems {
            println!("   ❌ {}", problem);
        }
    }

    println!("2. gateway");
    if problems.is_empty() {
        let client = super::gateway_client(config);
        match client.login().await {
            Ok(_) => {
                println!("   ✅ authentication ok");

                match client.user_info().await {
                    Ok(info) => {
                        let status = info.status.as_deref().unwrap_or("unknown");
                        if status == "active" {
                            println!("   ✅ account {} is active", info.email);
                        } else {
                            failures += 1;
                            println!("   ❌ account status: {}", status);
                        }
                    }
                    Err(err) => {
                        failures += 1;
                        println!("   ❌ profile fetch failed: {}", err);
                    }
                }

                match client.balance().await {
                    Ok(balance) if balance >= MIN_BALANCE => {
                        println!("   ✅ balance: {} sms", balance);
                    }
                    Ok(balance) => {
                        failures += 1;
                        println!(
                            "   ❌ balance low: {} sms (want at least {})",
                            balance, MIN_BALANCE
                        );
                    }
                    Err(err) => {
                        failures += 1;
                        println!("   ❌ balance fetch failed: {}", err);
                    }
                }
            }
            Err(err) => {
                failures += 1;
                println!("   ❌ authentication failed: {}", err);
            }
        }
    } else {
        println!("   … skipped until the configuration is complete");
    }

    println!("3. sms settings");
    println!("   ✅ sender: {}", config.sms.sender);
    println!("   ✅ template: {}", config.sms.template);
    match config.mode() {
        SmsMode::Development => {
            println!("   ⚠️  development mode: codes are logged, not sent");
        }
        SmsMode::Production => {
            println!("   ✅ production mode: codes go out as real sms");
        }
    }

    println!();
    if failures == 0 {
        println!("✅ all checks passed");
        Ok(())
    } else {
        anyhow::bail!("{} check(s) failed", failures);
    }
}
