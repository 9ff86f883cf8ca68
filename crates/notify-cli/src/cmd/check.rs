//! Gateway health check: authentication, account, balance.

use anyhow::Result;

use osonish_notify::prelude::*;

/// Below this many SMS the check warns; sends still work.
const LOW_BALANCE: i64 = 10;

pub async fn run(config: &AppConfig) -> Result<()> {
    let problems = config.validate();
    if !problems.is_empty() {
        println!("❌ configuration problems:");
        for problem in &problems {
            println!("   - {}", problem);
        }
        anyhow::bail!("fix the configuration before checking the gateway");
    }

    println!("checking gateway at {}", config.eskiz.base_url);

    let client = super::gateway_client(config);
    let token = client.login().await?;
    println!(
        "✅ authenticated as {} (token {}…)",
        config.eskiz.email,
        super::token_preview(&token)
    );

    let info = client.user_info().await?;
    println!("   account: {} <{}>", info.name, info.email);
    if let Some(status) = &info.status {
        println!("   status: {}", status);
    }
    if let Some(role) = &info.role {
        println!("   role: {}", role);
    }

    let balance = client.balance().await?;
    if balance < LOW_BALANCE {
        println!("⚠️  balance low: {} sms left, top up soon", balance);
    } else {
        println!("✅ balance: {} sms", balance);
    }

    println!("✅ gateway is ready ({} mode)", config.mode());
    Ok(())
}
