//! Account introspection: profile and balance.

use anyhow::Result;

use osonish_notify::prelude::*;

/// The release checklist wants at least this many SMS in reserve.
const COMFORTABLE_BALANCE: i64 = 100;

pub async fn user(config: &AppConfig) -> Result<()> {
    let client = super::gateway_client(config);
    let info = client.user_info().await?;

    println!("id:         {}", info.id);
    println!("name:       {}", info.name);
    println!("email:      {}", info.email);
    if let Some(role) = &info.role {
        println!("role:       {}", role);
    }
    if let Some(status) = &info.status {
        println!("status:     {}", status);
    }
    if let Some(price) = info.uz_price {
        println!("uz price:   {} so'm", price);
    }
    if let Some(price) = info.ru_price {
        println!("ru price:   {} so'm", price);
    }
    if let Some(phone) = &info.test_phone {
        println!("test phone: {}", phone);
    }
    Ok(())
}

pub async fn balance(config: &AppConfig) -> Result<()> {
    let client = super::gateway_client(config);
    let balance = client.balance().await?;

    println!("balance: {} sms", balance);
    if balance < COMFORTABLE_BALANCE {
        println!("⚠️  fewer than {} sms left", COMFORTABLE_BALANCE);
    }
    Ok(())
}
