//! Inspect or switch the SMS mode.
//!
//! The switch persists as `sms.force_production` in `config/local.toml`,
//! the gitignored local layer, so it never ends up in version control.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use osonish_notify::prelude::*;

const LOCAL_CONFIG: &str = "config/local.toml";

pub fn run(config: &AppConfig, set: Option<&str>) -> Result<()> {
    match set {
        None => show(config),
        Some(target) => switch(config, target == "production"),
    }
}

fn show(config: &AppConfig) -> Result<()> {
    println!("sms mode: {}", config.mode());
    match config.mode() {
        SmsMode::Development => {
            println!("   codes are logged locally, the gateway is never contacted");
        }
        SmsMode::Production => {
            println!("   codes go out as real sms via {}", config.eskiz.base_url);
        }
    }
    println!("   sender: {}", config.sms.sender);
    println!("   template: {}", config.sms.template);
    Ok(())
}

fn switch(config: &AppConfig, force_production: bool) -> Result<()> {
    let path = Path::new(LOCAL_CONFIG);
    let mut doc: toml::Table = match fs::read_to_string(path) {
        Ok(text) => text
            .parse()
            .with_context(|| format!("{} is not valid TOML", LOCAL_CONFIG))?,
        Err(_) => toml::Table::new(),
    };

    let sms = doc
        .entry("sms")
        .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    sms.as_table_mut()
        .with_context(|| format!("`sms` in {} is not a table", LOCAL_CONFIG))?
        .insert(
            "force_production".to_string(),
            toml::Value::Boolean(force_production),
        );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(&doc)?)
        .with_context(|| format!("failed to write {}", LOCAL_CONFIG))?;

    let mode = if force_production {
        SmsMode::Production
    } else {
        SmsMode::Development
    };
    println!("✅ sms mode set to {} (written to {})", mode, LOCAL_CONFIG);
    if force_production && config.mode() == SmsMode::Development {
        println!("   real sms now spend balance; switch back with `osonish mode development`");
    }
    Ok(())
}
