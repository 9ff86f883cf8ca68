//! `osonish` developer CLI.
//!
//! One binary replaces the pile of ad-hoc scripts that grew around the
//! SMS gateway: health checks, credential tests, one-off sends,
//! verification flow runs, template moderation and push tests.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use osonish_notify::prelude::*;

mod cmd;

#[derive(Parser)]
#[command(
    name = "osonish",
    version,
    about = "Osonish SMS gateway and push notification tooling"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full gateway health check: auth, account, balance
    Check,
    /// Try the configured credentials against the gateway
    Login,
    /// Show the gateway account profile
    User,
    /// Show the remaining SMS balance
    Balance,
    /// Send one SMS with explicit text
    Send {
        /// Recipient, any common Uzbek format
        #[arg(long)]
        to: String,
        /// Message text; production only delivers approved wordings
        #[arg(long)]
        text: String,
        /// Sender name, defaults to the configured one
        #[arg(long)]
        from: Option<String>,
    },
    /// Issue a verification code and deliver it per the current mode
    SendCode {
        #[arg(long)]
        to: String,
        /// Immediately check this guess against the issued code
        #[arg(long)]
        check: Option<String>,
    },
    /// Send the same text to several recipients as one batch
    Batch {
        /// Comma-separated recipients
        #[arg(long, value_delimiter = ',', required = true)]
        to: Vec<String>,
        #[arg(long)]
        text: String,
        #[arg(long)]
        from: Option<String>,
    },
    /// Template moderation helpers
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Send a test push notification through Expo
    Push {
        /// ExponentPushToken[...] of the target device
        #[arg(long)]
        token: String,
        #[arg(long, default_value = "Osonish")]
        title: String,
        #[arg(long, default_value = "Тестовое уведомление")]
        body: String,
        /// JSON payload handed to the app
        #[arg(long)]
        data: Option<String>,
    },
    /// Show or switch the SMS mode
    Mode {
        /// development or production; omit to show the current mode
        #[arg(value_parser = ["development", "production"])]
        set: Option<String>,
    },
    /// Run all diagnostics: configuration, gateway, sms settings
    Doctor,
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// Send the candidate wordings through the batch endpoint for review
    Submit,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env feed the OSONISH_* environment source.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Commands::Check => cmd::check::run(&config).await,
        Commands::Login => cmd::login::run(&config).await,
        Commands::User => cmd::account::user(&config).await,
        Commands::Balance => cmd::account::balance(&config).await,
        Commands::Send { to, text, from } => {
            cmd::send::single(&config, &to, &text, from.as_deref()).await
        }
        Commands::SendCode { to, check } => cmd::code::run(&config, &to, check.as_deref()).await,
        Commands::Batch { to, text, from } => {
            cmd::send::batch(&config, &to, &text, from.as_deref()).await
        }
        Commands::Template {
            command: TemplateCommands::Submit,
        } => cmd::template::submit(&config).await,
        Commands::Push {
            token,
            title,
            body,
            data,
        } => cmd::push::run(&config, &token, &title, &body, data.as_deref()).await,
        Commands::Mode { set } => cmd::mode::run(&config, set.as_deref()),
        Commands::Doctor => cmd::doctor::run(&config).await,
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
