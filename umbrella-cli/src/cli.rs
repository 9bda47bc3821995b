use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use umbrella_core::{Config, check_umbrella, provider_from_config};

use crate::render;

const END_TIME_PROMPT: &str = "Until what time will you be out for? (e.g., '9 PM', '6:30 AM')";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "umbrella", version, about = "Do I need an umbrella before I get back?")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Check the forecast between now and the time you'll be back.
    Check {
        /// When you'll be back, e.g. "9 PM", "6:30 AM" or "14:00". Prompted if absent.
        #[arg(long)]
        until: Option<String>,

        /// City to check instead of the configured one.
        #[arg(long)]
        city: Option<String>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Extra attempts after a network failure or server error.
        #[arg(long)]
        retries: Option<u32>,
    },

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Check {
                until,
                city,
                timeout_secs,
                retries,
            } => check(until, city, timeout_secs, retries).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let city = Text::new("Default city:")
        .with_default(&config.city)
        .prompt()
        .context("Failed to read city")?;

    config.set_api_key(api_key);
    config.set_city(city);
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn check(
    until: Option<String>,
    city: Option<String>,
    timeout_secs: Option<u64>,
    retries: Option<u32>,
) -> anyhow::Result<()> {
    let mut config = Config::load()?;
    if timeout_secs.is_some() {
        config.network.timeout_secs = timeout_secs;
    }
    if let Some(retries) = retries {
        config.network.retries = retries;
    }

    let provider = provider_from_config(&config)?;
    let city = city.unwrap_or_else(|| config.city.clone());

    let phrase = match until {
        Some(phrase) => phrase,
        None => Text::new(END_TIME_PROMPT)
            .prompt()
            .context("Failed to read end time")?,
    };

    let now = Local::now();
    match check_umbrella(provider.as_ref(), &city, &now, &phrase).await {
        Ok(report) => {
            tracing::info!(
                location = %report.location.display_name(),
                until = %report.end_time,
                "checked forecast"
            );
            render::print_report(&report);
        }
        Err(err) => render::print_error(&err),
    }

    Ok(())
}
