//! Ontcheck CLI - classify an ONT installation photo.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use ontcheck::config::{EnvSecrets, SecretsFile};
use ontcheck::{Classifier, ClassifierConfig, Exemplars, PromptLocale};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Prompt language.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum Locale {
    /// English
    #[default]
    En,
    /// Spanish
    Es,
}

impl From<Locale> for PromptLocale {
    fn from(locale: Locale) -> Self {
        match locale {
            Locale::En => Self::English,
            Locale::Es => Self::Spanish,
        }
    }
}

/// Ontcheck CLI - classify an ONT installation photo
#[derive(Parser, Debug)]
#[command(name = "ontcheck")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Photo to classify
    image: PathBuf,

    /// Secrets file (TOML, or JSON by extension); the environment is used for missing keys
    #[arg(short, long, env = "ONTCHECK_SECRETS")]
    secrets: Option<PathBuf>,

    /// Reference photo of a correctly installed unit
    #[arg(long)]
    good: Option<PathBuf>,

    /// Reference photo of a poorly installed unit
    #[arg(long)]
    bad: Option<PathBuf>,

    /// Maximum tokens to generate
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Prompt language
    #[arg(short, long, value_enum, default_value_t = Locale::En)]
    locale: Locale,

    /// HTTP timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> anyhow::Result<ClassifierConfig> {
        let file = self
            .secrets
            .as_deref()
            .map(SecretsFile::load)
            .transpose()
            .context("failed to load secrets file")?;

        let mut config = ClassifierConfig::from_secrets(&(file, EnvSecrets))
            .context("incomplete Azure OpenAI configuration")?
            .with_locale(self.locale.into());

        let defaults = Exemplars::default();
        config = config.with_exemplars(Exemplars::new(
            self.good.clone().unwrap_or(defaults.good),
            self.bad.clone().unwrap_or(defaults.bad),
        ));
        if let Some(max_tokens) = self.max_tokens {
            config = config.with_max_tokens(max_tokens);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout_secs(Some(timeout));
        }
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ontcheck=debug")
        } else {
            EnvFilter::new("ontcheck=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.config()?;
    debug!(?config, "configuration loaded");

    let classifier = Classifier::from_config(&config)?;
    let verdict = classifier
        .classify(&args.image)
        .await
        .with_context(|| format!("failed to classify {}", args.image.display()))?;

    println!("{verdict}");
    Ok(())
}
