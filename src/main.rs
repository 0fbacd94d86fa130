//! jobboard-forms - provision job postings and their application forms
//!
//! Creates a job in the job store and, when requested, a matching Tally
//! application form. A failed form deletes the job again.

mod config;
mod form;
mod job;
mod provision;
mod services;

use anyhow::{bail, Context, Result};
use config::ProvisionConfig;
use provision::{ProvisionRequest, ProvisioningSaga};
use services::{HttpJobStore, TallyClient};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: jobboard-forms <request.json>\n       jobboard-forms --check <form-body.json>";

enum Command {
    Provision(PathBuf),
    Check(PathBuf),
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command> {
    match (args.next(), args.next(), args.next()) {
        (Some(flag), Some(path), None) if flag == "--check" => Ok(Command::Check(path.into())),
        (Some(path), None, None) if !path.starts_with('-') => Ok(Command::Provision(path.into())),
        _ => bail!(USAGE),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobboard_forms=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let code = match parse_args(std::env::args().skip(1))? {
        Command::Provision(path) => provision(&path).await?,
        Command::Check(path) => check(&path)?,
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn provision(path: &Path) -> Result<i32> {
    let config = ProvisionConfig::load_with_env().context("failed to load configuration")?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let request: ProvisionRequest =
        serde_json::from_str(&content).context("request is not a valid provisioning request")?;

    let api_key = config.form_service_api_key.clone().unwrap_or_default();
    if request.form.is_some() && api_key.is_empty() {
        bail!("an application form was requested but no form service API key is configured");
    }

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("failed to build HTTP client")?;
    let job_store = HttpJobStore::new(
        client.clone(),
        config.job_store_url(),
        config.job_store_token.clone(),
    );
    let form_service = TallyClient::new(client, config.form_service_url(), &api_key);
    let saga =
        ProvisioningSaga::new(job_store, form_service).with_form_status(config.form_status());

    let outcome = saga.provision(request.job, request.form).await;
    println!("{}", serde_json::to_string_pretty(&outcome.report())?);
    Ok(outcome.exit_code())
}

/// Validate a raw create-form body without calling any service
fn check(path: &Path) -> Result<i32> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let body: serde_json::Value =
        serde_json::from_str(&content).context("form body is not valid JSON")?;

    match form::validate_request(&body) {
        Ok(()) => {
            println!("ok");
            Ok(0)
        }
        Err(err) => {
            println!("{err}");
            Ok(2)
        }
    }
}
