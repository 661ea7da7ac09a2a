//! Invoicer - command-line client for the invoicing API.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use invoicer_application::ApplicationError;
use invoicer_domain::InvoicePayload;
use invoicer_infrastructure::{EnvConfig, FileKeyValueStore, InvoicerServices, from_json_bytes};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command, InvoiceCommand};

/// Exit code when the user has to log in first.
const EXIT_LOGIN_REQUIRED: u8 = 2;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = EnvConfig::from_env().context("invalid configuration")?;
    tracing::debug!(
        credentials = %config.credentials_file.display(),
        token_url = %config.api.token_url(),
        "configuration loaded"
    );
    let storage = Arc::new(FileKeyValueStore::new(config.credentials_file.clone()));
    let services = InvoicerServices::connect(&config.api, storage)?;

    match run(cli.command, &services).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e)
            if e
                .downcast_ref::<ApplicationError>()
                .is_some_and(ApplicationError::requires_login) =>
        {
            eprintln!("{e}");
            Ok(ExitCode::from(EXIT_LOGIN_REQUIRED))
        }
        Err(e) => Err(e),
    }
}

async fn run(command: Command, services: &InvoicerServices) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let status = services.session.login(&username, &password).await?;
            println!("Logged in. {}", status.display_message());
        }
        Command::Logout => {
            services.session.logout().await;
            println!("Logged out.");
        }
        Command::Status => {
            let status = services.session.status().await;
            if !status.is_authenticated() {
                return Err(ApplicationError::AuthenticationRequired.into());
            }
            println!("{}", status.display_message());
        }
        Command::Refresh => {
            let status = services.session.refresh().await?;
            println!("Session refreshed. {}", status.display_message());
        }
        Command::Invoices {
            command: InvoiceCommand::List(args),
        } => {
            let page = services.list_invoices.execute(args.into()).await?;
            print_json(&page);
        }
        Command::Invoices {
            command: InvoiceCommand::Create { payload },
        } => {
            let bytes = tokio::fs::read(&payload)
                .await
                .with_context(|| format!("failed to read {}", payload.display()))?;
            let value = from_json_bytes(&bytes)
                .with_context(|| format!("{} is not valid JSON", payload.display()))?;
            let created = services
                .create_invoice
                .execute(InvoicePayload::new(value)?)
                .await?;
            print_json(&created);
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::warn!(error = %e, "failed to render output"),
    }
}
