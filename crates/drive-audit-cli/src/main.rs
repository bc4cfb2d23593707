#![forbid(unsafe_code)]

//! Drive Audit CLI
//!
//! Walks a shared drive, resolves the direct permission grants on every
//! folder and file, and writes them to a CSV report.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use drive_audit_core::{AppConfig, AuditRunner, CancelToken, ObjectId};
use drive_audit_csv::StagedCsvReport;
use drive_audit_gdrive::{DriveClient, ServiceAccountAuth, ServiceAccountKey};

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose {
        "info,drive_audit=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let file_config = AppConfig::resolve(args.config.as_deref())?;
    let config = args.apply(file_config);
    config.validate()?;

    // validate() guarantees these are set
    let (Some(drive_id), Some(key_path), Some(output)) = (
        config.drive_id.clone(),
        config.service_account_file.clone(),
        config.output.clone(),
    ) else {
        anyhow::bail!("incomplete configuration");
    };

    let key = ServiceAccountKey::from_file(&key_path)?;
    tracing::info!(
        service_account = %key.client_email,
        impersonate = ?config.impersonate_user,
        "Loaded credentials"
    );
    let mut auth = ServiceAccountAuth::new(key)?;
    if let Some(user) = &config.impersonate_user {
        auth = auth.with_subject(user.clone());
    }

    let client = DriveClient::from_settings(drive_id.clone(), Arc::new(auth), &config.drive);
    let runner = AuditRunner::new(Arc::new(client), config.audit.clone())?;

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling audit");
            on_signal.cancel();
        }
    });

    // The report replaces `output` only after a successful run.
    let mut report = StagedCsvReport::create(&output)
        .with_context(|| format!("failed to stage report for {}", output.display()))?;

    let summary = match runner.run(&ObjectId::new(drive_id), &mut report, &cancel).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!("Audit failed: {}", e);
            return Err(e.into());
        }
    };
    report
        .commit()
        .with_context(|| format!("failed to write {}", output.display()))?;

    if !summary.is_complete() {
        tracing::warn!(
            failures = summary.permission_failures.len(),
            "Some objects are missing from the report because their permissions could not be read"
        );
    }

    println!("Audit complete! CSV saved to {}", output.display());
    Ok(())
}
