//! Command-line arguments and their layering over the config file.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use drive_audit_core::{AppConfig, InheritancePolicy, RootScope};

/// Drive Audit - report who can access what on a shared drive
#[derive(Parser, Debug)]
#[command(name = "drive-audit")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Shared drive id (root of the audit)
    #[arg(long, env = "SHARED_DRIVE_ID")]
    pub drive_id: Option<String>,

    /// Service account JSON key file
    #[arg(long, env = "SERVICE_ACCOUNT_FILE")]
    pub service_account_file: Option<PathBuf>,

    /// User to impersonate through domain-wide delegation
    #[arg(long, env = "IMPERSONATE_USER")]
    pub impersonate: Option<String>,

    /// CSV output file
    #[arg(short, long, env = "CSV_OUTPUT_FILE")]
    pub output: Option<PathBuf>,

    /// Maximum concurrent permission lookups
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// How grants with several detail entries are classified
    #[arg(long, value_enum)]
    pub inheritance_policy: Option<PolicyArg>,

    /// Skip files sitting directly under the drive root
    #[arg(long)]
    pub root_folders_only: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command-line spelling of [`InheritancePolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Only the first detail entry decides
    FirstDetail,
    /// Any direct detail entry includes the grant
    AnyDirect,
}

impl From<PolicyArg> for InheritancePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FirstDetail => InheritancePolicy::FirstDetail,
            PolicyArg::AnyDirect => InheritancePolicy::AnyDirect,
        }
    }
}

impl Args {
    /// Overrides `config` with every flag that was given.
    pub fn apply(self, mut config: AppConfig) -> AppConfig {
        if let Some(drive_id) = self.drive_id {
            config.drive_id = Some(drive_id);
        }
        if let Some(file) = self.service_account_file {
            config.service_account_file = Some(file);
        }
        if let Some(user) = self.impersonate {
            config.impersonate_user = Some(user);
        }
        if let Some(output) = self.output {
            config.output = Some(output);
        }
        if let Some(concurrency) = self.concurrency {
            config.audit.concurrency = concurrency;
        }
        if let Some(policy) = self.inheritance_policy {
            config.audit.inheritance_policy = policy.into();
        }
        if self.root_folders_only {
            config.audit.root_scope = RootScope::FoldersOnly;
        }
        config
    }
}
