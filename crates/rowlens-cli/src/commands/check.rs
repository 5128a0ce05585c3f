//! `rowlens check` command implementation.
//!
//! Loads the configuration file and reports:
//! - errors that make the viewer unusable (bad prefix, page size bounds,
//!   default table outside the prefix, users without passwords)
//! - warnings for settings that work but weaken the dashboard
//! - notes on caching and secrets management

use anyhow::{Context, Result};
use std::path::Path;

use rowlens_core::RowlensConfig;

// ============================================================================
// Check Result Types
// ============================================================================

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Configuration section the finding belongs to.
    pub category: String,
    pub message: String,
}

impl CheckFinding {
    fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
        }
    }

    fn error(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Print human-readable summary.
    pub fn print_summary(&self) {
        for (severity, title) in [
            (Severity::Error, "❌ Errors"),
            (Severity::Warning, "⚠️  Warnings"),
            (Severity::Info, "ℹ️  Info"),
        ] {
            let mut group: Vec<_> = self
                .findings
                .iter()
                .filter(|f| f.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            group.sort_by(|a, b| a.category.cmp(&b.category));

            println!("\n{} ({}):", title, group.len());
            println!("{}", "─".repeat(60));
            for finding in group {
                print_finding(finding);
            }
        }

        println!();
        println!("{}", "═".repeat(60));
        if self.error_count() == 0 && self.warning_count() == 0 {
            println!("✅ All checks passed!");
        } else {
            println!(
                "Summary: {} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            );
            if self.has_errors() {
                println!("\n❌ Configuration has errors that must be fixed.");
            }
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let icon = match finding.severity {
        Severity::Error => "✗",
        Severity::Warning => "⚠",
        Severity::Info => "ℹ",
    };
    println!("  {} [{}]: {}", icon, finding.category, finding.message);
}

// ============================================================================
// Checks
// ============================================================================

fn check_viewer(config: &RowlensConfig) -> Vec<CheckFinding> {
    config
        .validate()
        .into_iter()
        .map(|problem| {
            let category = problem
                .split_once('.')
                .map(|(section, _)| section.to_string())
                .unwrap_or_else(|| "config".to_string());
            CheckFinding::error(category, problem)
        })
        .collect()
}

fn check_dashboard(config: &RowlensConfig) -> Vec<CheckFinding> {
    let dashboard = &config.dashboard;
    let mut findings = Vec::new();

    if dashboard.resolve_secret().is_none() {
        findings.push(CheckFinding::warning(
            "dashboard",
            "No signing secret set (secret or secret_env); a random one is generated at \
             startup and issued tokens stop working after a restart",
        ));
    }

    if !dashboard.auth.is_configured() && !is_loopback(&dashboard.host) {
        findings.push(CheckFinding::warning(
            "dashboard",
            format!(
                "No users configured while binding to {}; every visitor can list tables and counts",
                dashboard.host
            ),
        ));
    }

    for user in &dashboard.auth.users {
        if user.password.is_some() && user.password_env.is_none() {
            findings.push(CheckFinding::info(
                "dashboard",
                format!(
                    "User '{}' has an inline password; consider password_env",
                    user.username
                ),
            ));
        }
        if user.capabilities.is_empty() {
            findings.push(CheckFinding::warning(
                "dashboard",
                format!(
                    "User '{}' has no capabilities and cannot open the admin page",
                    user.username
                ),
            ));
        }
    }

    if dashboard.nonce_lifetime_secs < 2 {
        findings.push(CheckFinding::error(
            "dashboard",
            "nonce_lifetime_secs must be at least 2",
        ));
    }

    findings
}

fn check_database(config: &RowlensConfig) -> Vec<CheckFinding> {
    let db = &config.database;
    let mut findings = Vec::new();

    if db.max_connections == 0 {
        findings.push(CheckFinding::warning(
            "database",
            "max_connections is 0; a pool of 1 is used",
        ));
    }
    if db.password.is_some() && db.credentials_env.is_none() {
        findings.push(CheckFinding::info(
            "database",
            "Inline database password; consider credentials_env",
        ));
    }

    findings
}

fn check_cache(config: &RowlensConfig) -> Vec<CheckFinding> {
    let cache = &config.cache;
    [
        ("tables_ttl_secs", cache.tables_ttl_secs),
        ("counts_ttl_secs", cache.counts_ttl_secs),
        ("columns_ttl_secs", cache.columns_ttl_secs),
    ]
    .into_iter()
    .filter(|(_, ttl)| *ttl == 0)
    .map(|(name, _)| {
        CheckFinding::info(
            "cache",
            format!("{} is 0; every request goes to the database", name),
        )
    })
    .collect()
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "::1" | "localhost")
}

// ============================================================================
// Main Check Runner
// ============================================================================

/// Run all checks without printing.
pub fn run_quiet(config_path: &Path) -> Result<CheckResults> {
    let config = RowlensConfig::from_file(config_path)
        .with_context(|| format!("Failed to load configuration from {}", config_path.display()))?;

    let mut results = CheckResults::default();
    results.extend(check_viewer(&config));
    results.extend(check_dashboard(&config));
    results.extend(check_database(&config));
    results.extend(check_cache(&config));
    Ok(results)
}

/// Run all configuration checks.
pub fn run(config_path: &Path) -> Result<()> {
    println!("🔍 Checking {}...", config_path.display());

    let results = run_quiet(config_path)?;
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!(
            "Configuration check failed with {} error(s)",
            results.error_count()
        );
    }

    Ok(())
}
