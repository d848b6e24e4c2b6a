//! Filter rule management commands

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use dgate_core::filter::CleanOutcome;
use dgate_core::service::HEX_PREFIX;
use dgate_core::{DomainFilter, DomainKind, InMemoryRegistry, ServiceKey, ServiceType};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::Session;

/// Arguments naming a single service
#[derive(Args, Debug)]
pub struct KeyArgs {
    /// Service key (text, or hex:<digits> for raw bytes)
    pub key: String,
}

/// Add rule arguments
#[derive(Args, Debug)]
pub struct AddArgs {
    /// Service key (text, or hex:<digits> for raw bytes)
    pub key: String,

    /// Service type: file, tag, or a numeric type code
    #[arg(short = 't', long = "type", default_value = "file")]
    pub service_type: String,
}

/// Filter arguments
#[derive(Args, Debug)]
pub struct FilterArgs {
    /// Candidate service keys
    #[arg(required = true)]
    pub keys: Vec<String>,
}

/// Clean arguments
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Service registry file (TOML); defaults to the configured one
    #[arg(short, long)]
    pub registry: Option<PathBuf>,

    /// Report what would be dropped without saving
    #[arg(long)]
    pub dry_run: bool,
}

/// Diff arguments
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Older filter file
    pub old: PathBuf,

    /// Newer filter file
    pub new: PathBuf,
}

/// Human-readable form of a key: text when printable, `hex:` otherwise
pub fn display_key(key: &ServiceKey) -> String {
    match std::str::from_utf8(key.as_bytes()) {
        Ok(text) if !text.is_empty() && !text.starts_with(HEX_PREFIX) && !text.chars().any(char::is_control) => {
            text.to_string()
        }
        _ => format!("{HEX_PREFIX}{}", key.to_hex()),
    }
}

fn parse_key(raw: &str) -> Result<ServiceKey> {
    raw.parse()
        .with_context(|| format!("Invalid service key: {raw}"))
}

/// Load the filter for editing. A missing file is an empty filter; an
/// unreadable one is an error so it is never overwritten.
fn load_for_edit(path: &Path) -> Result<DomainFilter> {
    if !path.exists() {
        return Ok(DomainFilter::new());
    }
    DomainFilter::load(path).with_context(|| format!("Failed to load filter from {}", path.display()))
}

fn save(filter: &DomainFilter, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    filter
        .save(path)
        .with_context(|| format!("Failed to save filter to {}", path.display()))
}

fn warn_if_too_many(session: &Session, filter: &DomainFilter) {
    let threshold = session.config.filter.too_many_rules_threshold;
    if filter.is_over_threshold(&session.config.filter) {
        warn!("Filter has {} rules, more than the suggested {}", filter.len(), threshold);
        println!(
            "{} Filter has {} rules (suggested maximum {})",
            "!".yellow(),
            filter.len(),
            threshold
        );
    }
}

fn kind_label(kind: DomainKind) -> colored::ColoredString {
    match kind {
        DomainKind::File => "file".green(),
        DomainKind::Tag => "tag".cyan(),
        DomainKind::Unclassified => "unclassified".dimmed(),
    }
}

/// List all rules
pub fn list(session: &Session) -> Result<()> {
    let path = &session.filter_path;

    if !path.exists() {
        println!("{}", "Filter file not found. Create one with 'dgate add'".yellow());
        println!("Expected path: {}", path.display());
        return Ok(());
    }

    let filter = load_for_edit(path)?;
    let rules = filter.rules();

    println!("{}", "═".repeat(50).bright_blue());
    println!("{}", " Domain Filter".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("File: {}", path.display().to_string().cyan());
    println!("Total rules: {}", rules.len().to_string().green());
    println!("{}", "─".repeat(50).bright_black());

    if rules.is_empty() {
        println!("{}", "  (empty)".dimmed());
    } else {
        for (key, service_type) in rules.iter() {
            println!(
                "  {} {} (type {})",
                kind_label(service_type.kind()),
                display_key(key),
                service_type
            );
        }
    }

    println!("{}", "═".repeat(50).bright_blue());
    warn_if_too_many(session, &filter);

    Ok(())
}

/// Add or retype a rule
pub fn add(session: &Session, args: AddArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let service_type = ServiceType::parse_name(&args.service_type)
        .with_context(|| format!("Invalid service type: {}", args.service_type))?;

    let filter = load_for_edit(&session.filter_path)?;
    filter.add_rule(key.clone(), service_type);
    save(&filter, &session.filter_path)?;

    println!(
        "{} Added {} as {} (type {})",
        "✓".green(),
        display_key(&key).cyan(),
        kind_label(service_type.kind()),
        service_type
    );
    if service_type.kind() == DomainKind::Unclassified {
        println!("  {} This type is not blacklisted in any domain", "!".yellow());
    }
    println!("  File: {}", session.filter_path.display());
    warn_if_too_many(session, &filter);

    Ok(())
}

/// Remove a rule
pub fn remove(session: &Session, args: KeyArgs) -> Result<()> {
    let path = &session.filter_path;

    if !path.exists() {
        println!("{} Filter file not found: {}", "✗".red(), path.display());
        return Ok(());
    }

    let key = parse_key(&args.key)?;
    let filter = load_for_edit(path)?;

    if filter.rules().contains_key(&key) {
        filter.remove_rule(&key);
        save(&filter, path)?;
        println!("{} Removed {} from filter", "✓".green(), display_key(&key).cyan());
    } else {
        println!("{} No rule for {}", "-".dimmed(), display_key(&key));
    }

    Ok(())
}

/// Check a single service
pub fn check(session: &Session, args: KeyArgs) -> Result<()> {
    let key = parse_key(&args.key)?;
    let filter = DomainFilter::load_or_default(&session.filter_path);

    let allowed = filter.domain_ok(&key);
    let rule = filter.rules().get(&key);

    println!("{}", "─".repeat(50).bright_black());
    println!("Service: {}", display_key(&key).cyan());
    match rule {
        Some(service_type) => println!(
            "Rule: type {} ({})",
            service_type,
            kind_label(service_type.kind())
        ),
        None => println!("Rule: {}", "none".dimmed()),
    }
    println!(
        "Result: {}",
        if allowed {
            "allowed".green()
        } else {
            "blocked".red()
        }
    );
    println!("{}", "─".repeat(50).bright_black());

    Ok(())
}

/// Print allowed candidates, one per line, in the order given
pub fn filter(session: &Session, args: FilterArgs) -> Result<()> {
    let keys = args
        .keys
        .iter()
        .map(|raw| parse_key(raw))
        .collect::<Result<Vec<_>>>()?;

    let filter = DomainFilter::load_or_default(&session.filter_path);
    let allowed = filter.filter(&keys);

    let mut printed = HashSet::new();
    for key in keys.iter().filter(|k| allowed.contains(*k)) {
        if printed.insert(key) {
            println!("{}", display_key(key));
        }
    }

    Ok(())
}

/// Revalidate rules against a registry file
pub fn clean(session: &Session, args: CleanArgs) -> Result<()> {
    let Some(registry_path) = args
        .registry
        .or_else(|| session.config.filter.registry_file.clone())
    else {
        bail!("No registry file given; pass --registry or set filter.registry_file in the config");
    };

    let registry = InMemoryRegistry::load(&registry_path)
        .with_context(|| format!("Failed to load registry from {}", registry_path.display()))?;

    let path = &session.filter_path;
    let filter = load_for_edit(path)?;
    let before = filter.clone();

    let outcome = filter.clean_rules(&registry);
    let report = match outcome {
        CleanOutcome::Published(report) => report,
        CleanOutcome::Superseded(_) => bail!("Filter changed during cleanup; run clean again"),
    };

    for (key, service_type) in &report.dropped {
        println!(
            "  {} {} (type {})",
            "-".red(),
            display_key(key),
            service_type
        );
    }

    for (key, from, to) in &report.retyped {
        println!(
            "  {} {} (type {} -> {})",
            "~".yellow(),
            display_key(key),
            from,
            to
        );
    }

    let summary = filter.changes_summary(&before);
    if summary.is_empty() && report.retyped.is_empty() {
        println!("{} All {} rules are still valid", "✓".green(), report.kept.len());
    } else {
        if !summary.is_empty() {
            println!("{}", summary);
        }
        if !report.retyped.is_empty() {
            println!("Retyped {} rules", report.retyped.len());
        }
    }

    if args.dry_run {
        println!("{}", "Dry run: filter file not modified".dimmed());
    } else {
        save(&filter, path)?;
        info!("Cleaned filter saved to {}", path.display());
    }

    Ok(())
}

/// Summarize changes from one filter file to another
pub fn diff(args: DiffArgs) -> Result<()> {
    let old = DomainFilter::load(&args.old)
        .with_context(|| format!("Failed to load filter from {}", args.old.display()))?;
    let new = DomainFilter::load(&args.new)
        .with_context(|| format!("Failed to load filter from {}", args.new.display()))?;

    let changes = new.changes_since(&old);

    if changes.is_empty() {
        println!("No changes");
        return Ok(());
    }

    for (key, service_type) in &changes.added {
        println!("  {} {} (type {})", "+".green(), display_key(key), service_type);
    }
    for (key, service_type) in &changes.removed {
        println!("  {} {} (type {})", "-".red(), display_key(key), service_type);
    }
    println!("{}", changes.summary());

    Ok(())
}
