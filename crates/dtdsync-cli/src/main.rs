use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dtdsync::{diff, parse_dtd, parse_registry, reconcile, Mode, SchemaDelta};

#[derive(Debug, Parser)]
#[command(
    name = "dtdsync",
    version,
    about = "Analyze and sync a DTD grammar with its JSON element registry"
)]
struct Args {
    /// Show what would be changed without touching the registry
    #[arg(long)]
    dry_run: bool,
    /// Path to the DTD grammar file
    #[arg(long, value_name = "PATH", default_value = "src/docs/dbc/script.dtd")]
    dtd: PathBuf,
    /// Path to the JSON registry file
    #[arg(
        long,
        value_name = "PATH",
        default_value = "src/docs/dbc/script_registry.json"
    )]
    registry: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let grammar_text = fs::read_to_string(&args.dtd)
        .with_context(|| format!("failed to read grammar file {}", args.dtd.display()))?;
    let grammar = parse_dtd(&grammar_text)
        .with_context(|| format!("failed to parse grammar file {}", args.dtd.display()))?;
    println!("parsed {}: {} elements", args.dtd.display(), grammar.len());

    let registry_text = fs::read_to_string(&args.registry)
        .with_context(|| format!("failed to read registry file {}", args.registry.display()))?;
    let mut registry = parse_registry(&registry_text)
        .with_context(|| format!("failed to parse registry file {}", args.registry.display()))?;
    println!(
        "parsed {}: {} elements",
        args.registry.display(),
        registry.len()
    );

    let delta = diff(&grammar, &registry);
    print_delta(&delta);

    if delta.is_in_sync() {
        println!("no differences found, schemas are in sync");
        return Ok(());
    }

    let mode = if args.dry_run {
        Mode::DryRun
    } else {
        Mode::Apply
    };
    let outcome = reconcile(&grammar, &delta, &mut registry, mode);
    for action in &outcome.actions {
        println!("  {action}");
    }

    if !mode.is_dry_run() && outcome.edits > 0 {
        // the document is fully serialized in memory before the file is
        // touched, so a failure here never leaves a truncated registry
        let serialized = registry.to_json_pretty();
        fs::write(&args.registry, serialized)
            .with_context(|| format!("failed to write registry file {}", args.registry.display()))?;
        println!("updated {}", args.registry.display());
    }

    if args.dry_run {
        println!(
            "dry run complete, would make {} changes (re-run without --dry-run to apply)",
            outcome.edits
        );
    } else {
        println!("complete, made {} changes", outcome.edits);
    }

    Ok(())
}

fn print_delta(delta: &SchemaDelta) {
    println!("analysis results:");
    println!("  missing elements: {}", delta.missing_elements.len());
    println!(
        "  elements with missing attributes: {}",
        delta.missing_attributes.len()
    );
    println!(
        "  elements with missing children: {}",
        delta.missing_children.len()
    );
    println!(
        "  elements with incorrect children: {}",
        delta.incorrect_children.len()
    );
    println!("  total issues: {}", delta.total_issues());

    if !delta.missing_elements.is_empty() {
        println!("missing elements:");
        let mut names = delta.missing_elements.clone();
        names.sort();
        for name in names {
            println!("  - {name}");
        }
    }

    if !delta.missing_attributes.is_empty() {
        println!("missing attributes:");
        let mut elements: Vec<_> = delta.missing_attributes.iter().collect();
        elements.sort_by_key(|(name, _)| name.as_str());
        for (name, attrs) in elements {
            let mut attrs = attrs.clone();
            attrs.sort();
            println!("  - {name}: {}", attrs.join(", "));
        }
    }

    if !delta.missing_children.is_empty() {
        println!("missing children arrays:");
        let mut elements: Vec<_> = delta.missing_children.iter().collect();
        elements.sort_by_key(|(name, _)| name.as_str());
        for (name, children) in elements {
            println!("  - {name}: {children:?}");
        }
    }

    if !delta.incorrect_children.is_empty() {
        println!("incorrect children arrays:");
        let mut elements: Vec<_> = delta.incorrect_children.iter().collect();
        elements.sort_by_key(|(name, _)| name.as_str());
        for (name, mismatch) in elements {
            println!("  - {name}:");
            println!("      current:   {:?}", mismatch.current);
            println!("      should be: {:?}", mismatch.should_be);
        }
    }

    if !delta.skipped_props.is_empty() {
        println!("skipped for attribute comparison (no props mapping):");
        let mut names = delta.skipped_props.clone();
        names.sort();
        for name in names {
            println!("  - {name}");
        }
    }
}
