//! Inspect command - Show how a module's exports were classified.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use dock_module::{AgentModule, Protocol};
use dock_resolver::{Discovery, EntryPointResolver, PatternCategory, PRIORITY};

use super::TargetArgs;

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct InspectReport {
    module: String,
    source: PathBuf,
    protocol: Protocol,
    discovery: Discovery,
    entry_point: Option<ResolvedEntry>,
    error: Option<String>,
}

#[derive(Serialize)]
struct ResolvedEntry {
    name: String,
    category: PatternCategory,
}

pub async fn execute(args: InspectArgs) -> Result<()> {
    let config = args.target.to_config()?;
    let module = config
        .load_module()
        .with_context(|| format!("Failed to read {}", config.agent_path().display()))?;

    let resolver = EntryPointResolver::new(config.protocol);
    let outcome = resolver.resolve(&module);
    let discovery = match &outcome {
        Ok(resolution) => resolution.discovery.clone(),
        Err(_) => resolver.discover(&module),
    };

    let report = InspectReport {
        module: module.path().to_string(),
        source: module.source().to_path_buf(),
        protocol: config.protocol,
        discovery,
        entry_point: outcome.as_ref().ok().map(|r| ResolvedEntry {
            name: r.name.clone(),
            category: r.category,
        }),
        error: outcome.as_ref().err().map(ToString::to_string),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    outcome.map(|_| ()).map_err(Into::into)
}

fn print_report(report: &InspectReport) {
    let discovery = &report.discovery;
    println!("🔎 Module {} ({})", report.module, report.protocol);
    println!("   read from {}", report.source.display());
    println!(
        "   {} export(s) considered{}",
        discovery.considered.len(),
        if discovery.explicit { " from the explicit export list" } else { "" }
    );

    for category in PRIORITY {
        let names = discovery.candidates(category);
        if !names.is_empty() {
            println!("   {:<16} {}", category.to_string(), names.join(", "));
        }
    }
    for skipped in &discovery.skipped {
        println!("   ⚠️  skipped {}: {}", skipped.name, skipped.reason);
    }

    match &report.entry_point {
        Some(entry) => println!(
            "✅ Entry point: {}.{} ({})",
            report.module, entry.name, entry.category
        ),
        None => println!("❌ No single entry point"),
    }
}
