//! Requirements command - Show the dependency manifest that would be installed.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use dock_deploy::{RequirementsManifest, SkipReason};
use dock_module::Protocol;

#[derive(Args)]
pub struct RequirementsArgs {
    /// Project root holding requirements.txt
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Protocol the app is served with (rest or agui)
    #[arg(short, long, env = "AGENTDOCK_PROTOCOL", default_value = "rest")]
    pub protocol: Protocol,

    /// Print the manifest as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn execute(args: RequirementsArgs) -> Result<()> {
    let manifest = RequirementsManifest::load(args.root.join("requirements.txt"), args.protocol)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(());
    }

    println!(
        "📦 {} package(s) from {}",
        manifest.packages.len(),
        manifest.source.display()
    );
    for package in &manifest.packages {
        println!("   - {}", package);
    }
    for skipped in &manifest.skipped {
        let reason = match skipped.reason {
            SkipReason::EditableInstall => "editable install",
            SkipReason::RecursiveRequirement => "nested requirements file",
        };
        println!(
            "   ⚠️  line {} skipped ({}): {}",
            skipped.line, reason, skipped.content
        );
    }
    Ok(())
}
