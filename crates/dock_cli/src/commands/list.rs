//! List command - Resolve every module file below a directory.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tracing::debug;

use dock_deploy::CONFIG_FILE_NAME;
use dock_module::{AgentModule, ModuleReader, Protocol};
use dock_resolver::{EntryPointResolver, PatternCategory};

#[derive(Args)]
pub struct ListArgs {
    /// Directory to scan, relative to the project root
    #[arg(default_value = "agents")]
    pub dir: PathBuf,

    /// Project root used for module paths
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Protocol to resolve for (rest or agui)
    #[arg(short, long, env = "AGENTDOCK_PROTOCOL", default_value = "rest")]
    pub protocol: Protocol,

    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ListEntry {
    file: PathBuf,
    module: Option<String>,
    entry_point: Option<String>,
    category: Option<PatternCategory>,
    error: Option<String>,
}

pub async fn execute(args: ListArgs) -> Result<()> {
    let dir = if args.dir.is_absolute() {
        args.dir.clone()
    } else {
        args.root.join(&args.dir)
    };

    let files = ModuleReader::discover(&dir)?;
    let resolver = EntryPointResolver::new(args.protocol);
    let entries: Vec<ListEntry> = files
        .iter()
        .filter(|file| file.file_name().map_or(true, |name| name != CONFIG_FILE_NAME))
        .map(|file| list_entry(file, &args.root, &resolver))
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No module files found in {}", dir.display());
        return Ok(());
    }

    println!("📋 Modules in {} ({})", dir.display(), args.protocol);
    for entry in &entries {
        let file = entry.file.strip_prefix(&dir).unwrap_or(&entry.file).display().to_string();
        match (&entry.entry_point, &entry.category, &entry.error) {
            (Some(name), Some(category), _) => {
                println!("   ✅ {:<48} {} ({})", file, name, category)
            }
            (_, _, Some(error)) => {
                let first_line = error.lines().next().unwrap_or_default();
                println!("   ❌ {:<48} {}", file, first_line)
            }
            _ => println!("   ❌ {}", file),
        }
    }

    let resolved = entries.iter().filter(|e| e.entry_point.is_some()).count();
    println!("\n{} of {} module(s) resolve to an entry point", resolved, entries.len());
    Ok(())
}

fn list_entry(file: &Path, root: &Path, resolver: &EntryPointResolver) -> ListEntry {
    let mut entry = ListEntry {
        file: file.to_path_buf(),
        module: None,
        entry_point: None,
        category: None,
        error: None,
    };

    let module = match ModuleReader::read(file, root) {
        Ok(module) => module,
        Err(e) => {
            debug!("Could not read {}: {}", file.display(), e);
            entry.error = Some(e.to_string());
            return entry;
        }
    };
    entry.module = Some(module.path().to_string());

    match resolver.resolve(&module) {
        Ok(resolution) => {
            entry.entry_point = Some(resolution.name);
            entry.category = Some(resolution.category);
        }
        Err(e) => entry.error = Some(e.to_string()),
    }
    entry
}
