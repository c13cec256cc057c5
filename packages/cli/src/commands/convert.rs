use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;
use tracing::info;
use vellum_editor::{EditorBuilder, EditorConfig};
use vellum_features::standard_features;
use vellum_model::MAIN_ROOT;

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// JSON file holding an array of view nodes
    pub fragment: PathBuf,

    /// Root to load the fragment into
    #[arg(short, long, default_value = MAIN_ROOT)]
    pub root: String,

    /// Print the model as JSON instead of HTML
    #[arg(long)]
    pub model: bool,
}

pub fn convert(args: ConvertArgs, config: EditorConfig) -> Result<()> {
    let json = fs::read_to_string(&args.fragment)
        .with_context(|| format!("Cannot read {}", args.fragment.display()))?;

    let mut editor = EditorBuilder::new(config)
        .with_features(standard_features())
        .build()?;

    let result = editor.set_data_json(&args.root, &json)?;
    info!(
        root = %args.root,
        nodes = result.nodes.len(),
        unrecognized = result.unrecognized.len(),
        "Loaded fragment"
    );

    for entry in &result.unrecognized {
        eprintln!(
            "  {} <{}> at {:?} left out ({:?})",
            "⚠".yellow(),
            entry.name,
            entry.path,
            entry.reason
        );
    }
    for fault in &result.report.faults {
        eprintln!("  {} {}: {}", "✗".red(), fault.event, fault.error);
    }

    if args.model {
        let root = editor
            .model()
            .root(&args.root)
            .ok_or_else(|| anyhow!("Unknown root: {}", args.root))?;
        println!("{}", serde_json::to_string_pretty(root.children())?);
    } else {
        println!("{}", editor.get_data(&args.root)?);
    }

    Ok(())
}
