//! FLYT CLI - Command-line tool for inspecting and re-saving layout files.
//!
//! This is the main entry point for the `flyt` command-line application.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use flyt::prelude::*;

/// FLYT - layout file inspection and conversion tool
#[derive(Parser)]
#[command(name = "flyt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show header, canvas and table summary
    Info {
        /// Input layout file
        #[arg(short, long, env = "FLYT_INPUT")]
        input: PathBuf,
    },

    /// Print the pane and group trees
    Tree {
        /// Input layout file
        #[arg(short, long, env = "FLYT_INPUT")]
        input: PathBuf,
    },

    /// Dump the decoded document as JSON
    Dump {
        /// Input layout file
        #[arg(short, long, env = "FLYT_INPUT")]
        input: PathBuf,

        /// Output JSON file (stdout if omitted)
        #[arg(short, long, env = "FLYT_OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Convert a layout file to XML
    Xml {
        /// Input layout file
        #[arg(short, long, env = "FLYT_INPUT")]
        input: PathBuf,

        /// Output XML file
        #[arg(short, long, env = "FLYT_OUTPUT")]
        output: PathBuf,
    },

    /// Decode and re-encode a layout file
    Resave {
        /// Input layout file
        #[arg(short, long, env = "FLYT_INPUT")]
        input: PathBuf,

        /// Output layout file
        #[arg(short, long, env = "FLYT_OUTPUT")]
        output: PathBuf,
    },

    /// Round-trip every file matching a glob pattern
    Verify {
        /// Glob pattern, e.g. "layouts/**/*.bflyt"
        pattern: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Info { input } => cmd_info(&input)?,
        Commands::Tree { input } => cmd_tree(&input)?,
        Commands::Dump { input, output } => cmd_dump(&input, output.as_deref())?,
        Commands::Xml { input, output } => cmd_xml(&input, &output)?,
        Commands::Resave { input, output } => cmd_resave(&input, &output)?,
        Commands::Verify { pattern } => cmd_verify(&pattern)?,
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise the level follows `-v`.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path) -> Result<LayoutDocument> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let start = Instant::now();
    let doc = LayoutDocument::parse(&data)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!(path = %path.display(), elapsed = ?start.elapsed(), "loaded layout");
    Ok(doc)
}

fn cmd_info(input: &Path) -> Result<()> {
    let doc = load(input)?;

    println!("File:       {}", input.display());
    println!("Version:    {}", doc.version);
    println!("Byte order: {:?}", doc.endian);
    println!(
        "Canvas:     {} x {}{}",
        doc.layout.width,
        doc.layout.height,
        if doc.layout.draw_from_center { " (centered)" } else { "" }
    );
    if !doc.layout.name.is_empty() {
        println!("Name:       {}", doc.layout.name);
    }
    println!("Textures:   {}", doc.textures.len());
    println!("Fonts:      {}", doc.fonts.len());
    println!("Materials:  {}", doc.materials.len());
    println!("Panes:      {}", doc.pane_count());
    println!("Groups:     {}", doc.group_count());
    if !doc.opaque_sections.is_empty() {
        let tags: Vec<String> = doc
            .opaque_sections
            .iter()
            .map(|section| section.tag.to_string())
            .collect();
        println!("Unparsed:   {}", tags.join(", "));
    }

    Ok(())
}

fn cmd_tree(input: &Path) -> Result<()> {
    let doc = load(input)?;

    println!("Panes:");
    for visit in doc.walk_panes() {
        let pane = visit.node;
        println!(
            "  {:indent$}{} [{}]{}",
            "",
            pane.name(),
            pane.tag(),
            if pane.base.visible() { "" } else { " (hidden)" },
            indent = visit.depth * 2
        );
    }

    println!("Groups:");
    for visit in doc.walk_groups() {
        let group = visit.node;
        println!(
            "  {:indent$}{} ({} panes)",
            "",
            group.name,
            group.panes.len(),
            indent = visit.depth * 2
        );
    }

    Ok(())
}

fn cmd_dump(input: &Path, output: Option<&Path>) -> Result<()> {
    let doc = load(input)?;

    let json = serde_json::to_string_pretty(&doc).context("Failed to serialize layout")?;
    match output {
        Some(path) => {
            fs::write(path, json).context("Failed to write output file")?;
            info!(path = %path.display(), "wrote JSON dump");
        }
        None => println!("{json}"),
    }

    Ok(())
}

fn cmd_xml(input: &Path, output: &Path) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let doc = load(input)?;
    let xml = doc.to_xml_string().context("Failed to convert to XML")?;
    fs::write(output, xml).context("Failed to write output file")?;

    println!("Conversion complete");

    Ok(())
}

fn cmd_resave(input: &Path, output: &Path) -> Result<()> {
    println!("Re-saving: {} -> {}", input.display(), output.display());

    let doc = load(input)?;
    let bytes = doc.to_bytes().context("Failed to encode layout")?;
    fs::write(output, &bytes).context("Failed to write output file")?;

    println!("Wrote {} bytes", bytes.len());

    Ok(())
}

/// Outcome of round-tripping one file.
enum Verdict {
    /// Re-encoded bytes equal the input.
    Identical,
    /// Decoded content matches, bytes differ (padding, offsets, ordering).
    Equivalent,
}

fn verify_file(path: &Path) -> Result<Verdict> {
    let data = fs::read(path).context("read failed")?;
    let doc = LayoutDocument::parse(&data).context("decode failed")?;
    let bytes = doc.to_bytes().context("encode failed")?;
    if bytes == data {
        return Ok(Verdict::Identical);
    }

    let again = LayoutDocument::parse(&bytes).context("re-decode failed")?;
    let before: Vec<_> = doc.walk_panes().map(|v| (v.depth, v.node)).collect();
    let after: Vec<_> = again.walk_panes().map(|v| (v.depth, v.node)).collect();
    if before.len() != after.len() {
        anyhow::bail!("pane count changed: {} -> {}", before.len(), after.len());
    }
    for ((depth, old), (new_depth, new)) in before.iter().zip(&after) {
        if depth != new_depth || old.base != new.base || old.kind != new.kind {
            anyhow::bail!("pane {} changed after round trip", old.name());
        }
    }
    if doc.materials != again.materials {
        anyhow::bail!("materials changed after round trip");
    }

    Ok(Verdict::Equivalent)
}

fn cmd_verify(pattern: &str) -> Result<()> {
    let paths: Vec<PathBuf> = glob::glob(pattern)
        .with_context(|| format!("Invalid glob pattern: {pattern}"))?
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    println!("Verifying {} files...", paths.len());

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let results: Vec<(&PathBuf, Result<Verdict>)> = paths
        .par_iter()
        .map(|path| {
            let verdict = verify_file(path);
            pb.inc(1);
            (path, verdict)
        })
        .collect();
    pb.finish_with_message("Done");

    let mut identical = 0;
    let mut equivalent = 0;
    let mut failed = 0;
    for (path, verdict) in &results {
        match verdict {
            Ok(Verdict::Identical) => identical += 1,
            Ok(Verdict::Equivalent) => equivalent += 1,
            Err(e) => {
                eprintln!("FAIL {}: {:#}", path.display(), e);
                failed += 1;
            }
        }
    }

    println!(
        "Verified in {:?}: {} identical, {} equivalent, {} failed",
        start.elapsed(),
        identical,
        equivalent,
        failed
    );

    if failed > 0 {
        anyhow::bail!("{} of {} files failed to round-trip", failed, results.len());
    }

    Ok(())
}
