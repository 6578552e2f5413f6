//! templatree - Serialize starter-template directories into portable file trees.
//!
//! Usage:
//!   templatree scan PATH            Scan a directory and print its encoded tree
//!   templatree decode FILE          Decode a stored tree and print an outline
//!   templatree template KEY -r DIR  Scan a registered starter template
//!   templatree --help               Show help

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use templatree_core::{
    ContentKind, PolicyOverrides, TemplateFolder, TemplateItem, TemplateRegistry, codec,
};
use templatree_scan::{BlobStore, FilterPolicy, ScanOptions, ScanReport, TemplateScanner};

#[derive(Parser)]
#[command(
    name = "templatree",
    version,
    about = "Serialize starter-template directories into portable file trees"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and print its encoded tree
    Scan {
        /// Template directory to scan
        path: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,

        /// Write the encoded tree to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,

        /// Worker threads (0 = automatic)
        #[arg(short, long, default_value = "0")]
        threads: usize,
    },

    /// Decode a stored tree and print an outline
    Decode {
        /// File holding an encoded tree
        file: PathBuf,
    },

    /// Scan a registered starter template through a transient blob
    Template {
        /// Template key (REACT, NEXTJS, EXPRESS, VUE, HONO, ANGULAR)
        key: String,

        /// Directory holding one sub-directory per starter
        #[arg(short = 'r', long)]
        templates_root: PathBuf,

        /// Directory for the transient blob
        #[arg(short, long, default_value = "output")]
        blob_dir: PathBuf,

        #[command(flatten)]
        policy: PolicyArgs,
    },
}

/// Filter policy flags shared by scanning commands.
#[derive(clap::Args)]
struct PolicyArgs {
    /// Additional file name to skip (repeatable)
    #[arg(long = "exclude-file", value_name = "NAME")]
    exclude_files: Vec<String>,

    /// Additional folder name to skip (repeatable)
    #[arg(long = "exclude-folder", value_name = "NAME")]
    exclude_folders: Vec<String>,

    /// Additional file name regex to skip (repeatable)
    #[arg(long = "exclude-pattern", value_name = "REGEX")]
    exclude_patterns: Vec<String>,

    /// Files above this size get placeholder content (e.g. "512KB", "1MB")
    #[arg(long, value_name = "SIZE")]
    max_file_size: Option<String>,

    /// JSON file with policy overrides; flags are added on top
    #[arg(long, value_name = "FILE")]
    policy: Option<PathBuf>,
}

impl PolicyArgs {
    fn resolve(&self) -> Result<FilterPolicy> {
        let base = match &self.policy {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .wrap_err_with(|| format!("Cannot read policy file {}", path.display()))?;
                PolicyOverrides::from_json(&json).wrap_err("Invalid policy file")?
            }
            None => PolicyOverrides::default(),
        };

        let max_file_bytes = self.max_file_size.as_deref().map(parse_size).transpose()?;
        let flags = PolicyOverrides {
            exclude_files: self.exclude_files.clone(),
            exclude_folders: self.exclude_folders.clone(),
            exclude_patterns: self.exclude_patterns.clone(),
            max_file_bytes,
        };

        Ok(FilterPolicy::resolve(&base.merge(flags))?)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "templatree=info,templatree_scan=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan {
            path,
            policy,
            output,
            compact,
            threads,
        } => run_scan(&path, &policy, output, compact, threads)?,
        Command::Decode { file } => run_decode(&file)?,
        Command::Template {
            key,
            templates_root,
            blob_dir,
            policy,
        } => run_template(&key, &templates_root, blob_dir, &policy)?,
    }

    Ok(())
}

/// Scan a directory and emit its canonical form.
fn run_scan(
    path: &Path,
    policy: &PolicyArgs,
    output: Option<PathBuf>,
    compact: bool,
    threads: usize,
) -> Result<()> {
    let policy = policy.resolve()?;
    let scanner = TemplateScanner::with_options(ScanOptions {
        threads,
        ..ScanOptions::default()
    });
    let report = scanner.scan_report(path, &policy).wrap_err("Scan failed")?;

    let encoded = if compact {
        codec::encode_compact(&report.root)?
    } else {
        codec::encode(&report.root)?
    };

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, encoded)
                .wrap_err_with(|| format!("Cannot write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => println!("{encoded}"),
    }

    print_summary(&report);
    Ok(())
}

/// Decode a stored tree and print an outline.
fn run_decode(file: &Path) -> Result<()> {
    let text = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("Cannot read {}", file.display()))?;
    let tree = codec::decode(&text).wrap_err("Decode failed")?;

    println!(
        "{} ({} files, {} folders)",
        tree.name,
        tree.file_count(),
        tree.folder_count()
    );
    print_folder(&tree, 1);
    Ok(())
}

/// Resolve a starter key, scan it and round-trip the tree through a blob.
fn run_template(
    key: &str,
    templates_root: &Path,
    blob_dir: PathBuf,
    policy: &PolicyArgs,
) -> Result<()> {
    let registry = TemplateRegistry::new(templates_root);
    let (starter, path) = registry.resolve(key)?;
    let policy = policy.resolve()?;

    tracing::info!(template = %starter, path = %path.display(), "Generating template tree");

    let tree = TemplateScanner::new()
        .scan(path, &policy)
        .wrap_err("Failed to generate template")?;
    let tree = BlobStore::new(blob_dir).round_trip(&tree, starter.as_ref())?;

    let response = serde_json::json!({
        "success": true,
        "templateJson": serde_json::from_str::<serde_json::Value>(&codec::encode(&tree)?)?,
    });
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn print_summary(report: &ScanReport) {
    let stats = &report.stats;
    eprintln!();
    eprintln!("{}", "─".repeat(60));
    eprintln!(" {}", report.root_path.display());
    eprintln!(
        " {} files, {} folders, {} read",
        stats.files,
        stats.folders,
        format_size(stats.bytes_read)
    );
    eprintln!(
        " {} skipped, {} over size limit ({}), {} unreadable",
        stats.skipped,
        stats.placeholders,
        format_size(report.policy.max_file_bytes()),
        stats.degraded
    );
    eprintln!(" Scanned in {:.2}s", report.scan_duration.as_secs_f64());
    eprintln!("{}", "─".repeat(60));

    for warning in &report.warnings {
        eprintln!(" ! {}: {}", warning.path.display(), warning.message);
    }
}

/// Print a folder's children as an indented outline.
fn print_folder(folder: &TemplateFolder, depth: usize) {
    let indent = "  ".repeat(depth);
    for child in &folder.children {
        match child {
            TemplateItem::Folder(sub) => {
                println!("{indent}▼ {}/", sub.name);
                print_folder(sub, depth + 1);
            }
            TemplateItem::File(file) => {
                let note = match file.content_kind() {
                    ContentKind::Text => format_size(file.content().len() as u64),
                    ContentKind::Placeholder => "too large".to_string(),
                    ContentKind::Unavailable => "unavailable".to_string(),
                };
                println!("{indent}  {} ({note})", file.file_name());
            }
        }
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a size string (e.g., "512", "1KB", "10MB", "1GB").
fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_uppercase();
    let digits_end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (num, unit) = s.split_at(digits_end);

    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        other => bail!("Unknown size unit '{other}' in '{s}'"),
    };
    let num: f64 = num
        .parse()
        .wrap_err_with(|| format!("Invalid size '{s}'"))?;

    Ok((num * multiplier as f64) as u64)
}
