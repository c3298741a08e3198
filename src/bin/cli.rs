use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use modelaudit::{
    AuditOrchestrator, AuditSelection, Capabilities, EnvSnapshot, HashEngine, IntegrityManifest,
    ManifestBuilder, PathOverrides, ArtifactStatus, load_params, resolve,
};
use modelaudit::audit::ReportTableRow;
use tabled::{Table, settings::Style};

const DEFAULT_MANIFEST_PATH: &str = "artifacts/security_manifest.json";

#[derive(Parser)]
#[command(name = "modelaudit")]
#[command(about = "Fairness, quality-scan and provenance audits for trained classifiers")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    audit: AuditArgs,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Args)]
struct AuditArgs {
    /// Path to the dataset (.csv or .parquet)
    #[arg(long)]
    dataset_path: Option<PathBuf>,

    /// Path to the trained model artifact
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Params file with an `audit:` section (defaults to ./params.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the fairness snapshot
    #[arg(long)]
    run_fairness: bool,

    /// Run the quality scan
    #[arg(long)]
    run_scan: bool,

    /// Capture presence-check metadata
    #[arg(long)]
    run_presence: bool,

    /// Fairness report path
    #[arg(long)]
    fairness_report: Option<PathBuf>,

    /// Scan report path
    #[arg(long)]
    scan_report: Option<PathBuf>,

    /// Presence-check report path
    #[arg(long)]
    presence_report: Option<PathBuf>,

    /// Also write an integrity manifest for the dataset and model
    #[arg(long)]
    manifest: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash the dataset and model and write an integrity manifest
    Manifest {
        /// Path to the dataset
        #[arg(long)]
        data_path: Option<PathBuf>,

        /// Path to the model artifact
        #[arg(long)]
        model_path: Option<PathBuf>,

        /// Where to write the manifest
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Params file with an `audit:` section
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Re-hash the artifacts named in a manifest and compare
    Verify {
        /// Manifest to verify
        manifest: PathBuf,
    },

    /// Print the SHA-256 digest of a file
    Hash {
        /// File to hash
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("modelaudit=debug,info")
    } else {
        EnvFilter::new("modelaudit=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(e);
            ExitCode::FAILURE
        }
    }
}

fn print_error(err: Box<dyn std::error::Error>) {
    let message = err.to_string().replace('\n', " ");
    eprintln!("{} {}", "✗ Error:".red(), message);
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        None => cmd_audit(cli.audit).await,
        Some(Commands::Manifest { data_path, model_path, output, config }) => {
            cmd_manifest(data_path, model_path, output, config)
        }
        Some(Commands::Verify { manifest }) => cmd_verify(&manifest),
        Some(Commands::Hash { path }) => {
            println!("{}  {}", HashEngine::hash_file(&path)?, path.display());
            Ok(())
        }
    }
}

async fn cmd_audit(args: AuditArgs) -> Result<(), Box<dyn std::error::Error>> {
    let selection = AuditSelection {
        fairness: args.run_fairness,
        scan: args.run_scan,
        presence: args.run_presence,
    };

    if selection.is_empty() {
        println!("No audits selected; exiting cleanly.");
        return Ok(());
    }

    let explicit = PathOverrides {
        dataset_path: args.dataset_path,
        model_path: args.model_path,
        fairness_report: args.fairness_report,
        scan_report: args.scan_report,
        presence_report: args.presence_report,
        manifest_path: args.manifest,
    };
    let file = load_params(args.config.as_deref())?;
    let config = resolve(selection, &explicit, &file, &EnvSnapshot::capture());

    info!(
        "Auditing {} with {}",
        config.dataset_path.display(),
        config.model_path.display()
    );

    let orchestrator = AuditOrchestrator::new(config, Capabilities::detect());
    let summary = orchestrator.run().await?;

    let rows: Vec<ReportTableRow> = summary.reports.iter().map(ReportTableRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::markdown());
    println!("{}", table);

    for record in &summary.reports {
        if let Some(detail) = &record.detail {
            println!("{} {} report degraded: {}", "⚠".yellow(), record.kind, detail);
        }
    }

    if let Some(manifest) = &summary.manifest {
        println!("{} Integrity manifest written to {}", "✓".green(), manifest.display());
    }

    Ok(())
}

fn cmd_manifest(
    data_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let explicit = PathOverrides {
        dataset_path: data_path,
        model_path,
        manifest_path: output,
        ..Default::default()
    };
    let file = load_params(config.as_deref())?;
    let config = resolve(AuditSelection::default(), &explicit, &file, &EnvSnapshot::capture());
    let output = config
        .manifest_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_PATH));

    let manifest = ManifestBuilder::build(&config.dataset_path, &config.model_path)?;
    manifest.write(&output)?;

    println!("{} Integrity manifest written to {}", "✓".green(), output.display());
    for (tag, value) in manifest.tags() {
        println!("  {}: {}", tag, value);
    }

    Ok(())
}

fn cmd_verify(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = IntegrityManifest::load(path)?;
    let report = manifest.verify()?;

    for entry in &report.entries {
        let marker = match entry.status {
            ArtifactStatus::Match => "✓".green(),
            ArtifactStatus::Mismatch => "✗".red(),
            ArtifactStatus::Missing => "○".yellow(),
        };
        println!("{} {:<6} {} ({})", marker, entry.name, entry.path, entry.status.as_str());
    }

    if report.passed() {
        println!("{} All artifacts match {}", "✓".green(), path.display());
        Ok(())
    } else {
        let failed: Vec<_> = report.failures().iter().map(|e| e.name.clone()).collect();
        Err(format!("Integrity check failed for: {}", failed.join(", ")).into())
    }
}
