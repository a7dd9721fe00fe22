//! Command-line interface for the catalog builder.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::catalog::build_catalog;
use crate::config::{
    default_hierarchy, unescape_column, BuildOptions, CATALOG_NAME, DEFAULT_HIERARCHY,
    REGIME_START_INDEX, SCRIPT_OUTPUT_FILE,
};
use crate::error::Result;
use crate::output::{read_script_payload, save_outputs};
use crate::report::regime_report;

/// Default location of the controls table.
pub const DEFAULT_CONTROLS_PATH: &str = "data/scf_controls.csv";

/// SCF Catalog - Convert a Secure Controls Framework export into a hierarchy.
#[derive(Parser)]
#[command(name = "scf-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build scf_data.json and scf_data.js from the controls table.
    Build {
        /// Controls table (CSV)
        #[arg(short, long, default_value = DEFAULT_CONTROLS_PATH)]
        controls: PathBuf,

        /// Domains table (CSV) (default: data/scf_domains.csv, if present)
        #[arg(short, long)]
        domains: Option<PathBuf>,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Label of the document root
        #[arg(long, default_value = CATALOG_NAME)]
        name: String,

        /// Index of the first regime column
        #[arg(long, default_value_t = REGIME_START_INDEX)]
        regime_start: usize,

        /// Hierarchy column, outer to inner; repeat for each level.
        /// Write embedded newlines as \n (default: SCF Domain, NIST CSF\nFunction Grouping,
        /// PPTDF\nApplicability)
        #[arg(long = "hierarchy", value_name = "COLUMN")]
        hierarchy: Vec<String>,
    },

    /// List the compliance regimes found in a generated script document.
    Regimes {
        /// Script document to inspect
        #[arg(default_value = SCRIPT_OUTPUT_FILE)]
        file: PathBuf,

        /// Also list regimes referenced by control mappings
        #[arg(long)]
        mapped: bool,

        /// Number of branch levels above the controls
        #[arg(long, default_value_t = DEFAULT_HIERARCHY.len())]
        levels: usize,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            controls,
            domains,
            output,
            name,
            regime_start,
            hierarchy,
        } => {
            let hierarchy = if hierarchy.is_empty() {
                default_hierarchy()
            } else {
                hierarchy.iter().map(|c| unescape_column(c)).collect()
            };
            let mut options = BuildOptions::new(controls)
                .with_catalog_name(name)
                .with_regime_start(regime_start)
                .with_hierarchy(hierarchy);
            if let Some(domains) = domains {
                options = options.with_domains(domains);
            }
            if let Some(output) = output {
                options = options.with_output_dir(output);
            }
            build_command(&options)
        }
        Commands::Regimes {
            file,
            mapped,
            levels,
        } => regimes_command(&file, mapped, levels),
    }
}

/// Execute the build command.
fn build_command(options: &BuildOptions) -> Result<()> {
    // Validate before reading anything
    options.validate()?;

    println!(
        "{} {}",
        style("Building").bold(),
        style(options.controls_path.display()).cyan()
    );
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Reading controls...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let (document, summary) = match build_catalog(options) {
        Ok(built) => built,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.set_message("Saving documents...");

    let paths = match save_outputs(&document, &options.output_dir) {
        Ok(paths) => paths,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Catalog: {}", style(&document.name).green());
    println!("  Regimes: {}", document.regime_list.len());
    println!("  Controls: {}", summary.processed);
    if summary.merged > 0 {
        println!("  Merged rows: {}", summary.merged);
    }
    if summary.skipped > 0 {
        println!("  Skipped rows: {}", style(summary.skipped).yellow());
    }
    if summary.defaulted_weights > 0 {
        println!(
            "  Default weights: {}",
            style(summary.defaulted_weights).yellow().bold()
        );
    }

    println!();
    println!("{} {}", style("Saved to:").green().bold(), paths.script.display());
    println!("{} {}", style("Saved to:").green().bold(), paths.json.display());

    Ok(())
}

/// Execute the regimes command.
fn regimes_command(file: &Path, mapped: bool, levels: usize) -> Result<()> {
    let payload = read_script_payload(file)?;
    let document: serde_json::Value = serde_json::from_str(&payload)?;
    let report = regime_report(&document, levels);

    println!(
        "Root name: {}",
        report.root_name.as_deref().unwrap_or_default()
    );
    println!("Domains found: {}", report.domain_count);

    if report.nested_regimes.is_empty() {
        println!("No regimes found.");
    } else {
        println!("Included Compliance Regimes:");
        for regime in &report.nested_regimes {
            println!("- {regime}");
        }
    }

    if mapped {
        println!();
        println!("Mapped Compliance Regimes: {}", report.mapped_regimes.len());
        for regime in &report.mapped_regimes {
            println!("- {regime}");
        }
    }

    Ok(())
}
