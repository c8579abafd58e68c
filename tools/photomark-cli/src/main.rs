//! Photomark CLI — Command-line interface for batch photo watermarking.
//!
//! Usage:
//!   photomark export <INPUTS>... -o DIR    Watermark and export a batch
//!   photomark preview <IMAGE> -o FILE      Render a scaled preview
//!   photomark template <ACTION>            Manage saved templates
//!   photomark fonts                        Check font capabilities

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::watermark::WatermarkArgs;

#[derive(Parser)]
#[command(
    name = "photomark",
    about = "Batch photo watermarking with pixel-equivalent preview and export",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watermark every queued image and write the results
    Export {
        /// Image files and/or directories (directories expand one level)
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Output format: png or jpeg
        #[arg(long)]
        format: Option<String>,

        /// Filename rule: original, prefix, or suffix
        #[arg(long)]
        rule: Option<String>,

        /// Affix string for the prefix/suffix rules
        #[arg(long)]
        affix: Option<String>,

        /// Allow writing into a directory that contains source images
        #[arg(long)]
        allow_source_dir: bool,

        /// Start from a saved template instead of the last-used config
        #[arg(short, long)]
        template: Option<String>,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Render one watermarked image at preview scale
    Preview {
        /// Source image
        image: PathBuf,

        /// Output file (PNG)
        #[arg(short, long)]
        output: PathBuf,

        /// Explicit render scale (1.0 = full resolution)
        #[arg(long)]
        scale: Option<f64>,

        /// Fit the preview into this maximum dimension instead
        #[arg(long)]
        max_dim: Option<u32>,

        /// Start from a saved template instead of the last-used config
        #[arg(short, long)]
        template: Option<String>,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// Manage saved watermark templates
    Template {
        #[command(subcommand)]
        action: commands::template::TemplateAction,
    },

    /// Report which fonts are available on this system
    Fonts,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    photomark_common::logging::init_logging(&photomark_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
    });

    let app = photomark_common::config::AppConfig::load();

    match cli.command {
        Commands::Export {
            inputs,
            output,
            format,
            rule,
            affix,
            allow_source_dir,
            template,
            watermark,
        } => commands::export::run(
            &app,
            inputs,
            output,
            format,
            rule,
            affix,
            allow_source_dir,
            template.as_deref(),
            &watermark,
        ),
        Commands::Preview {
            image,
            output,
            scale,
            max_dim,
            template,
            watermark,
        } => commands::preview::run(
            &app,
            image,
            output,
            scale,
            max_dim,
            template.as_deref(),
            &watermark,
        ),
        Commands::Template { action } => commands::template::run(&app, action),
        Commands::Fonts => commands::fonts::run(),
    }
}
