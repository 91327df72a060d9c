use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use monies_core::{File, Transaction};
use monies_ingest::{parse_file, SourceKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod state;

#[derive(Parser, Debug)]
#[command(
    name = "monies",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MONIES_BUILD_SHA"), ")"),
    about = "Parse Nordea statement exports and card bills"
)]
struct Cli {
    /// Log parser progress (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse statement files and print the transaction count of each
    Parse {
        /// Statement files (.txt, .tsv or .pdf)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also write each parsed file as <DIR>/<file name>.json
        #[arg(long, value_name = "DIR")]
        json: Option<PathBuf>,
    },

    /// Print the transactions of a single statement file
    Show {
        file: PathBuf,
    },

    /// Manage ~/.monies/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Parse { files, json } => {
            let parser = config::load_config()?.parser_config()?;
            validate_inputs(&files)?;
            if let Some(dir) = &json {
                fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
            }
            for path in &files {
                let file = parse_file(path, &parser)
                    .with_context(|| format!("{}", path.display()))?;
                println!("{} {} transactions", file.file_name(), file.transactions().len());
                if let Some(dir) = &json {
                    let out = write_json(&file, dir)?;
                    tracing::debug!(path = %out.display(), "wrote json");
                }
            }
        }

        Command::Show { file } => {
            let parser = config::load_config()?.parser_config()?;
            validate_inputs(std::slice::from_ref(&file))?;
            let parsed = parse_file(&file, &parser)
                .with_context(|| format!("{}", file.display()))?;
            print!("{}", render_file(&parsed));
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                config::init_config()?;
            }
            ConfigCommand::Show => {
                let cfg = config::load_config()?;
                cfg.parser_config()?;
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Check every path before parsing any of them.
fn validate_inputs(files: &[PathBuf]) -> Result<()> {
    if files.is_empty() {
        bail!("no files given");
    }
    for path in files {
        if !path.exists() {
            bail!("file not found: {}", path.display());
        }
        SourceKind::from_path(path).with_context(|| format!("{}", path.display()))?;
    }
    Ok(())
}

fn write_json(file: &File, dir: &Path) -> Result<PathBuf> {
    let out = dir.join(format!("{}.json", file.file_name()));
    let body = serde_json::to_string_pretty(file).context("serialize transactions")?;
    fs::write(&out, body).with_context(|| format!("write {}", out.display()))?;
    Ok(out)
}

fn render_file(file: &File) -> String {
    let mut out = format!("{}\n{}\n", file.account(), file.file_name());
    for tx in file.transactions() {
        out.push_str(&render_row(tx));
        out.push('\n');
    }
    out
}

fn render_row(tx: &Transaction) -> String {
    format!(
        "{} {:<12} {:<40} {:>8.2}",
        tx.transaction_date.format("%d.%m.%Y"),
        tx.transaction_code,
        tx.payee_payer,
        tx.amount
    )
}
