//! Inspect and maintain a persisted widget geometry file.

use std::{io, path::PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::Level;
use xyhl::{Expanse, GeometryStore, PersistMode, ScreenScaler, StoreConfig};

/// Application directory used when no file is given.
const DEFAULT_APP: &str = "xyhl";

/// CLI flags for xyhlctl.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Geometry file. Defaults to the user configuration directory.
    #[clap(short, long, value_name = "PATH", global = true)]
    file: Option<PathBuf>,

    /// Increase log verbosity. Repeat for more.
    #[clap(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List every record.
    List,
    /// Print one record as JSON.
    Show {
        /// Widget name.
        name: String,
        /// Owning form, needed when the name occurs on several forms.
        #[clap(long)]
        form: Option<String>,
    },
    /// Preview a record's bounds on a screen of another resolution.
    Scale {
        /// Widget name.
        name: String,
        /// Screen width.
        #[clap(long)]
        width: u32,
        /// Screen height.
        #[clap(long)]
        height: u32,
        /// Owning form.
        #[clap(long)]
        form: Option<String>,
    },
    /// Drop records whose form is not in the keep list.
    Prune {
        /// Forms to keep. Repeat for several.
        #[clap(long = "keep-form", value_name = "FORM", required = true)]
        keep_form: Vec<String>,
        /// Report what would be removed without writing.
        #[clap(long)]
        dry_run: bool,
    },
}

/// Install a stderr logger at a level chosen by `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .without_time()
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let path = args
        .file
        .unwrap_or_else(|| StoreConfig::default_location(DEFAULT_APP));
    let config = StoreConfig::new(&path).persist(PersistMode::Inline);
    let store = GeometryStore::open(&config)
        .with_context(|| format!("opening {}", path.display()))?;

    match args.command {
        Command::List => {
            for r in store.records() {
                println!("{r}");
            }
        }
        Command::Show { name, form } => {
            let Some(r) = store.lookup(&name, form.as_deref()) else {
                bail!("no record for {name}");
            };
            println!("{}", serde_json::to_string_pretty(&r)?);
        }
        Command::Scale {
            name,
            width,
            height,
            form,
        } => {
            let Some(r) = store.lookup(&name, form.as_deref()) else {
                bail!("no record for {name}");
            };
            let scaled = ScreenScaler::scale_for_screen(&r, Expanse::new(width, height));
            let b = scaled.bounds();
            println!(
                "{}: {}x{} at {},{} (from {}x{} reference)",
                r.name, b.w, b.h, b.tl.x, b.tl.y, r.reference_width, r.reference_height
            );
        }
        Command::Prune { keep_form, dry_run } => {
            let keep = |form: Option<&str>| form.is_some_and(|f| keep_form.iter().any(|k| k == f));
            if dry_run {
                for r in store.records().iter().filter(|r| !keep(r.form.as_deref())) {
                    println!("would remove {r}");
                }
            } else {
                let removed = store.retain(|r| keep(r.form.as_deref()));
                println!("removed {removed} records");
            }
        }
    }
    Ok(())
}
