// src/cli.rs
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::archive::DirArchive;
use crate::config::consts::{LOG_FILE, SETTINGS_FILE};
use crate::config::{AnalysisOptions, ExportFormat, Selection, Settings};
use crate::csv::to_export_string;
use crate::file::export_report;
use crate::progress::Progress;
use crate::session::Session;
use crate::taxonomy::{Taxonomy, TaxonomySource};
use crate::views;
use crate::Result;

#[derive(Parser)]
#[command(name = "grace")]
#[command(about = "Compare GRACE error reports across measurement runs")]
#[command(version)]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Append logs to a file instead of stderr
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = LOG_FILE)]
    log_file: Option<PathBuf>,

    /// Settings file
    #[arg(long, global = true, default_value = SETTINGS_FILE)]
    config: PathBuf,

    /// Error taxonomy resource (CODE_ERREUR;FAMILLE)
    #[arg(long, global = true)]
    taxonomy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest runs, print the comparison and write the report
    Analyze(AnalyzeArgs),

    /// List elements found in the runs with their period counts
    Elements {
        /// Extracted run directories, in processing order
        #[arg(required = true)]
        runs: Vec<PathBuf>,
    },

    /// List error families
    Families,

    /// Print the family of each error code
    Classify {
        #[arg(required = true)]
        codes: Vec<String>,
    },
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Extracted run directories, in processing order
    #[arg(required = true)]
    runs: Vec<PathBuf>,

    /// Element (PM) to compare; repeatable. Defaults to all
    #[arg(long = "pm")]
    elements: Vec<String>,

    /// Error family to compare; repeatable. Defaults to all
    #[arg(long = "family")]
    families: Vec<String>,

    /// Report directory
    #[arg(short, long)]
    out: Option<PathBuf>,

    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Omit header rows from exported tables
    #[arg(long)]
    no_headers: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Tsv,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Tsv => ExportFormat::Tsv,
        }
    }
}

/// Per-archive status lines on stderr.
struct ConsoleProgress {
    total: usize,
    done: usize,
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
    }

    fn item_done(&mut self, archive: &str, records: usize) {
        self.done += 1;
        eprintln!("[{}/{}] {archive}: {records} records", self.done, self.total);
    }

    fn item_failed(&mut self, archive: &str, reason: &str) {
        self.done += 1;
        eprintln!("[{}/{}] {archive}: FAILED ({reason})", self.done, self.total);
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::log::init(cli.verbose, cli.log_file.as_deref())?;

    let settings = Settings::load(&cli.config)?;
    let mut opts = AnalysisOptions::default();
    settings.apply(&mut opts);
    if let Some(t) = &cli.taxonomy {
        opts.taxonomy_path = Some(t.clone());
    }

    match cli.command {
        Command::Analyze(args) => analyze(args, opts, &settings),
        Command::Elements { runs } => {
            let session = ingest(&runs, &opts);
            for e in session.elements() {
                println!("{}\t{} period(s)\t{} record(s)", e.element_ref, e.periods, e.records);
            }
            Ok(())
        }
        Command::Families => {
            let taxonomy = load_taxonomy(&opts);
            for family in taxonomy.families() {
                println!("{family}");
            }
            Ok(())
        }
        Command::Classify { codes } => {
            let taxonomy = load_taxonomy(&opts);
            for code in &codes {
                println!("{code}\t{}", taxonomy.classify(code));
            }
            Ok(())
        }
    }
}

fn load_taxonomy(opts: &AnalysisOptions) -> Taxonomy {
    let taxonomy = Taxonomy::load_or_builtin(opts.taxonomy_path.as_deref());
    if let (Some(wanted), TaxonomySource::BuiltIn) = (&opts.taxonomy_path, taxonomy.source()) {
        eprintln!("warning: {} unusable, using the built-in taxonomy", wanted.display());
    }
    taxonomy
}

fn ingest(runs: &[PathBuf], opts: &AnalysisOptions) -> Session {
    let mut session = Session::new(load_taxonomy(opts));
    let sources: Vec<DirArchive> = runs.iter().map(|run| DirArchive::new(run.as_path())).collect();
    let mut progress = ConsoleProgress { total: 0, done: 0 };
    let summary = session.analyze(&sources, Some(&mut progress));
    eprintln!(
        "{} archive(s), {} record(s), {} element(s)",
        summary.archives, summary.records, summary.elements
    );
    session
}

fn analyze(args: AnalyzeArgs, mut opts: AnalysisOptions, settings: &Settings) -> Result<()> {
    if let Some(out) = &args.out {
        opts.export.set_out_dir(out);
    }
    if let Some(f) = args.format {
        opts.export.format = f.into();
    }
    if args.no_headers {
        opts.export.include_headers = false;
    }

    let mut session = ingest(&args.runs, &opts);
    for e in session.elements() {
        println!("{}\t{} period(s)", e.element_ref, e.periods);
    }

    session.select_all();
    let all = session.selection().clone();
    let elements = if args.elements.is_empty() { all.elements } else { args.elements };
    let families = if !args.families.is_empty() {
        args.families
    } else if !settings.families.is_empty() {
        settings.families.clone()
    } else {
        all.families
    };
    session.select(Selection::new(elements, families));

    let table = views::comparison_table(&session)?;
    println!();
    print!("{}", to_export_string(&table.headers, &table.rows, true, '\t'));

    let paths = export_report(&session, &opts.export)?;
    eprintln!("Report written:");
    for p in [&paths.raw_data, &paths.comparison, &paths.charts] {
        eprintln!("  {}", p.display());
    }
    Ok(())
}
