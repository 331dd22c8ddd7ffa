//! Command line flags and the non-interactive subcommands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use toshokan_core::{
    search, Command, ConfigError, OpenTarget, Outcome, Session, TagFilter, ToshokanConfig,
};

/// Toshokan - personal paper library and reading tracker.
#[derive(Debug, Parser)]
#[command(name = "toshokan")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/toshokan/config.toml).
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Document directory.
    #[arg(long, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Notes directory.
    #[arg(long, value_name = "DIR")]
    pub notes: Option<PathBuf>,

    /// Bibliography directory.
    #[arg(long, value_name = "DIR")]
    pub bibs: Option<PathBuf>,

    /// Catalog file.
    #[arg(long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Log file (default: <data dir>/toshokan/toshokan.log).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Where `e` in the library view writes the bibliography export.
    #[arg(long, value_name = "FILE", default_value = "toshokan-export.bib")]
    pub export_path: PathBuf,

    /// Run a subcommand instead of the terminal UI.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Effective configuration: flags over config file over defaults.
    pub fn config(&self) -> Result<ToshokanConfig, ConfigError> {
        let mut config = ToshokanConfig::load(self.config_file.as_deref())?;
        let paths = &mut config.paths;
        if let Some(library) = &self.library {
            paths.library = library.clone();
        }
        if let Some(notes) = &self.notes {
            paths.notes = notes.clone();
        }
        if let Some(bibs) = &self.bibs {
            paths.bibs = bibs.clone();
        }
        if let Some(catalog) = &self.catalog {
            paths.catalog = catalog.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

/// Non-interactive subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the entries of a view.
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Keep entries whose title, authors or year contain this text.
        #[arg(long, short)]
        search: Option<String>,
    },
    /// Print the tag panel with entry counts.
    Tags,
    /// Concatenate the bibliography records of a view into one file.
    Export {
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file (default: --export-path).
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the path of an entry's document, notes or bibliography file.
    Path {
        /// Entry id (the document filename).
        id: String,
        #[arg(value_enum, default_value_t = TargetArg::Document)]
        target: TargetArg,
    },
}

/// View selection shared by `list` and `export`.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Only entries carrying this tag.
    #[arg(long, short, conflicts_with_all = ["read", "unread"])]
    pub tag: Option<String>,
    /// Only read entries.
    #[arg(long, conflicts_with = "unread")]
    pub read: bool,
    /// Only unread entries.
    #[arg(long)]
    pub unread: bool,
}

impl FilterArgs {
    pub fn filter(&self) -> TagFilter {
        match (&self.tag, self.read, self.unread) {
            (Some(tag), _, _) => TagFilter::Tag(tag.trim().to_string()),
            (None, true, _) => TagFilter::Read,
            (None, _, true) => TagFilter::Unread,
            (None, false, false) => TagFilter::All,
        }
    }
}

/// Which file `path` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Document,
    Notes,
    Bib,
}

impl From<TargetArg> for OpenTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Document => OpenTarget::Document,
            TargetArg::Notes => OpenTarget::Notes,
            TargetArg::Bib => OpenTarget::Bibliography,
        }
    }
}

/// Run one subcommand against an opened session.
pub fn run_command(
    mut session: Session,
    command: Commands,
    export_path: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::List { filter, search: query } => {
            let rows = session.view(&filter.filter());
            let rows = match query {
                Some(query) => search(rows, &query),
                None => rows,
            };
            for row in rows {
                let entry = row.entry;
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    entry.read_marker(),
                    entry.year,
                    entry.authors,
                    entry.title,
                    row.id
                );
            }
        }
        Commands::Tags => {
            for filter in session.tag_filters() {
                let count = session.view(&filter).len();
                println!("{}\t{count}", session.tag_label(&filter));
            }
        }
        Commands::Export { filter, output } => {
            let destination = output.unwrap_or(export_path);
            let outcome = session.execute(Command::Export {
                filter: filter.filter(),
                destination: destination.clone(),
            })?;
            if let Outcome::Exported(report) = outcome {
                for id in &report.missing {
                    eprintln!("no bibliography record for {id}");
                }
                println!(
                    "wrote {} record(s) to {}",
                    report.written,
                    destination.display()
                );
            }
        }
        Commands::Path { id, target } => {
            let outcome = session.execute(Command::Open {
                id,
                target: target.into(),
            })?;
            if let Outcome::Launch { path, .. } = outcome {
                println!("{}", path.display());
            }
        }
    }
    Ok(())
}
