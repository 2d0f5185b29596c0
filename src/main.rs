//! Command-line interface for marcfix.

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use log::LevelFilter;
use marcfix::config::{ArxivConfig, InspireConfig, DEFAULT_ARXIV_OAI_URL, DEFAULT_INSPIRE_URL};
use marcfix::fetch::{fetch_records, recid_pattern, InspireClient};
use marcfix::pipeline::{load_local_collections, run_rule, RunResult};
use marcfix::rules::{ArxivRule, CorrectionRule, Dedupe035Rule, PubinfoRule, VenueCorrection};
use marcfix::{doi, write_corrected_marcxml, ArxivClient};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "marcfix", version)]
#[command(about = "Correct malformed INSPIRE-HEP MARCXML records for batch re-upload")]
struct Cli {
    /// More log output (repeat for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// INSPIRE base URL
    #[arg(long, env = "INSPIRE_URL", default_value = DEFAULT_INSPIRE_URL, global = true)]
    inspire_url: String,

    #[command(subcommand)]
    command: Command,
}

/// Where the records to correct come from.
#[derive(Debug, Args)]
struct SourceArgs {
    /// INSPIRE search pattern to fetch
    #[arg(short = 'p', long, required_unless_present = "indir", requires = "outdir")]
    pattern: Option<String>,

    /// Directory to save fetched result pages in
    #[arg(short = 'o', long)]
    outdir: Option<PathBuf>,

    /// Directory of previously fetched result pages
    #[arg(short = 'i', long, conflicts_with = "pattern")]
    indir: Option<PathBuf>,

    /// Records per result page
    #[arg(short = 'l', long, default_value_t = 50)]
    page_size: usize,
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Directory for the corrected MARCXML file [default: system temp dir]
    #[arg(short = 'c', long)]
    correct_outdir: Option<PathBuf>,

    /// Also write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

impl OutputArgs {
    fn outdir(&self) -> PathBuf {
        self.correct_outdir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch search results from INSPIRE into MARCXML files
    Fetch {
        /// INSPIRE search pattern
        #[arg(short = 'p', long, required_unless_present = "recid_file", conflicts_with = "recid_file")]
        pattern: Option<String>,

        /// File of whitespace separated record IDs to fetch
        #[arg(short = 'r', long)]
        recid_file: Option<PathBuf>,

        /// Output directory
        #[arg(short = 'o', long, default_value = "inspire_xmls")]
        outdir: PathBuf,

        /// Records per result page
        #[arg(short = 'l', long, default_value_t = 50)]
        page_size: usize,
    },

    /// Split free-text 773__x pubinfo into journal, volume, year and pages
    FixPubinfo {
        /// Venue name as wrongly entered (repeatable, paired with --correct)
        #[arg(long = "wrong", required = true)]
        wrong: Vec<String>,

        /// Correct venue name (repeatable, paired with --wrong)
        #[arg(long = "correct", required = true)]
        correct: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Add the arXiv primary category to 037 and the arXiv 035
    FixArxiv {
        /// arXiv OAI-PMH endpoint
        #[arg(long, env = "ARXIV_OAI_URL", default_value = DEFAULT_ARXIV_OAI_URL)]
        arxiv_url: String,

        /// Seconds to wait between arXiv requests
        #[arg(long, default_value_t = 5)]
        delay: u64,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Drop repeated arXiv 035 fields from the listed records
    #[command(name = "dedupe-035")]
    Dedupe035 {
        /// File of whitespace separated record IDs
        #[arg(long)]
        recids: PathBuf,

        /// Directory of previously fetched result pages
        #[arg(short = 'i', long)]
        indir: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract DOIs from a tab-separated export and list those not in INSPIRE
    ExtractDois {
        /// Tab-separated file with DOI and Reference columns
        input: PathBuf,

        /// Output directory [default: system temp dir]
        #[arg(short = 'c', long)]
        outdir: Option<PathBuf>,

        /// Do not query INSPIRE; list every DOI found
        #[arg(long)]
        skip_inspire_check: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn inspire_client(base_url: &str, page_size: usize) -> Result<InspireClient> {
    let config = InspireConfig::default()
        .with_base_url(base_url)
        .with_page_size(page_size);
    InspireClient::new(config).context("Failed to build INSPIRE client")
}

/// Fetch or load the documents named by the source arguments.
fn load_documents(source: &SourceArgs, inspire_url: &str) -> Result<Vec<String>> {
    if let Some(indir) = &source.indir {
        return load_local_collections(indir)
            .with_context(|| format!("Failed to read {}", indir.display()));
    }

    let pattern = source
        .pattern
        .as_deref()
        .context("Either --pattern or --indir is required")?;
    let outdir = source
        .outdir
        .as_deref()
        .context("--pattern requires --outdir")?;

    let client = inspire_client(inspire_url, source.page_size)?;
    let paths = fetch_records(&client, pattern, client.config().page_size, outdir)
        .with_context(|| format!("Failed to fetch records for '{pattern}'"))?;

    paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("Failed to read {}", p.display())))
        .collect()
}

/// Write corrected records and the summary.
fn finish(result: &RunResult, output: &OutputArgs) -> Result<()> {
    if result.corrected.is_empty() {
        log::info!("No records to correct");
    } else {
        let outdir = output.outdir();
        write_corrected_marcxml(&result.corrected, &outdir)
            .with_context(|| format!("Failed to write to {}", outdir.display()))?;
    }

    result.summary.log();
    if let Some(path) = &output.summary {
        result
            .summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }
    Ok(())
}

fn run_correction<R: CorrectionRule>(
    rule: &R,
    documents: &[String],
    output: &OutputArgs,
) -> Result<()> {
    let result = run_rule(rule, documents).context("Failed to parse MARCXML")?;
    finish(&result, output)
}

fn venue_corrections(wrong: &[String], correct: &[String]) -> Result<Vec<VenueCorrection>> {
    if wrong.len() != correct.len() {
        Cli::command()
            .error(
                ErrorKind::ArgumentConflict,
                "--wrong and --correct must be given the same number of times",
            )
            .exit();
    }

    let venues = wrong
        .iter()
        .zip(correct)
        .map(|(w, c)| VenueCorrection::new(w, c))
        .collect::<marcfix::Result<Vec<_>>>()?;
    for venue in &venues {
        log::info!("Replacing venue '{}' with '{}'", venue.wrong(), venue.correct());
    }
    Ok(venues)
}

fn read_recid_file(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let pattern = recid_pattern(text.split_whitespace());
    if pattern.is_empty() {
        anyhow::bail!("{} contains no record IDs", path.display());
    }
    Ok(pattern)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Fetch {
            pattern,
            recid_file,
            outdir,
            page_size,
        } => {
            let pattern = match (pattern, recid_file) {
                (Some(p), _) => p.clone(),
                (None, Some(file)) => read_recid_file(file)?,
                (None, None) => anyhow::bail!("Either --pattern or --recid-file is required"),
            };
            log::info!("Output dir is {}", outdir.display());
            log::info!("INSPIRE search pattern: {pattern}");

            let client = inspire_client(&cli.inspire_url, *page_size)?;
            let paths = fetch_records(&client, &pattern, client.config().page_size, outdir)?;
            log::info!("Wrote {} result pages", paths.len());
        }

        Command::FixPubinfo {
            wrong,
            correct,
            source,
            output,
        } => {
            let rule = PubinfoRule::new(venue_corrections(wrong, correct)?);
            let documents = load_documents(source, &cli.inspire_url)?;
            run_correction(&rule, &documents, output)?;
        }

        Command::FixArxiv {
            arxiv_url,
            delay,
            source,
            output,
        } => {
            let config = ArxivConfig::default()
                .with_base_url(arxiv_url.as_str())
                .with_delay(Duration::from_secs(*delay));
            let lookup = ArxivClient::new(config).context("Failed to build arXiv client")?;
            let rule = ArxivRule::new(lookup);
            let documents = load_documents(source, &cli.inspire_url)?;
            run_correction(&rule, &documents, output)?;
        }

        Command::Dedupe035 {
            recids,
            indir,
            output,
        } => {
            let text = fs::read_to_string(recids)
                .with_context(|| format!("Failed to read {}", recids.display()))?;
            let rule = Dedupe035Rule::from_id_list(&text)?;
            log::info!("{} records on the denylist", rule.len());
            let documents = load_local_collections(indir)
                .with_context(|| format!("Failed to read {}", indir.display()))?;
            run_correction(&rule, &documents, output)?;
        }

        Command::ExtractDois {
            input,
            outdir,
            skip_inspire_check,
        } => {
            let file = fs::File::open(input)
                .with_context(|| format!("Failed to open {}", input.display()))?;
            let dois = doi::extract_dois(file)?;

            let new_dois = if *skip_inspire_check {
                dois.into_iter().collect()
            } else {
                let client = inspire_client(&cli.inspire_url, 1)?;
                doi::dois_not_in_inspire(&client, &dois)?
            };

            let outdir = outdir.clone().unwrap_or_else(std::env::temp_dir);
            doi::write_doi_list(&new_dois, &outdir)?;
        }
    }

    Ok(())
}
