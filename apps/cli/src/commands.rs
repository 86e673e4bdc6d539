//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use execscout_core::{CompanyJob, CompanyResult, ExecutiveFinder, ProgressReporter};
use execscout_shared::{
    AppConfig, CompanyMeta, Document, init_config, load_config, load_config_from,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn};
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ExecScout: find owners and directors on small-business websites.
#[derive(Parser)]
#[command(
    name = "execscout",
    version,
    about = "Discover executives and their contact details from saved company web pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (defaults to ~/.execscout/execscout.toml).
    #[arg(long, env = "EXECSCOUT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Process one company from saved HTML pages.
    Run {
        /// Company trading name.
        #[arg(long)]
        company: String,

        /// Company web domain, e.g. example.co.uk.
        #[arg(long)]
        domain: String,

        /// Saved HTML pages belonging to the company.
        #[arg(required = true)]
        pages: Vec<PathBuf>,
    },

    /// Process every company listed in a JSON manifest.
    Batch {
        /// Manifest of `[{ "name", "domain", "pages": [...] }]`; page paths
        /// are relative to the manifest.
        manifest: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// parseable JSON.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "execscout=info",
        1 => "execscout=debug",
        _ => "execscout=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run {
            company,
            domain,
            pages,
        } => cmd_run(cli.config.as_deref(), &company, &domain, &pages).await,
        Command::Batch { manifest } => cmd_batch(cli.config.as_deref(), &manifest).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()).await,
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Page loading
// ---------------------------------------------------------------------------

/// One manifest entry.
#[derive(Debug, Deserialize)]
struct ManifestEntry {
    name: String,
    domain: String,
    #[serde(default)]
    pages: Vec<PathBuf>,
}

fn company_meta(name: &str, domain: &str) -> Result<CompanyMeta> {
    let domain = domain.trim().trim_end_matches('/');
    let root = Url::parse(&format!("https://{domain}/"))
        .map_err(|e| eyre!("invalid domain '{domain}': {e}"))?;
    let host = root
        .host_str()
        .ok_or_else(|| eyre!("domain '{domain}' has no host"))?;
    Ok(CompanyMeta::new(name, host))
}

/// Document URL for a saved page: `https://<domain>/<file stem>`.
fn page_url(domain: &str, path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match stem.as_str() {
        "" | "index" | "home" => format!("https://{domain}/"),
        _ => format!("https://{domain}/{stem}"),
    }
}

fn load_page(domain: &str, path: &Path) -> Result<Document> {
    let html = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read page {}", path.display()))?;
    Ok(Document::from_html(page_url(domain, path), &html))
}

/// Load every readable page; unreadable ones are logged and skipped.
fn load_pages(domain: &str, paths: &[PathBuf]) -> Vec<Document> {
    paths
        .iter()
        .filter_map(|path| match load_page(domain, path) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(page = %path.display(), error = %e, "skipping unreadable page");
                None
            }
        })
        .collect()
}

fn read_manifest(path: &Path) -> Result<Vec<CompanyJob>> {
    let raw = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read manifest {}", path.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("invalid manifest {}", path.display()))?;
    let base = path.parent().unwrap_or(Path::new("."));

    entries
        .into_iter()
        .map(|entry| {
            let company = company_meta(&entry.name, &entry.domain)?;
            let pages: Vec<PathBuf> = entry.pages.iter().map(|p| base.join(p)).collect();
            let documents = load_pages(&company.domain, &pages);
            Ok(CompanyJob { company, documents })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: Option<&Path>, name: &str, domain: &str, pages: &[PathBuf]) -> Result<()> {
    let config = resolve_config(config)?;
    let company = company_meta(name, domain)?;
    let documents = pages
        .iter()
        .map(|p| load_page(&company.domain, p))
        .collect::<Result<Vec<_>>>()?;

    info!(company = %company.name, pages = documents.len(), "running discovery");

    let finder = ExecutiveFinder::new(config);
    let result = finder.process_company(&company, documents).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn cmd_batch(config: Option<&Path>, manifest: &Path) -> Result<()> {
    let config = resolve_config(config)?;
    let jobs = read_manifest(manifest)?;
    if jobs.is_empty() {
        return Err(eyre!("manifest {} lists no companies", manifest.display()));
    }

    info!(companies = jobs.len(), "starting batch");

    let reporter = CliProgress::new(jobs.len())?;
    let finder = ExecutiveFinder::new(config);
    let results = finder.process_batch(jobs, &reporter).await;

    for result in &results {
        println!("{}", serde_json::to_string(result)?);
    }

    let profiles: usize = results.iter().map(|r| r.profiles.len()).sum();
    eprintln!();
    eprintln!("  Companies: {}", results.len());
    eprintln!("  Profiles:  {profiles}");
    for result in &results {
        eprintln!(
            "  {:<40} grade {}  ({:.2})",
            result.company.name, result.report.grade, result.report.score
        );
    }
    eprintln!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Result<Self> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| eyre!("invalid progress template: {e}"))?
                .progress_chars("=> "),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(80));
        Ok(Self { bar })
    }
}

impl ProgressReporter for CliProgress {
    fn company_started(&self, company: &CompanyMeta, _index: usize, _total: usize) {
        self.bar.set_message(company.name.clone());
    }

    fn company_finished(&self, result: &CompanyResult, _index: usize, _total: usize) {
        if !result.warnings.is_empty() {
            self.bar.println(format!(
                "  {}: {} warning(s)",
                result.company.name,
                result.warnings.len()
            ));
        }
        self.bar.inc(1);
    }

    fn done(&self, _results: &[CompanyResult]) {
        self.bar.finish_and_clear();
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: Option<&Path>) -> Result<()> {
    let config = resolve_config(config)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
