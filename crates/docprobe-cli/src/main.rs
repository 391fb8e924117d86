use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docprobe_client::HttpRenderer;
use docprobe_core::inventory::{build_inventory, top_level};
use docprobe_core::suite::{Outcome, TracingSuiteReporter, plan};
use docprobe_core::traits::Renderer;
use docprobe_core::{
    BaselineMode, BaselineStore, ProbeError, RenderConfig, Report, Scenario, SiteProfile, SuiteConfig,
    Verifier,
};
use docprobe_harness::{PortNegotiator, ServerConfig, Session, SessionConfig, StaticServer};

#[derive(Parser)]
#[command(name = "docprobe", version, about = "Verify a built documentation site in a real browser")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the component pages found in the markdown sources
    Inventory {
        /// Markdown source root (the directory containing `components/`)
        #[arg(short, long, env = "DOCPROBE_DOCS_DIR")]
        docs: PathBuf,

        /// Only pages shallow enough to be verified
        #[arg(long, default_value_t = false)]
        top_level: bool,

        /// Site profile JSON (defaults to the built-in profile)
        #[arg(long, env = "DOCPROBE_PROFILE")]
        profile: Option<PathBuf>,
    },

    /// Serve the built site and verify every page
    Verify {
        #[command(flatten)]
        args: VerifyArgs,

        /// Record table counts instead of comparing them
        #[arg(long, default_value_t = false)]
        accept_baselines: bool,
    },

    /// Inspect or refresh the table-count baselines
    Baseline {
        #[command(subcommand)]
        command: BaselineCommand,
    },

    /// Serve the built site until Ctrl-C
    Serve {
        /// Built site directory
        #[arg(short, long, env = "DOCPROBE_SITE_DIR")]
        site: PathBuf,

        /// Preferred port; a free port is chosen if it is taken
        #[arg(short, long, env = "DOCPROBE_PORT", default_value_t = 8000)]
        port: u16,

        /// Serve index.html for unknown paths
        #[arg(long, default_value_t = false)]
        spa_fallback: bool,
    },
}

#[derive(Subcommand)]
enum BaselineCommand {
    /// Print the stored table counts
    Show {
        #[arg(short, long, env = "DOCPROBE_BASELINES", default_value = "docprobe-baselines.json")]
        baselines: PathBuf,
    },

    /// Run the suite and record the observed table counts
    Accept {
        #[command(flatten)]
        args: VerifyArgs,
    },
}

#[derive(Args)]
struct VerifyArgs {
    /// Built site directory
    #[arg(short, long, env = "DOCPROBE_SITE_DIR")]
    site: PathBuf,

    /// Markdown source root (the directory containing `components/`)
    #[arg(short, long, env = "DOCPROBE_DOCS_DIR")]
    docs: PathBuf,

    /// Table-count baseline file
    #[arg(short, long, env = "DOCPROBE_BASELINES", default_value = "docprobe-baselines.json")]
    baselines: PathBuf,

    /// Site profile JSON (defaults to the built-in profile)
    #[arg(long, env = "DOCPROBE_PROFILE")]
    profile: Option<PathBuf>,

    /// Preferred port; a free port is chosen if it is taken
    #[arg(short, long, env = "DOCPROBE_PORT", default_value_t = 8000)]
    port: u16,

    /// Fetch pages over plain HTTP instead of a headless browser
    #[arg(long, env = "DOCPROBE_NO_BROWSER", default_value_t = false)]
    no_browser: bool,

    /// Only run scenarios whose name contains this string
    #[arg(short, long)]
    filter: Option<String>,

    /// Print the report as JSON on stdout
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Serve index.html for unknown paths
    #[arg(long, env = "DOCPROBE_SPA_FALLBACK", default_value_t = false)]
    spa_fallback: bool,

    /// Upper bound for a navigation to reach document construction, in seconds
    #[arg(long, env = "DOCPROBE_NAV_TIMEOUT_SECS", default_value_t = 30)]
    nav_timeout_secs: u64,

    /// Wait after navigation so client-side rendering can finish, in milliseconds
    #[arg(long, env = "DOCPROBE_SETTLE_MS", default_value_t = 2000)]
    settle_ms: u64,

    /// Upper bound for the wait on --wait-selector, in milliseconds
    #[arg(long, env = "DOCPROBE_SELECTOR_TIMEOUT_MS", default_value_t = 5000)]
    selector_timeout_ms: u64,

    /// Element to wait for before capturing a page; empty disables the wait
    #[arg(long, env = "DOCPROBE_WAIT_SELECTOR", default_value = "main table")]
    wait_selector: String,

    /// Ceiling for a whole scenario, render included, in seconds
    #[arg(long, env = "DOCPROBE_SCENARIO_TIMEOUT_SECS", default_value_t = 60)]
    scenario_timeout_secs: u64,
}

impl VerifyArgs {
    fn render_config(&self) -> Result<RenderConfig> {
        let wait_selector = self.wait_selector.trim();
        let config = RenderConfig {
            navigation_timeout: Duration::from_secs(self.nav_timeout_secs),
            settle_delay: Duration::from_millis(self.settle_ms),
            selector_timeout: Duration::from_millis(self.selector_timeout_ms),
            wait_selector: (!wait_selector.is_empty()).then(|| wait_selector.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    fn suite_config(&self, baseline_mode: BaselineMode) -> Result<SuiteConfig> {
        let config = SuiteConfig {
            scenario_timeout: Duration::from_secs(self.scenario_timeout_secs),
            baseline_mode,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Exit code when at least one scenario failed.
const EXIT_SCENARIOS_FAILED: i32 = 1;
/// Exit code when the run was aborted before any scenario.
const EXIT_SETUP_FAILED: i32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("docprobe=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inventory {
            docs,
            top_level,
            profile,
        } => cmd_inventory(&docs, top_level, profile.as_deref())?,
        Commands::Verify {
            args,
            accept_baselines,
        } => {
            let mode = if accept_baselines {
                BaselineMode::Accept
            } else {
                BaselineMode::Check
            };
            exit_on_failure(cmd_verify(&args, mode).await)?;
        }
        Commands::Baseline { command } => match command {
            BaselineCommand::Show { baselines } => cmd_baseline_show(&baselines)?,
            BaselineCommand::Accept { args } => {
                exit_on_failure(cmd_verify(&args, BaselineMode::Accept).await)?;
            }
        },
        Commands::Serve {
            site,
            port,
            spa_fallback,
        } => cmd_serve(site, port, spa_fallback).await?,
    }

    Ok(())
}

/// Map a verification result onto the process exit code.
fn exit_on_failure(result: Result<bool>) -> Result<()> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(EXIT_SCENARIOS_FAILED),
        Err(e) if is_setup_failure(&e) => {
            tracing::error!("Setup failed, no scenario ran: {e:#}");
            std::process::exit(EXIT_SETUP_FAILED)
        }
        Err(e) => Err(e),
    }
}

fn is_setup_failure(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ProbeError>()
        .is_some_and(ProbeError::is_setup_fatal)
}

fn load_profile(path: Option<&Path>) -> Result<SiteProfile> {
    match path {
        Some(path) => SiteProfile::load(path)
            .with_context(|| format!("Failed to load site profile: {}", path.display())),
        None => Ok(SiteProfile::default()),
    }
}

fn cmd_inventory(docs: &Path, only_top_level: bool, profile: Option<&Path>) -> Result<()> {
    let profile = load_profile(profile)?;
    let mut ids = build_inventory(docs, &profile.inventory);
    if only_top_level {
        ids = top_level(&ids, profile.max_component_depth);
    }

    for id in &ids {
        println!("{id}");
    }
    tracing::info!("{} pages", ids.len());
    Ok(())
}

/// Run the suite. Returns whether every scenario passed.
async fn cmd_verify(args: &VerifyArgs, mode: BaselineMode) -> Result<bool> {
    let profile = load_profile(args.profile.as_deref())?;
    let inventory = build_inventory(&args.docs, &profile.inventory);
    let mut scenarios = plan(&profile, &inventory);
    if let Some(filter) = &args.filter {
        scenarios.retain(|s| s.name(&profile).contains(filter.as_str()));
    }
    if scenarios.is_empty() {
        bail!("No scenarios selected");
    }

    let mut baselines = BaselineStore::load(args.baselines.clone())
        .with_context(|| format!("Failed to load baselines: {}", args.baselines.display()))?;
    let render_config = args.render_config()?;
    let suite_config = args.suite_config(mode)?;
    let session_config = SessionConfig {
        site_root: args.site.clone(),
        spa_fallback: args.spa_fallback,
    };
    let ports = PortNegotiator::new(args.port);
    let suite = Suite {
        session: &session_config,
        ports: &ports,
        profile: &profile,
        scenarios: &scenarios,
        config: suite_config,
    };

    let report = if args.no_browser {
        suite.run(HttpRenderer::new()?, &mut baselines).await?
    } else {
        run_with_browser(suite, render_config, &mut baselines).await?
    };

    if mode == BaselineMode::Accept && baselines.is_dirty() {
        baselines.save()?;
        tracing::info!(
            "Saved {} baselines to {}",
            baselines.len(),
            args.baselines.display()
        );
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report);
    }

    Ok(report.is_success())
}

#[cfg(feature = "browser")]
async fn run_with_browser(
    suite: Suite<'_>,
    render_config: RenderConfig,
    baselines: &mut BaselineStore,
) -> Result<Report> {
    use docprobe_client::{BrowserRenderer, FallbackRenderer};

    let browser = BrowserRenderer::launch(render_config)
        .await
        .context("Failed to launch browser (use --no-browser to fetch over HTTP)")?;
    let renderer = FallbackRenderer::new(browser, HttpRenderer::new()?);
    suite.run(renderer, baselines).await
}

#[cfg(not(feature = "browser"))]
async fn run_with_browser(
    suite: Suite<'_>,
    _render_config: RenderConfig,
    baselines: &mut BaselineStore,
) -> Result<Report> {
    tracing::warn!("Built without browser support, fetching pages over HTTP");
    suite.run(HttpRenderer::new()?, baselines).await
}

/// Everything a run needs except the renderer.
struct Suite<'a> {
    session: &'a SessionConfig,
    ports: &'a PortNegotiator,
    profile: &'a SiteProfile,
    scenarios: &'a [Scenario],
    config: SuiteConfig,
}

impl Suite<'_> {
    async fn run<R: Renderer>(self, renderer: R, baselines: &mut BaselineStore) -> Result<Report> {
        let session = Session::start(self.session, self.ports, renderer).await?;
        let config = self.config;
        let report = session
            .scoped(async |session| {
                Verifier::new(session.renderer(), session.base_url().clone(), self.profile, config)
                    .run(self.scenarios, baselines, &TracingSuiteReporter)
                    .await
            })
            .await;
        Ok(report)
    }
}

fn print_summary(report: &Report) {
    for scenario in &report.scenarios {
        match &scenario.outcome {
            Outcome::Passed { notes } => {
                println!("  [PASS] {} ({} ms)", scenario.name, scenario.duration_ms);
                for note in notes {
                    println!("         {note}");
                }
            }
            Outcome::Failed { reason } => {
                println!("  [FAIL] {}: {reason}", scenario.name);
            }
            Outcome::TimedOut { after_secs } => {
                println!("  [FAIL] {}: timed out after {after_secs}s", scenario.name);
            }
        }
    }

    println!(
        "\n{} passed, {} failed ({} scenarios against {})",
        report.passed(),
        report.failed(),
        report.scenarios.len(),
        report.base_url
    );
}

fn cmd_baseline_show(path: &Path) -> Result<()> {
    let store = BaselineStore::load(path.to_path_buf())?;
    if store.is_empty() {
        println!("No baselines recorded in {}", path.display());
        return Ok(());
    }

    println!("Table-count baselines in {}:\n", path.display());
    for (key, count) in store.entries() {
        println!("  {count:>3}  {key}");
    }
    println!("\nTotal: {} pages", store.len());
    Ok(())
}

async fn cmd_serve(site: PathBuf, port: u16, spa_fallback: bool) -> Result<()> {
    let ports = PortNegotiator::new(port);
    let config = ServerConfig {
        root: site,
        spa_fallback,
    };
    let server = StaticServer::bind(&config, ports.port().await?).await?;
    println!("Serving {} at {}", config.root.display(), server.base_url());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    server.shutdown().await;
    Ok(())
}
