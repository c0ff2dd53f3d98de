use anyhow::Result;
use chrono::{Duration as ChronoDuration, Local};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vigia::checker::{AppointmentChecker, CheckerConfig, Target};
use vigia::config::Config;
use vigia::models::TargetConfig;
use vigia::notify::{self, Notifier, TelegramChannel};
use vigia::probes::{AlicanteProbe, MadridProbe, SedeProbe, StaticProbe, TargetProbe};
use vigia::scheduler::SweepScheduler;
use vigia::server;

#[derive(Parser)]
#[command(
    name = "vigia",
    version,
    about = "Appointment slot watcher for Spanish booking portals with Telegram alerts",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the watcher: periodic sweeps plus the liveness endpoint
    Watch,

    /// Run a single sweep and print the report
    Check {
        /// Override the end of the probe window (DD/MM/YYYY)
        #[arg(long)]
        date_limit: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(&cli.log_format, cli.verbose)?;

    match cli.command {
        Commands::Watch => watch().await?,
        Commands::Check { date_limit } => check(date_limit).await?,
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("vigia=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new("vigia=info,warn")
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    Ok(())
}

/// Canned probe used in simulate mode. The offered dates sit a few days out
/// so they always land inside the probe window.
fn simulated_probe(name: &str) -> StaticProbe {
    let today = Local::now().date_naive();
    StaticProbe::offering(
        name,
        vec![today + ChronoDuration::days(3), today + ChronoDuration::days(4)],
    )
}

/// Assemble the target list from config: every known site, enabled or not,
/// with its probe (live or canned per the simulate flag).
fn build_targets(config: &Config) -> vigia::error::Result<Vec<Target>> {
    let simulate = config.app.simulate;
    let date_limit = config.app.target_date_limit.clone();
    let mut targets = Vec::new();

    let mut madrid = TargetConfig::new("madrid", config.madrid.booking_url.clone());
    madrid.enabled = config.madrid.enabled;
    madrid.date_limit = date_limit.clone();
    let probe: Box<dyn TargetProbe> = if simulate {
        Box::new(simulated_probe("madrid"))
    } else {
        Box::new(MadridProbe::new(config.madrid.clone())?)
    };
    targets.push(Target::new(madrid, probe));

    let mut alicante = TargetConfig::new("alicante", config.alicante.url.clone());
    alicante.enabled = config.alicante.enabled;
    alicante.date_limit = date_limit.clone();
    let probe: Box<dyn TargetProbe> = if simulate {
        Box::new(simulated_probe("alicante"))
    } else {
        Box::new(AlicanteProbe::new(config.alicante.clone())?)
    };
    targets.push(Target::new(alicante, probe));

    let mut sede = TargetConfig::new("sede", config.sede.url.clone());
    sede.enabled = config.sede.enabled;
    sede.date_limit = date_limit;
    let probe: Box<dyn TargetProbe> = if simulate {
        Box::new(simulated_probe("sede"))
    } else if config.sede.enabled {
        Box::new(SedeProbe::new(config.sede.clone())?)
    } else {
        Box::new(StaticProbe::empty("sede"))
    };
    targets.push(Target::new(sede, probe));

    Ok(targets)
}

fn build_notifier(config: &Config) -> Result<Arc<Notifier>> {
    let mut notifier = Notifier::new();

    match TelegramChannel::from_config(&config.telegram)? {
        Some(channel) => notifier.add_channel(Box::new(channel)),
        None => tracing::warn!("telegram credentials not set, notifications will be skipped"),
    }

    Ok(Arc::new(notifier))
}

fn build_checker(config: &Config, notifier: Arc<Notifier>) -> Result<AppointmentChecker> {
    let targets = build_targets(config)?;

    let checker_config = CheckerConfig::default()
        .with_pacing(config.app.pacing_min_ms, config.app.pacing_max_ms)
        .with_error_threshold(config.app.error_threshold);

    Ok(AppointmentChecker::new(checker_config, targets, notifier))
}

/// Names of the targets that will participate in sweeps
fn enabled_target_names(config: &Config) -> Vec<String> {
    let mut names = Vec::new();
    if config.madrid.enabled {
        names.push(String::from("madrid"));
    }
    if config.alicante.enabled {
        names.push(String::from("alicante"));
    }
    if config.sede.enabled {
        names.push(String::from("sede"));
    }
    names
}

async fn watch() -> Result<()> {
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!(
        interval_ms = config.app.check_interval_ms,
        simulate = config.app.simulate,
        "vigia starting"
    );

    let notifier = build_notifier(&config)?;
    let checker = Arc::new(build_checker(&config, Arc::clone(&notifier))?);
    let state = checker.state();

    if config.app.enable_heartbeat {
        let message = notify::heartbeat_message(
            config.app.check_interval_ms / 1000,
            &enabled_target_names(&config),
            config.app.simulate,
        );
        notifier.notify(&message).await;
    }

    let scheduler = Arc::new(SweepScheduler::new(checker, config.check_interval()));
    let scheduler_task = tokio::spawn({
        let scheduler = Arc::clone(&scheduler);
        async move { scheduler.run().await }
    });

    let _keep_alive = config
        .app
        .keep_alive_url
        .clone()
        .map(server::spawn_keep_alive);

    // Blocks until a termination signal stops the listener
    server::run(config.app.port, state).await?;

    // An in-flight sweep is abandoned, not drained
    scheduler.stop();
    scheduler_task.abort();

    tracing::info!("vigia stopped");
    Ok(())
}

async fn check(date_limit: Option<String>) -> Result<()> {
    let mut config = Config::from_env()?;
    if date_limit.is_some() {
        config.app.target_date_limit = date_limit;
    }
    config.validate()?;

    let notifier = build_notifier(&config)?;
    let checker = build_checker(&config, notifier)?;
    let report = checker.sweep().await;

    println!("Sweep complete");
    for target in &report.targets {
        println!(
            "  {}: {} dates checked, {} found, {} errors{}",
            target.name,
            target.dates_checked,
            target.discoveries,
            target.errors,
            if target.aborted { " (aborted)" } else { "" }
        );
    }
    println!(
        "Total: {} dates checked, {} discoveries",
        report.dates_checked(),
        report.discoveries()
    );

    Ok(())
}
