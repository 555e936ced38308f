use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;

#[derive(Parser)]
#[command(name = "tenantd", about = "Multi-tenant edge router")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, default_value = "example_config.yaml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.router.validate() {
        eprintln!("invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // The guard must outlive the runtime for events to be flushed.
    let _sentry = config.logging.as_ref().map(|logging| {
        sentry::init((
            logging.sentry_dsn.clone(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    if let Some(metrics) = &config.metrics
        && let Err(e) =
            shared::metrics::init_statsd(&metrics.statsd_host, metrics.statsd_port, "tenantd")
    {
        eprintln!("could not initialize metrics: {e}");
        return ExitCode::FAILURE;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("could not start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(edge_router::run(config.router)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "router exited");
            ExitCode::FAILURE
        }
    }
}
