use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use netwatch::{export, report, App, Settings};

#[derive(Parser, Debug)]
#[command(name = "netwatch")]
#[command(about = "Polls netdata hosts and reports selected metrics and alarm status")]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "netwatch.toml")]
    config: PathBuf,

    /// Poll every host once, write all sensor states to this JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Minimum seconds between two printed reports (overrides the config file)
    #[arg(short, long)]
    report_every: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,netwatch=debug")),
        )
        .init();

    let args = Args::parse();

    let settings = Settings::load(&args.config)?;
    let specs = settings.host_specs()?;
    let report_every = Duration::from_secs(
        args.report_every
            .or(settings.report_every_secs)
            .unwrap_or(1),
    );

    let app = App::setup(specs).await;

    if let Some(export_path) = args.export {
        let result = export::export_to_file(&app, &export_path);
        app.shutdown().await;
        result?;
        println!("Exported sensor state to: {}", export_path.display());
        return Ok(());
    }

    if app.hosts().is_empty() {
        app.shutdown().await;
        bail!("no host could be set up");
    }

    run(&app, report_every).await;
    app.shutdown().await;
    Ok(())
}

/// Print the table after publications until Ctrl-C.
async fn run(app: &App, report_every: Duration) {
    let (tx, mut rx) = mpsc::channel::<()>(16);

    // Forward every publication of every host into one channel.
    for mut reader in app.subscribe_all() {
        let tx = tx.clone();
        tokio::spawn(async move {
            while reader.changed().await {
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        });
    }
    drop(tx);

    print!("{}", report::render(app));
    let mut last_report = Instant::now();

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to listen for Ctrl-C");
                }
                info!("shutting down");
                break;
            }
            published = rx.recv() => {
                if published.is_none() {
                    break;
                }
                if last_report.elapsed() >= report_every {
                    println!();
                    print!("{}", report::render(app));
                    last_report = Instant::now();
                }
            }
        }
    }
}
