use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use squat_counter_lib::core::config::AppConfig;
use squat_counter_lib::core::runtime::{self, pump_frames};
use squat_counter_lib::core::workout::{Notification, Workout};
use squat_counter_lib::models::workout::{Language, Mode};
use squat_counter_lib::platform::camera::{CameraSelector, VirtualCameraBackend};
use squat_counter_lib::platform::pose::ReplayPoseSource;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const COUNTDOWN_PERIOD: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "squat-counter", about = "Squat rep counter driven by pose landmarks")]
struct Cli {
    /// Configuration file (default: ~/.squat_counter/config/settings.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one session over a recorded landmark file
    Replay {
        /// JSON-lines recording, one `{"timestamp", "landmarks"}` object per frame
        #[arg(long)]
        landmarks: PathBuf,

        /// AUTO, FRONT or SIDE
        #[arg(long)]
        mode: Option<String>,

        /// TH or EN
        #[arg(long)]
        lang: Option<String>,

        /// Camera device id to select after setup
        #[arg(long)]
        camera: Option<String>,

        /// Countdown seconds before reps are counted
        #[arg(long)]
        countdown: Option<u32>,

        /// Deliver frames at the configured fps instead of as fast as possible
        #[arg(long)]
        paced: bool,
    },
    /// Inspect or reset the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    Show,
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => AppConfig::get_config_path()?,
    };

    match cli.command {
        Command::Config { action } => match action {
            ConfigAction::Show => {
                let config = AppConfig::load_from(&config_path)?;
                println!("{}", config_path.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            ConfigAction::Reset => {
                AppConfig::reset_at(&config_path)?;
                println!("reset {}", config_path.display());
            }
        },
        Command::Replay {
            landmarks,
            mode,
            lang,
            camera,
            countdown,
            paced,
        } => {
            let mut config = AppConfig::load_from(&config_path)
                .with_context(|| format!("loading {}", config_path.display()))?;

            if let Some(tag) = mode {
                config.default_mode = Mode::from_string(&tag)?;
            }
            if let Some(lang) = lang {
                config.default_language = Language::from_string(&lang)?;
            }
            if let Some(secs) = countdown {
                config.countdown_secs = secs;
                config.validate()?;
            }

            replay(config, landmarks, camera, paced).await?;
        }
    }

    Ok(())
}

async fn replay(
    config: AppConfig,
    landmarks: PathBuf,
    camera: Option<String>,
    paced: bool,
) -> Result<()> {
    let mut cameras = CameraSelector::new(VirtualCameraBackend::single(
        "replay",
        &landmarks.display().to_string(),
    ));
    cameras.setup().await.context("camera setup failed")?;
    if let Some(device_id) = camera {
        cameras.select(&device_id).await?;
    }

    let mut source = ReplayPoseSource::open(&landmarks, &config.pose, paced)
        .await
        .with_context(|| format!("reading {}", landmarks.display()))?;

    let (handle, join) = runtime::spawn(Workout::new(&config), COUNTDOWN_PERIOD);
    let mut notifications = handle.subscribe();

    handle.start().await?;
    wait_for_counting(&mut notifications).await?;

    let delivered = pump_frames(&mut source, &handle).await?;
    let summary = handle.stop().await?;
    let display = handle.snapshot().await?;

    drop(handle);
    join.await?;
    cameras.release();

    info!(
        "Session {} finished after {} frames",
        summary.session_id.as_deref().unwrap_or("-"),
        delivered
    );
    println!(
        "{}: {} | {}: {}",
        display.reps_label, display.rep_text, display.score_label, display.score_text
    );
    println!("{}", summary.to_text());

    Ok(())
}

/// Block until the countdown has finished and reps are being counted
async fn wait_for_counting(notifications: &mut broadcast::Receiver<Notification>) -> Result<()> {
    loop {
        match notifications.recv().await {
            Ok(Notification::CountingEnabled) => return Ok(()),
            Ok(Notification::Countdown { remaining }) => info!("Get ready... {}", remaining),
            Ok(other) => debug!("{:?}", other),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!("Missed {} notifications", skipped)
            }
            Err(broadcast::error::RecvError::Closed) => {
                anyhow::bail!("workout runtime exited before counting started")
            }
        }
    }
}
