use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use desk_core::{DeskSession, DispatchLoop, IntervalTicks, TickSource};
use device_link::{build_link, DeviceLink};
use storage::{prepare_preset_path, JsonPresetFile};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod console;

use config::load_settings;
use console::Command;

#[derive(Parser, Debug)]
#[command(about = "Lighting desk: drives a channel bank over a DMX output link")]
struct Args {
    #[arg(long, default_value = "desk.toml")]
    config: PathBuf,
    #[arg(long)]
    presets: Option<String>,
    /// Output link: dry-run or udmx.
    #[arg(long)]
    link: Option<String>,
    #[arg(long)]
    channels: Option<usize>,
    #[arg(long)]
    tick_ms: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config);
    if let Some(presets) = args.presets {
        settings.presets_path = presets;
    }
    if let Some(link) = args.link {
        settings.link = link;
    }
    if let Some(channels) = args.channels {
        settings.channel_count = channels;
    }
    if let Some(tick_ms) = args.tick_ms {
        settings.tick_interval_ms = tick_ms;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = settings.desk_config()?;
    let presets_path = prepare_preset_path(&settings.presets_path)?;
    let persistence = JsonPresetFile::new(presets_path);
    let mut session = DeskSession::restore(config.clone(), &persistence);

    let mut link = build_link(settings.link_kind()?).context("failed to build output link")?;
    if let Err(error) = link.open() {
        warn!(%error, "output link unavailable; retrying on the reconnect cadence");
    }
    let mut dispatch = DispatchLoop::new(link, &config);
    let mut ticks = IntervalTicks::new(config.tick_interval);

    info!(
        channels = config.channel_count,
        max_preset = config.max_preset_index(),
        tick_ms = config.tick_interval.as_millis() as u64,
        link = %settings.link,
        presets = %persistence.path().display(),
        "desk running"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let shutdown_signal = tokio::signal::ctrl_c();
    tokio::pin!(shutdown_signal);

    // Each branch runs to completion before the next is polled, so input
    // handlers never interleave with a tick.
    loop {
        tokio::select! {
            _ = ticks.next_tick() => {
                let report = dispatch.tick(&mut session);
                if report.sent > 0 || report.reconnected {
                    debug!(?report, "tick");
                }
            }
            line = lines.next_line(), if input_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match console::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => println!("{}", console::apply(command, &mut session, &persistence)),
                    Err(error) => println!("{error}"),
                },
                Ok(None) => {
                    info!("console input closed; running until interrupted");
                    input_open = false;
                }
                Err(error) => {
                    warn!(%error, "console input failed");
                    input_open = false;
                }
            },
            _ = &mut shutdown_signal => {
                info!("shutdown requested");
                break;
            }
        }
    }

    desk_core::shutdown(&session, dispatch, &persistence)
}
