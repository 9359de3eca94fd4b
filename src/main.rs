use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use sailpad::cli::Cli;
use sailpad::config::Config;
use sailpad::controller::{DeviceSettings, GamepadSource};
use sailpad::link;
use sailpad::streaming::CommandStreamer;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref()).await?;
    cli.apply(&mut config);
    config.validate()?;
    info!(
        "Streaming to {}:{} over {:?}",
        config.link.host,
        config.link.effective_port(),
        config.link.transport
    );

    let stop = CancellationToken::new();
    let loop_stop = stop.clone();

    // gilrs and the sockets block, keep the whole loop on one blocking thread
    let mut streamer = tokio::task::spawn_blocking(move || stream(config, loop_stop));

    let joined = tokio::select! {
        joined = &mut streamer => joined,
        signal = tokio::signal::ctrl_c() => {
            match signal {
                Ok(()) => {
                    info!("Ctrl-C received, stopping after the current cycle");
                    stop.cancel();
                }
                Err(e) => warn!("Unable to listen for Ctrl-C: {}", e),
            }
            streamer.await
        }
    };

    let messages_sent = joined.map_err(|e| eyre!("Streaming task failed: {}", e))??;
    info!("Stream ended, {} messages sent", messages_sent);
    Ok(())
}

fn stream(config: Config, stop: CancellationToken) -> Result<u64> {
    let mapper = config.axes.mapper()?;

    let source = GamepadSource::create(Some(DeviceSettings::from(&config.device)))?.initialize()?;
    let sink = link::open(&config.link)?;

    let echo: Option<Box<dyn Write>> = if config.display.echo {
        Some(Box::new(io::stdout()))
    } else {
        None
    };

    let terminated = CommandStreamer::connect(Box::new(source), sink, mapper, echo).run(&stop);
    Ok(terminated.into_result()?)
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

// Logs go to stderr, stdout carries the payload echo
fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
