//! Owns the registry, the bus, and the two workers: wires them together,
//! runs the periodic TTL timer, and drives shutdown.

use crate::config::Cli;
use crate::workers::{mailbox::MailboxWorker, stream::StreamWorker};
use alertsd_bus::{mailbox_channel, ControlMessage, InProcessBus};
use alertsd_core::{persistence, Registry};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

pub async fn run(cli: Cli) -> Result<()> {
    let entries = persistence::load(&cli.state_file).unwrap_or_else(|err| {
        tracing::warn!(%err, "failed to load snapshot, starting with an empty registry");
        Vec::new()
    });
    tracing::info!(loaded = entries.len(), "registry loaded");
    let registry = Registry::from_entries(entries);

    let bus: Arc<InProcessBus> = Arc::new(InProcessBus::default());
    let stream_bus = bus.clone() as Arc<dyn alertsd_bus::AlertStream>;
    let mailbox_bus = bus.clone() as Arc<dyn alertsd_bus::AlertStream>;

    let (list_mailbox, list_rx) = mailbox_channel("rfc-alerts-list", 64);
    let (acknowledge_mailbox, acknowledge_rx) = mailbox_channel("rfc-alerts-acknowledge", 64);
    // Exposed for a future real transport to bind these subjects to; the
    // in-process bus has no external listener, so they're unused here
    // beyond keeping the sender halves alive.
    let _ = (&list_mailbox, &acknowledge_mailbox);

    let (stream_worker, stream_control) = StreamWorker::new(registry.clone(), stream_bus);
    let (mailbox_worker, mailbox_control) =
        MailboxWorker::new(registry.clone(), mailbox_bus, list_rx, acknowledge_rx);

    let stream_handle = tokio::spawn(stream_worker.run());
    let mailbox_handle = tokio::spawn(mailbox_worker.run());

    let sweep_control = stream_control.clone();
    let sweep_interval = Duration::from_secs(cli.sweep_interval_secs.max(1));
    let timer_handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_interval);
        ticker.tick().await; // first tick fires immediately
        loop {
            ticker.tick().await;
            if sweep_control.send(ControlMessage::TtlCleanup).await.is_err() {
                return;
            }
        }
    });

    wait_for_shutdown_signal().await?;
    tracing::info!("shutdown signal received");

    timer_handle.abort();
    let _ = mailbox_control.send(ControlMessage::Term).await;
    let _ = mailbox_handle.await;
    let _ = stream_control.send(ControlMessage::Term).await;
    let _ = stream_handle.await;

    let entries = registry.lock().await.iter().cloned().collect::<Vec<_>>();
    if let Err(err) = persistence::save(&cli.state_file, &entries) {
        tracing::error!(%err, "failed to save snapshot on shutdown");
    } else {
        tracing::info!(saved = entries.len(), "snapshot saved");
    }

    Ok(())
}

/// Resolves on either SIGINT or SIGTERM (systemd `stop`, `docker stop`,
/// and a Kubernetes pod termination all send SIGTERM, not SIGINT, so
/// `ctrl_c` alone would miss them and skip the shutdown snapshot).
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("failed to install SIGINT handler"),
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .context("failed to install shutdown signal handler")
}
