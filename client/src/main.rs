use std::sync::Arc;

use costmap_client::config::MapConfig;
use costmap_client::fetch::HttpCostSource;
use costmap_client::session::{MapSession, SessionInput, SessionOutput};
use costmap_client::zoom::ZoomSwitch;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

/// Replays JSON-line renderer events and host commands from stdin through a
/// map session, printing render commands and host events as JSON lines.
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let config = MapConfig::from_env();
    tracing::info!(
        api_base = %config.api_base,
        year = config.cost_year,
        zoom_threshold = config.zoom_threshold,
        "starting map session"
    );
    let source = match HttpCostSource::new(&config) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "failed to build cost API client");
            return;
        }
    };

    let session = MapSession::new(ZoomSwitch::new(config.zoom_threshold), Arc::new(source));
    let (in_tx, in_rx) = mpsc::channel(64);
    let (out_tx, mut out_rx) = mpsc::channel(64);
    let running = tokio::spawn(session.run(in_rx, out_tx));

    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut line_no = 0usize;
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read stdin");
                    break;
                }
            };
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionInput>(&line) {
                Ok(input) => {
                    if in_tx.send(input).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::warn!(line = line_no, error = %e, "skipping malformed input"),
            }
        }
    });

    let mut stdout = tokio::io::stdout();
    while let Some(output) = out_rx.recv().await {
        if let Err(e) = write_output(&mut stdout, &output).await {
            tracing::error!(error = %e, "failed to write output");
            break;
        }
    }

    drop(out_rx);
    reader.abort();
    match running.await {
        Ok(controller) => tracing::info!(
            cached = controller.resolver().cache().len(),
            zoom = controller.zoom(),
            "session finished"
        ),
        Err(e) => tracing::error!(error = %e, "session task failed"),
    }
}

async fn write_output(
    stdout: &mut tokio::io::Stdout,
    output: &SessionOutput,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut line = serde_json::to_vec(output)?;
    line.push(b'\n');
    stdout.write_all(&line).await?;
    stdout.flush().await?;
    Ok(())
}
