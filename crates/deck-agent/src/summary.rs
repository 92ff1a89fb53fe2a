//! `--test` mode: connect, print a read-only summary of OBS, disconnect.

use std::sync::Arc;

use anyhow::{Context, Result};
use deck_control::{ActionDispatcher, ConnectionManager};
use deck_transport::{InputInfo, RecordStatus, StreamStatus};

/// List entries printed before a list is cut short.
const ITEMS_SHOWN: usize = 5;

pub async fn run(manager: &Arc<ConnectionManager>) -> Result<()> {
    let config = manager.config();
    println!("Connecting to OBS at {}:{} ...", config.host(), config.port());
    manager.connect().await.context("Failed to connect to OBS")?;

    let result = report(manager).await;
    manager.disconnect().await?;
    result
}

async fn report(manager: &Arc<ConnectionManager>) -> Result<()> {
    let version = manager.get_version().await?;
    println!("Connected to OBS {version}");

    let dispatcher = ActionDispatcher::new(Arc::clone(manager));

    let scenes = dispatcher.scenes().list_scenes().await?;
    for line in scene_lines(&scenes) {
        println!("{line}");
    }

    let current = dispatcher.scenes().get_current_scene().await?;
    println!("Current scene: {current}");

    let stream = dispatcher.streams().stream_status().await?;
    println!("{}", stream_line(&stream));

    let record = dispatcher.streams().record_status().await?;
    println!("{}", record_line(&record));

    let inputs = dispatcher.sources().list_inputs(None).await?;
    for line in input_lines(&inputs) {
        println!("{line}");
    }

    println!("All checks passed");
    Ok(())
}

fn scene_lines(scenes: &[String]) -> Vec<String> {
    let mut lines = vec![format!("Scenes ({}):", scenes.len())];
    lines.extend(scenes.iter().take(ITEMS_SHOWN).map(|s| format!("  - {s}")));
    if scenes.len() > ITEMS_SHOWN {
        lines.push(format!("  ... and {} more", scenes.len() - ITEMS_SHOWN));
    }
    lines
}

fn stream_line(status: &StreamStatus) -> String {
    if status.active {
        let reconnecting = if status.reconnecting { ", reconnecting" } else { "" };
        format!("Streaming: active ({}{reconnecting})", status.timecode)
    } else {
        "Streaming: inactive".to_string()
    }
}

fn record_line(status: &RecordStatus) -> String {
    match (status.active, status.paused) {
        (true, true) => format!("Recording: paused ({})", status.timecode),
        (true, false) => format!("Recording: active ({})", status.timecode),
        (false, _) => "Recording: inactive".to_string(),
    }
}

fn input_lines(inputs: &[InputInfo]) -> Vec<String> {
    let mut lines = vec![format!("Inputs ({}):", inputs.len())];
    lines.extend(
        inputs
            .iter()
            .take(ITEMS_SHOWN)
            .map(|i| format!("  - {} [{}]", i.input_name, i.input_kind)),
    );
    if inputs.len() > ITEMS_SHOWN {
        lines.push(format!("  ... and {} more", inputs.len() - ITEMS_SHOWN));
    }
    lines
}
