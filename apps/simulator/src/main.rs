use anyhow::Result;
use clap::Parser;
use follow_core::{
    transport::{FrameHub, FrameHubBuilder, FrameMailbox, LocalContextTree},
    FollowController,
};
use shared::{
    domain::{FrameId, FrameInfo, FramePosition, ViewSize},
    protocol::Envelope,
};
use tracing::{debug, info, warn};

mod config;

use config::{load_settings, parse_counts, Settings};

#[derive(Parser, Debug)]
struct Args {
    /// Targets per child frame, comma separated (e.g. "2,3").
    #[arg(long)]
    child_counts: Option<String>,
    /// Targets in the top-level frame.
    #[arg(long)]
    self_count: Option<usize>,
    /// Key script, e.g. "b" or "a Backspace c Enter".
    #[arg(long)]
    keys: Option<String>,
    /// Ask activated targets to open in a new tab.
    #[arg(long)]
    new_tab: bool,
    /// Hint alphabet.
    #[arg(long)]
    charset: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(raw) = args.child_counts {
        settings.child_counts = parse_counts(&raw);
    }
    if let Some(count) = args.self_count {
        settings.self_count = count;
    }
    if let Some(keys) = args.keys {
        settings.keys = keys;
    }
    if args.new_tab {
        settings.new_tab = true;
    }
    if let Some(charset) = args.charset {
        settings.charset = charset;
    }

    run(settings).await
}

async fn run(settings: Settings) -> Result<()> {
    let view = ViewSize {
        width: 1280,
        height: 720,
    };

    let mut builder = FrameHubBuilder::new();
    let (parent_frame, parent_mailbox) = builder.register();
    let mut children = Vec::new();
    let mut pending = Vec::new();
    for (index, count) in settings.child_counts.iter().enumerate() {
        let (frame, mailbox) = builder.register();
        children.push(FrameInfo {
            frame,
            position: FramePosition {
                x: 40.0 * (index + 1) as f64,
                y: 160.0,
            },
        });
        pending.push((frame, mailbox, *count));
    }
    let hub = builder.finish();

    let mut child_tasks = Vec::new();
    for (frame, mailbox, count) in pending {
        child_tasks.push(tokio::spawn(child_frame(hub.clone(), frame, mailbox, count)));
    }

    let tree = LocalContextTree::new(hub.clone(), parent_frame, view, children);
    let expected = settings.self_count + settings.child_counts.iter().sum::<usize>();
    info!(
        children = settings.child_counts.len(),
        targets = expected,
        "simulator: starting follow mode"
    );

    // Kick the mode off the way the browser action would.
    hub.post(
        parent_frame,
        parent_frame,
        &Envelope::Start {
            new_tab: settings.new_tab,
        },
    );

    let activated = parent_frame_loop(hub, parent_frame, parent_mailbox, tree, &settings, expected).await;
    for task in child_tasks {
        let _ = task.await;
    }

    match activated {
        Some(label) => info!(label = %label, "simulator: target activated"),
        None => info!("simulator: follow mode ended without activation"),
    }
    Ok(())
}

/// The top-level frame plays both roles: it hosts the controller and it
/// renders hints for its own targets.
async fn parent_frame_loop(
    hub: FrameHub,
    frame: FrameId,
    mut mailbox: FrameMailbox,
    tree: LocalContextTree,
    settings: &Settings,
    expected: usize,
) -> Option<String> {
    let mut controller = FollowController::with_charset(tree, &settings.charset);
    let script = key_script(&settings.keys);
    let mut typing = false;
    let mut activated = None;

    while let Some(message) = mailbox.recv().await {
        let envelope = match Envelope::from_json(&message.text) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(%err, "parent: dropping undecodable message");
                continue;
            }
        };

        match envelope {
            Envelope::RequestCountTargets { .. } => {
                info!(count = settings.self_count, "parent: reporting own targets");
                hub.post(
                    frame,
                    message.sender,
                    &Envelope::ResponseCountTargets {
                        count: settings.self_count,
                    },
                );
            }
            Envelope::CreateHints { keys_array, .. } => {
                info!(labels = ?keys_array, "parent: labels assigned to top frame");
            }
            Envelope::ShowHints { keys } => {
                debug!(prefix = %keys, "parent: filtering hints");
            }
            Envelope::Activate { keys } => {
                info!(label = %keys, "parent: activate broadcast");
                activated = Some(keys);
            }
            Envelope::RemoveHints => {
                info!("parent: hints removed, leaving follow mode");
                break;
            }
            envelope => {
                if let Err(err) = controller.on_message(envelope, message.sender) {
                    warn!(%err, "parent: dropped message");
                }
            }
        }

        // Replay the key script once every frame has its labels.
        if !typing && controller.keys().len() >= expected {
            typing = true;
            for key in &script {
                if !controller.state().enabled {
                    break;
                }
                info!(key = %key, "parent: key press");
                controller.key_press(key);
            }
            if controller.state().enabled {
                info!("parent: script exhausted without a unique match; cancelling");
                controller.key_press("Escape");
            }
        }
    }

    activated
}

async fn child_frame(hub: FrameHub, frame: FrameId, mut mailbox: FrameMailbox, target_count: usize) {
    let mut labels: Vec<String> = Vec::new();

    while let Some(message) = mailbox.recv().await {
        let envelope = match Envelope::from_json(&message.text) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(frame = frame.0, %err, "child: dropping undecodable message");
                continue;
            }
        };

        match envelope {
            Envelope::RequestCountTargets { frame_position, .. } => {
                info!(
                    frame = frame.0,
                    count = target_count,
                    x = frame_position.x,
                    y = frame_position.y,
                    "child: reporting targets"
                );
                hub.post(
                    frame,
                    message.sender,
                    &Envelope::ResponseCountTargets {
                        count: target_count,
                    },
                );
            }
            Envelope::CreateHints { keys_array, .. } => {
                info!(frame = frame.0, labels = ?keys_array, "child: labels assigned");
                labels = keys_array;
            }
            Envelope::ShowHints { keys } => {
                let visible = labels.iter().filter(|label| label.starts_with(&keys)).count();
                debug!(frame = frame.0, prefix = %keys, visible, "child: filtered hints");
            }
            Envelope::Activate { keys } => {
                if labels.iter().any(|label| label == &keys) {
                    info!(frame = frame.0, label = %keys, "child: activating target");
                }
            }
            Envelope::RemoveHints => {
                debug!(frame = frame.0, "child: removing hints");
                break;
            }
            _ => {}
        }
    }
}

fn key_script(script: &str) -> Vec<String> {
    let mut keys = Vec::new();
    for token in script.split_whitespace() {
        match token {
            "Enter" | "Escape" | "Backspace" | "Delete" => keys.push(token.to_owned()),
            characters => keys.extend(characters.chars().map(|c| c.to_string())),
        }
    }
    keys
}
