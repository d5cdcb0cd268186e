//! `coak-inspect`: render a comment thread from a store snapshot.
//!
//! ```text
//! coak-inspect <snapshot.json> <video|notice> <thread-id> [--viewer ID] [--email EMAIL] [--admin] [--all]
//! ```
//!
//! Loads the snapshot into the in-memory gateways, opens a thread session as
//! the given viewer and prints what that viewer would see as JSON. With
//! `--all` every page and every reply list is loaded first.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use coak_core::namespace::ContentSource;
use coak_core::visibility::Viewer;
use coak_db::{MemoryBlobStore, MemoryStore, Snapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coak_thread::{SessionConfig, ThreadSession};

struct Args {
    snapshot: PathBuf,
    source: ContentSource,
    thread_id: String,
    viewer: Viewer,
    load_all: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut viewer_id = String::from("anonymous");
    let mut email = String::new();
    let mut is_admin = false;
    let mut load_all = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--viewer" => viewer_id = args.next().context("--viewer needs a value")?,
            "--email" => email = args.next().context("--email needs a value")?,
            "--admin" => is_admin = true,
            "--all" => load_all = true,
            flag if flag.starts_with("--") => bail!("unknown flag '{flag}'"),
            _ => positional.push(arg),
        }
    }

    let [snapshot, source, thread_id]: [String; 3] = positional.try_into().map_err(|_| {
        anyhow::anyhow!(
            "usage: coak-inspect <snapshot.json> <video|notice> <thread-id> \
             [--viewer ID] [--email EMAIL] [--admin] [--all]"
        )
    })?;

    Ok(Args {
        snapshot: PathBuf::from(snapshot),
        source: ContentSource::parse(&source)?,
        thread_id,
        viewer: Viewer::new(viewer_id, email, is_admin),
        load_all,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coak_thread=debug,coak_db=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // --- Configuration ---
    let config = SessionConfig::from_env()?;
    let args = parse_args(std::env::args().skip(1))?;
    tracing::info!(
        page_size = config.page_size,
        source = args.source.as_str(),
        thread_id = %args.thread_id,
        "Loaded configuration"
    );

    // --- Store ---
    let raw = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("reading snapshot {}", args.snapshot.display()))?;
    let snapshot: Snapshot = serde_json::from_str(&raw).context("parsing snapshot")?;
    let document_count = snapshot.documents.len();

    let store = Arc::new(MemoryStore::from_documents(snapshot.documents)?);
    let blobs = Arc::new(MemoryBlobStore::from_json(snapshot.blobs));
    tracing::info!(documents = document_count, "Seeded in-memory store");

    // --- Session ---
    let mut session = ThreadSession::new(
        config.comment_repo(store, args.source),
        config.banned_word_repo(blobs),
        args.viewer,
        args.thread_id,
    );
    session.on_appear().await?;

    if args.load_all {
        while session.has_more() {
            if session.load_more().await? == 0 {
                break;
            }
        }
        let parent_ids: Vec<String> = session.comments().iter().map(|c| c.id.clone()).collect();
        for parent_id in &parent_ids {
            session.load_replies(parent_id).await?;
        }
    }

    if let Some(notice) = session.take_notice() {
        tracing::warn!(kind = ?notice.kind, message = %notice.message, "Session notice");
    }

    println!("{}", serde_json::to_string_pretty(&session.render())?);
    Ok(())
}
