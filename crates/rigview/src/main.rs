use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rigview_core::{AudioFrame, Document, LightsMessage};
use rigview_ui::MonitorPage;
use tokio::fs::File;
use tokio::io::{self, AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;

/// Renders a lighting-rig monitor page from recorded event feeds.
///
/// The lights feed carries the snapshot/state/monitor messages the web GUI
/// would receive over its push channel; the optional audio feed carries
/// audio-reactive frames. Both are newline-delimited JSON.
#[derive(Parser, Debug)]
#[command(name = "rigview")]
#[command(about = "Render a lighting rig monitor page from event feeds")]
struct Args {
    /// Lights-channel feed (defaults to stdin)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Optional audio-channel feed
    #[arg(long)]
    audio: Option<PathBuf>,

    /// Where to write the rendered HTML (defaults to stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

enum PageInput {
    Lights(LightsMessage),
    Audio(AudioFrame),
}

type Feed = Box<dyn AsyncRead + Unpin + Send>;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let (tx, mut rx) = mpsc::unbounded_channel();

    let lights: Feed = match &args.input {
        Some(path) => Box::new(
            File::open(path)
                .await
                .with_context(|| format!("opening lights feed {}", path.display()))?,
        ),
        None => Box::new(io::stdin()),
    };
    tokio::spawn(read_lights(lights, tx.clone()));

    if let Some(path) = &args.audio {
        let audio: Feed = Box::new(
            File::open(path)
                .await
                .with_context(|| format!("opening audio feed {}", path.display()))?,
        );
        tokio::spawn(read_audio(audio, tx.clone()));
    }
    drop(tx);

    // Events are processed strictly in arrival order; nothing here runs in
    // parallel with the page.
    let document = Document::new("div");
    let container = document.root();
    let mut page = MonitorPage::new(document, container);

    while let Some(input) = rx.recv().await {
        match input {
            PageInput::Lights(message) => page.handle_message(message),
            PageInput::Audio(frame) => page.handle_audio(&frame),
        }
    }

    let html = page.to_html();
    page.stop();

    match &args.output {
        Some(path) => std::fs::write(path, &html)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", html),
    }
    Ok(())
}

async fn read_lights(feed: Feed, tx: mpsc::UnboundedSender<PageInput>) {
    let mut lines = BufReader::new(feed).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match LightsMessage::from_json(line) {
                    Ok(message) => {
                        if tx.send(PageInput::Lights(message)).is_err() {
                            break;
                        }
                    }
                    Err(err) => log::warn!("dropping undecodable lights message: {}", err),
                }
            }
            Ok(None) => break,
            Err(err) => {
                log::warn!("lights feed read error: {}", err);
                break;
            }
        }
    }
}

async fn read_audio(feed: Feed, tx: mpsc::UnboundedSender<PageInput>) {
    let mut lines = BufReader::new(feed).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match AudioFrame::from_json(line) {
                    Ok(frame) => {
                        if tx.send(PageInput::Audio(frame)).is_err() {
                            break;
                        }
                    }
                    Err(err) => log::warn!("dropping undecodable audio frame: {}", err),
                }
            }
            Ok(None) => break,
            Err(err) => {
                log::warn!("audio feed read error: {}", err);
                break;
            }
        }
    }
}
