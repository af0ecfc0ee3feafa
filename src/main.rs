//! Key Beam - keyboard visualizer with beams synchronized to playback
//!
//! Entry point for the application.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use serde_json::json;

use key_beam::app::ViewerApp;
use key_beam::config::{self, Settings};
use key_beam::engine::{run_headless, VisualizerEngine};
use key_beam::protocol::{EngineInput, EventChannels, InputSender, PlaybackReceiver, WireEvent};
use key_beam::timing::SystemClock;

const WINDOW_SIZE: [f32; 2] = [1280.0, 720.0];

#[derive(Parser, Debug)]
#[command(name = "key-beam", version, about = "Piano keyboard with note beams")]
struct Args {
    /// Path to a settings JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial speed slider position (31 = 100%).
    #[arg(long)]
    speed: Option<f64>,

    /// Read newline-delimited JSON events from stdin.
    #[arg(long)]
    stdin_events: bool,

    /// Run without a window; requires --stdin-events.
    #[arg(long, requires = "stdin_events")]
    headless: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("key_beam=info"))
        .init();

    let args = Args::parse();
    info!("key-beam starting");

    let mut settings = match &args.config {
        Some(path) => config::load_from_file(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(speed) = args.speed {
        settings.default_speed_value = speed;
    }

    let (sender, playback, mut handle) = EventChannels::with_defaults().split();
    let printer = spawn_playback_printer(playback);

    if args.headless {
        let [width, height] = WINDOW_SIZE;
        let mut engine = VisualizerEngine::new(settings, width as f64, height as f64);
        spawn_stdin_reader(sender, None);
        let clock = SystemClock::new();
        run_headless(&mut engine, &mut handle, &clock, |ms| {
            thread::sleep(Duration::from_secs_f64(ms / 1000.0))
        });
        drop(handle);
        if printer.join().is_err() {
            warn!("Playback printer panicked");
        }
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title("Key Beam"),
        ..Default::default()
    };

    let stdin_events = args.stdin_events;
    eframe::run_native(
        "Key Beam",
        options,
        Box::new(move |cc| {
            if stdin_events {
                spawn_stdin_reader(sender, Some(cc.egui_ctx.clone()));
            }
            let [width, height] = WINDOW_SIZE;
            let engine = VisualizerEngine::new(settings, width as f64, height as f64);
            Ok(Box::new(ViewerApp::new(&cc.egui_ctx, engine, handle)?))
        }),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}

/// Parse JSON lines from stdin and queue them for the engine. Wakes the
/// viewer after each event when one is running.
fn spawn_stdin_reader(mut sender: InputSender, repaint: Option<egui::Context>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match WireEvent::decode(&line) {
                Ok(event) => {
                    sender.send_lossy(EngineInput::from(event));
                    if let Some(ctx) = &repaint {
                        ctx.request_repaint();
                    }
                }
                Err(e) => debug!("Skipping malformed event line: {}", e),
            }
            if sender.is_abandoned() {
                break;
            }
        }
        debug!("Stdin closed");
    });
}

/// Write fired playback requests to stdout as JSON lines.
fn spawn_playback_printer(mut playback: PlaybackReceiver) -> thread::JoinHandle<()> {
    thread::spawn(move || loop {
        // Sampled before draining so nothing pushed before the engine
        // dropped is lost
        let engine_gone = playback.is_abandoned();

        let mut stdout = io::stdout().lock();
        for request in playback.drain() {
            let line = json!({
                "kind": "playback",
                "id": request.id,
                "payload": request.payload,
                "dueMs": request.due_ms,
                "firedAtMs": request.fired_at_ms,
            });
            if writeln!(stdout, "{}", line).is_err() {
                return;
            }
        }
        if stdout.flush().is_err() || engine_gone {
            return;
        }
        drop(stdout);
        thread::sleep(Duration::from_millis(1));
    })
}
