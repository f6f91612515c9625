use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod args;
mod input;
mod output;

use args::Args;
use gaze_words::completion::{CannedCompletion, CompletionClient, HuggingFaceClient};
use gaze_words::config::AppConfig;
use gaze_words::session::{calibration_message, FrameOutcome, Session};
use gaze_words::source::{JsonLinesSource, LandmarkSource, ProcessSource};
use gaze_words::speech::{CommandSpeech, NoSpeech, SpeechOutput};
use gaze_words::types::LandmarkFrame;
use input::{UserCommand, HELP};
use output::TerminalOutput;

/// Everything the dispatcher reacts to, in arrival order.
enum Event {
    Frame(LandmarkFrame),
    SourceEnded(Option<String>),
    Line(String),
    InputClosed,
    Completed(String),
}

fn main() -> std::process::ExitCode {
    let args = Args::parse();

    let filter = match args.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
        .and_then(|rt| rt.block_on(run(args)));

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let mut config = AppConfig::load(&args.config)?;
    args.apply(&mut config);
    config.validate()?;
    if args.write_config {
        config.save(&args.config)?;
        info!("Wrote configuration to {}", args.config.display());
    }

    let session = Session::from_config(&config)?;

    let speech: Box<dyn SpeechOutput> = if !config.speech.enabled {
        Box::new(NoSpeech)
    } else {
        match config.speech.command.as_deref().and_then(CommandSpeech::from_command_line) {
            Some(cmd) => Box::new(cmd),
            None => Box::new(CommandSpeech::default()),
        }
    };

    match &args.canned {
        Some(reply) => dispatch(&args, session, CannedCompletion::new(reply.clone()), speech).await,
        None => {
            let client = HuggingFaceClient::new(config.completion.endpoint.clone())
                .with_prompt_suffix(config.completion.prompt_suffix.clone())
                .with_fallback(config.completion.fallback.clone())
                .with_api_token(config.completion.api_token.clone());
            info!("Completion endpoint: {}", client.endpoint());
            dispatch(&args, session, client, speech).await
        }
    }
}

async fn dispatch<C>(args: &Args, mut session: Session, client: C, speech: Box<dyn SpeechOutput>) -> Result<()>
where
    C: CompletionClient + Clone + 'static,
{
    let (tx, mut rx) = mpsc::channel::<Event>(64);
    let mut source_live = spawn_source(args, tx.clone());
    let mut input_live = true;
    spawn_input(tx.clone());

    let out = TerminalOutput::new(&session);
    out.everything(&session);
    println!("{}", HELP);

    let mut pending = false;
    let mut last_hover = None;
    let mut last_outcome = FrameOutcome::default();

    while let Some(event) = rx.recv().await {
        match event {
            Event::Frame(frame) => {
                let outcome = session.process_frame(&frame);
                if let Some(line) = output::gaze_line(&outcome) {
                    debug!("{}", line);
                }
                if let Some(cell) = outcome.selected {
                    debug!("dwell selected cell {}", cell);
                    out.grid(&session);
                    out.selected(&session);
                } else if outcome.hovered != last_hover {
                    out.grid(&session);
                }
                last_hover = outcome.hovered;
                last_outcome = outcome;
            }
            Event::SourceEnded(err) => {
                match err {
                    Some(e) => out.error(&format!("Landmark source stopped: {e}")),
                    None => info!("Landmark source finished"),
                }
                source_live = false;
            }
            Event::Line(line) => match UserCommand::parse(&line) {
                Ok(None) => {}
                Ok(Some(UserCommand::Quit)) => break,
                Ok(Some(UserCommand::Show)) => {
                    out.everything(&session);
                    out.gaze(&last_outcome);
                }
                Ok(Some(cmd)) => {
                    if let Some(prompt) = handle_command(cmd, &mut session, &out, pending) {
                        pending = true;
                        let client = client.clone();
                        let tx = tx.clone();
                        tokio::spawn(async move {
                            let text = client.complete(&prompt).await;
                            let _ = tx.send(Event::Completed(text)).await;
                        });
                    }
                }
                Err(e) => out.error(&format!("{e}. {HELP}")),
            },
            Event::InputClosed => input_live = false,
            Event::Completed(text) => {
                pending = false;
                session.finish_completion(text, &speech);
                out.result(&session);
                out.grid(&session);
                out.selected(&session);
            }
        }

        if !input_live && !source_live && !pending {
            break;
        }
    }
    Ok(())
}

/// Applies one typed command. Returns the prompt when a completion should be sent.
fn handle_command(
    cmd: UserCommand,
    session: &mut Session,
    out: &TerminalOutput,
    pending: bool,
) -> Option<String> {
    match cmd {
        UserCommand::Calibrate => out.advisory(calibration_message(&session.calibrate())),
        UserCommand::Click(cell) => match session.click_cell(cell) {
            Ok(_) => {
                out.grid(session);
                out.selected(session);
            }
            Err(e) => out.error(&e.to_string()),
        },
        UserCommand::Edit(cell, text) => match session.edit_cell(cell, text) {
            Ok(()) => out.grid(session),
            Err(e) => out.error(&e.to_string()),
        },
        UserCommand::Complete => {
            if pending {
                out.advisory("Still waiting for the previous completion.");
                return None;
            }
            match session.begin_completion() {
                Some(prompt) => {
                    out.result(session);
                    return Some(prompt);
                }
                None => out.advisory(&format!("{} (select more words first)", session.readout())),
            }
        }
        UserCommand::Help => println!("{}", HELP),
        UserCommand::Show | UserCommand::Quit => {}
    }
    None
}

/// Reads landmark frames on a dedicated thread. Returns whether a source was
/// started at all.
fn spawn_source(args: &Args, tx: mpsc::Sender<Event>) -> bool {
    let command = args.source_command();
    let replay = args.replay.clone();
    // Live processes pace themselves; only replays are throttled.
    let pace = (command.is_none() && args.fps > 0).then(|| Duration::from_secs_f64(1.0 / args.fps as f64));

    if command.is_none() && replay.is_none() {
        warn!("No landmark source given (--source-cmd or --replay); only typed commands will work");
        return false;
    }

    std::thread::spawn(move || {
        let opened: Result<Box<dyn LandmarkSource>> = match (command, replay) {
            (Some(cmd), _) => ProcessSource::spawn(&cmd).map(|s| Box::new(s) as Box<dyn LandmarkSource>),
            (None, Some(path)) => File::open(&path)
                .with_context(|| format!("Failed to open replay {}", path.display()))
                .map(|f| {
                    Box::new(JsonLinesSource::new(path.display().to_string(), BufReader::new(f)))
                        as Box<dyn LandmarkSource>
                }),
            (None, None) => return,
        };

        let ended = match opened {
            Ok(source) => pump_frames(source, &tx, pace),
            Err(e) => Some(format!("{e:#}")),
        };
        let _ = tx.blocking_send(Event::SourceEnded(ended));
    });
    true
}

fn pump_frames(mut source: Box<dyn LandmarkSource>, tx: &mpsc::Sender<Event>, pace: Option<Duration>) -> Option<String> {
    info!("Reading landmarks from {}", source.name());
    loop {
        match source.next_frame() {
            Ok(Some(frame)) => {
                if tx.blocking_send(Event::Frame(frame)).is_err() {
                    return None;
                }
                if let Some(pace) = pace {
                    std::thread::sleep(pace);
                }
            }
            Ok(None) => return None,
            Err(e) => return Some(format!("{e:#}")),
        }
    }
}

fn spawn_input(tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(Event::Line(line)).is_err() {
                return;
            }
        }
        let _ = tx.blocking_send(Event::InputClosed);
    });
}
