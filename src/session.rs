//! Interactive session over stdin, and the spinner-driven ritual runner
//! shared with the one-shot `sever` command.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::controller::RitualController;
use crate::error::CropError;
use crate::gateway::{Gateway, ImageFile};
use crate::portal::Portal;
use crate::state_machine::RitualState;
use crate::ui::{self, RitualProgress};

const DEFAULT_EXPORT: &str = "phantom_severed.png";

/// A line typed into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Offer(PathBuf),
    Reset,
    Toggle,
    Server(String),
    Status,
    Export(PathBuf),
    Record,
    Help,
    Quit,
}

impl SessionCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "offer" | "o" if !rest.is_empty() => Ok(SessionCommand::Offer(PathBuf::from(rest))),
            "offer" | "o" => Err("usage: offer <path>".to_string()),
            "reset" | "discard" => Ok(SessionCommand::Reset),
            "toggle" | "mock" => Ok(SessionCommand::Toggle),
            "server" if !rest.is_empty() => Ok(SessionCommand::Server(rest.to_string())),
            "server" => Err("usage: server <url>".to_string()),
            "status" | "s" => Ok(SessionCommand::Status),
            "export" if rest.is_empty() => Ok(SessionCommand::Export(PathBuf::from(DEFAULT_EXPORT))),
            "export" => Ok(SessionCommand::Export(PathBuf::from(rest))),
            "record" => Ok(SessionCommand::Record),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            "" => Err(String::new()),
            other => Err(format!("unknown command `{other}` (try `help`)")),
        }
    }
}

/// Submit `file`, animating the spinner with every state change until the
/// ritual settles, then print the outcome.
pub async fn run_ritual<G: Gateway>(
    controller: &mut RitualController<G>,
    file: ImageFile,
    reset_ms: u64,
) -> Result<RitualState, CropError> {
    let progress = RitualProgress::start(&file.name);
    let mut rx = controller.subscribe();

    let outcome = {
        let submission = controller.submit(file);
        tokio::pin!(submission);
        loop {
            tokio::select! {
                outcome = &mut submission => break outcome,
                Ok(()) = rx.changed() => progress.update_state(*rx.borrow_and_update()),
            }
        }
    };

    match &outcome {
        Ok(RitualState::Complete) => {
            if let Some(image) = controller.result() {
                progress.complete(image, controller.store());
            }
        }
        Ok(_) => {
            let reason = controller.last_record().and_then(|r| r.failure.as_deref());
            progress.failed(reason, reset_ms);
        }
        Err(e) => progress.warn(&e.to_string()),
    }
    outcome
}

/// Read commands from stdin until `quit` or end of input.
pub async fn run<G: Gateway>(controller: &mut RitualController<G>, reset_ms: u64) -> Result<()> {
    let portal = Portal::new(controller.subscribe());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print_help();
    prompt();
    while let Some(line) = lines.next_line().await? {
        match SessionCommand::parse(&line) {
            Ok(SessionCommand::Offer(path)) => match portal.offer_path(&path) {
                Ok(file) => {
                    // Outcome already rendered by the runner.
                    let _ = run_ritual(controller, file, reset_ms).await;
                }
                Err(e) => println!("  ! {e}"),
            },
            Ok(SessionCommand::Reset) => {
                controller.reset();
                println!("  state: {}", controller.state());
            }
            Ok(SessionCommand::Toggle) => {
                let use_mock = controller.toggle_mock();
                println!("  mode: {}", if use_mock { "SIMULATION" } else { "LIVE" });
            }
            Ok(SessionCommand::Server(url)) => {
                controller.settings().set_server_url(url.clone());
                println!("  server: {url}");
            }
            Ok(SessionCommand::Status) => print_status(controller, &portal),
            Ok(SessionCommand::Export(path)) => match controller.export(&path) {
                Ok(()) => println!("  written to {}", path.display()),
                Err(e) => println!("  ! {e:#}"),
            },
            Ok(SessionCommand::Record) => match controller.last_record() {
                Some(record) => ui::print_record(record),
                None => println!("  no ritual yet"),
            },
            Ok(SessionCommand::Help) => print_help(),
            Ok(SessionCommand::Quit) => break,
            Err(message) if message.is_empty() => {}
            Err(message) => println!("  ! {message}"),
        }
        prompt();
    }

    controller.reset();
    Ok(())
}

fn print_status<G: Gateway>(controller: &RitualController<G>, portal: &Portal) {
    let config = controller.settings().snapshot();
    let store = controller.store();
    println!("  state:   {}", controller.state());
    println!("  portal:  {}", if portal.is_open() { "open" } else { "closed" });
    println!(
        "  mode:    {} ({})",
        if config.use_mock { "SIMULATION" } else { "LIVE" },
        config.server_url
    );
    println!(
        "  handles: {} live ({} created, {} released)",
        store.outstanding(),
        store.created(),
        store.released()
    );
}

fn print_help() {
    println!("  commands: offer <path> | reset | toggle | server <url> | status | export [path] | record | quit");
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}
