//! Operator console - register contacts and send them WhatsApp messages
//!
//! Usage:
//!   cargo run --bin console
//!
//! Commands:
//!   register <name> <phone>   Register a contact (phone is the last word)
//!   list                      Show registered contacts
//!   select <n|phone>          Pick a recipient by list position or phone
//!   send <message>            Send a message to the selected recipient
//!   status                    Show the selection, send state and feedback
//!   help                      Show this help
//!   quit                      Exit (registrations are not kept)
//!
//! Optional environment variables:
//! - WHATSAPP_AGENT_URL (defaults to http://localhost:$PORT)
//! - PORT (defaults to 3000)

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;
use whatsapp_agent::client::{ClientError, DispatchClient, Feedback, PendingSend, Session, Tone};
use whatsapp_agent::dispatch::SendResult;

/// A dispatched send and its outcome, handed back to the input loop
type Completed = (PendingSend, Result<SendResult, ClientError>);

const HELP: &str = "\
Commands:
  register <name> <phone>   Register a contact (phone is the last word)
  list                      Show registered contacts
  select <n|phone>          Pick a recipient by list position or phone
  send <message>            Send a message to the selected recipient
  status                    Show the selection, send state and feedback
  help                      Show this help
  quit                      Exit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("console=warn".parse()?)
                .add_directive("whatsapp_agent=warn".parse()?),
        )
        .init();

    let base_url = std::env::var("WHATSAPP_AGENT_URL").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
        format!("http://localhost:{}", port)
    });
    let client = DispatchClient::new(&base_url);
    info!("Using dispatch endpoint at {}", client.base_url());

    println!("WhatsApp Messaging Agent");
    println!("Register users and send WhatsApp messages ({})", client.base_url());
    println!("{}", HELP);

    let mut session = Session::new();
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<Completed>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(&mut session, &client, &done_tx, line.trim()) {
                    break;
                }
            }
            Some((pending, outcome)) = done_rx.recv() => {
                let feedback = session.finish_send(pending, &outcome);
                print_feedback(&feedback);
            }
        }
    }

    Ok(())
}

/// Run one console command. Returns false when the operator quits.
fn handle_command(
    session: &mut Session,
    client: &DispatchClient,
    done_tx: &mpsc::UnboundedSender<Completed>,
    line: &str,
) -> bool {
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));

    match command {
        "" => {}
        "register" => {
            let (name, phone) = rest.rsplit_once(char::is_whitespace).unwrap_or(("", rest));
            if let Ok(registration) = session.register(name, phone) {
                println!(
                    "  {} - {} ({})",
                    registration.name,
                    registration.phone,
                    registration.timestamp.format("%H:%M:%S")
                );
            }
            show_current(session);
        }
        "list" => {
            println!("Registered Users ({})", session.registry.len());
            if session.registry.is_empty() {
                println!("  No users registered yet");
            }
            for (i, registration) in session.registry.entries().iter().enumerate() {
                println!(
                    "  {}. {} - {} ({})",
                    i + 1,
                    registration.name,
                    registration.phone,
                    registration.timestamp.format("%H:%M:%S")
                );
            }
        }
        "select" => match session.select(rest) {
            Ok(()) => println!("Selected {}", session.composer.selected().unwrap_or_default()),
            Err(_) => show_current(session),
        },
        "send" => match session.begin_send(rest) {
            Ok(pending) => {
                println!("Sending...");
                let client = client.clone();
                let done_tx = done_tx.clone();
                tokio::spawn(async move {
                    let outcome = pending.dispatch(&client).await;
                    let _ = done_tx.send((pending, outcome));
                });
            }
            Err(_) => show_current(session),
        },
        "status" => {
            println!(
                "Recipient: {}",
                session.composer.selected().unwrap_or("(none)")
            );
            println!("State: {:?}", session.composer.state());
            if session.feedback().is_none() {
                println!("No feedback");
            }
            show_current(session);
        }
        "help" => println!("{}", HELP),
        "quit" | "exit" => return false,
        other => println!("Unknown command: {} (type 'help')", other),
    }

    true
}

fn show_current(session: &mut Session) {
    if let Some(feedback) = session.feedback() {
        print_feedback(feedback);
    }
}

fn print_feedback(feedback: &Feedback) {
    if feedback.tone == Tone::Error {
        eprintln!("{}", feedback.text);
    } else {
        println!("{}", feedback.text);
    }
}
