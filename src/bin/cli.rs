//! Terminal chat client for a running gateway
//!
//! Lines typed on stdin are sent as messages. `/retry` resends the last
//! message, `/clear` starts over and `/exit` quits.

use chat_relay::client::{
    ConversationStore, HttpTransport, Message, SendOutcome, DEFAULT_TRANSPORT_TIMEOUT,
};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_URL: &str = "http://127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_relay=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_url = std::env::var("CHAT_RELAY_URL").unwrap_or_else(|_| DEFAULT_URL.to_string());
    let transport = HttpTransport::new(&base_url, DEFAULT_TRANSPORT_TIMEOUT)?;
    tracing::info!(endpoint = %transport.endpoint(), "Using gateway");
    let store = ConversationStore::new(Arc::new(transport));

    for message in store.messages() {
        print_message(&message);
    }
    prompt()?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let outcome = match line.trim() {
            "/exit" => break,
            "/clear" => {
                store.clear_conversation();
                for message in store.messages() {
                    print_message(&message);
                }
                None
            }
            "/retry" => Some(store.retry_last_message().await),
            _ => Some(store.send_message(&line).await),
        };

        match outcome {
            Some(SendOutcome::Replied(_) | SendOutcome::Failed(_)) => {
                if let Some(last) = store.messages().last() {
                    print_message(last);
                }
            }
            Some(SendOutcome::Ignored(reason)) => eprintln!("({reason})"),
            None => {}
        }
        prompt()?;
    }

    Ok(())
}

fn print_message(message: &Message) {
    println!("{}: {}", message.role.as_str(), message.text);
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}
