//! CLI for PopChat
//!
//! Subcommands:
//! - `server`: run the WebSocket chat server
//! - `list`: print every message
//! - `post`: post a message
//! - `watch`: print the log, then follow new messages

use std::sync::Arc;

use clap::Parser;
use popchat::client::ChatClient;
use popchat::config::load_config;
use popchat::service::ChatService;
use popchat::store::{Message, MessageId};
use popchat::transport::start_websocket_server;
use tracing::{error, info};

const DEFAULT_URL: &str = "ws://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "popchat")]
enum Command {
    /// Start the WebSocket server
    Server,
    /// Print all messages
    List {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// Post a message and print its id
    Post {
        #[arg(long)]
        user: String,
        #[arg(long)]
        content: String,
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
    /// Print the log, then every new message until interrupted
    Watch {
        #[arg(long, default_value = DEFAULT_URL)]
        url: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cmd = Command::parse();

    let result = match cmd {
        Command::Server => run_server().await,
        Command::List { url } => {
            popchat::utils::logging::init("warn");
            run_list(&url).await
        }
        Command::Post { user, content, url } => {
            popchat::utils::logging::init("warn");
            run_post(&url, &user, &content).await
        }
        Command::Watch { url } => {
            popchat::utils::logging::init("warn");
            run_watch(&url).await
        }
    };

    if let Err(e) = result {
        // no-op when the command already installed a subscriber
        popchat::utils::logging::init("error");
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run_server() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    popchat::utils::logging::init(&config.log.level);

    let addr = config.server.addr();
    let service = Arc::new(ChatService::from_settings(&config));

    tokio::select! {
        res = start_websocket_server(&addr, service) => {
            res?;
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }

    Ok(())
}

async fn run_list(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ChatClient::connect(url).await?;
    for message in client.messages().await? {
        print_message(&message);
    }
    client.close().await?;
    Ok(())
}

async fn run_post(url: &str, user: &str, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ChatClient::connect(url).await?;
    let id = client.post_message(user, content).await?;
    println!("{id}");
    client.close().await?;
    Ok(())
}

async fn run_watch(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = ChatClient::connect(url).await?;
    let mut last_seen = None;

    loop {
        for message in client.subscribe(true).await?.unwrap_or_default() {
            print_if_new(&message, &mut last_seen);
        }

        tokio::select! {
            res = follow(&mut client, &mut last_seen) => res?,
            _ = tokio::signal::ctrl_c() => break,
        }
        // dropped by the server for falling behind; the next snapshot fills the hole
        eprintln!("-- subscription lost, resyncing --");
    }

    client.close().await?;
    Ok(())
}

async fn follow(
    client: &mut ChatClient,
    last_seen: &mut Option<MessageId>,
) -> Result<(), popchat::client::ClientError> {
    while let Some(message) = client.next_message().await? {
        print_if_new(&message, last_seen);
    }
    Ok(())
}

fn print_if_new(message: &Message, last_seen: &mut Option<MessageId>) {
    if last_seen.is_some_and(|last| message.id <= last) {
        return;
    }
    *last_seen = Some(message.id);
    print_message(message);
}

fn print_message(message: &Message) {
    println!("[{}] {}: {}", message.id, message.user, message.content);
}
