use std::path::PathBuf;
use std::thread;

use anyhow::Result;
use clap::Parser;
use radio_core::constants::DEFAULT_SERVER_URL;
use radio_core::notify::{Notifier, SilentNotifier, SystemSpeaker};
use radio_core::{CoreConfig, SessionEvent, SessionRuntime};

mod menu;

#[derive(Parser, Debug)]
#[command(name = "radio-client")]
#[command(about = "Text messaging client with spoken notifications")]
struct Args {
    /// Message server URL
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Directory holding settings.json and relative history files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,

    /// Username to register (prompted for when omitted)
    #[arg(long, short)]
    username: Option<String>,

    /// Disable text-to-speech announcements
    #[arg(long)]
    silent: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = radio_core::tracing_setup::init_tracing() {
        eprintln!("Warning: {:#}", e);
    }

    match run(args) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    let config = CoreConfig::new(&args.data_dir).with_server_url(args.server);
    let notifier: Box<dyn Notifier> = if args.silent {
        Box::new(SilentNotifier)
    } else {
        Box::new(SystemSpeaker::new())
    };

    tracing::debug!(
        "Using server {} and data dir {}",
        config.server_url,
        config.data_dir.display()
    );
    let mut runtime = SessionRuntime::connect(config, notifier)?;

    let username = match args.username {
        Some(name) => name,
        None => match menu::prompt("Enter your username: ")? {
            Some(name) => name,
            None => return Ok(1),
        },
    };

    if let Err(e) = runtime.create_user(&username) {
        println!("Failed to create user. Error: {}", e);
        return Ok(1);
    }
    println!("User created successfully!");

    // Messages found by either the menu or the auto-check loop
    if let Some(events) = runtime.take_event_rx() {
        thread::spawn(move || {
            for event in events {
                match event {
                    SessionEvent::MessageReceived { username, text } => {
                        println!("\nLatest message for {}: {}", username, text);
                    }
                }
            }
        });
    }

    let result = menu::run_menu(&mut runtime, &username);
    runtime.shutdown();
    result?;
    Ok(0)
}
