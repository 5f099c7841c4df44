use std::io::{self, BufRead, Write};

use anyhow::Result;
use radio_core::models::SettingKey;
use radio_core::{ReconcileOutcome, SendOutcome, SessionRuntime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    SendMessage,
    CheckMessages,
    ToggleAutoCheck,
    ChangeSettings,
    ListUsers,
    Quit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::SendMessage),
            "2" => Some(MenuChoice::CheckMessages),
            "3" => Some(MenuChoice::ToggleAutoCheck),
            "4" => Some(MenuChoice::ChangeSettings),
            "5" => Some(MenuChoice::ListUsers),
            "6" => Some(MenuChoice::Quit),
            _ => None,
        }
    }
}

const MENU: &str = "\nOptions:
1. Send message
2. Check messages
3. Toggle auto-check messages
4. Change settings
5. Get users
6. Quit";

/// Print `label` and read one line. `None` on end of input.
pub fn prompt(label: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", label)?;
    stdout.flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// Interactive loop; returns when the user quits or input ends.
pub fn run_menu(runtime: &mut SessionRuntime, username: &str) -> Result<()> {
    loop {
        println!("{}", MENU);
        let Some(input) = prompt("Choose an option (1-6): ")? else {
            return Ok(());
        };

        match MenuChoice::parse(&input) {
            Some(MenuChoice::SendMessage) => send_message(runtime)?,
            Some(MenuChoice::CheckMessages) => check_messages(runtime, username),
            Some(MenuChoice::ToggleAutoCheck) => {
                if runtime.toggle_polling(username) {
                    println!("Auto-check messages enabled");
                } else {
                    println!("Auto-check messages disabled");
                }
            }
            Some(MenuChoice::ChangeSettings) => change_settings(runtime)?,
            Some(MenuChoice::ListUsers) => {
                println!("Current users: {:?}", runtime.list_users());
            }
            Some(MenuChoice::Quit) => return Ok(()),
            None => println!("Invalid option. Please try again."),
        }
    }
}

fn send_message(runtime: &SessionRuntime) -> Result<()> {
    let Some(recipient) = prompt("Enter recipient username (or 'all' to broadcast): ")? else {
        return Ok(());
    };
    let Some(message) = prompt("Enter message: ")? else {
        return Ok(());
    };

    match runtime.send_message(&recipient, &message) {
        Ok(SendOutcome::Broadcast) => println!("Message broadcast successfully!"),
        Ok(SendOutcome::Direct) => println!("Message sent successfully!"),
        Err(e) if e.is_transport() => println!("Error sending message: {}", e),
        Err(e) => println!("Failed to send message. {}", e),
    }
    Ok(())
}

fn check_messages(runtime: &SessionRuntime, username: &str) {
    // New messages are printed by the event listener
    match runtime.fetch_once(username, true) {
        Ok(ReconcileOutcome::Unchanged { report: true }) => println!("No new messages."),
        Ok(ReconcileOutcome::NoMessage) => println!("No messages."),
        Ok(_) => {}
        Err(e) if e.is_transport() => println!("Error getting message: {}", e),
        Err(e) => println!("Failed to get message. {}", e),
    }
}

fn change_settings(runtime: &SessionRuntime) -> Result<()> {
    println!("\nCurrent Settings:");
    let settings = runtime.settings();
    for key in SettingKey::ALL {
        println!("{}: {}", key, settings.value_of(key));
    }

    let Some(name) = prompt("\nEnter setting to change (or 'done' to finish): ")? else {
        return Ok(());
    };
    if name.trim().eq_ignore_ascii_case("done") {
        return Ok(());
    }

    let key: SettingKey = match name.parse() {
        Ok(key) => key,
        Err(_) => {
            println!("Setting not found!");
            return Ok(());
        }
    };

    let Some(value) = prompt(&format!("Enter new value for {}: ", key))? else {
        return Ok(());
    };
    match runtime.update_setting(key, &value) {
        Ok(()) => println!("Settings updated successfully!"),
        Err(e) => println!("{}", e),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choices() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::SendMessage));
        assert_eq!(MenuChoice::parse(" 3 "), Some(MenuChoice::ToggleAutoCheck));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::Quit));
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse("quit"), None);
    }
}
