//! Speech notification for newly received messages
//!
//! The platform speaker is picked at runtime from the host OS. Speech runs
//! as a child process that is reaped on a detached thread, so announcing
//! never blocks the session worker.

use std::process::{Command, Stdio};

pub trait Notifier: Send {
    /// Speak `text` at `rate` words per minute
    fn announce(&self, text: &str, rate: u32);
}

/// Notifier that does nothing (e.g. `--silent` or headless hosts)
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn announce(&self, _text: &str, _rate: u32) {}
}

/// Environment variable carrying the text to the Windows speech script
const WINDOWS_TEXT_ENV: &str = "RADIO_SPEAK_TEXT";

/// A fully resolved speech invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    pub program: &'static str,
    pub args: Vec<String>,
    pub env: Option<(&'static str, String)>,
}

impl SpeechCommand {
    /// Build the command for `os` (values of `std::env::consts::OS`)
    pub fn for_os(os: &str, text: &str, rate: u32) -> Self {
        match os {
            "macos" => Self {
                program: "say",
                args: vec!["-r".to_string(), rate.to_string(), text.to_string()],
                env: None,
            },
            // SpeechSynthesizer has its own -10..10 rate scale; keep its default
            "windows" => Self {
                program: "powershell",
                args: vec![
                    "-NoProfile".to_string(),
                    "-Command".to_string(),
                    format!(
                        "Add-Type -AssemblyName System.Speech; \
                         (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak($env:{})",
                        WINDOWS_TEXT_ENV
                    ),
                ],
                env: Some((WINDOWS_TEXT_ENV, text.to_string())),
            },
            _ => Self {
                program: "espeak",
                args: vec!["-s".to_string(), rate.to_string(), text.to_string()],
                env: None,
            },
        }
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(self.program);
        cmd.args(&self.args);
        if let Some((key, value)) = &self.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

/// Speaks through the host's text-to-speech command
#[derive(Debug, Clone)]
pub struct SystemSpeaker {
    os: &'static str,
}

impl SystemSpeaker {
    pub fn new() -> Self {
        Self {
            os: std::env::consts::OS,
        }
    }
}

impl Default for SystemSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for SystemSpeaker {
    fn announce(&self, text: &str, rate: u32) {
        let speech = SpeechCommand::for_os(self.os, text, rate);
        match speech.to_command().spawn() {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    if let Err(e) = child.wait() {
                        tracing::warn!("Text-to-speech process failed: {}", e);
                    }
                });
            }
            Err(e) => {
                tracing::warn!("Error in text-to-speech ({}): {}", speech.program, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macos_uses_say_with_rate() {
        let cmd = SpeechCommand::for_os("macos", "hello there", 180);
        assert_eq!(cmd.program, "say");
        assert_eq!(cmd.args, vec!["-r", "180", "hello there"]);
        assert!(cmd.env.is_none());
    }

    #[test]
    fn test_linux_uses_espeak_with_rate() {
        let cmd = SpeechCommand::for_os("linux", "hello", 200);
        assert_eq!(cmd.program, "espeak");
        assert_eq!(cmd.args, vec!["-s", "200", "hello"]);
    }

    #[test]
    fn test_windows_passes_text_out_of_band() {
        let text = "it's \"quoted\"; exit";
        let cmd = SpeechCommand::for_os("windows", text, 200);
        assert_eq!(cmd.program, "powershell");
        assert!(cmd.args.iter().all(|arg| !arg.contains(text)));
        assert_eq!(cmd.env, Some((WINDOWS_TEXT_ENV, text.to_string())));
    }

    #[test]
    fn test_unknown_os_falls_back_to_espeak() {
        assert_eq!(SpeechCommand::for_os("freebsd", "x", 1).program, "espeak");
    }
}
