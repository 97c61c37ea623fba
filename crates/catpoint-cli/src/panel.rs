//! Interactive control panel
//!
//! Reads one command per line from stdin and keeps the same security
//! service alive between commands, so a cat seen by `scan` is still
//! remembered when the system is armed afterwards.

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::sync::Arc;

use catpoint_core::{
    AlarmStatus, ImageAnalyzer, SecurityRepository, SecurityService, StatusEvent, StatusEventLog,
    StatusListener,
};

use crate::commands::{self, Commands};

/// Listener that prints every notification to stdout
#[derive(Debug, Default)]
pub struct ConsoleStatusListener;

impl StatusListener for ConsoleStatusListener {
    fn on_status_changed(&self, status: AlarmStatus) {
        println!("  » {}", StatusEvent::StatusChanged { status });
    }

    fn on_cat_detected(&self, cat_detected: bool) {
        println!("  » {}", StatusEvent::CatDetected { cat_detected });
    }

    fn on_sensor_status_changed(&self) {
        println!("  » {}", StatusEvent::SensorStatusChanged);
    }
}

#[derive(Parser, Debug)]
#[command(name = "catpoint>", no_binary_name = true, disable_version_flag = true)]
struct PanelLine {
    #[command(subcommand)]
    command: PanelCommand,
}

#[derive(Subcommand, Debug)]
enum PanelCommand {
    #[command(flatten)]
    Run(Commands),

    /// Show notifications received in this session
    History,

    /// Leave the panel
    #[command(alias = "exit")]
    Quit,
}

/// Run the panel until `quit` or end of input
pub fn run<R, I>(service: &mut SecurityService<R, I>, input: impl BufRead) -> anyhow::Result<()>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    let history = Arc::new(StatusEventLog::new());
    let history_id = service.add_status_listener(history.clone());

    let result = read_commands(service, &history, input);
    service.remove_status_listener(history_id);
    result
}

fn read_commands<R, I>(
    service: &mut SecurityService<R, I>,
    history: &StatusEventLog,
    input: impl BufRead,
) -> anyhow::Result<()>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    println!("Catpoint panel. Type 'help' for commands, 'quit' to leave.");
    prompt()?;

    for line in input.lines() {
        let line = line?;
        let words = match split_line(&line) {
            Ok(words) => words,
            Err(e) => {
                eprintln!("error: {}", e);
                prompt()?;
                continue;
            }
        };
        if words.is_empty() {
            prompt()?;
            continue;
        }

        match PanelLine::try_parse_from(words) {
            Ok(PanelLine {
                command: PanelCommand::Quit,
            }) => break,
            Ok(PanelLine {
                command: PanelCommand::History,
            }) => {
                for event in history.events() {
                    println!("  {}", event);
                }
            }
            Ok(PanelLine {
                command: PanelCommand::Run(command),
            }) => {
                if let Err(e) = commands::execute(service, command) {
                    tracing::warn!("Panel command failed: {:#}", e);
                    eprintln!("error: {:#}", e);
                }
            }
            Err(e) => {
                // also covers `help`, which clap reports as an "error"
                let _ = e.print();
            }
        }
        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("catpoint> ");
    std::io::stdout().flush()
}

/// Split a panel line into words. Single or double quotes group words
/// containing spaces, e.g. `sensor add "Front Door" door`.
pub fn split_line(line: &str) -> Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {} quote", q));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}
