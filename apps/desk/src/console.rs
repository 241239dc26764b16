//! Line-oriented operator console: each stdin line is one desk command.

use std::fmt::Write as _;

use clap::{Parser, Subcommand};
use desk_core::DeskSession;
use shared::{
    domain::{ChannelIndex, NavigateDirection, PresetIndex, SlotDisplay},
    persistence::PresetPersistence,
};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Move a channel fader.
    Ch { channel: u16, level: u8 },
    /// Type into a channel's numeric field.
    Text {
        channel: u16,
        #[arg(value_parser = digits)]
        input: String,
    },
    /// Backspace in a channel's numeric field.
    Bs { channel: u16 },
    /// Move the grand master fader.
    Gm { level: u8 },
    Gmtext {
        #[arg(value_parser = digits)]
        input: String,
    },
    Gmbs,
    #[command(alias = "bo")]
    Blackout,
    Left,
    Right,
    /// Type into the preset index field.
    Goto {
        #[arg(value_parser = digits)]
        input: String,
    },
    #[command(name = "gotobs")]
    GotoBs,
    /// Set the preset name field; no words clears it.
    Name {
        #[arg(trailing_var_arg = true, num_args = 0..)]
        words: Vec<String>,
    },
    Save,
    Load,
    Clear,
    Copy { to: u32 },
    Show,
    #[command(alias = "exit")]
    Quit,
}

/// Numeric field input: digits only, possibly empty.
fn digits(raw: &str) -> Result<String, String> {
    if raw.chars().all(|c| c.is_ascii_digit()) {
        Ok(raw.to_string())
    } else {
        Err(format!("'{raw}' is not a number"))
    }
}

pub fn parse(line: &str) -> Result<Command, clap::Error> {
    Line::try_parse_from(line.split_whitespace()).map(|line| line.command)
}

/// Runs one command against the session and returns the status to print.
pub fn apply(
    command: Command,
    session: &mut DeskSession,
    persistence: &impl PresetPersistence,
) -> String {
    match command {
        Command::Ch { channel, level } => {
            if session.set_channel_level(ChannelIndex(channel), level) {
                format!("ch {channel} = {level}")
            } else {
                no_such_channel(channel, session)
            }
        }
        Command::Text { channel, input } => {
            if session.edit_channel_text(ChannelIndex(channel), &input) {
                channel_status(channel, session)
            } else {
                no_such_channel(channel, session)
            }
        }
        Command::Bs { channel } => {
            if session.backspace_channel_text(ChannelIndex(channel)) {
                channel_status(channel, session)
            } else {
                no_such_channel(channel, session)
            }
        }
        Command::Gm { level } => {
            session.set_grand_master(level);
            format!("gm = {level}")
        }
        Command::Gmtext { input } => {
            session.edit_grand_master_text(&input);
            format!("gm = {}", session.grand_master().mirror_text())
        }
        Command::Gmbs => {
            session.backspace_grand_master_text();
            format!("gm = {}", session.grand_master().mirror_text())
        }
        Command::Blackout => {
            if session.toggle_blackout() {
                "blackout on".to_string()
            } else {
                "blackout off".to_string()
            }
        }
        Command::Left => {
            session.navigate_presets(NavigateDirection::Left);
            preset_status(session)
        }
        Command::Right => {
            session.navigate_presets(NavigateDirection::Right);
            preset_status(session)
        }
        Command::Goto { input } => {
            session.edit_preset_entry(&input);
            preset_status(session)
        }
        Command::GotoBs => {
            session.backspace_preset_entry();
            preset_status(session)
        }
        Command::Name { words } => {
            session.set_preset_name(words.join(" "));
            format!("name = '{}'", session.preset_name())
        }
        Command::Save => match session.save_preset() {
            Ok(index) => {
                commit(session, persistence);
                format!("saved preset {index}")
            }
            Err(error) => error.to_string(),
        },
        Command::Load => {
            let index = session.load_preset();
            format!("loaded preset {index}")
        }
        Command::Clear => {
            let index = session.clear_preset();
            format!("cleared preset {index}")
        }
        Command::Copy { to } => match session.copy_preset(PresetIndex(to)) {
            Ok(()) => {
                commit(session, persistence);
                format!("copied preset {} to {to}", session.preset_cursor())
            }
            Err(error) => error.to_string(),
        },
        Command::Show => render(session),
        Command::Quit => "bye".to_string(),
    }
}

fn commit(session: &DeskSession, persistence: &impl PresetPersistence) {
    if let Err(error) = session.commit_presets(persistence) {
        warn!(%error, "failed to save presets");
    }
}

fn no_such_channel(channel: u16, session: &DeskSession) -> String {
    format!(
        "no channel {channel}; channels are 1..={}",
        session.channels().len()
    )
}

fn channel_status(channel: u16, session: &DeskSession) -> String {
    match session.channel(ChannelIndex(channel)) {
        Some(state) => format!("ch {channel} = {}", state.mirror_text()),
        None => no_such_channel(channel, session),
    }
}

fn preset_status(session: &DeskSession) -> String {
    let state = match session.preset_display() {
        SlotDisplay::Empty => "empty",
        SlotDisplay::Populated => "populated",
    };
    format!(
        "preset {} [{state}] '{}'",
        session.preset_entry_text(),
        session.preset_name()
    )
}

/// Text rendering of the desk: numeric fields, grand master, preset bank.
pub fn render(session: &DeskSession) -> String {
    let mut out = String::new();
    let fields: Vec<&str> = session
        .channels()
        .iter()
        .map(|state| state.mirror_text())
        .collect();
    let _ = writeln!(out, "levels  {}", fields.join(" "));
    let _ = writeln!(
        out,
        "gm      {}{}",
        session.grand_master().mirror_text(),
        if session.blackout().is_active() {
            "  BLACKOUT"
        } else {
            ""
        }
    );
    let preview: Vec<String> = session
        .preset_preview()
        .levels
        .iter()
        .map(u8::to_string)
        .collect();
    let _ = writeln!(out, "{}", preset_status(session));
    let _ = write!(out, "preview {}", preview.join(" "));
    out
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
