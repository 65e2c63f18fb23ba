//! Command grammar: the closed vocabulary the link recognises.
//!
//! Validation is case-insensitive exact matching against the literal sets,
//! plus one parametric form, `solenoid time <number>`. Classification
//! checks the literal sets in a fixed order and applies the `solenoid`
//! prefix catch-all last.

use serde::{Deserialize, Serialize};

/// Command categories, partitioning the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandCategory {
    System,
    Test,
    Control,
    Solenoid,
    Unknown,
}

impl std::fmt::Display for CommandCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommandCategory::System => "system",
            CommandCategory::Test => "test",
            CommandCategory::Control => "control",
            CommandCategory::Solenoid => "solenoid",
            CommandCategory::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

const SYSTEM_COMMANDS: &[&str] = &["clear", "exit", "status"];

const TEST_COMMANDS: &[&str] = &["temperature test", "pressure test", "solenoid test"];

const CONTROL_COMMANDS: &[&str] = &["start control loop", "stop control loop"];

const SOLENOID_COMMANDS: &[&str] = &["solenoid open", "solenoid close", "solenoid pressure"];

/// Parametric form prefix; the remainder must parse as a number.
const SOLENOID_TIME_PREFIX: &str = "solenoid time ";

/// The recognised command vocabulary.
///
/// Stateless; construct once and share, or call through a fresh value;
/// either way the vocabulary is fixed at compile time.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandSet;

impl CommandSet {
    pub fn new() -> Self {
        CommandSet
    }

    /// Whether `command` is recognised.
    ///
    /// A command is valid iff it exact-matches a known literal
    /// (case-insensitive) or is `solenoid time <n>` with `<n>` parseable
    /// as a float. Negative and zero timings are accepted here; range
    /// policy belongs to the device.
    pub fn validate(&self, command: &str) -> bool {
        if let Some(rest) = command.strip_prefix(SOLENOID_TIME_PREFIX) {
            return rest.trim().parse::<f64>().is_ok();
        }

        let lowered = command.to_lowercase();
        SYSTEM_COMMANDS
            .iter()
            .chain(TEST_COMMANDS)
            .chain(CONTROL_COMMANDS)
            .chain(SOLENOID_COMMANDS)
            .any(|known| *known == lowered)
    }

    /// Category of `command`.
    ///
    /// Literal sets are consulted in the order system, test, control,
    /// solenoid. The `solenoid` prefix catch-all is evaluated last and is
    /// case-sensitive, matching forms like `solenoid time 1500` that are
    /// not literals themselves.
    pub fn classify(&self, command: &str) -> CommandCategory {
        let lowered = command.to_lowercase();

        if SYSTEM_COMMANDS.contains(&lowered.as_str()) {
            CommandCategory::System
        } else if TEST_COMMANDS.contains(&lowered.as_str()) {
            CommandCategory::Test
        } else if CONTROL_COMMANDS.contains(&lowered.as_str()) {
            CommandCategory::Control
        } else if SOLENOID_COMMANDS.contains(&lowered.as_str()) || command.starts_with("solenoid") {
            CommandCategory::Solenoid
        } else {
            CommandCategory::Unknown
        }
    }

    /// Human-readable command reference for the console.
    pub fn help_text(&self) -> String {
        [
            "Available Commands:",
            "",
            "System Commands:",
            "  clear - Clear command history",
            "  exit - Exit application gracefully",
            "  status - Show system status",
            "",
            "Test Commands:",
            "  temperature test - Start temperature monitoring",
            "  pressure test - Start pressure monitoring",
            "  solenoid test - Initialize solenoid system",
            "",
            "Control Commands:",
            "  start control loop - Begin current control with waveform",
            "  stop control loop - Stop current control",
            "",
            "Solenoid Commands:",
            "  solenoid open - Open solenoid valve",
            "  solenoid close - Close solenoid valve",
            "  solenoid pressure - Get pressure reading",
            "  solenoid time <ms> - Set valve open duration",
        ]
        .join("\n")
    }
}
