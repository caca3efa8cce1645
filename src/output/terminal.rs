// Colored terminal output for verdicts, probes, and the composer.
//
// main.rs delegates all formatting here so the CLI commands stay short.

use colored::Colorize;

use super::truncate_chars;
use crate::client::DisplayState;
use crate::moderation::{CapabilityProbe, Mode, Verdict};

/// One-line label for a verdict: "SAFE" or "FLAGGED", colored.
pub fn verdict_label(verdict: &Verdict) -> String {
    if verdict.safe() {
        "SAFE".green().bold().to_string()
    } else {
        "FLAGGED".red().bold().to_string()
    }
}

fn mode_label(mode: Mode) -> String {
    match mode {
        Mode::Primary => "primary".cyan().to_string(),
        Mode::Heuristic => "heuristic".yellow().to_string(),
        Mode::None => "none".dimmed().to_string(),
    }
}

/// Display a single verdict with its reasons.
pub fn display_verdict(text: &str, verdict: &Verdict) {
    println!(
        "{}  {}  {}",
        verdict_label(verdict),
        format!("[{}]", mode_label(verdict.mode())).dimmed(),
        truncate_chars(text.trim(), 60)
    );
    for reason in verdict.reasons() {
        println!("  {} {}", "-".red(), reason);
    }
}

/// Display the capability probe.
pub fn display_probe(probe: &CapabilityProbe) {
    let yes_no = |available: bool| {
        if available {
            "available".green().to_string()
        } else {
            "unavailable".dimmed().to_string()
        }
    };
    println!("Primary classifier:   {}", yes_no(probe.primary_available));
    println!("Heuristic classifier: {}", yes_no(probe.heuristic_available));
}

/// Display the composer's current state.
pub fn display_state(state: &DisplayState) {
    match (&state.text, &state.verdict, &state.error) {
        (Some(text), Some(verdict), _) => display_verdict(text, verdict),
        (_, _, Some(error)) => println!("{}", error.yellow()),
        _ if state.checking => println!("{}", "checking...".dimmed()),
        _ => println!("{}", "(empty)".dimmed()),
    }
}
