/// Console status output
///
/// This module handles:
/// - Prefixed status lines for pipeline progress
/// - Colored error reporting
/// - The end-of-run outcome summary

use crate::types::PrepOutcome;
use std::io::Write;

/// Print a status message with the "prep: " prefix
pub fn status(s: &str) {
    println!("prep: {}", s);
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    println!();
    print_color("error", term::color::BRIGHT_RED);
    println!(": {}", msg);
    println!();
}

/// Print the summary of a completed run
pub fn print_outcome(outcome: &PrepOutcome) {
    status(&format!("resolved {}", outcome.branch.describe()));

    if outcome.overrides.is_empty() {
        status("no branch overrides applied");
    } else {
        for (name, spec) in &outcome.overrides {
            status(&format!("override {} -> {}", name, spec));
        }
    }

    if outcome.removed_nested > 0 {
        status(&format!("{} stale nested copies removed", outcome.removed_nested));
    }

    match &outcome.special {
        Some(special) => status(&format!(
            "linked {} from {}#{}",
            special.name, special.repository, special.branch
        )),
        None => status("no secondary install required"),
    }

    status("workspace ready");
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
        }

        true
    }
}
