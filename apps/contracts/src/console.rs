//! Terminal rendering and prompts.

use std::io::{self, BufRead, Write};

use client_core::{Confirm, ContractDraft, Controls, Phase};
use shared::domain::{ContractFields, ContractSummary, FieldKind};

/// Asks on stdin; anything but `y`/`yes` declines.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(_) => false,
        }
    }
}

/// Auto-approves when `--yes` was given.
pub struct Preapproved;

impl Confirm for Preapproved {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

pub fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(Preapproved)
    } else {
        Box::new(StdinConfirm)
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Parses a `--set field=value` argument. The value may be empty; `\n` in
/// the value becomes a line break.
pub fn parse_assignment(raw: &str) -> Result<(FieldKind, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    let field = field.parse::<FieldKind>()?;
    Ok((field, value.replace("\\n", "\n")))
}

pub fn read_line(prompt: &str) -> io::Result<String> {
    print!("{prompt}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn render_fields(fields: &ContractFields) -> String {
    let mut out = String::new();
    for field in FieldKind::ALL {
        let value = fields.get(field).unwrap_or_default();
        out.push_str(&format!("  {} ({}):\n", field.label(), field.wire_name()));
        if value.is_empty() {
            out.push_str("    -\n");
        }
        for line in value.lines() {
            out.push_str(&format!("    {line}\n"));
        }
    }
    out
}

pub fn render_draft(draft: &ContractDraft, controls: Controls) -> String {
    let mut out = String::new();
    let id = draft
        .id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!(
        "Contract {id} [{}] {}\n",
        phase_label(draft.phase()),
        draft.filename().unwrap_or_default()
    ));
    if let Some(failure) = draft.failure() {
        out.push_str(&format!("  error: {failure}\n"));
    }
    out.push_str(&render_fields(draft.fields()));
    if !controls.commit {
        out.push_str("  (saving is not available in this state)\n");
    }
    out
}

pub fn render_listing(contracts: &[ContractSummary]) -> String {
    if contracts.is_empty() {
        return "No contracts yet.\n".to_string();
    }
    let mut out = String::new();
    for contract in contracts {
        out.push_str(&format!(
            "{:>5}  {}  {}\n",
            contract.id.0,
            contract.filename,
            contract.fields.parties.as_deref().unwrap_or("-")
        ));
    }
    out
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Empty => "empty",
        Phase::FileSelected => "file selected",
        Phase::Extracting => "extracting",
        Phase::ReviewReady => "review",
        Phase::Saving => "saving",
        Phase::Committed => "saved",
        Phase::Failed => "failed",
    }
}

#[cfg(test)]
#[path = "tests/console_tests.rs"]
mod tests;
