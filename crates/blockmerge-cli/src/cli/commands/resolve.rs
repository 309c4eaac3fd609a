//! `blockmerge resolve` - resolve conflicts and print the audit trail.
//!
//! Nothing is written to disk; JSON is the default output.

use anyhow::Result;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use blockmerge_core::{Decision, OverrideRecord};
use blockmerge_engine::{resolve, ManualOverrides};

use super::Context;
use crate::cli::args::ResolveArgs;
use crate::output::OutputFormat;

#[derive(Tabled)]
struct AuditRow {
    #[tabled(rename = "Entry")]
    entry: String,
    #[tabled(rename = "Decision")]
    decision: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Block")]
    block: usize,
    #[tabled(rename = "Allow")]
    allow: usize,
}

impl From<&OverrideRecord> for AuditRow {
    fn from(r: &OverrideRecord) -> Self {
        let decision = match r.decision {
            Decision::Block => r.decision.as_str().red(),
            Decision::Allow => r.decision.as_str().green(),
            Decision::Conflict => r.decision.as_str().yellow(),
        };
        Self {
            entry: r.entry.clone(),
            decision: decision.to_string(),
            reason: r.reason.to_string(),
            block: r.block_count,
            allow: r.allow_count,
        }
    }
}

fn audit_table(records: &[OverrideRecord]) -> String {
    Table::new(records.iter().map(AuditRow::from))
        .with(Style::rounded())
        .to_string()
}

pub async fn execute(ctx: Context, args: ResolveArgs) -> Result<()> {
    let files = ctx.processed_files(args.processed)?;
    let reader = ctx.config.line_reader();
    let overrides = ManualOverrides::load(&ctx.config.overrides, &reader);

    let resolution =
        tokio::task::spawn_blocking(move || resolve(&files, &reader, &overrides)).await?;

    match ctx.output_format.unwrap_or(OutputFormat::Json) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&resolution.audit)?);
        }
        OutputFormat::Pretty => {
            if resolution.audit.is_empty() {
                println!("{}", "No contested or overridden entries".dimmed());
            } else {
                println!("{}", audit_table(&resolution.audit));
            }
            println!();
            println!(
                "{} blocked, {} allowed, {} unresolved",
                resolution.result.total_blocked(),
                resolution.result.total_allowed(),
                resolution.result.unresolved_conflicts().len()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visible_width(line: &str) -> usize {
        let mut width = 0;
        let mut in_escape = false;
        for c in line.chars() {
            match c {
                '\u{1b}' => in_escape = true,
                'm' if in_escape => in_escape = false,
                _ if in_escape => {}
                _ => width += 1,
            }
        }
        width
    }

    #[test]
    fn test_colored_cells_keep_borders_aligned() {
        let rows = [AuditRow {
            entry: "x.com".into(),
            decision: "\u{1b}[31mblock\u{1b}[0m".into(),
            reason: "manual_forced_block".into(),
            block: 1,
            allow: 2,
        }];
        let table = Table::new(rows).with(Style::rounded()).to_string();

        let widths: Vec<usize> = table.lines().map(visible_width).collect();
        assert!(widths.len() > 3);
        assert!(widths.iter().all(|w| *w == widths[0]), "{table}");
    }
}
