//! `blockmerge run` - consolidate every scope and resolve conflicts.

use anyhow::Result;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use blockmerge_engine::{pipeline, RunOptions, RunReport};

use super::Context;
use crate::cli::args::RunArgs;
use crate::output::OutputFormat;

#[derive(Tabled)]
struct TotalRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Value")]
    value: usize,
}

pub async fn execute(mut ctx: Context, args: RunArgs) -> Result<()> {
    if let Some(output) = args.output {
        ctx.config.output_dir = output;
    }
    let files = ctx.processed_files(args.processed)?;

    let options = RunOptions {
        force_checksum: args.checksum,
    };
    let report = pipeline::run(&ctx.config, files, options).await?;

    match ctx.output_format.unwrap_or_default() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Pretty => print_report(&report, &ctx.config.output_dir.display().to_string()),
    }

    Ok(())
}

fn print_report(report: &RunReport, output_dir: &str) {
    println!("{}", "Consolidation complete".bold().underline());
    println!();

    let rows = [
        TotalRow { metric: "Scopes", value: report.scopes },
        TotalRow { metric: "Summaries", value: report.summaries },
        TotalRow { metric: "Valid summaries", value: report.valid_summaries },
        TotalRow { metric: "Blocked entries", value: report.blocked },
        TotalRow { metric: "Allowed entries", value: report.allowed },
        TotalRow { metric: "Audit records", value: report.audit_records },
    ];
    println!("{}", Table::new(rows).with(Style::rounded()));

    println!();
    if report.unresolved_conflicts == 0 {
        println!("{}", "No unresolved conflicts".green());
    } else {
        println!(
            "{}",
            format!(
                "{} unresolved conflicts, see {output_dir}/summaries/conflicts.json",
                report.unresolved_conflicts
            )
            .yellow()
        );
    }
}
