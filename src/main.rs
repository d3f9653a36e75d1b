use anyhow::{Context, Result};
use clap::Parser;
use gem5_stats::{
    analyze::{analyze_files, RunReport},
    cli::{Cli, OutputFormat},
    compare::{build_table, RunColumn},
    config::ReportConfig,
    csv_output::CsvOutput,
    json_output::JsonOutput,
    text_output,
};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Load the report configuration and apply command-line overrides
fn load_config(args: &Cli) -> Result<ReportConfig> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(marker) = &args.missing {
        config.missing_marker = marker.clone();
    }

    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;
    Ok(config)
}

fn run(args: Cli) -> Result<bool> {
    let config = load_config(&args)?;

    if args.files.len() > config.max_files {
        anyhow::bail!(
            "Too many files: {} given, at most {} can be compared",
            args.files.len(),
            config.max_files
        );
    }

    let outcomes = analyze_files(&args.files, config.parallel);
    let all_ok = outcomes.iter().all(|o| o.result.is_ok());

    if args.format == OutputFormat::Json {
        let mut output = JsonOutput::new();
        for outcome in &outcomes {
            match &outcome.result {
                Ok(report) => output.add_run(report),
                Err(e) => output.add_error(&outcome.label, e),
            }
        }
        println!("{}", output.to_json()?);
        return Ok(all_ok);
    }

    let mut reports: Vec<RunReport> = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(report) => reports.push(report),
            Err(e) => eprintln!("Error: {}: {}", outcome.label, e),
        }
    }

    if reports.is_empty() {
        return Ok(false);
    }

    let columns: Vec<RunColumn<'_>> = reports
        .iter()
        .map(|r| RunColumn {
            label: &r.label,
            stats: &r.stats,
        })
        .collect();
    let table = build_table(args.category, &columns, &config);

    match args.format {
        OutputFormat::Csv => {
            for report in &reports {
                eprintln!("{}", text_output::headline(&report.active_core));
            }
            print!(
                "{}",
                CsvOutput::from_table(&table, &config.missing_marker).to_csv()
            );
        }
        _ => print!(
            "{}",
            text_output::render_report(&reports, &table, &config.missing_marker)
        ),
    }

    Ok(all_ok)
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    if run(args)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
