// ─────────────────────────────────────────────────────────────────────
// LENR Nano-SAV — Driver
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! `lenr-sav-nano`: runs the nano-SAV scenario, prints the headline numbers
//! and renders the example trajectory.
//!
//! ```text
//! lenr-sav-nano [--config scenario.json] [--json] [--no-plot]
//! RUST_LOG=debug lenr-sav-nano
//! ```

use lenr_core::render::render_trajectory;
use lenr_core::resonance::ResonanceRun;
use lenr_core::scenario::{run_example_trajectory, run_scenario, ScenarioReport};
use lenr_types::config::ScenarioConfig;
use lenr_types::error::{LenrError, LenrResult};
use std::path::Path;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: lenr-sav-nano [OPTIONS]

Options:
  --config <file.json>  Scenario configuration (missing fields use defaults)
  --json                Print the scenario summary as JSON
  --no-plot             Skip the example trajectory and its PNG
  --help                Show this message

Set RUST_LOG (e.g. RUST_LOG=info) for solver diagnostics.";

#[derive(Debug, Default, PartialEq)]
struct CliArgs {
    config: Option<String>,
    json: bool,
    no_plot: bool,
    help: bool,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> LenrResult<CliArgs> {
    let mut out = CliArgs::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => out.json = true,
            "--no-plot" => out.no_plot = true,
            "--help" | "-h" => out.help = true,
            "--config" => {
                let path = iter.next().ok_or_else(|| {
                    LenrError::ConfigError("--config expects a file path".to_string())
                })?;
                out.config = Some(path);
            }
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    out.config = Some(path.to_string());
                } else {
                    return Err(LenrError::ConfigError(format!(
                        "unrecognised argument '{other}'"
                    )));
                }
            }
        }
    }
    Ok(out)
}

fn load_config(args: &CliArgs) -> LenrResult<ScenarioConfig> {
    let mut cfg = match &args.config {
        Some(path) => ScenarioConfig::from_file(path)?,
        None => ScenarioConfig::default(),
    };
    if args.no_plot {
        cfg.plot.enabled = false;
    }
    Ok(cfg)
}

fn print_report(report: &ScenarioReport, json: bool) -> LenrResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    } else {
        for line in report.summary_lines() {
            println!("{line}");
        }
    }
    Ok(())
}

/// Render the example run. Failure is reported but not fatal.
fn render_example(run: &ResonanceRun, cfg: &ScenarioConfig, json: bool) {
    let path = Path::new(&cfg.plot.output);
    match render_trajectory(run, &cfg.constants, path, cfg.plot.width, cfg.plot.height) {
        Ok(()) if json => log::info!("Example plot saved as '{}'", path.display()),
        Ok(()) => println!("Example plot saved as '{}'", path.display()),
        Err(e) => {
            log::warn!("{e}");
            eprintln!("warning: {e}");
        }
    }
}

fn run(args: CliArgs) -> LenrResult<()> {
    let cfg = load_config(&args)?;
    let report = run_scenario(&cfg)?;
    print_report(&report, args.json)?;
    if let Some(example) = run_example_trajectory(&cfg)? {
        render_example(&example, &cfg, args.json);
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {e}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        println!("{USAGE}");
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:?}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
