use anyhow::Context;
use caseroll_core::{CaseEngine, CaseError, Event, EventBus, Request};
use caseroll_data::{apply_step, load_catalog_file, load_engine_config, load_script, ReplayStep};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "assets/engine.json";
const DEFAULT_CATALOG_PATH: &str = "assets/catalog.json";

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config: PathBuf,
    catalog: Option<PathBuf>,
    seed: Option<u64>,
    script: Option<PathBuf>,
    help: bool,
}

/// Lines written to stdout, one JSON object each.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum OutputLine<'a> {
    Request {
        step: usize,
        request: &'a Request,
    },
    Event {
        step: usize,
        event: &'a Event,
    },
    Rejected {
        step: usize,
        action: &'a str,
        error: String,
    },
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        config: PathBuf::from(DEFAULT_CONFIG_PATH),
        catalog: None,
        seed: None,
        script: None,
        help: false,
    };
    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--help" | "-h" => options.help = true,
            "--config" => {
                if let Some(value) = args.get(idx + 1) {
                    options.config = PathBuf::from(value);
                    idx += 1;
                }
            }
            "--catalog" => {
                if let Some(value) = args.get(idx + 1) {
                    options.catalog = Some(PathBuf::from(value));
                    idx += 1;
                }
            }
            "--seed" => {
                if let Some(value) = args.get(idx + 1) {
                    options.seed = value.parse::<u64>().ok();
                    idx += 1;
                }
            }
            other if !other.starts_with("--") && options.script.is_none() => {
                options.script = Some(PathBuf::from(other));
            }
            other => tracing::warn!(arg = other, "ignoring unknown argument"),
        }
        idx += 1;
    }
    options
}

fn print_usage() {
    eprintln!("usage: caseroll-cli [--config PATH] [--catalog PATH] [--seed N] SCRIPT");
    eprintln!("replays SCRIPT and prints outbound requests and local events as JSON lines");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn write_line(out: &mut impl Write, line: &OutputLine<'_>) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, line).context("write output line")?;
    writeln!(out)?;
    Ok(())
}

fn flush_bus(out: &mut impl Write, step: usize, bus: &mut EventBus) -> anyhow::Result<()> {
    for request in bus.drain_requests() {
        write_line(
            out,
            &OutputLine::Request {
                step,
                request: &request,
            },
        )?;
    }
    for event in bus.drain() {
        write_line(out, &OutputLine::Event { step, event: &event })?;
    }
    Ok(())
}

fn report_rejection(
    out: &mut impl Write,
    step: usize,
    action: &ReplayStep,
    err: &CaseError,
) -> anyhow::Result<()> {
    write_line(
        out,
        &OutputLine::Rejected {
            step,
            action: action.label(),
            error: err.to_string(),
        },
    )
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let script_path = options
        .script
        .as_deref()
        .context("missing script path")?;
    let script = load_script(script_path)?;
    let mut config = load_engine_config(&options.config)?;
    if let Some(seed) = options.seed.or(script.seed) {
        config.seed = Some(seed);
    }
    tracing::info!(
        script = %script_path.display(),
        steps = script.steps.len(),
        seed = ?config.seed,
        "replaying"
    );

    let mut engine = CaseEngine::new(config);
    let mut bus = EventBus::default();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let catalog_path = options
        .catalog
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH));
    if options.catalog.is_some() || catalog_path.exists() {
        let catalog = load_catalog_file(&catalog_path)?;
        if let Err(err) = engine.apply(catalog.into_inbound(), &mut bus) {
            tracing::warn!(error = %err, "catalog rejected");
        }
        flush_bus(&mut out, 0, &mut bus)?;
    }

    let mut rejected = 0usize;
    for (idx, step) in script.steps.iter().enumerate() {
        let step_no = idx + 1;
        if let Err(err) = apply_step(&mut engine, step, &mut bus) {
            rejected += 1;
            report_rejection(&mut out, step_no, step, &err)?;
        }
        flush_bus(&mut out, step_no, &mut bus)?;
    }
    out.flush()?;
    tracing::info!(
        steps = script.steps.len(),
        rejected,
        stale = engine.stale_responses(),
        phase = ?engine.phase(),
        "replay finished"
    );
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    init_tracing();
    let options = parse_cli_options(&args);
    if options.help {
        print_usage();
        return;
    }
    if let Err(err) = run(&options) {
        eprintln!("caseroll: {err:#}");
        if options.script.is_none() {
            print_usage();
        }
        std::process::exit(1);
    }
}
