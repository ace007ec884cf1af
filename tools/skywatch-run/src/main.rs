//! skywatch-run: headless radar scenario runner.
//!
//! Usage:
//!   skywatch-run run scenarios/crossing.json --secs 30 --snapshot
//!   skywatch-run check scenarios/crossing.json

use std::path::PathBuf;
use std::process;

use skywatch_core::constants::TICK_RATE;
use skywatch_sim::scenario::Scenario;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "skywatch-run: SKYWATCH radar scenario runner\n\
         \n\
         Commands:\n\
         \n\
         run       Run a scenario and print radar events as JSON lines\n\
         \n\
           <path>             Scenario JSON file\n\
           --secs <N>         Simulated seconds to run (default: scenario duration)\n\
           --snapshot         Print a full snapshot every simulated second\n\
         \n\
         check     Load and validate a scenario without running it\n\
         \n\
           <path>             Scenario JSON file\n\
         \n\
         Logging goes to stderr and is controlled by RUST_LOG (default: warn).\n"
    );
}

/// Options shared by the `run` and `check` commands.
#[derive(Debug, PartialEq)]
struct Options {
    path: PathBuf,
    secs: Option<f64>,
    snapshot: bool,
}

fn parse_options(args: &[String]) -> Result<Options, String> {
    let mut path = None;
    let mut secs = None;
    let mut snapshot = false;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--secs" => {
                let value = iter.next().ok_or("--secs requires a value")?;
                let parsed: f64 = value
                    .parse()
                    .map_err(|_| format!("invalid --secs value: {value}"))?;
                if !(parsed > 0.0) {
                    return Err(format!("--secs must be positive, got {value}"));
                }
                secs = Some(parsed);
            }
            "--snapshot" => snapshot = true,
            other if other.starts_with("--") => return Err(format!("unknown option: {other}")),
            other => {
                if path.replace(PathBuf::from(other)).is_some() {
                    return Err(format!("unexpected argument: {other}"));
                }
            }
        }
    }

    let path = path.ok_or("scenario path is required")?;
    Ok(Options {
        path,
        secs,
        snapshot,
    })
}

fn load(args: &[String]) -> (Options, Scenario) {
    let options = parse_options(args).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        print_usage();
        process::exit(1);
    });
    let scenario = Scenario::load(&options.path).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    (options, scenario)
}

fn cmd_run(args: &[String]) {
    let (options, scenario) = load(args);
    let secs = options.secs.unwrap_or(scenario.duration_secs);
    let snapshots = options.snapshot;

    let mut engine = scenario.build().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let ticks = (secs * TICK_RATE as f64).round() as u64;
    info!(scenario = %scenario.name, secs, ticks, "running scenario");
    let mut events = 0usize;
    for _ in 0..ticks {
        let snapshot = engine.tick();
        for event in &snapshot.events {
            print_json(event);
        }
        events += snapshot.events.len();
        if snapshots && snapshot.time.tick % TICK_RATE as u64 == 0 {
            print_json(&snapshot);
        }
    }
    engine.shutdown();

    eprintln!(
        "Ran '{}' for {:.2}s ({ticks} ticks, {events} events)",
        scenario.name, secs
    );
}

fn cmd_check(args: &[String]) {
    let (_, scenario) = load(args);
    let engine = scenario.build().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });
    eprintln!(
        "Scenario '{}' OK: {} entities, {} sensors, terrain: {}, duration {:.1}s",
        scenario.name,
        scenario.entities.len(),
        engine.coverage().sensor_count(),
        if scenario.terrain.is_some() { "yes" } else { "no" },
        scenario.duration_secs
    );
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{line}"),
        Err(e) => {
            eprintln!("Error: failed to serialize output: {e}");
            process::exit(1);
        }
    }
}
