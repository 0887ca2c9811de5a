use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use script_debugger::engine::{DebugEngine, DebugEvent};
use script_debugger::replay::{self, Replay, Scenario};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Replays recorded debug sessions against annotated test scripts.
#[derive(Debug, Parser)]
#[command(name = "script-debugger", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run every step of a scenario and print the event log.
    Replay(ReplayArgs),
    /// Step through a scenario from a prompt.
    Interactive {
        scenario: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
}

#[derive(Debug, Args)]
struct ReplayArgs {
    scenario: PathBuf,

    /// Expected event log; the exit code is 1 when the output differs.
    #[arg(long)]
    baseline: Option<PathBuf>,

    /// Write the event log here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,
}

#[derive(Debug, Args)]
struct Overrides {
    /// Strings longer than this render as `<large string>`.
    #[arg(long)]
    max_string_length: Option<usize>,

    /// Trace bits enabled from the start (1 commands, 2 engine results,
    /// 4 internals, 8 debug events).
    #[arg(long)]
    trace: Option<u32>,
}

impl Overrides {
    fn apply(&self, scenario: &mut Scenario) {
        if let Some(length) = self.max_string_length {
            scenario.config.inspect_max_string_length = length;
        }
        if let Some(trace) = self.trace {
            scenario.config.trace |= trace;
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Replay(args) => run_replay(args),
        Command::Interactive {
            scenario,
            overrides,
        } => {
            let mut scenario = load_scenario(&scenario)?;
            overrides.apply(&mut scenario);
            run_interactive(scenario)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_scenario(path: &Path) -> anyhow::Result<Scenario> {
    Scenario::load(path).with_context(|| format!("loading scenario {}", path.display()))
}

fn run_replay(args: ReplayArgs) -> anyhow::Result<ExitCode> {
    let mut scenario = load_scenario(&args.scenario)?;
    args.overrides.apply(&mut scenario);

    let baseline = match &args.baseline {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("reading baseline {}", path.display()))?,
        ),
        None => None,
    };

    let outcome = replay::run(scenario, baseline.as_deref());
    match &args.output {
        Some(path) => fs::write(path, &outcome.output)
            .with_context(|| format!("writing output {}", path.display()))?,
        None => println!("{}", outcome.output),
    }

    if outcome.verdict.passed() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("baseline mismatch");
        Ok(ExitCode::from(1))
    }
}

fn run_interactive(scenario: Scenario) -> anyhow::Result<()> {
    let mut replay = Replay::new(scenario);
    let stdin = io::stdin();
    let mut input = String::new();

    eprintln!("{} step(s) loaded. Type 'help' for commands.", replay.remaining());
    loop {
        eprint!("dbg> ");
        io::stderr().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        let Some(words) = shlex::split(input.trim()) else {
            eprintln!("unbalanced quotes");
            continue;
        };
        let Some((command, rest)) = words.split_first() else {
            continue;
        };

        match command.as_str() {
            "step" | "s" => {
                let count = rest.first().and_then(|n| n.parse().ok()).unwrap_or(1usize);
                for _ in 0..count {
                    if !replay.step() {
                        eprintln!("no steps left");
                        break;
                    }
                }
                eprintln!("{} step(s) remaining", replay.remaining());
            }
            "run" => replay.run_to_end(),
            "compile" => match rest.first().and_then(|id| id.parse::<u32>().ok()) {
                Some(script_id) => replay
                    .controller_mut()
                    .handle_debug_event(DebugEvent::SourceCompile { script_id }),
                None => eprintln!("usage: compile <scriptId>"),
            },
            "raw" => {
                let Some(kind) = rest.first().and_then(|k| k.parse::<u32>().ok()) else {
                    eprintln!("usage: raw <kind> [json]");
                    continue;
                };
                let data = match rest.get(1) {
                    Some(text) => match serde_json::from_str(text) {
                        Ok(data) => data,
                        Err(err) => {
                            eprintln!("invalid event data: {err}");
                            continue;
                        }
                    },
                    None => Value::Object(Default::default()),
                };
                if let Err(err) = replay.controller_mut().handle_raw_debug_event(kind, &data) {
                    eprintln!("fatal: {err}");
                    break;
                }
            }
            "rundown" => {
                let controller = replay.controller_mut();
                match controller.engine_mut().get_scripts() {
                    Ok(scripts) => controller.handle_source_rundown(&scripts),
                    Err(err) => eprintln!("{err}"),
                }
            }
            "breakpoints" | "bp" => {
                for record in replay.controller().breakpoints().iter() {
                    eprintln!(
                        "  {} {} line {} col {}{}",
                        record.id,
                        record.name.as_deref().unwrap_or("-"),
                        record.line,
                        record.column,
                        if record.enabled { "" } else { " (disabled)" }
                    );
                }
            }
            "output" => println!("{}", replay.controller().get_output_json()),
            "verify" => {
                let verdict = replay.controller_mut().verify();
                eprintln!("{verdict:?}");
            }
            "baseline" => match rest.first() {
                Some(path) => match fs::read_to_string(path) {
                    Ok(text) => {
                        let _ = replay.controller_mut().set_baseline(&text);
                    }
                    Err(err) => eprintln!("{path}: {err}"),
                },
                None => eprintln!("usage: baseline <file>"),
            },
            "help" | "?" => {
                eprintln!("  step [n]          dispatch the next n events");
                eprintln!("  run               dispatch every remaining event");
                eprintln!("  compile <id>      raise a compile event for a script");
                eprintln!("  raw <kind> [json] raise an event by its numeric code");
                eprintln!("  rundown           re-parse every loaded script");
                eprintln!("  breakpoints       list tracked breakpoints");
                eprintln!("  baseline <file>   load an expected event log");
                eprintln!("  output            print the event log");
                eprintln!("  verify            compare the event log with the baseline");
                eprintln!("  quit");
            }
            "quit" | "q" | "exit" => break,
            other => eprintln!("unknown command '{other}'"),
        }
    }
    Ok(())
}
