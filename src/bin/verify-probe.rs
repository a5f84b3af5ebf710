use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use verify_bridge::{
    config, logging, register_suite, verifier, BuildMode, FailureReport, RecordingEngine,
    TestScope, Verifier, VerifyStats,
};

#[path = "verify_probe/scenarios.rs"]
mod scenarios;
use scenarios::Scenario;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("verify-probe error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "verify-probe", about = "Runs verification scenarios in a separate process")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        logging::init_stderr_logging();
        match self.command {
            Command::Run(args) => run_command(args),
            Command::Global(args) => global_command(args),
            Command::Suite(args) => suite_command(args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario against a recording engine and print the report.
    Run(RunArgs),
    /// Run a scenario through the global verifier.
    Global(GlobalArgs),
    /// Register a suite, loading shared configuration.
    Suite(SuiteArgs),
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[arg(long, value_enum)]
    scenario: Scenario,
    /// Failure policy; `auto` resolves from configuration and build profile.
    #[arg(long, value_enum, default_value_t = ModeArg::Auto)]
    mode: ModeArg,
    #[arg(long, value_enum, default_value_t = ReportFormat::Json)]
    format: ReportFormat,
}

#[derive(Args, Debug, Clone)]
struct GlobalArgs {
    #[arg(long, value_enum)]
    scenario: Scenario,
}

#[derive(Args, Debug, Clone)]
struct SuiteArgs {
    /// Suite name to register.
    #[arg(long, default_value = "ProbeSuite")]
    name: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ModeArg {
    Auto,
    Debug,
    Release,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum ReportFormat {
    Json,
    Table,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    scenario: String,
    mode: BuildMode,
    stats: VerifyStats,
    failures: Vec<FailureReport>,
    messages: Vec<String>,
}

impl ModeArg {
    fn resolve(self) -> Result<BuildMode> {
        Ok(match self {
            ModeArg::Debug => BuildMode::Debug,
            ModeArg::Release => BuildMode::Release,
            ModeArg::Auto => {
                let config = config::ensure_initialized().context("loading configuration")?;
                BuildMode::resolve(config)
            }
        })
    }
}

fn run_command(args: RunArgs) -> Result<()> {
    let mode = args.mode.resolve()?;
    let engine = Arc::new(RecordingEngine::new());
    let verifier = Verifier::with_engine(mode, engine.clone());

    scenarios::run(&verifier, args.scenario);

    let report = ProbeReport {
        scenario: args.scenario.to_string(),
        mode,
        stats: verifier.stats(),
        failures: engine.failures(),
        messages: engine.messages(),
    };
    match args.format {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("serializing report")?;
            println!("{json}");
        }
        ReportFormat::Table => print_table(&report),
    }
    Ok(())
}

fn print_table(report: &ProbeReport) {
    println!("scenario: {} ({} mode)", report.scenario, report.mode);
    println!(
        "checks: {} passed: {} failed: {}",
        report.stats.checks, report.stats.passed, report.stats.failed
    );
    for failure in &report.failures {
        println!("  {failure}");
    }
    for message in &report.messages {
        println!("  message: {message}");
    }
}

fn global_command(args: GlobalArgs) -> Result<()> {
    let verifier = verifier();
    scenarios::run(verifier, args.scenario);
    println!("{}", serde_json::to_string(&verifier.stats())?);
    Ok(())
}

fn suite_command(args: SuiteArgs) -> Result<()> {
    let name: &'static str = Box::leak(args.name.into_boxed_str());
    let context = register_suite(name).with_context(|| format!("registering suite {name}"))?;
    let _scope = TestScope::enter(name);
    context.trace_info(format_args!("suite {} ready", context.name()));
    println!(
        "{}",
        serde_json::to_string(context.config()).context("serializing configuration")?
    );
    Ok(())
}
