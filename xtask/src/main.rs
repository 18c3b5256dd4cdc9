use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the link-sweep workspace",
    long_about = "Runs the standard link campaigns, benchmarks, load tests\n\
                  and CI checks of the link-sweep workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Distance campaign over all propagation models (results.csv)
    Sweep,
    /// Duration campaign for one model (pre_results.csv)
    DurationSweep {
        /// Propagation model
        #[arg(long, default_value = "Nakagami")]
        model: String,
        /// Fixed node separation in meters
        #[arg(long, default_value_t = 55.0)]
        distance: f64,
    },
    /// One trial at 1 m (trial_results.csv)
    Trial,
    /// Run Criterion benchmarks
    Bench,
    /// Run CI checks (fmt, clippy, tests, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
    /// Run load tests (ignored full-length trials)
    LoadTest,
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Run benchmarks
    Bench,
    /// Run check + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn cargo(args: &[&str]) -> ExitStatus {
    eprintln!("+ cargo {}", args.join(" "));
    Command::new("cargo")
        .args(args)
        .status()
        .expect("failed to execute cargo")
}

fn run_cargo(args: &[&str]) {
    let status = cargo(args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_sweep(extra: &[&str]) {
    let mut args = vec!["run", "-p", "link_experiments", "--bin", "link-sweep", "--release", "--"];
    args.extend_from_slice(extra);
    run_cargo(&args);
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test link_core");
    run_cargo(&["test", "-p", "link_core"]);

    step("Test link_experiments");
    run_cargo(&["test", "-p", "link_experiments"]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&["bench", "--package", "link_core", "--bench", "performance"]);
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sweep => run_sweep(&["--mode", "distance"]),
        Commands::DurationSweep { model, distance } => {
            let distance = distance.to_string();
            run_sweep(&["--mode", "duration", "--model", &model, "--distance", &distance]);
        }
        Commands::Trial => run_sweep(&["--mode", "single"]),
        Commands::Bench => ci_bench(),
        Commands::Ci { job } => match job {
            CiJob::Check => ci_check(),
            CiJob::Bench => ci_bench(),
            CiJob::All => {
                ci_check();
                ci_bench();
            }
        },
        Commands::LoadTest => {
            step("Run load tests");
            for package in ["link_core", "link_experiments"] {
                run_cargo(&[
                    "test",
                    "--package",
                    package,
                    "--release",
                    "--test",
                    "load_tests",
                    "--",
                    "--ignored",
                    "--nocapture",
                ]);
            }
        }
    }
}
