mod logging;
mod server;

use std::io;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use solvekit_lang::{DEFAULT_EQUATION, ObjectiveConvention, Options, PivotRule};

use crate::server::Server;

#[derive(Parser)]
#[command(name = "solvekit")]
#[command(about = "Solve single-variable equations and small linear programs", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: OptionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct OptionArgs {
    /// Offset used to tighten strict `<` and `>` constraints
    #[arg(long, global = true, default_value_t = solvekit_lang::STRICT_EPSILON)]
    epsilon: f64,
    /// Report the solver's raw (negated) objective for Minimize problems
    #[arg(long, global = true)]
    raw_minimize: bool,
    /// Round LP output to this many significant digits (0 or unset: unrounded)
    #[arg(long, global = true)]
    precision: Option<usize>,
    /// Simplex pivot budget
    #[arg(long, global = true, default_value_t = 10_000)]
    max_iterations: usize,
    /// Simplex entering-column rule
    #[arg(long, global = true, value_enum, default_value = "bland")]
    pivot_rule: PivotArg,
}

#[derive(Clone, Copy, ValueEnum)]
enum PivotArg {
    Bland,
    Dantzig,
}

impl From<PivotArg> for PivotRule {
    fn from(arg: PivotArg) -> Self {
        match arg {
            PivotArg::Bland => PivotRule::Bland,
            PivotArg::Dantzig => PivotRule::Dantzig,
        }
    }
}

impl OptionArgs {
    fn to_options(&self) -> Options {
        let convention = if self.raw_minimize {
            ObjectiveConvention::Raw
        } else {
            ObjectiveConvention::Restore
        };
        Options::new()
            .with_epsilon(self.epsilon)
            .with_convention(convention)
            .with_precision(self.precision.filter(|&digits| digits > 0))
            .with_max_iterations(self.max_iterations)
            .with_pivot_rule(self.pivot_rule.into())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve an equation in x and print its first real root
    Equation {
        /// The equation, e.g. "x^2 + 7 = 43"
        #[arg(default_value = DEFAULT_EQUATION)]
        equation: String,
    },
    /// Solve a linear program written in compact notation
    Lp {
        /// e.g. "Maximize 5A + 3B; A <= 20; A + B <= 40"
        problem: String,
        /// Print the solved model as JSON instead of the result line
        #[arg(long)]
        json: bool,
    },
    /// Print the registered tool descriptors as JSON
    Tools,
    /// Serve tool calls as JSON lines over stdin/stdout
    Serve,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(message) = logging::init() {
        eprintln!("{message}");
        return ExitCode::FAILURE;
    }

    let options = cli.options.to_options();

    match cli.command {
        Commands::Equation { equation } => match solvekit_lang::solve_equation(&equation) {
            Ok(root) => {
                println!("{root}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("{}: {}", err.kind(), err);
                ExitCode::FAILURE
            }
        },
        Commands::Lp { problem, json: false } => {
            // `Error: ...` lines are results, not failures
            println!("{}", solvekit_lang::solve_lp_with(&problem, &options));
            ExitCode::SUCCESS
        }
        Commands::Lp { problem, json: true } => {
            let value = match solvekit_lang::solve_lp_result(&problem, &options) {
                Ok(solved) => serde_json::to_value(&solved),
                Err(err) => Ok(serde_json::json!({
                    "error": { "kind": err.kind(), "message": err.to_string() }
                })),
            };
            match value.and_then(|v| serde_json::to_string_pretty(&v)) {
                Ok(json) => {
                    println!("{json}");
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    eprintln!("Error serializing result: {err}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Tools => match serde_json::to_string_pretty(&server::tools()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("Error serializing tools: {err}");
                ExitCode::FAILURE
            }
        },
        Commands::Serve => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            match Server::new(options).run(stdin.lock(), stdout.lock()) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Server I/O error: {err}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}
