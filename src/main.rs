//! Smoke-check CLI for the GDB pretty-printer harness
//!
//! Lets a developer probe the environment and print a single expression
//! through the loaded pretty-printers without going through the test suite.

use clap::{Parser, Subcommand};
use colored::Colorize;

use gdb_harness::common::{logging, Result};
use gdb_harness::fixture::{self, ArrowFixture};

#[derive(Parser)]
#[command(name = "arrow-gdb-check", about = "Drive GDB to exercise the Arrow pretty-printers")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report whether gdb, python3 and the printer script are available
    Doctor,
    /// Load the pretty-printers and print one expression
    Print {
        /// Expression to evaluate in the test-entry frame
        expr: String,

        /// Suppress the raw session traffic
        #[arg(long)]
        quiet: bool,
    },
}

fn main() {
    logging::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Doctor => doctor(),
        Commands::Print { expr, quiet } => print_expr(&expr, quiet),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn doctor() -> Result<()> {
    let mut ok = true;

    report("gdb", fixture::gdb_available(), &mut ok);
    report("python3", fixture::python_executable().is_ok(), &mut ok);

    let script = fixture::script_path();
    report(
        &format!("printer script ({})", script.display()),
        script.exists(),
        &mut ok,
    );

    if !ok {
        std::process::exit(1);
    }
    println!("{}", "Environment ready".green());
    Ok(())
}

fn report(name: &str, present: bool, ok: &mut bool) {
    if present {
        println!("  {} {}", "✓".green(), name);
    } else {
        println!("  {} {}", "✗".red(), name);
        *ok = false;
    }
}

fn print_expr(expr: &str, quiet: bool) -> Result<()> {
    let mut fixture = ArrowFixture::start()?;
    fixture.session().set_echo(!quiet);

    let outcome = fixture
        .load_pretty_printers()
        .and_then(|_| fixture.session().print_value(expr));

    // Teardown before reporting so a failed print still reaps the child
    fixture.join()?;

    let value = outcome?;
    println!("{value}");
    Ok(())
}
