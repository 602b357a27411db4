/// forkjoin CLI
///
/// Runs the example fork/join programs against a configurable spawner.
use forkjoin_core::cli;

fn main() {
    if let Err(e) = cli::run_cli() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
