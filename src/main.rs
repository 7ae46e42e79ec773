use lrukit::cli::run_cli;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    run_cli()
}
