//! Pizza compiler CLI.
//!
//! `bake --repl [jsonPath] [llPath]` runs interactively over stdin;
//! `bake <srcPath> [jsonPath] [llPath]` runs a source file. The optional
//! paths receive the JSON tree dump and the textual IR of every lowered
//! function.

use std::process::ExitCode;

mod driver;
mod output;
mod tracing_setup;

use driver::Options;

fn main() -> ExitCode {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(opts) = Options::from_args(&args) else {
        print_usage();
        return ExitCode::FAILURE;
    };

    match driver::run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("bake: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Invalid arguments");
    eprintln!("usage: bake --repl [jsonPath] [llPath]");
    eprintln!("       bake <srcPath> [jsonPath] [llPath]");
}
