use std::process;

use clap::Parser;

use polyextract::cli::Args;

fn main() {
    let args = Args::parse();
    match polyextract::run(args) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}
