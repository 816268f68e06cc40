use std::env;

use ballgame::{cli, logging};

fn main() {
    logging::init_logging("warn");
    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
