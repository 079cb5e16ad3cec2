use clap::Parser;
use std::process;
use translation_sim::config::Config;
use translation_sim::run_simulation;

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
}

fn main() {
    init_logging();
    log::info!("address translation simulation");
    let config = Config::parse();
    config.display();
    if let Err(err) = config.validate() {
        eprintln!("{}", err);
        process::exit(1);
    }
    if let Err(err) = run_simulation(&config) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
