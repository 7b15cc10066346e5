use clap::Parser;
use log::LevelFilter;
use messenger::{cmd::Cli, log_error};

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    if log_error(cli.exe()).is_none() {
        std::process::exit(1);
    }
}
