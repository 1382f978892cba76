//! Where the magic happens for `usbscan` binary!
use clap::Parser;
use colored::*;

use usbscan::config::Config;
use usbscan::error::Result;

mod cli;
use cli::Args;

fn merge_config(args: &Args, config: &mut Config) {
    if let Some(command) = &args.command {
        config.set_command(command);
    }
    if !args.args.is_empty() {
        config.args = args.args.to_owned();
    }
    if args.buffer_size.is_some() {
        config.buffer_size = args.buffer_size;
    }
}

fn run(args: Args) -> Result<()> {
    usbscan::set_log_level(args.debug)?;

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::sys()?,
    };
    merge_config(&args, &mut config);
    log::debug!("Running with {:?}", config);

    config.scanner().run_and_print()
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        match e.code() {
            Some(code) => eprintln!("{}: {:#} (code {})", "Error".red().bold(), e, code),
            None => eprintln!("{}: {:#}", "Error".red().bold(), e),
        }
        std::process::exit(1);
    }
}
