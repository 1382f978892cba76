use clap::Parser;
use std::path::PathBuf;

/// Print the output of the system `lsusb` followed by a blank line
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None, max_term_width=80)]
pub struct Args {
    /// Path to user config file to use; defaults to the system config dir
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Program to run instead of 'lsusb'
    #[arg(long)]
    pub command: Option<String>,

    /// Line buffer size in bytes; longer lines are read in chunks
    #[arg(long)]
    pub buffer_size: Option<usize>,

    /// Turn debugging information on. Alternatively can use RUST_LOG env: INFO, DEBUG, TRACE
    #[arg(short = 'z', long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Arguments passed through to the program
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
