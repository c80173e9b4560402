use anyhow::Result;
use clap::Parser;

mod cli;
mod cmd_del;
mod cmd_get;
mod cmd_keys;
mod cmd_merge;
mod cmd_put;
mod cmd_status;
mod util;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = cli::Cli::parse();
    match cli.cmd {
        cli::Cmd::Put {
            path,
            key,
            value,
            value_file,
        } => cmd_put::exec(path, key, value, value_file),

        cli::Cmd::Get { path, key, out } => cmd_get::exec(path, key, out),

        cli::Cmd::Del { path, key } => cmd_del::exec(path, key),

        cli::Cmd::Keys { path } => cmd_keys::exec(path),

        cli::Cmd::Merge { path } => cmd_merge::exec(path),

        cli::Cmd::Status { path, json } => cmd_status::exec(path, json),
    }
}
