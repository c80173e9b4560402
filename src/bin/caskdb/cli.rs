use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Минимальный CLI для CaskDB
#[derive(Parser, Debug)]
#[command(name = "caskdb", version, about = "CaskDB CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Put key/value (value as string or from file)
    Put {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Value as a literal string (UTF-8). Ignored if --value-file is set.
        #[arg(long)]
        value: Option<String>,
        /// Read value bytes from a file
        #[arg(long)]
        value_file: Option<PathBuf>,
    },
    /// Get key
    Get {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
        /// Optional file to write raw value into
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete key (tombstone write)
    Del {
        #[arg(long)]
        path: PathBuf,
        #[arg(long)]
        key: String,
    },
    /// List live keys (one per line)
    Keys {
        #[arg(long)]
        path: PathBuf,
    },
    /// Merge non-active data files into a compacted data+hint pair
    ///
    /// Пример:
    ///   caskdb merge --path ./db
    Merge {
        #[arg(long)]
        path: PathBuf,
    },
    /// Print store summary (files, live keys, config, metrics)
    Status {
        #[arg(long)]
        path: PathBuf,
        /// JSON output (single object)
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}
