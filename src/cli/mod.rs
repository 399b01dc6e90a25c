// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the biosift command-line interface.

pub mod display;

use std::path::PathBuf;

use biosift::Domain;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "biosift",
    about = "Build, inspect and query per-domain search indexes",
    version
)]
pub struct Cli {
    /// More logging (-v debug, -vv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON runtime config (index_dir, quiet_period_ms, worker_stack_size)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build one index asset per domain from a directory of JSON datasets
    Index {
        /// Input directory containing manifest.json and dataset files
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for <domain>_search_index.bsx files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Display the structure of an index asset
    Inspect {
        /// Path to a .bsx file
        file: PathBuf,
    },

    /// Load a domain's index in a worker and run one query against it
    Search {
        /// Domain whose asset to load
        #[arg(short, long)]
        domain: Domain,

        /// Directory holding the assets (overrides the config file)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Query text
        query: String,

        /// Maximum number of ids to print
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print the worker's events as JSON lines instead of a table
        #[arg(long)]
        json: bool,

        /// Give up after this many milliseconds
        #[arg(long, default_value = "10000")]
        timeout_ms: u64,
    },
}
