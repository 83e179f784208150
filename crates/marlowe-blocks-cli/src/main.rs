//! Marlowe block compiler CLI.
//!
//! Provides the `marlowe-blocks` binary:
//!
//! - `compile` reads a Blockly workspace saved by the editor, compiles it and
//!   writes the contract document
//! - `check` reads a contract document and reports whether it is well formed
//! - `grammar` prints the block grammar table as JSON
//!
//! Uses the same `marlowe_blocks_compile::compile()` entry point as the
//! editor, so both produce identical documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use marlowe_blocks_compile::{compile, read_document, serialize};
use marlowe_blocks_core::{BlockGraph, BlockSource, GRAMMAR};

/// Marlowe block compiler and tools.
#[derive(Parser)]
#[command(name = "marlowe-blocks", about = "Marlowe block compiler and tools")]
struct Cli {
    /// Log more (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Compile a Blockly workspace to a contract document.
    Compile {
        /// Path to the workspace JSON file.
        workspace: PathBuf,

        /// Write the document here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a contract document is well formed.
    Check {
        /// Path to the document JSON file.
        document: PathBuf,
    },
    /// Print the block grammar table as JSON.
    Grammar,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Compile { workspace, output } => run_compile(&workspace, output.as_deref()),
        Commands::Check { document } => run_check(&document),
        Commands::Grammar => run_grammar(),
    };
    process::exit(exit_code);
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute the compile subcommand.
///
/// Returns exit code: 0 = success, 1 = compile error,
/// 2 = invalid workspace, 3 = I/O error.
fn run_compile(workspace: &Path, output: Option<&Path>) -> i32 {
    let text = match fs::read_to_string(workspace) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", workspace.display(), e);
            return 3;
        }
    };

    let graph = match BlockGraph::from_workspace_json(&text) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Error: invalid workspace '{}': {}", workspace.display(), e);
            return 2;
        }
    };
    tracing::debug!(
        blocks = graph.node_count(),
        edges = graph.edge_count(),
        "loaded workspace"
    );

    let document = match compile(&graph) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            if let Some(block) = e.node().and_then(|node| graph.block_id(node)) {
                eprintln!("  at editor block '{}'", block);
            }
            // Machine-readable error on stdout for the editor.
            match serde_json::to_string_pretty(&e) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::warn!(error = %e, "failed to serialize compile error"),
            }
            return 1;
        }
    };

    let text = serialize(&document);
    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &text) {
                eprintln!("Error: failed to write '{}': {}", path.display(), e);
                return 3;
            }
            tracing::info!(path = %path.display(), "wrote contract document");
        }
        None => println!("{}", text),
    }
    0
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 = well formed, 2 = invalid document, 3 = I/O error.
fn run_check(document: &Path) -> i32 {
    let text = match fs::read_to_string(document) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error: failed to read '{}': {}", document.display(), e);
            return 3;
        }
    };

    match read_document(&text) {
        Ok(contract) => {
            println!(
                "{}: ok ({} contract nodes)",
                document.display(),
                contract.size()
            );
            0
        }
        Err(e) => {
            eprintln!("Error: {}: {}", document.display(), e);
            2
        }
    }
}

/// Execute the grammar subcommand.
fn run_grammar() -> i32 {
    match serde_json::to_string_pretty(&GRAMMAR[..]) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize grammar: {}", e);
            1
        }
    }
}
