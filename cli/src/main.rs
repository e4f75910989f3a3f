#![deny(missing_docs)]

//! # Vault Compiler CLI
//!
//! Command Line Interface for the Vault schema compiler.
//!
//! Supported Commands:
//! - `compile`: Source tree (or manifest) -> content types and spaces -> schema document.
//! - `hash`: Prints the storage names derived from a remote id.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod compile;
mod error;
mod hash;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Vault schema compiler")]
struct Cli {
    /// Log every discovered file and declaration.
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile marked declarations into content type and space schemas.
    Compile(compile::CompileArgs),
    /// Print the storage names derived from a remote id.
    Hash(hash::HashArgs),
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Commands::Compile(args) => compile::execute(args),
        Commands::Hash(args) => {
            hash::execute(args);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_compile_flags() {
        let cli = Cli::try_parse_from([
            "vault-compiler",
            "-v",
            "compile",
            "--manifest",
            "decls.yaml",
            "--unresolved-models",
            "skip",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Compile(args) => {
                assert_eq!(
                    args.unresolved_models,
                    vault_core::UnresolvedModelPolicy::Skip
                );
                assert!(args.source.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn compile_requires_an_input() {
        assert!(Cli::try_parse_from(["vault-compiler", "compile"]).is_err());
    }
}
