#![deny(missing_docs)]

//! # Compile Command
//!
//! Runs the schema compiler over a Rust source tree or a declaration
//! manifest and writes the resulting schema document.
//!
//! 1. **Discover**: parse `*.rs` files (or load the manifest).
//! 2. **Compile**: extract content types, assemble spaces.
//! 3. **Emit**: print diagnostics; on success write the schema document.

use crate::error::{CliError, CliResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use vault_core::{
    Compiler, CompilerOptions, DeclarationSet, JsonEmitter, SourceSet, UnresolvedModelPolicy,
};
use walkdir::WalkDir;

/// Arguments for the compile command.
#[derive(clap::Args, Debug, Clone)]
#[command(group(
    clap::ArgGroup::new("input")
        .required(true)
        .args(["source", "manifest"])
))]
pub struct CompileArgs {
    /// Root of the Rust source tree to scan (e.g. `src`).
    #[clap(long, env = "VAULT_SOURCE")]
    pub source: Option<PathBuf>,

    /// Declaration manifest (.json, .yaml or .yml).
    #[clap(long)]
    pub manifest: Option<PathBuf>,

    /// Output path for the schema document.
    /// Supports .json and .yaml/.yml extensions.
    /// If not provided, prints JSON to stdout.
    #[clap(long, env = "VAULT_OUTPUT")]
    pub output: Option<PathBuf>,

    /// What to do with a space that includes a content type without schema
    /// (`report` or `skip`).
    #[clap(long, default_value = "report", env = "VAULT_UNRESOLVED_MODELS")]
    pub unresolved_models: UnresolvedModelPolicy,
}

/// Executes the compile pipeline.
///
/// # Arguments
///
/// * `args` - Command arguments.
pub fn execute(args: &CompileArgs) -> CliResult<()> {
    let set = load_declarations(args)?;
    info!(
        declarations = set.declarations.len(),
        types = set.types.len(),
        "declarations loaded"
    );

    let compiler = Compiler::new(
        CompilerOptions::default().with_unresolved_models(args.unresolved_models),
    );
    let mut output = compiler.compile(&set);
    let mut emitter = JsonEmitter::new();
    compiler.emit_all(&mut output, &mut emitter);

    for diagnostic in &output.diagnostics {
        eprintln!("{}", diagnostic);
    }
    if !output.is_success() {
        return Err(CliError::Diagnostics(output.diagnostics.len()));
    }

    let document = emitter.into_document();
    match &args.output {
        Some(out_path) => {
            let ext = out_path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("json");
            let rendered = match ext {
                "yaml" | "yml" => serde_yaml::to_string(&document)?,
                _ => serde_json::to_string_pretty(&document)?,
            };
            if let Some(parent) = out_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(out_path, rendered)?;
            println!("Schema generated at {:?}", out_path);
        }
        None => println!("{}", serde_json::to_string_pretty(&document)?),
    }

    Ok(())
}

/// Reads declarations from the manifest or the source tree.
fn load_declarations(args: &CompileArgs) -> CliResult<DeclarationSet> {
    if let Some(manifest) = &args.manifest {
        return Ok(DeclarationSet::load(manifest)?);
    }
    let root = args
        .source
        .as_ref()
        .ok_or_else(|| CliError::General("either --source or --manifest is required".into()))?;
    load_source_tree(root)
}

fn load_source_tree(root: &Path) -> CliResult<DeclarationSet> {
    if !root.is_dir() {
        return Err(CliError::General(format!(
            "Source directory not found: {:?}",
            root
        )));
    }

    let mut sources = SourceSet::new();
    // Sorted walk keeps discovery order stable between runs
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry
            .map_err(|e| CliError::General(format!("Failed to walk {:?}: {}", root, e)))?;
        let path = entry.path();
        if entry.file_type().is_file() && path.extension().is_some_and(|e| e == "rs") {
            sources.add_file(root, path)?;
        }
    }
    Ok(sources.into_declarations()?)
}
