//! `glint`: inspect glTF 2.0 assets from the command line.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use glint::{ExtensionRegistry, ImportError, Importer, ReadOptions};
use glint_core::{AccessorIndex, GltfError, SceneIndex};
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "glint", version, about = "Inspect glTF 2.0 assets")]
struct Cli {
    /// Register the bundled KHR extension factories
    #[arg(long, global = true)]
    khr: bool,

    /// Resolve every buffer, accessor and image before reporting
    #[arg(long, global = true)]
    preload: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize the document
    Info {
        file: PathBuf,
    },
    /// Print the node hierarchy of a scene
    Tree {
        file: PathBuf,
        /// Scene index; the document's default scene when omitted
        #[arg(long)]
        scene: Option<u32>,
    },
    /// Decode and print an accessor
    Accessor {
        file: PathBuf,
        index: u32,
        /// Maximum number of elements to print
        #[arg(long, default_value_t = 16)]
        limit: usize,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Gltf(#[from] GltfError),
}

fn run(cli: Cli) -> Result<String, CliError> {
    let mut registry = ExtensionRegistry::new();
    if cli.khr {
        glint::khr::register_all(&mut registry)?;
    }
    let importer = Importer::new().with_registry(registry);
    let mut options = ReadOptions::new();
    options.preload = cli.preload;
    options.parallel = cli.preload && cfg!(feature = "parallel");

    match cli.command {
        Command::Info { file } => {
            let import = importer.import_file(&file, &options)?;
            Ok(report::info(&import))
        }
        Command::Tree { file, scene } => {
            options.scene = scene.map(SceneIndex::from);
            let import = importer.import_file(&file, &options)?;
            Ok(report::tree(import.scene()?))
        }
        Command::Accessor { file, index, limit } => {
            let import = importer.import_file(&file, &options)?;
            Ok(report::accessor(&import, AccessorIndex::from(index), limit)?)
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(text) => {
            print!("{}", text);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
