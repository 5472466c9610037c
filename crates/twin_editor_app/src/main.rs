// SPDX-License-Identifier: MIT OR Apache-2.0
//! Twin Editor - headless editing session driver
//!
//! Loads a data-center scene description into the in-memory live scene and
//! replays an editor command script against it, the same operations the
//! viewport, hierarchy and inspector panels perform interactively.
//!
//! ```text
//! twin_editor <scene.ron> [script] [--config editor.ron]
//! ```
//!
//! The script is read from stdin when no path is given. Logging goes to
//! stderr and honours `RUST_LOG`.

mod runner;
mod script;

use runner::ScriptRunner;
use std::io::Read;
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use twin_editor_core::{ConfigError, EditorConfig, MemoryScene, SceneDescription, SceneError};

/// Errors that abort the driver
#[derive(Debug, Error)]
enum AppError {
    #[error("Usage: twin_editor <scene.ron> [script] [--config editor.ron]")]
    Usage,

    #[error("Failed to load scene: {0}")]
    Scene(#[from] SceneError),

    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid log filter: {0}")]
    Logging(#[from] tracing_subscriber::filter::ParseError),
}

#[derive(Debug, Default, PartialEq)]
struct Args {
    scene: PathBuf,
    script: Option<PathBuf>,
    config: Option<PathBuf>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, AppError> {
        let mut positional = Vec::new();
        let mut config = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--config" {
                config = Some(PathBuf::from(args.next().ok_or(AppError::Usage)?));
            } else {
                positional.push(PathBuf::from(arg));
            }
        }

        let mut positional = positional.into_iter();
        let scene = positional.next().ok_or(AppError::Usage)?;
        let script = positional.next();
        if positional.next().is_some() {
            return Err(AppError::Usage);
        }
        Ok(Self { scene, script, config })
    }
}

fn init_logging() -> Result<(), AppError> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("twin_editor_core=debug".parse()?)
        .add_directive("twin_editor_app=debug".parse()?);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let description = SceneDescription::load(&args.scene)?;
    let scene = MemoryScene::from_description(&description)?;
    tracing::info!("Loaded {} ({} nodes)", args.scene.display(), scene.len());

    let script = match &args.script {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let mut runner = ScriptRunner::new(config, scene);
    for output in runner.run_script(&script) {
        println!("{output}");
    }
    Ok(())
}

fn main() {
    if let Err(e) = init_logging() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    tracing::info!("Starting Twin Editor v{}", env!("CARGO_PKG_VERSION"));

    let result = Args::parse(std::env::args().skip(1)).and_then(run);
    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Args, AppError> {
        Args::parse(list.iter().map(ToString::to_string))
    }

    #[test]
    fn test_parse_args() {
        let parsed = args(&["hall.ron", "--config", "editor.ron", "edit.txt"]).unwrap();
        assert_eq!(
            parsed,
            Args {
                scene: PathBuf::from("hall.ron"),
                script: Some(PathBuf::from("edit.txt")),
                config: Some(PathBuf::from("editor.ron")),
            }
        );
        assert_eq!(args(&["hall.ron"]).unwrap().script, None);
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(args(&[]), Err(AppError::Usage)));
        assert!(matches!(args(&["hall.ron", "--config"]), Err(AppError::Usage)));
        assert!(matches!(args(&["a", "b", "c"]), Err(AppError::Usage)));
    }
}
