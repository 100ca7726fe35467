//! Command implementations

pub mod build;
pub mod completions;
pub mod toolchain;

use std::path::{Path, PathBuf};

use isebuild::core::manifest::find_manifest;
use isebuild::util::config::{global_config_path, load_config, project_config_path};
use isebuild::util::fs::absolutize;
use isebuild::util::Config;

/// Global and project configuration for the project rooted at `project_root`.
pub fn config_for(project_root: &Path) -> Config {
    let global = global_config_path().unwrap_or_default();
    load_config(&global, &project_config_path(project_root))
}

/// Directory of the nearest manifest above `cwd`, or `cwd` outside a project.
pub fn project_root(cwd: &Path) -> PathBuf {
    find_manifest(cwd)
        .ok()
        .and_then(|manifest| manifest.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| cwd.to_path_buf())
}

/// ISE root: command line, then configuration, then the default location.
///
/// A command-line path is relative to `cwd`, a configured one to
/// `project_root`.
pub fn ise_path(
    cli: Option<PathBuf>,
    config: &Config,
    cwd: &Path,
    project_root: &Path,
) -> PathBuf {
    match (cli, config.toolchain.ise_path.as_deref()) {
        (Some(path), _) => absolutize(cwd, &path),
        (None, Some(path)) => absolutize(project_root, path),
        (None, None) => PathBuf::from(isebuild::ops::ise_build::DEFAULT_ISE_PATH),
    }
}
