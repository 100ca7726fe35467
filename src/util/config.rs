//! Configuration file support for isebuild.
//!
//! Two configuration file locations are consulted:
//! - Global: `~/.isebuild/config.toml` - User-wide defaults (toolchain location)
//! - Project: `.isebuild/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::mode::SynthesisMode;
use crate::builder::script::ToolOptions;
use crate::builder::BuildError;

/// isebuild configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Toolchain location settings
    pub toolchain: ToolchainSettings,

    /// Build settings
    pub build: BuildConfig,

    /// Per-stage option strings for the ISE tools
    pub options: StageOptionsConfig,
}

/// Where the ISE toolchain lives and how to enter its environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// ISE installation root containing one directory per version (e.g. /opt/Xilinx)
    pub ise_path: Option<PathBuf>,

    /// Source the ISE `settings*.sh` script before running the tools
    pub source: Option<bool>,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Build directory (default: build)
    pub build_dir: Option<PathBuf>,

    /// Base name of generated files (default: top)
    pub build_name: Option<String>,

    /// Synthesis mode (xst, yosys, edif, mist)
    pub mode: Option<String>,

    /// Run the toolchain after generating files
    pub run: Option<bool>,
}

/// Option strings passed verbatim to the individual tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StageOptionsConfig {
    pub xst: Option<String>,
    pub ngdbuild: Option<String>,
    pub map: Option<String>,
    pub par: Option<String>,
    pub bitgen: Option<String>,
    /// Commands appended to the control script; `{build_name}` is substituted
    pub commands: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.toolchain.ise_path.is_some() {
            self.toolchain.ise_path = other.toolchain.ise_path;
        }
        if other.toolchain.source.is_some() {
            self.toolchain.source = other.toolchain.source;
        }

        if other.build.build_dir.is_some() {
            self.build.build_dir = other.build.build_dir;
        }
        if other.build.build_name.is_some() {
            self.build.build_name = other.build.build_name;
        }
        if other.build.mode.is_some() {
            self.build.mode = other.build.mode;
        }
        if other.build.run.is_some() {
            self.build.run = other.build.run;
        }

        let opts = other.options;
        merge_opt(&mut self.options.xst, opts.xst);
        merge_opt(&mut self.options.ngdbuild, opts.ngdbuild);
        merge_opt(&mut self.options.map, opts.map);
        merge_opt(&mut self.options.par, opts.par);
        merge_opt(&mut self.options.bitgen, opts.bitgen);
        merge_opt(&mut self.options.commands, opts.commands);
    }

    /// Parse the configured synthesis mode.
    ///
    /// Unlike other settings, an invalid mode is an error rather than being
    /// ignored.
    pub fn mode(&self) -> Result<Option<SynthesisMode>, BuildError> {
        self.build.mode.as_deref().map(str::parse).transpose()
    }

    /// Tool option strings, with unset stages at their defaults.
    pub fn tool_options(&self) -> ToolOptions {
        let mut opts = ToolOptions::default();
        let cfg = &self.options;
        for (slot, value) in [
            (&mut opts.xst, &cfg.xst),
            (&mut opts.ngdbuild, &cfg.ngdbuild),
            (&mut opts.map, &cfg.map),
            (&mut opts.par, &cfg.par),
            (&mut opts.bitgen, &cfg.bitgen),
            (&mut opts.commands, &cfg.commands),
        ] {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }
        opts
    }
}

fn merge_opt(slot: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.isebuild/config.toml)
/// 2. Global config (~/.isebuild/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Get the global isebuild config directory (~/.isebuild).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".isebuild"))
}

/// Get the global config path (~/.isebuild/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.isebuild/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".isebuild").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.toolchain.ise_path.is_none());
        assert!(config.build.mode.is_none());
        assert!(config.options.xst.is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[toolchain]
ise_path = "/opt/Xilinx"
source = false

[build]
mode = "yosys"
build_name = "soc"

[options]
bitgen = "-g Binary:Yes"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.toolchain.ise_path, Some(PathBuf::from("/opt/Xilinx")));
        assert_eq!(config.toolchain.source, Some(false));
        assert_eq!(config.build.build_name, Some("soc".to_string()));
        assert_eq!(config.options.bitgen, Some("-g Binary:Yes".to_string()));
        assert_eq!(config.mode().unwrap(), Some(SynthesisMode::Yosys));
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.toolchain.ise_path = Some(PathBuf::from("/opt/Xilinx"));
        base.build.mode = Some("xst".to_string());

        let mut override_cfg = Config::default();
        override_cfg.build.mode = Some("edif".to_string());
        override_cfg.options.map = Some("-ol std".to_string());

        base.merge(override_cfg);

        assert_eq!(base.build.mode, Some("edif".to_string()));
        assert_eq!(base.options.map, Some("-ol std".to_string()));
        assert_eq!(base.toolchain.ise_path, Some(PathBuf::from("/opt/Xilinx"))); // Not overridden
    }

    #[test]
    fn test_tool_options_keep_defaults() {
        let mut config = Config::default();
        config.options.bitgen = Some("-g Binary:Yes".to_string());
        config.options.commands = Some("cp {build_name}.bit /srv/tftp\n".to_string());

        let opts = config.tool_options();
        assert_eq!(opts.bitgen, "-g Binary:Yes");
        assert_eq!(opts.commands, "cp {build_name}.bit /srv/tftp\n");
        assert_eq!(opts.map, ToolOptions::default().map);
        assert_eq!(opts.xst, ToolOptions::default().xst);
    }

    #[test]
    fn test_config_invalid_mode() {
        let mut config = Config::default();
        config.build.mode = Some("vivado".to_string());

        let err = config.mode().unwrap_err();
        assert!(matches!(err, BuildError::InvalidMode(ref m) if m == "vivado"));
    }

    #[test]
    fn test_load_config_project_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.toml");
        let project = tmp.path().join("project.toml");
        std::fs::write(&global, "[build]\nbuild_dir = \"out\"\nrun = false\n").unwrap();
        std::fs::write(&project, "[build]\nrun = true\n").unwrap();

        let config = load_config(&global, &project);
        assert_eq!(config.build.build_dir, Some(PathBuf::from("out")));
        assert_eq!(config.build.run, Some(true));
    }
}
