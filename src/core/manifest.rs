//! Isebuild.toml manifest parsing and schema.
//!
//! The manifest describes a design that has already been compiled to
//! verilog and/or EDIF by an upstream HDL compiler, together with its pin
//! table. It is what the `isebuild` binary feeds to the build orchestrator.
//!
//! ```toml
//! [design]
//! device = "xc6slx9-tqg144-2"
//! verilog = "gen/top.v"
//! sources = ["rtl/*.v"]
//! include_dirs = ["rtl/include"]
//!
//! [[signal]]
//! name = "user_led"
//! pins = ["P11", "N9"]
//! iostandard = "LVCMOS33"
//!
//! [[clock]]
//! name = "clk50"
//! period = 20.0
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::builder::errors::{BuildError, Stage};
use crate::builder::lowering::LoweringTable;
use crate::core::constraint::{period_constraint, ConstraintRecord, ResourceName, SignalConstraint};
use crate::core::design::{DesignGenerator, EdifTarget, GeneratedDesign, SpecializedSynthesizer};
use crate::core::device::Device;
use crate::core::primitive::LoweringRequest;
use crate::core::source::{Language, SourceFile};
use crate::util::fs::{absolutize, glob_files, read_to_string};
use crate::util::process::{ProcessBuilder, Runner};

/// Canonical manifest file name.
pub const MANIFEST_NAME: &str = "Isebuild.toml";

/// The parsed manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub design: DesignSection,

    #[serde(default, rename = "signal")]
    pub signals: Vec<SignalEntry>,

    #[serde(default, rename = "clock")]
    pub clocks: Vec<ClockEntry>,

    /// Free-form UCF blocks appended after the pin constraints.
    #[serde(default)]
    pub platform_commands: Vec<String>,

    #[serde(default, rename = "primitive")]
    pub primitives: Vec<LoweringRequest>,

    /// External specialized synthesizer, used by the `mist` mode.
    #[serde(default)]
    pub mist: Option<MistSection>,
}

/// The `[design]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignSection {
    pub device: Device,

    /// Generated verilog for the top module.
    pub verilog: Option<PathBuf>,

    /// Generated EDIF netlist.
    pub edif: Option<PathBuf>,

    /// Glob patterns for additional HDL sources.
    #[serde(default)]
    pub sources: Vec<String>,

    /// Verilog include directories.
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
}

/// One `[[signal]]` entry of the pin table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalEntry {
    pub name: String,
    pub pins: Vec<String>,

    /// Platform resource name; defaults to the signal name.
    pub resource: Option<String>,
    #[serde(default)]
    pub index: u32,
    pub subsignal: Option<String>,

    pub iostandard: Option<String>,
    pub drive: Option<u32>,
    #[serde(default)]
    pub misc: Vec<String>,

    /// Attributes meant for other toolchains.
    #[serde(flatten)]
    pub other: BTreeMap<String, toml::Value>,
}

impl SignalEntry {
    pub fn to_constraint(&self) -> SignalConstraint {
        let mut resource = ResourceName::new(
            self.resource.clone().unwrap_or_else(|| self.name.clone()),
            self.index,
        );
        if let Some(ref sub) = self.subsignal {
            resource = resource.with_subindex(sub.clone());
        }

        let mut sc = SignalConstraint::new(self.name.clone(), self.pins.clone(), resource);
        if let Some(ref standard) = self.iostandard {
            sc = sc.with_attribute(ConstraintRecord::IoStandard(standard.clone()));
        }
        if let Some(drive) = self.drive {
            sc = sc.with_attribute(ConstraintRecord::Drive(drive));
        }
        for misc in &self.misc {
            sc = sc.with_attribute(ConstraintRecord::Misc(misc.clone()));
        }
        for (kind, value) in &self.other {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            sc = sc.with_attribute(ConstraintRecord::Other {
                kind: kind.clone(),
                value,
            });
        }
        sc
    }
}

/// A `[[clock]]` period constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockEntry {
    pub name: String,
    /// Period in nanoseconds.
    pub period: f64,
}

/// The `[mist]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistSection {
    pub program: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Manifest {
    /// Load a manifest from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        let manifest: Manifest = toml::from_str(&contents)
            .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        for signal in &self.signals {
            if signal.pins.is_empty() {
                bail!("signal `{}` has no pins", signal.name);
            }
        }
        if self.design.verilog.is_none() && self.design.edif.is_none() {
            bail!("[design] needs at least one of `verilog` or `edif`");
        }
        Ok(())
    }

    /// Platform constraint blocks: clock periods first, then free-form commands.
    pub fn platform_commands(&self) -> Vec<String> {
        self.clocks
            .iter()
            .map(|c| period_constraint(&c.name, c.period))
            .chain(self.platform_commands.iter().cloned())
            .collect()
    }
}

/// Find the manifest by walking up from `start`.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }
    bail!(
        "could not find `{}` in `{}` or any parent directory",
        MANIFEST_NAME,
        start.display()
    )
}

/// A design compiled ahead of time, described by a manifest.
///
/// Every path is absolute so the design can be rendered from inside the
/// build directory.
#[derive(Debug, Clone)]
pub struct PrecompiledDesign {
    manifest: Manifest,
    root: PathBuf,
}

impl PrecompiledDesign {
    /// `root` is the directory relative paths in the manifest are resolved against.
    pub fn new(manifest: Manifest, root: impl Into<PathBuf>) -> Self {
        PrecompiledDesign {
            manifest,
            root: root.into(),
        }
    }

    /// Load the manifest at `path`, resolving paths against its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let manifest = Manifest::load(path)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(PrecompiledDesign::new(manifest, root))
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn device(&self) -> &Device {
        &self.manifest.design.device
    }

    /// Additional sources matched by the `sources` globs, with their languages.
    pub fn extra_sources(&self) -> Result<Vec<SourceFile>> {
        let files = glob_files(&self.root, &self.manifest.design.sources)?;
        let mut sources = Vec::with_capacity(files.len());
        for file in files {
            let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
            match Language::from_extension(ext) {
                Some(language) => sources.push(SourceFile::new(file, language)),
                None => tracing::warn!("skipping `{}`: unknown HDL language", file.display()),
            }
        }
        Ok(sources)
    }

    pub fn include_dirs(&self) -> Vec<PathBuf> {
        self.manifest
            .design
            .include_dirs
            .iter()
            .map(|p| absolutize(&self.root, p))
            .collect()
    }

    /// The specialized synthesizer configured under `[mist]`, if any.
    pub fn mist<R: Runner>(&self, runner: R) -> Option<ExternalSynthesizer<R>> {
        self.manifest.mist.as_ref().map(|m| ExternalSynthesizer {
            program: m.program.clone(),
            args: m.args.clone(),
            runner,
        })
    }

    fn constraints(&self, text: String) -> GeneratedDesign {
        GeneratedDesign {
            text,
            signal_constraints: self
                .manifest
                .signals
                .iter()
                .map(SignalEntry::to_constraint)
                .collect(),
            platform_commands: self.manifest.platform_commands(),
        }
    }
}

/// Byte offset of the `endmodule` that closes `module top`.
fn top_module_end(text: &str) -> Option<usize> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    let start = text.match_indices("module top").find_map(|(i, m)| {
        let before = text[..i].chars().next_back();
        let after = text[i + m.len()..].chars().next();
        let bounded = !before.is_some_and(is_ident) && !after.is_some_and(is_ident);
        bounded.then_some(i + m.len())
    })?;
    text[start..].find("endmodule").map(|end| start + end)
}

impl DesignGenerator for PrecompiledDesign {
    fn get_verilog(&self, lowering: &LoweringTable) -> Result<GeneratedDesign> {
        let Some(ref verilog) = self.manifest.design.verilog else {
            bail!("the manifest has no `verilog` artifact");
        };
        let path = absolutize(&self.root, verilog);
        let mut text = read_to_string(&path)?;

        if !self.manifest.primitives.is_empty() {
            let items: String = self
                .manifest
                .primitives
                .iter()
                .map(|p| lowering.lower_or_generic(p).to_verilog())
                .collect();
            let Some(end) = top_module_end(&text) else {
                bail!("no complete `module top` in {}", path.display());
            };
            text.insert_str(end, &items);
        }

        Ok(self.constraints(text))
    }

    fn get_edif(&self, target: &EdifTarget) -> Result<GeneratedDesign> {
        let Some(ref edif) = self.manifest.design.edif else {
            bail!("the manifest has no `edif` artifact");
        };
        if target.device != *self.device() {
            tracing::warn!(
                "EDIF requested for {} but the manifest targets {}",
                target.device,
                self.device()
            );
        }
        let text = read_to_string(&absolutize(&self.root, edif))?;
        Ok(self.constraints(text))
    }

    fn io_signals(&self) -> Vec<String> {
        self.manifest.signals.iter().map(|s| s.name.clone()).collect()
    }
}

/// Runs an external program as the specialized synthesizer.
///
/// The program receives the configured arguments followed by the names of
/// the top-level I/O signals, and must leave the design's EDIF in place.
#[derive(Debug, Clone)]
pub struct ExternalSynthesizer<R> {
    program: PathBuf,
    args: Vec<String>,
    runner: R,
}

impl<R: Runner> SpecializedSynthesizer for ExternalSynthesizer<R> {
    fn synthesize(&self, _design: &dyn DesignGenerator, io_signals: &[String]) -> Result<()> {
        let cmd = ProcessBuilder::new(&self.program)
            .args(&self.args)
            .args(io_signals);
        tracing::info!("running `{}`", cmd.display_command());

        let code = self.runner.run(&cmd)?;
        if code != Some(0) {
            return Err(BuildError::Subprocess {
                stage: Stage::SpecializedSynthesis,
                code,
            }
            .into());
        }
        Ok(())
    }
}
