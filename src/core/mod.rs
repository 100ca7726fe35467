//! Core data structures for isebuild.
//!
//! - Constraint records and signal pin tables
//! - HDL source files and device identifiers
//! - Synchronization primitives and their lowered fragments
//! - The design compiler interface and the Isebuild.toml manifest

pub mod constraint;
pub mod design;
pub mod device;
pub mod manifest;
pub mod primitive;
pub mod source;

pub use constraint::{ConstraintRecord, ResourceName, SignalConstraint};
pub use design::{DesignGenerator, EdifTarget, GeneratedDesign, SpecializedSynthesizer};
pub use device::Device;
pub use manifest::{find_manifest, Manifest, PrecompiledDesign, MANIFEST_NAME};
pub use primitive::{DesignFragment, LoweringRequest, PrimitiveKind};
pub use source::{Language, SourceFile};
