//! Pin and electrical constraint records.
//!
//! These are produced upstream by the design compiler from the platform's
//! I/O table and consumed here only to be rendered into UCF.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One electrical or placement attribute attached to a signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintRecord {
    /// Physical pin location.
    Location(String),
    /// I/O standard name, e.g. `LVCMOS33`.
    IoStandard(String),
    /// Output drive strength in mA.
    Drive(u32),
    /// Free-form clause copied verbatim, e.g. `PULLUP`.
    Misc(String),
    /// An attribute kind this toolchain has no clause for.
    ///
    /// Records of this kind are carried through and ignored when rendering.
    Other { kind: String, value: String },
}

/// The platform resource a signal was requested from: `(name, index, subsignal)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceName {
    pub kind: String,
    pub index: u32,
    pub subindex: Option<String>,
}

impl ResourceName {
    pub fn new(kind: impl Into<String>, index: u32) -> Self {
        ResourceName {
            kind: kind.into(),
            index,
            subindex: None,
        }
    }

    pub fn with_subindex(mut self, subindex: impl Into<String>) -> Self {
        self.subindex = Some(subindex.into());
        self
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.index)?;
        if let Some(ref sub) = self.subindex {
            write!(f, ".{}", sub)?;
        }
        Ok(())
    }
}

/// Constraints for one top-level I/O signal.
///
/// `pins` holds one entry per bit; more than one pin makes this a vector
/// signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalConstraint {
    pub signal: String,
    pub pins: Vec<String>,
    pub attributes: Vec<ConstraintRecord>,
    pub resource: ResourceName,
}

impl SignalConstraint {
    pub fn new(signal: impl Into<String>, pins: Vec<String>, resource: ResourceName) -> Self {
        SignalConstraint {
            signal: signal.into(),
            pins,
            attributes: Vec::new(),
            resource,
        }
    }

    pub fn with_attribute(mut self, attribute: ConstraintRecord) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn is_vector(&self) -> bool {
        self.pins.len() > 1
    }
}

/// Build the platform command that constrains `clk` to a period in nanoseconds.
pub fn period_constraint(clk: &str, period_ns: f64) -> String {
    format!(
        "NET \"{clk}\" TNM_NET = \"GRP{clk}\";\n\
         TIMESPEC \"TS{clk}\" = PERIOD \"GRP{clk}\" {period_ns} ns HIGH 50%;"
    )
}
