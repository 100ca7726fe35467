//! UCF constraint file generation.
//!
//! Attribute kinds without a UCF clause (`ConstraintRecord::Other`) are
//! ignored, not rejected: platform tables are shared between vendors and
//! carry records meant for other toolchains.

use crate::core::constraint::{ConstraintRecord, ResourceName, SignalConstraint};

/// Render one attribute as a UCF clause, if it has one.
pub fn format_constraint(record: &ConstraintRecord) -> Option<String> {
    match record {
        ConstraintRecord::Location(pin) => Some(format!("LOC={}", pin)),
        ConstraintRecord::IoStandard(name) => Some(format!("IOSTANDARD={}", name)),
        ConstraintRecord::Drive(strength) => Some(format!("DRIVE={}", strength)),
        ConstraintRecord::Misc(text) => Some(text.clone()),
        ConstraintRecord::Other { kind, .. } => {
            tracing::debug!("no UCF clause for `{}` attribute, skipping", kind);
            None
        }
    }
}

/// Render the `NET` line binding `signal` to `pin`.
///
/// The location clause always comes first, so the clause list is never empty.
pub fn format_ucf(
    signal: &str,
    pin: &str,
    attributes: &[ConstraintRecord],
    resource: &ResourceName,
) -> String {
    let mut clauses = vec![format!("LOC={}", pin)];
    clauses.extend(attributes.iter().filter_map(format_constraint));

    format!(
        "NET \"{}\" {}; # {}\n",
        signal,
        clauses.join(" | "),
        resource
    )
}

/// Build a complete UCF document.
///
/// Vector signals get one line per bit, named `<signal>(<i>)`. Platform
/// commands follow after a blank line, separated from each other by blank
/// lines.
pub fn build_ucf(signals: &[SignalConstraint], platform_commands: &[String]) -> String {
    let mut out = String::new();

    for sc in signals {
        if sc.is_vector() {
            for (i, pin) in sc.pins.iter().enumerate() {
                let name = format!("{}({})", sc.signal, i);
                out.push_str(&format_ucf(&name, pin, &sc.attributes, &sc.resource));
            }
        } else if let Some(pin) = sc.pins.first() {
            out.push_str(&format_ucf(&sc.signal, pin, &sc.attributes, &sc.resource));
        }
    }

    if !platform_commands.is_empty() {
        out.push('\n');
        out.push_str(&platform_commands.join("\n\n"));
    }

    out
}
