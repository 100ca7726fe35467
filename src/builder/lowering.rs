//! Platform substitutions for synchronization primitives.
//!
//! The table maps each [`PrimitiveKind`] to a lowering function. It is built
//! once per build and handed to the design compiler; callers replace or add
//! entries with [`LoweringTable::with`] or [`LoweringTable::merge`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::primitive::{DesignFragment, LoweringRequest, PrimitiveKind, SynthesisDirective};

/// A lowering implementation.
pub type LowerFn = Arc<dyn Fn(&LoweringRequest) -> DesignFragment + Send + Sync>;

/// Registry of primitive lowerings.
#[derive(Clone, Default)]
pub struct LoweringTable {
    entries: HashMap<PrimitiveKind, LowerFn>,
}

impl LoweringTable {
    /// A table with no entries; every primitive falls back to the design
    /// compiler's generic lowering.
    pub fn empty() -> Self {
        LoweringTable::default()
    }

    /// The Xilinx substitutions.
    pub fn xilinx() -> Self {
        LoweringTable::empty()
            .with(PrimitiveKind::NoRetiming, Arc::new(xilinx_no_retiming))
            .with(PrimitiveKind::MultiReg, Arc::new(xilinx_multireg))
    }

    /// Set the lowering for `kind`, replacing any existing one.
    pub fn with(mut self, kind: PrimitiveKind, f: LowerFn) -> Self {
        self.entries.insert(kind, f);
        self
    }

    /// Take every entry of `overrides`, replacing existing ones.
    pub fn merge(&mut self, overrides: LoweringTable) {
        self.entries.extend(overrides.entries);
    }

    pub fn get(&self, kind: PrimitiveKind) -> Option<&LowerFn> {
        self.entries.get(&kind)
    }

    /// Lower `request` through its table entry, if there is one.
    pub fn lower(&self, request: &LoweringRequest) -> Option<DesignFragment> {
        self.get(request.kind()).map(|f| f(request))
    }

    /// Lower `request`, using the target-independent implementation when the
    /// table has no entry for it.
    pub fn lower_or_generic(&self, request: &LoweringRequest) -> DesignFragment {
        self.lower(request)
            .unwrap_or_else(|| generic_lowering(request))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for LoweringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.entries.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("LoweringTable").field("entries", &kinds).finish()
    }
}

/// Target-independent lowering.
pub fn generic_lowering(request: &LoweringRequest) -> DesignFragment {
    match request {
        // Nothing to do without a retiming-aware synthesizer.
        LoweringRequest::NoRetiming { .. } => DesignFragment::default(),
        LoweringRequest::MultiReg {
            input,
            output,
            odomain,
            stages,
            width,
        } => DesignFragment::multireg(input, output, odomain, *stages, *width),
    }
}

/// Exclude the register from XST register balancing.
fn xilinx_no_retiming(request: &LoweringRequest) -> DesignFragment {
    match request {
        LoweringRequest::NoRetiming { reg } => DesignFragment::directives_only(vec![
            SynthesisDirective::attribute("register_balancing", reg, "no"),
        ]),
        other => generic_lowering(other),
    }
}

/// Generic crossing register, with shift-register extraction disabled on
/// every stage so XST keeps the flip-flops.
fn xilinx_multireg(request: &LoweringRequest) -> DesignFragment {
    let mut fragment = generic_lowering(request);
    let directives: Vec<_> = fragment
        .registers
        .iter()
        .map(|r| SynthesisDirective::attribute("shreg_extract", &r.name, "no"))
        .collect();
    fragment.directives.extend(directives);
    fragment
}
