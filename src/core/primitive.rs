//! Generic synchronization primitives and the fragments they lower to.
//!
//! A design may contain primitives whose implementation depends on the
//! target: a register that must not be retimed, and a multi-stage register
//! chain that carries a signal into another clock domain. Before code
//! generation each one is replaced by a [`DesignFragment`], optionally with
//! synthesis directives attached.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// Number of stages in a crossing register when none is given.
pub const DEFAULT_MULTIREG_STAGES: usize = 2;

/// Kinds of primitive that can be substituted per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    /// A register excluded from register balancing.
    NoRetiming,
    /// A chain of registers synchronizing a signal into another domain.
    MultiReg,
}

impl PrimitiveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::NoRetiming => "no_retiming",
            PrimitiveKind::MultiReg => "multi_reg",
        }
    }
}

/// A primitive occurrence submitted for lowering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoweringRequest {
    NoRetiming {
        reg: String,
    },
    MultiReg {
        input: String,
        output: String,
        odomain: String,
        #[serde(default = "default_stages")]
        stages: usize,
        #[serde(default = "default_width")]
        width: u32,
    },
}

fn default_stages() -> usize {
    DEFAULT_MULTIREG_STAGES
}

fn default_width() -> u32 {
    1
}

impl LoweringRequest {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            LoweringRequest::NoRetiming { .. } => PrimitiveKind::NoRetiming,
            LoweringRequest::MultiReg { .. } => PrimitiveKind::MultiReg,
        }
    }
}

/// A synthesis directive, rendered as a `// synthesis ...` comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisDirective(pub String);

impl SynthesisDirective {
    /// `attribute <name> of <signal> is <value>`
    pub fn attribute(name: &str, signal: &str, value: &str) -> Self {
        SynthesisDirective(format!("attribute {name} of {signal} is {value}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A register introduced by a lowering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    pub name: String,
    pub width: u32,
    /// Clock domain; the clock net is `<domain>_clk`.
    pub domain: String,
    /// Expression loaded on every clock edge.
    pub next: String,
}

/// The replacement for one primitive: new registers, continuous assignments
/// and directives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignFragment {
    pub registers: Vec<Register>,
    /// `(target, expression)` pairs.
    pub assigns: Vec<(String, String)>,
    pub directives: Vec<SynthesisDirective>,
}

impl DesignFragment {
    /// A fragment that only carries directives about existing signals.
    pub fn directives_only(directives: Vec<SynthesisDirective>) -> Self {
        DesignFragment {
            directives,
            ..Default::default()
        }
    }

    /// Target-independent crossing register: `stages` registers named
    /// `<output>_mr<i>` in `odomain`, each loading its predecessor, the last
    /// one driving `output`.
    pub fn multireg(input: &str, output: &str, odomain: &str, stages: usize, width: u32) -> Self {
        let stages = stages.max(1);
        let mut registers = Vec::with_capacity(stages);
        let mut prev = input.to_string();
        for i in 0..stages {
            let name = format!("{output}_mr{i}");
            registers.push(Register {
                name: name.clone(),
                width,
                domain: odomain.to_string(),
                next: prev,
            });
            prev = name;
        }

        DesignFragment {
            registers,
            assigns: vec![(output.to_string(), prev)],
            directives: Vec::new(),
        }
    }

    /// Render as verilog module items.
    pub fn to_verilog(&self) -> String {
        let mut out = String::new();

        for reg in &self.registers {
            if reg.width > 1 {
                let _ = writeln!(out, "reg [{}:0] {};", reg.width - 1, reg.name);
            } else {
                let _ = writeln!(out, "reg {};", reg.name);
            }
        }

        // One always block per domain, in first-use order.
        let mut domains: Vec<&str> = Vec::new();
        for reg in &self.registers {
            if !domains.contains(&reg.domain.as_str()) {
                domains.push(&reg.domain);
            }
        }
        for domain in domains {
            let _ = writeln!(out, "always @(posedge {domain}_clk) begin");
            for reg in self.registers.iter().filter(|r| r.domain == domain) {
                let _ = writeln!(out, "\t{} <= {};", reg.name, reg.next);
            }
            out.push_str("end\n");
        }

        for (target, expr) in &self.assigns {
            let _ = writeln!(out, "assign {target} = {expr};");
        }

        for directive in &self.directives {
            let _ = writeln!(out, "// synthesis {}", directive.as_str());
        }

        out
    }
}
