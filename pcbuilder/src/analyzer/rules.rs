use crate::model::{Component, ComponentKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Headroom added on top of CPU and GPU draw for the rest of the system.
pub const AUXILIARY_POWER_WATTS: u32 = 100;

/// Minimum spare capacity a power supply should have over the requirement.
pub const RECOMMENDED_POWER_MARGIN_WATTS: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Error => "❌",
            Severity::Warning => "⚠️",
            Severity::Info => "ℹ️",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of the finding an issue reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleId {
    SocketMismatch,
    MemoryMismatch,
    FormFactorMismatch,
    NoPsu,
    InsufficientPower,
    LowPowerMargin,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::SocketMismatch => "SOCKET_MISMATCH",
            RuleId::MemoryMismatch => "MEMORY_MISMATCH",
            RuleId::FormFactorMismatch => "FORM_FACTOR_MISMATCH",
            RuleId::NoPsu => "NO_PSU",
            RuleId::InsufficientPower => "INSUFFICIENT_POWER",
            RuleId::LowPowerMargin => "LOW_POWER_MARGIN",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            RuleId::LowPowerMargin => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    pub rule_id: RuleId,
    pub severity: Severity,
    pub message: String,
    /// Names of the components involved.
    pub components: Vec<String>,
    pub suggestion: Option<String>,
}

impl Issue {
    fn new(rule_id: RuleId, message: String) -> Self {
        Self {
            rule_id,
            severity: rule_id.severity(),
            message,
            components: Vec::new(),
            suggestion: None,
        }
    }

    fn involving(mut self, components: &[&Component]) -> Self {
        self.components = components.iter().map(|c| c.name.clone()).collect();
        self
    }

    fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity.icon(),
            self.severity,
            self.rule_id,
            self.message
        )
    }
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn check(&self, components: &[Component]) -> Vec<Issue>;
}

/// Runs the fixed compatibility rule set: socket, memory, form factor, power.
pub struct RulesEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(SocketRule),
                Box::new(MemoryRule),
                Box::new(FormFactorRule),
                Box::new(PowerSupplyRule),
            ],
        }
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|rule| rule.as_ref())
    }

    pub fn analyze(&self, components: &[Component]) -> Vec<Issue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            let found = rule.check(components);
            tracing::debug!(rule = rule.id(), issues = found.len(), "rule evaluated");
            issues.extend(found);
        }
        issues
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

// Helper functions

/// First component of the given kind; later ones of the same kind are ignored.
pub fn find_first<'a>(components: &'a [Component], kind: &ComponentKind) -> Option<&'a Component> {
    components.iter().find(|c| &c.kind == kind)
}

/// Both values present and different. Missing data is not an opinion.
fn differs(a: Option<&str>, b: Option<&str>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a != b)
}

/// Watts needed by processors and video cards plus auxiliary headroom.
pub fn required_power_watts(components: &[Component]) -> u32 {
    let load: u32 = components
        .iter()
        .filter(|c| matches!(c.kind, ComponentKind::Processor | ComponentKind::VideoCard))
        .filter_map(|c| c.power_watts)
        .fold(0u32, |acc, watts| acc.saturating_add(watts));
    load.saturating_add(AUXILIARY_POWER_WATTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFactor {
    Atx,
    ExtendedAtx,
    MicroAtx,
    MiniItx,
}

impl FormFactor {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ATX" => Some(FormFactor::Atx),
            "Extended-ATX" | "E-ATX" | "EATX" => Some(FormFactor::ExtendedAtx),
            "Micro-ATX" => Some(FormFactor::MicroAtx),
            "Mini-ITX" => Some(FormFactor::MiniItx),
            _ => None,
        }
    }

    /// Chassis form factors a motherboard of this size mounts in.
    fn fits(&self) -> &'static [FormFactor] {
        match self {
            FormFactor::Atx => &[FormFactor::Atx, FormFactor::ExtendedAtx],
            FormFactor::MicroAtx => &[FormFactor::Atx, FormFactor::MicroAtx],
            FormFactor::MiniItx => &[FormFactor::Atx, FormFactor::MicroAtx, FormFactor::MiniItx],
            FormFactor::ExtendedAtx => &[],
        }
    }
}

/// Whether a motherboard of `motherboard` size fits a `chassis` case.
/// Unknown motherboard sizes and missing values are treated as compatible.
pub fn form_factor_fits(motherboard: Option<&str>, chassis: Option<&str>) -> bool {
    let (Some(motherboard), Some(chassis)) = (motherboard, chassis) else {
        return true;
    };
    let board = match FormFactor::parse(motherboard) {
        Some(FormFactor::ExtendedAtx) | None => return true,
        Some(board) => board,
    };
    FormFactor::parse(chassis).is_some_and(|case| board.fits().contains(&case))
}

fn label(value: Option<&str>) -> &str {
    value.unwrap_or("unknown")
}

// Rule implementations

pub struct SocketRule;

impl Rule for SocketRule {
    fn id(&self) -> &str {
        "socket"
    }

    fn name(&self) -> &str {
        "CPU Socket Check"
    }

    fn description(&self) -> &str {
        "Processor socket must match the motherboard socket"
    }

    fn check(&self, components: &[Component]) -> Vec<Issue> {
        let cpu = find_first(components, &ComponentKind::Processor);
        let board = find_first(components, &ComponentKind::Motherboard);
        let (Some(cpu), Some(board)) = (cpu, board) else {
            return Vec::new();
        };

        if !differs(cpu.socket.as_deref(), board.socket.as_deref()) {
            return Vec::new();
        }

        vec![Issue::new(
            RuleId::SocketMismatch,
            format!(
                "Socket mismatch: processor {} (socket {}) does not fit motherboard {} (socket {})",
                cpu.name,
                label(cpu.socket.as_deref()),
                board.name,
                label(board.socket.as_deref())
            ),
        )
        .involving(&[cpu, board])
        .suggest("Choose a processor and motherboard with the same socket")]
    }
}

pub struct MemoryRule;

impl Rule for MemoryRule {
    fn id(&self) -> &str {
        "memory"
    }

    fn name(&self) -> &str {
        "Memory Type Check"
    }

    fn description(&self) -> &str {
        "Memory technology must be supported by the motherboard"
    }

    fn check(&self, components: &[Component]) -> Vec<Issue> {
        let memory = find_first(components, &ComponentKind::Memory);
        let board = find_first(components, &ComponentKind::Motherboard);
        let (Some(memory), Some(board)) = (memory, board) else {
            return Vec::new();
        };

        if !differs(memory.memory_type.as_deref(), board.memory_type.as_deref()) {
            return Vec::new();
        }

        vec![Issue::new(
            RuleId::MemoryMismatch,
            format!(
                "Memory mismatch: memory {} ({}) is not supported by motherboard {} ({})",
                memory.name,
                label(memory.memory_type.as_deref()),
                board.name,
                label(board.memory_type.as_deref())
            ),
        )
        .involving(&[memory, board])
        .suggest(format!(
            "Use {} memory modules",
            label(board.memory_type.as_deref())
        ))]
    }
}

pub struct FormFactorRule;

impl Rule for FormFactorRule {
    fn id(&self) -> &str {
        "form_factor"
    }

    fn name(&self) -> &str {
        "Form Factor Check"
    }

    fn description(&self) -> &str {
        "Motherboard must mount in the chassis (ATX, Micro-ATX, Mini-ITX, Extended-ATX)"
    }

    fn check(&self, components: &[Component]) -> Vec<Issue> {
        let board = find_first(components, &ComponentKind::Motherboard);
        let chassis = find_first(components, &ComponentKind::Chassis);
        let (Some(board), Some(chassis)) = (board, chassis) else {
            return Vec::new();
        };

        if form_factor_fits(board.form_factor.as_deref(), chassis.form_factor.as_deref()) {
            return Vec::new();
        }

        vec![Issue::new(
            RuleId::FormFactorMismatch,
            format!(
                "Form factor mismatch: motherboard {} ({}) does not fit chassis {} ({})",
                board.name,
                label(board.form_factor.as_deref()),
                chassis.name,
                label(chassis.form_factor.as_deref())
            ),
        )
        .involving(&[board, chassis])
        .suggest("Pick a chassis at least as large as the motherboard form factor")]
    }
}

pub struct PowerSupplyRule;

impl Rule for PowerSupplyRule {
    fn id(&self) -> &str {
        "power"
    }

    fn name(&self) -> &str {
        "Power Supply Check"
    }

    fn description(&self) -> &str {
        "Power supply must cover CPU and GPU draw plus 100W, ideally with 100W to spare"
    }

    fn check(&self, components: &[Component]) -> Vec<Issue> {
        let Some(psu) = find_first(components, &ComponentKind::PowerSupply) else {
            return vec![Issue::new(
                RuleId::NoPsu,
                "No power supply in the configuration".to_string(),
            )
            .suggest("Add a power supply")];
        };

        let required = required_power_watts(components);
        let available = psu.power_watts.unwrap_or(0);

        if available < required {
            return vec![Issue::new(
                RuleId::InsufficientPower,
                format!(
                    "Insufficient power: {}W required, power supply {} provides {}W",
                    required, psu.name, available
                ),
            )
            .involving(&[psu])
            .suggest(format!(
                "Use a power supply rated at least {}W",
                required.saturating_add(RECOMMENDED_POWER_MARGIN_WATTS)
            ))];
        }

        let margin = available - required;
        if margin < RECOMMENDED_POWER_MARGIN_WATTS {
            return vec![Issue::new(
                RuleId::LowPowerMargin,
                format!(
                    "Low power margin: {}W recommended, current margin is {}W",
                    RECOMMENDED_POWER_MARGIN_WATTS, margin
                ),
            )
            .involving(&[psu])];
        }

        Vec::new()
    }
}
