//! Catalog and configuration data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Invalid catalog data or an unrecognized stored value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("component name must not be empty")]
    EmptyName,
    #[error("component type must not be empty")]
    EmptyKind,
    #[error("component price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("component id is required")]
    MissingId,
    #[error("unknown compatibility status '{0}'")]
    UnknownStatus(String),
}

/// Component category. Known kinds drive the compatibility rules; anything
/// else is kept verbatim as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ComponentKind {
    Processor,
    Motherboard,
    Memory,
    VideoCard,
    PowerSupply,
    Chassis,
    Other(String),
}

impl ComponentKind {
    /// Kinds with a fixed meaning, in catalog display order.
    pub const KNOWN: [ComponentKind; 6] = [
        ComponentKind::Processor,
        ComponentKind::Motherboard,
        ComponentKind::Memory,
        ComponentKind::VideoCard,
        ComponentKind::PowerSupply,
        ComponentKind::Chassis,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Processor => "Processor",
            ComponentKind::Motherboard => "Motherboard",
            ComponentKind::Memory => "Memory",
            ComponentKind::VideoCard => "Video Card",
            ComponentKind::PowerSupply => "Power Supply",
            ComponentKind::Chassis => "Chassis",
            ComponentKind::Other(name) => name,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().trim().is_empty()
    }
}

impl From<&str> for ComponentKind {
    fn from(value: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value.trim()))
            .cloned()
            .unwrap_or_else(|| ComponentKind::Other(value.to_string()))
    }
}

impl From<String> for ComponentKind {
    fn from(value: String) -> Self {
        ComponentKind::from(value.as_str())
    }
}

impl From<ComponentKind> for String {
    fn from(kind: ComponentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A catalogued PC part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Assigned by the store; `None` until the component is persisted.
    pub id: Option<i64>,
    pub name: String,
    pub kind: ComponentKind,
    pub price: f64,
    /// Units in stock.
    pub quantity: u32,
    pub specifications: Option<String>,
    pub socket: Option<String>,
    pub memory_type: Option<String>,
    pub form_factor: Option<String>,
    /// Power draw for consumers, rated output for a power supply.
    pub power_watts: Option<u32>,
    pub max_memory_gb: Option<u32>,
}

impl Component {
    pub fn new(name: impl Into<String>, kind: ComponentKind, price: f64) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            price,
            quantity: 0,
            specifications: None,
            socket: None,
            memory_type: None,
            form_factor: None,
            power_watts: None,
            max_memory_gb: None,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_specifications(mut self, specifications: impl Into<String>) -> Self {
        self.specifications = Some(specifications.into());
        self
    }

    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = Some(socket.into());
        self
    }

    pub fn with_memory_type(mut self, memory_type: impl Into<String>) -> Self {
        self.memory_type = Some(memory_type.into());
        self
    }

    pub fn with_form_factor(mut self, form_factor: impl Into<String>) -> Self {
        self.form_factor = Some(form_factor.into());
        self
    }

    pub fn with_power_watts(mut self, watts: u32) -> Self {
        self.power_watts = Some(watts);
        self
    }

    pub fn with_max_memory_gb(mut self, gigabytes: u32) -> Self {
        self.max_memory_gb = Some(gigabytes);
        self
    }

    /// Checks the catalog invariants, returning the first violation.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        if self.kind.is_empty() {
            return Err(ModelError::EmptyKind);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(ModelError::InvalidPrice(self.price));
        }
        Ok(())
    }
}

/// Result of the last compatibility check recorded for a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityStatus {
    #[default]
    Unchecked,
    Compatible,
    Incompatible,
}

impl CompatibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityStatus::Unchecked => "UNCHECKED",
            CompatibilityStatus::Compatible => "COMPATIBLE",
            CompatibilityStatus::Incompatible => "INCOMPATIBLE",
        }
    }
}

impl FromStr for CompatibilityStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNCHECKED" => Ok(CompatibilityStatus::Unchecked),
            "COMPATIBLE" => Ok(CompatibilityStatus::Compatible),
            "INCOMPATIBLE" => Ok(CompatibilityStatus::Incompatible),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for CompatibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A named bundle of components representing one buildable PC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: Option<i64>,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub status: CompatibilityStatus,
    /// Price total written to the store when the configuration was assembled.
    /// Member prices may have changed since; see [`Configuration::total_price`].
    pub recorded_total: Option<f64>,
    pub components: Vec<Component>,
}

impl Configuration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            created_at: Utc::now(),
            status: CompatibilityStatus::Unchecked,
            recorded_total: None,
            components: Vec::new(),
        }
    }

    /// Sum of the current member prices.
    pub fn total_price(&self) -> f64 {
        self.components.iter().map(|c| c.price).sum()
    }

    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
    }

    /// Removes the first member with the given id.
    pub fn remove_component(&mut self, component_id: i64) -> Option<Component> {
        let index = self
            .components
            .iter()
            .position(|c| c.id == Some(component_id))?;
        Some(self.components.remove(index))
    }

    pub fn component_ids(&self) -> Vec<i64> {
        self.components.iter().filter_map(|c| c.id).collect()
    }
}
