//! Resource database boundary.
//!
//! The engine never owns the resource database; the host game supplies one.
//! [`ResourceLibrary`] is the seam: given a resource name it yields the
//! per-unit physical properties the accounting formulas need, including the
//! fallback amounts used to give zero-mass/zero-cost resources sensible
//! aggregate mass and cost. [`MemoryResourceLibrary`] is a plain in-memory
//! implementation for hosts that load their resource table from config, and
//! for tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-unit physical properties of one resource.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceProperties {
    /// Volume occupied by one unit.
    pub unit_volume: f64,
    /// Mass of one unit (density).
    pub unit_mass: f64,
    /// Cost of one unit.
    pub unit_cost: f64,
    /// Substitute mass per unit for resources whose unit mass is zero.
    #[serde(default)]
    pub zero_mass_fallback: f64,
    /// Substitute cost per unit for resources whose unit cost is zero.
    #[serde(default)]
    pub zero_cost_fallback: f64,
}

/// Name-keyed lookup into the host's resource database.
pub trait ResourceLibrary {
    /// Properties for the named resource, or `None` when undefined.
    fn properties(&self, name: &str) -> Option<ResourceProperties>;
}

/// In-memory resource table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryResourceLibrary {
    entries: HashMap<String, ResourceProperties>,
}

impl MemoryResourceLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, properties: ResourceProperties) {
        self.entries.insert(name.into(), properties);
    }

    pub fn from_entries<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, ResourceProperties)>,
        N: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(n, p)| (n.into(), p))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLibrary for MemoryResourceLibrary {
    fn properties(&self, name: &str) -> Option<ResourceProperties> {
        self.entries.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(unit_volume: f64, unit_mass: f64, unit_cost: f64) -> ResourceProperties {
        ResourceProperties {
            unit_volume,
            unit_mass,
            unit_cost,
            zero_mass_fallback: 0.0,
            zero_cost_fallback: 0.0,
        }
    }

    #[test]
    fn lookup_known_and_unknown() {
        let mut library = MemoryResourceLibrary::new();
        library.insert("LiquidFuel", props(5.0, 0.005, 0.8));
        assert_eq!(library.properties("LiquidFuel"), Some(props(5.0, 0.005, 0.8)));
        assert_eq!(library.properties("Unobtainium"), None);
    }

    #[test]
    fn loads_from_json_table() {
        let library: MemoryResourceLibrary = serde_json::from_str(
            r#"{
                "LiquidFuel": { "unitVolume": 5.0, "unitMass": 0.005, "unitCost": 0.8 },
                "ElectricCharge": {
                    "unitVolume": 1.0, "unitMass": 0.0, "unitCost": 0.0,
                    "zeroMassFallback": 0.0001, "zeroCostFallback": 0.05
                }
            }"#,
        )
        .expect("parse");
        assert_eq!(library.len(), 2);
        let ec = library.properties("ElectricCharge").expect("EC defined");
        assert_eq!(ec.unit_mass, 0.0);
        assert_eq!(ec.zero_mass_fallback, 0.0001);
        assert_eq!(ec.zero_cost_fallback, 0.05);
    }
}
