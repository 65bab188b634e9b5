//! Static catalogs — container modifiers, resource sets, and fuel presets.
//!
//! The three catalog tables are loaded once from structured config data and
//! are read-only afterwards. Unlike the usual "global registry" approach,
//! the [`CatalogRegistry`] is an explicitly constructed value that callers
//! pass by reference into every container constructor, so the loader's
//! output is independently testable and nothing resolves through hidden
//! global state.

use serde::{Deserialize, Serialize};

/// A named material/construction profile for a container.
///
/// Alters how much of the raw volume is usable, what fraction of resource
/// mass becomes dry mass, and cost/impact/heat/boiloff multipliers consumed
/// by external modules. Numeric fields carry their documented defaults when
/// absent from the config source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerModifier {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Fraction of raw volume that remains usable, applied before any
    /// resource volumes are apportioned.
    #[serde(rename = "volumeModifier", default = "default_volume_modifier")]
    pub volume_modifier: f64,
    /// Fraction applied to resource mass (or usable volume, for structural
    /// containers) when deriving dry mass.
    #[serde(rename = "massModifier", default = "default_dry_mass_modifier")]
    pub dry_mass_modifier: f64,
    #[serde(rename = "costModifier", default = "default_multiplier")]
    pub cost_modifier: f64,
    #[serde(rename = "impactModifier", default = "default_multiplier")]
    pub impact_modifier: f64,
    #[serde(rename = "heatModifier", default = "default_multiplier")]
    pub heat_modifier: f64,
    /// 0–1 for semi-insulated container types; consumed externally.
    #[serde(rename = "boiloffModifier", default = "default_multiplier")]
    pub boiloff_modifier: f64,
    /// Multiplier on the energy needed to prevent boiloff; consumed externally.
    #[serde(rename = "boiloffEnergyModifier", default = "default_multiplier")]
    pub boiloff_energy_modifier: f64,
    /// Structural-tank mode: dry mass derives from usable volume rather than
    /// resource mass.
    #[serde(rename = "useVolumeForMass", default)]
    pub use_volume_for_mass: bool,
}

impl ContainerModifier {
    /// A modifier with the documented default multipliers.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            description: String::new(),
            volume_modifier: default_volume_modifier(),
            dry_mass_modifier: default_dry_mass_modifier(),
            cost_modifier: default_multiplier(),
            impact_modifier: default_multiplier(),
            heat_modifier: default_multiplier(),
            boiloff_modifier: default_multiplier(),
            boiloff_energy_modifier: default_multiplier(),
            use_volume_for_mass: false,
        }
    }
}

fn default_volume_modifier() -> f64 {
    0.85
}

fn default_dry_mass_modifier() -> f64 {
    0.15
}

fn default_multiplier() -> f64 {
    1.0
}

/// A named grouping of resource names, used to expand a container's eligible
/// resource list without repeating long lists in every config record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSet {
    pub name: String,
    #[serde(rename = "resource", default)]
    pub resources: Vec<String>,
    /// Marks the wildcard set covering all pumpable resources.
    #[serde(default)]
    pub generic: bool,
}

/// One (resource, ratio) entry of a fuel preset. Ratio defaults to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRatio {
    pub resource: String,
    #[serde(default = "default_ratio")]
    pub ratio: u32,
}

fn default_ratio() -> u32 {
    1
}

/// A named fixed fuel mix, offered as a one-click setup option when every
/// resource it references is eligible for the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPreset {
    pub name: String,
    #[serde(rename = "resources", default)]
    pub resource_ratios: Vec<ResourceRatio>,
}

impl FuelPreset {
    /// True when every resource this preset references is in the input list.
    ///
    /// A preset with no resource entries is never applicable; empty presets
    /// are reserved for structural containers and get no preset button.
    pub fn applicable(&self, available_resources: &[String]) -> bool {
        if self.resource_ratios.is_empty() {
            return false;
        }
        self.resource_ratios
            .iter()
            .all(|r| available_resources.iter().any(|a| *a == r.resource))
    }
}

/// The three catalog tables, loaded once and shared read-only.
///
/// Absent sections deserialize as empty tables; callers treat an empty
/// catalog as a validation error at container construction, not at load.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRegistry {
    #[serde(default)]
    modifiers: Vec<ContainerModifier>,
    #[serde(rename = "resourceSets", default)]
    resource_sets: Vec<ResourceSet>,
    #[serde(rename = "fuelPresets", default)]
    fuel_presets: Vec<FuelPreset>,
}

impl CatalogRegistry {
    /// Build a registry from already-parsed records. Duplicate names within
    /// a table keep the first record and log a warning.
    pub fn new(
        modifiers: Vec<ContainerModifier>,
        resource_sets: Vec<ResourceSet>,
        fuel_presets: Vec<FuelPreset>,
    ) -> Self {
        Self {
            modifiers,
            resource_sets,
            fuel_presets,
        }
        .deduplicated()
    }

    /// Parse the three catalog tables from a JSON document.
    pub fn from_json(source: &str) -> Result<Self, CatalogError> {
        let registry: CatalogRegistry = serde_json::from_str(source)?;
        Ok(registry.deduplicated())
    }

    fn deduplicated(mut self) -> Self {
        dedup_by_name(&mut self.modifiers, "modifier", |m| &m.name);
        dedup_by_name(&mut self.resource_sets, "resource set", |s| &s.name);
        dedup_by_name(&mut self.fuel_presets, "fuel preset", |p| &p.name);
        self
    }

    pub fn modifiers(&self) -> &[ContainerModifier] {
        &self.modifiers
    }

    pub fn modifier(&self, name: &str) -> Option<&ContainerModifier> {
        self.modifiers.iter().find(|m| m.name == name)
    }

    /// Modifiers matching the given names, in catalog order. Unknown names
    /// are simply absent from the result.
    pub fn modifiers_by_name(&self, names: &[String]) -> Vec<&ContainerModifier> {
        self.modifiers
            .iter()
            .filter(|m| names.iter().any(|n| *n == m.name))
            .collect()
    }

    pub fn all_modifier_names(&self) -> Vec<String> {
        self.modifiers.iter().map(|m| m.name.clone()).collect()
    }

    pub fn resource_set(&self, name: &str) -> Option<&ResourceSet> {
        self.resource_sets.iter().find(|s| s.name == name)
    }

    pub fn presets(&self) -> &[FuelPreset] {
        &self.fuel_presets
    }

    pub fn preset(&self, name: &str) -> Option<&FuelPreset> {
        self.fuel_presets.iter().find(|p| p.name == name)
    }
}

fn dedup_by_name<T>(records: &mut Vec<T>, kind: &str, name: impl Fn(&T) -> &str) {
    let mut seen: Vec<String> = Vec::with_capacity(records.len());
    records.retain(|r| {
        let n = name(r);
        if seen.iter().any(|s| s == n) {
            log::warn!("duplicate {kind} '{n}' in catalog, keeping the first");
            false
        } else {
            seen.push(n.to_string());
            true
        }
    });
}

/// Errors from parsing the catalog source.
#[derive(Debug)]
pub enum CatalogError {
    Parse(serde_json::Error),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Parse(e) => write!(f, "malformed catalog source: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_defaults() {
        let registry = CatalogRegistry::from_json(
            r#"{ "modifiers": [ { "name": "standard" } ] }"#,
        )
        .expect("parse");
        let m = registry.modifier("standard").expect("standard modifier");
        assert_eq!(m.volume_modifier, 0.85);
        assert_eq!(m.dry_mass_modifier, 0.15);
        assert_eq!(m.cost_modifier, 1.0);
        assert_eq!(m.impact_modifier, 1.0);
        assert_eq!(m.heat_modifier, 1.0);
        assert_eq!(m.boiloff_modifier, 1.0);
        assert_eq!(m.boiloff_energy_modifier, 1.0);
        assert!(!m.use_volume_for_mass);
    }

    #[test]
    fn modifier_overrides() {
        let registry = CatalogRegistry::from_json(
            r#"{ "modifiers": [ {
                "name": "insulated",
                "title": "Insulated Tank",
                "volumeModifier": 0.8,
                "massModifier": 0.2,
                "costModifier": 1.5,
                "boiloffModifier": 0.1
            } ] }"#,
        )
        .expect("parse");
        let m = registry.modifier("insulated").expect("insulated modifier");
        assert_eq!(m.title, "Insulated Tank");
        assert_eq!(m.volume_modifier, 0.8);
        assert_eq!(m.dry_mass_modifier, 0.2);
        assert_eq!(m.cost_modifier, 1.5);
        assert_eq!(m.boiloff_modifier, 0.1);
        // Untouched multipliers keep their defaults
        assert_eq!(m.heat_modifier, 1.0);
    }

    #[test]
    fn absent_sections_yield_empty_tables() {
        let registry = CatalogRegistry::from_json("{}").expect("parse");
        assert!(registry.modifiers().is_empty());
        assert!(registry.presets().is_empty());
        assert!(registry.resource_set("generic").is_none());
    }

    #[test]
    fn malformed_source_is_an_error() {
        let err = CatalogRegistry::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn duplicate_names_keep_first() {
        let registry = CatalogRegistry::from_json(
            r#"{ "modifiers": [
                { "name": "standard", "volumeModifier": 0.85 },
                { "name": "standard", "volumeModifier": 0.5 }
            ] }"#,
        )
        .expect("parse");
        assert_eq!(registry.modifiers().len(), 1);
        assert_eq!(registry.modifier("standard").unwrap().volume_modifier, 0.85);
    }

    #[test]
    fn resource_set_and_preset_parse() {
        let registry = CatalogRegistry::from_json(
            r#"{
                "resourceSets": [
                    { "name": "generic", "resource": ["LiquidFuel", "Oxidizer"], "generic": true }
                ],
                "fuelPresets": [
                    { "name": "LFO", "resources": [
                        { "resource": "LiquidFuel", "ratio": 9 },
                        { "resource": "Oxidizer", "ratio": 11 }
                    ] },
                    { "name": "Fumes", "resources": [ { "resource": "LiquidFuel" } ] }
                ]
            }"#,
        )
        .expect("parse");
        let set = registry.resource_set("generic").expect("generic set");
        assert!(set.generic);
        assert_eq!(set.resources.len(), 2);
        let lfo = registry.preset("LFO").expect("LFO preset");
        assert_eq!(lfo.resource_ratios[0].ratio, 9);
        assert_eq!(lfo.resource_ratios[1].ratio, 11);
        // Omitted ratio defaults to 1
        let fumes = registry.preset("Fumes").expect("Fumes preset");
        assert_eq!(fumes.resource_ratios[0].ratio, 1);
    }

    #[test]
    fn preset_applicability() {
        let preset = FuelPreset {
            name: "LFO".to_string(),
            resource_ratios: vec![
                ResourceRatio {
                    resource: "LiquidFuel".to_string(),
                    ratio: 9,
                },
                ResourceRatio {
                    resource: "Oxidizer".to_string(),
                    ratio: 11,
                },
            ],
        };
        let both = vec!["LiquidFuel".to_string(), "Oxidizer".to_string()];
        let one = vec!["LiquidFuel".to_string()];
        assert!(preset.applicable(&both));
        assert!(!preset.applicable(&one));
    }

    #[test]
    fn empty_preset_never_applicable() {
        let preset = FuelPreset {
            name: "Structural".to_string(),
            resource_ratios: Vec::new(),
        };
        let resources = vec!["LiquidFuel".to_string()];
        assert!(!preset.applicable(&resources));
        assert!(!preset.applicable(&[]));
    }

    #[test]
    fn modifiers_by_name_preserves_catalog_order() {
        let registry = CatalogRegistry::from_json(
            r#"{ "modifiers": [
                { "name": "standard" },
                { "name": "lightweight" },
                { "name": "structural", "useVolumeForMass": true }
            ] }"#,
        )
        .expect("parse");
        let picked = registry.modifiers_by_name(&[
            "structural".to_string(),
            "standard".to_string(),
            "missing".to_string(),
        ]);
        let names: Vec<&str> = picked.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["standard", "structural"]);
        assert_eq!(
            registry.all_modifier_names(),
            ["standard", "lightweight", "structural"]
        );
    }
}
