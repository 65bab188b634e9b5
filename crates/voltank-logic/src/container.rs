//! Container definitions — volume apportionment, mass, and cost accounting.
//!
//! A [`ContainerDefinition`] models one physical tank instance: it owns one
//! [`SubContainer`] per eligible resource, apportions the usable volume among
//! them by user-assigned integer ratios, and derives aggregate resource
//! mass/cost and container dry mass/cost. Every mutation triggers an eager,
//! total recompute; external modules only read the results.
//!
//! The engine is single-instance by design. "Apply to symmetric siblings"
//! belongs to the host, which invokes the same mutation on each sibling's
//! definition, and after changing a part's total volume the host must call
//! [`ContainerDefinition::set_container_volume`] on every container of that
//! part.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogRegistry, ContainerModifier, FuelPreset, ResourceRatio};
use crate::persistence::{self, DecodeError, PersistentState};
use crate::resources::{ResourceLibrary, ResourceProperties};

/// Fuel-preset label used once the ratio mix no longer matches any catalog
/// preset.
pub const CUSTOM_PRESET: &str = "custom";

/// Static per-container config record (spec'd external interface).
///
/// Field names on the wire match the legacy config format; absent fields
/// take the documented defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerConfig {
    pub name: String,
    /// Explicitly eligible resources.
    #[serde(rename = "resource")]
    pub resources: Vec<String>,
    /// Resource sets expanding the eligible list.
    #[serde(rename = "resourceSet")]
    pub resource_sets: Vec<String>,
    /// Modifier names usable on this container; empty means all known.
    #[serde(rename = "modifier")]
    pub modifiers: Vec<String>,
    /// Fraction of the part's total volume (values above 1 are read as
    /// percentages).
    pub percent: f64,
    /// Fraction of raw volume lost to tankage.
    pub tankage_volume: f64,
    /// Fraction of resource mass (or usable volume) counted as dry mass.
    pub tankage_mass: f64,
    /// Base cost per dry ton, before the modifier's cost multiplier.
    #[serde(rename = "dryCost")]
    pub cost_per_dry_ton: f64,
    /// Dry mass per cubic meter when the container holds no resources.
    #[serde(rename = "emptyMass")]
    pub empty_mass_per_cubic_meter: f64,
    /// Fuel preset applied at construction; empty means use
    /// `default_resources`.
    pub default_fuel_preset: String,
    /// CSV of alternating resource,ratio pairs; a single bare resource name
    /// implies ratio 1.
    pub default_resources: String,
    pub default_modifier: String,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            name: "Main".to_string(),
            resources: Vec::new(),
            resource_sets: Vec::new(),
            modifiers: Vec::new(),
            percent: 1.0,
            tankage_volume: 0.0,
            tankage_mass: 0.0,
            cost_per_dry_ton: 700.0,
            empty_mass_per_cubic_meter: 0.05,
            default_fuel_preset: String::new(),
            default_resources: String::new(),
            default_modifier: "standard".to_string(),
        }
    }
}

/// Per-resource slice of a container: the user-set ratio and the volume
/// share derived from it.
///
/// Unit properties are resolved from the resource library once, at container
/// construction; nothing here resolves names at runtime.
#[derive(Debug, Clone)]
pub struct SubContainer {
    name: String,
    properties: ResourceProperties,
    ratio: u32,
    volume: f64,
}

impl SubContainer {
    fn new(name: String, properties: ResourceProperties) -> Self {
        Self {
            name,
            properties,
            ratio: 0,
            volume: 0.0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &ResourceProperties {
        &self.properties
    }

    /// User-assigned dimensionless ratio.
    pub fn ratio(&self) -> u32 {
        self.ratio
    }

    /// Usable volume currently apportioned to this resource.
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Ratio weighted by unit volume; apportionment weights.
    pub fn volume_ratio(&self) -> f64 {
        f64::from(self.ratio) * self.properties.unit_volume
    }

    /// Resource units this volume holds.
    pub fn units(&self) -> f64 {
        if self.properties.unit_volume > 0.0 {
            self.volume / self.properties.unit_volume
        } else {
            0.0
        }
    }

    pub fn mass(&self) -> f64 {
        self.units() * self.properties.unit_mass
    }

    pub fn cost(&self) -> f64 {
        self.units() * self.properties.unit_cost
    }

    fn set_ratio(&mut self, ratio: i64) {
        self.ratio = ratio.max(0) as u32;
        if self.ratio == 0 {
            self.volume = 0.0;
        }
    }

    fn add_ratio(&mut self, delta: i64) {
        self.set_ratio(i64::from(self.ratio) + delta);
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }
}

/// One physical tank instance: the sub-containers for its eligible
/// resources, the active modifier and fuel-preset selection, and the
/// aggregate volume/mass/cost figures derived from them.
#[derive(Debug, Clone)]
pub struct ContainerDefinition {
    name: String,
    tankage_volume: f64,
    tankage_mass: f64,
    cost_per_dry_ton: f64,
    empty_mass_per_cubic_meter: f64,

    resource_names: Vec<String>,
    modifiers: Vec<ContainerModifier>,
    fuel_presets: Vec<FuelPreset>,
    subs: Vec<SubContainer>,

    current_modifier: String,
    current_preset: String,
    percent_of_part_volume: f64,
    raw_volume: f64,
    usable_volume: f64,
    total_unit_ratio: u64,
    total_volume_ratio: f64,
    resource_mass: f64,
    resource_cost: f64,
    container_mass: f64,
    container_cost: f64,
    dirty: bool,
}

impl ContainerDefinition {
    /// Build a container from its static config record and the owning
    /// part's total volume.
    ///
    /// Eligible resources are the union of the explicit resource list and
    /// every referenced resource set, deduplicated and sorted; when both
    /// selection mechanisms are empty the `generic` wildcard set stands in.
    /// An empty modifier list means every modifier the catalog knows.
    pub fn new(
        config: &ContainerConfig,
        catalogs: &CatalogRegistry,
        library: &dyn ResourceLibrary,
        part_total_volume: f64,
    ) -> Result<Self, ContainerError> {
        let mut set_names = config.resource_sets.clone();
        if config.resources.is_empty() && set_names.is_empty() {
            set_names.push("generic".to_string());
        }

        let modifier_names = if config.modifiers.is_empty() {
            catalogs.all_modifier_names()
        } else {
            config.modifiers.clone()
        };
        let modifiers: Vec<ContainerModifier> = catalogs
            .modifiers_by_name(&modifier_names)
            .into_iter()
            .cloned()
            .collect();
        if modifiers.is_empty() {
            return Err(ContainerError::NoModifiers);
        }

        let mut resource_names: Vec<String> = Vec::new();
        for name in &config.resources {
            if !resource_names.contains(name) {
                resource_names.push(name.clone());
            }
        }
        for set_name in &set_names {
            let Some(set) = catalogs.resource_set(set_name) else {
                log::warn!(
                    "container '{}' references unknown resource set '{}'",
                    config.name,
                    set_name
                );
                continue;
            };
            for name in &set.resources {
                if !resource_names.contains(name) {
                    resource_names.push(name.clone());
                }
            }
        }
        resource_names.sort();

        let mut subs = Vec::with_capacity(resource_names.len());
        for name in &resource_names {
            let properties = library
                .properties(name)
                .ok_or_else(|| ContainerError::UnknownResource(name.clone()))?;
            subs.push(SubContainer::new(name.clone(), properties));
        }

        let fuel_presets: Vec<FuelPreset> = catalogs
            .presets()
            .iter()
            .filter(|p| p.applicable(&resource_names))
            .cloned()
            .collect();

        let current_modifier = if modifiers.iter().any(|m| m.name == config.default_modifier) {
            config.default_modifier.clone()
        } else {
            if !config.default_modifier.is_empty() {
                log::warn!(
                    "container '{}': default modifier '{}' is not applicable, using '{}'",
                    config.name,
                    config.default_modifier,
                    modifiers[0].name
                );
            }
            modifiers[0].name.clone()
        };

        let default_resources = if config.default_fuel_preset.is_empty()
            && config.default_resources.is_empty()
            && !resource_names.is_empty()
        {
            format!("{},1", resource_names[0])
        } else {
            config.default_resources.clone()
        };

        let percent = normalized_percent(config.percent);
        let mut container = Self {
            name: config.name.clone(),
            tankage_volume: config.tankage_volume,
            tankage_mass: config.tankage_mass,
            cost_per_dry_ton: config.cost_per_dry_ton,
            empty_mass_per_cubic_meter: config.empty_mass_per_cubic_meter,
            resource_names,
            modifiers,
            fuel_presets,
            subs,
            current_modifier,
            current_preset: CUSTOM_PRESET.to_string(),
            percent_of_part_volume: percent,
            raw_volume: part_total_volume * percent,
            usable_volume: 0.0,
            total_unit_ratio: 0,
            total_volume_ratio: 0.0,
            resource_mass: 0.0,
            resource_cost: 0.0,
            container_mass: 0.0,
            container_cost: 0.0,
            dirty: false,
        };
        container.initialize_defaults(&config.default_fuel_preset, &default_resources)?;
        container.dirty = true;
        Ok(container)
    }

    fn initialize_defaults(
        &mut self,
        default_fuel_preset: &str,
        default_resources: &str,
    ) -> Result<(), ContainerError> {
        if !default_fuel_preset.is_empty() {
            if !self.set_fuel_preset(default_fuel_preset) {
                return Err(ContainerError::UnknownFuelPreset(
                    default_fuel_preset.to_string(),
                ));
            }
            return Ok(());
        }
        self.current_preset = CUSTOM_PRESET.to_string();
        if !default_resources.trim().is_empty() {
            let mut parts: Vec<&str> = default_resources.split(',').map(str::trim).collect();
            if parts.len() == 1 {
                parts.push("1");
            }
            if parts.len() % 2 != 0 {
                return Err(ContainerError::MalformedDefaultResources(format!(
                    "'{}' is not an alternating resource,ratio list",
                    default_resources
                )));
            }
            for pair in parts.chunks(2) {
                let ratio: i64 = pair[1].parse().map_err(|_| {
                    ContainerError::MalformedDefaultResources(format!(
                        "ratio '{}' for resource '{}' is not an integer",
                        pair[1], pair[0]
                    ))
                })?;
                let Some(index) = self.sub_index(pair[0]) else {
                    return Err(ContainerError::MalformedDefaultResources(format!(
                        "resource '{}' is not eligible for this container",
                        pair[0]
                    )));
                };
                self.subs[index].set_ratio(ratio);
            }
        }
        self.update_all();
        Ok(())
    }

    // --- mutation API ---------------------------------------------------

    /// Set one resource's ratio; negative values clamp to 0. Returns false
    /// for a resource name this container does not hold.
    pub fn set_resource_ratio(&mut self, name: &str, ratio: i32) -> bool {
        let Some(index) = self.sub_index(name) else {
            log::warn!("container '{}' holds no resource '{}'", self.name, name);
            return false;
        };
        self.subs[index].set_ratio(i64::from(ratio));
        self.update_all();
        self.dirty = true;
        true
    }

    /// Switch the active modifier. Ratios are untouched; usable volume and
    /// the derived mass/cost figures change.
    pub fn set_modifier(&mut self, name: &str) -> bool {
        if !self.modifiers.iter().any(|m| m.name == name) {
            log::warn!(
                "modifier '{}' is not applicable to container '{}'",
                name,
                self.name
            );
            return false;
        }
        self.current_modifier = name.to_string();
        self.update_volumes();
        self.update_mass_and_cost();
        self.dirty = true;
        true
    }

    /// Recompute this container's raw volume from the owning part's total
    /// volume. The host must call this on every sibling container of the
    /// same part after the part's volume changes.
    pub fn set_container_volume(&mut self, part_total_volume: f64) {
        self.raw_volume = part_total_volume * self.percent_of_part_volume;
        self.update_volumes();
        self.update_mass_and_cost();
        self.dirty = true;
    }

    /// Store a new fraction of the part's volume. Values above 1 are read
    /// as percentages, negatives clamp to 0. Does not recompute: the caller
    /// must follow with [`set_container_volume`](Self::set_container_volume)
    /// on every container of the part.
    pub fn set_container_percent(&mut self, percent: f64) {
        self.percent_of_part_volume = normalized_percent(percent);
    }

    /// Zero every ratio, then apply the named preset's ratios. Destructive
    /// by design; this is the "next fuel type" operation.
    pub fn set_fuel_preset(&mut self, name: &str) -> bool {
        let Some(ratios) = self.preset_ratios(name) else {
            return false;
        };
        self.current_preset = name.to_string();
        for sub in &mut self.subs {
            sub.set_ratio(0);
        }
        self.apply_preset_ratios(&ratios, 1);
        true
    }

    /// Add the named preset's ratios on top of the current mix. Forces the
    /// `custom` preset label.
    pub fn add_preset_ratios(&mut self, name: &str) -> bool {
        let Some(ratios) = self.preset_ratios(name) else {
            return false;
        };
        self.apply_preset_ratios(&ratios, 1);
        self.current_preset = CUSTOM_PRESET.to_string();
        true
    }

    /// Subtract the named preset's ratios from the current mix (clamping at
    /// 0). Forces the `custom` preset label.
    pub fn subtract_preset_ratios(&mut self, name: &str) -> bool {
        let Some(ratios) = self.preset_ratios(name) else {
            return false;
        };
        self.apply_preset_ratios(&ratios, -1);
        self.current_preset = CUSTOM_PRESET.to_string();
        true
    }

    /// Acknowledge the dirty flag after the host has consumed the new
    /// figures.
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    // --- persistence ----------------------------------------------------

    /// Snapshot of the mutable inputs, in wire order.
    pub fn persistent_state(&self) -> PersistentState {
        PersistentState {
            modifier: self.current_modifier.clone(),
            fuel_preset: self.current_preset.clone(),
            percent: self.percent_of_part_volume,
            ratios: self.subs.iter().map(SubContainer::ratio).collect(),
        }
    }

    /// Encode the mutable state for saving.
    pub fn save_persistent_data(&self) -> String {
        persistence::encode(&self.persistent_state())
    }

    /// Restore mutable state from a persisted string and recompute
    /// everything derived from it.
    ///
    /// A short ratio tail leaves the remaining sub-containers at ratio 0.
    /// The raw volume is not touched; the host re-applies the part volume
    /// via [`set_container_volume`](Self::set_container_volume) after load.
    pub fn load_persistent_data(&mut self, data: &str) -> Result<(), DecodeError> {
        let state = persistence::decode(data)?;
        self.current_modifier = state.modifier;
        self.current_preset = state.fuel_preset;
        self.set_container_percent(state.percent);
        for (index, sub) in self.subs.iter_mut().enumerate() {
            let ratio = state.ratios.get(index).copied().unwrap_or(0);
            sub.set_ratio(i64::from(ratio));
        }
        self.update_all();
        Ok(())
    }

    // --- query surface --------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sub-containers.
    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Eligible resource names, sorted.
    pub fn resource_names(&self) -> &[String] {
        &self.resource_names
    }

    pub fn sub_containers(&self) -> &[SubContainer] {
        &self.subs
    }

    /// (resource name, units) pairs for the host's part resource list.
    pub fn resource_fill(&self) -> Vec<(&str, f64)> {
        self.subs.iter().map(|s| (s.name(), s.units())).collect()
    }

    pub fn resource_unit_ratio(&self, name: &str) -> Option<u32> {
        self.sub_index(name).map(|i| self.subs[i].ratio())
    }

    pub fn resource_volume_ratio(&self, name: &str) -> Option<f64> {
        self.sub_index(name).map(|i| self.subs[i].volume_ratio())
    }

    pub fn resource_volume(&self, name: &str) -> Option<f64> {
        self.sub_index(name).map(|i| self.subs[i].volume())
    }

    pub fn resource_units(&self, name: &str) -> Option<f64> {
        self.sub_index(name).map(|i| self.subs[i].units())
    }

    /// Modifiers applicable to this container.
    pub fn modifiers(&self) -> &[ContainerModifier] {
        &self.modifiers
    }

    /// Fuel presets applicable to this container.
    pub fn fuel_presets(&self) -> &[FuelPreset] {
        &self.fuel_presets
    }

    /// The active modifier record. An unresolvable stored name falls back
    /// to the first applicable modifier.
    pub fn current_modifier(&self) -> &ContainerModifier {
        self.modifiers
            .iter()
            .find(|m| m.name == self.current_modifier)
            .unwrap_or(&self.modifiers[0])
    }

    /// Active fuel-preset label, which is [`CUSTOM_PRESET`] once the mix no
    /// longer matches a catalog preset.
    pub fn fuel_preset(&self) -> &str {
        &self.current_preset
    }

    pub fn container_percent(&self) -> f64 {
        self.percent_of_part_volume
    }

    pub fn raw_volume(&self) -> f64 {
        self.raw_volume
    }

    /// Raw volume after tankage loss and the modifier's volume yield.
    pub fn usable_volume(&self) -> f64 {
        self.usable_volume
    }

    pub fn total_unit_ratio(&self) -> u64 {
        self.total_unit_ratio
    }

    pub fn total_volume_ratio(&self) -> f64 {
        self.total_volume_ratio
    }

    /// Mass of the held resources.
    pub fn resource_mass(&self) -> f64 {
        self.resource_mass
    }

    /// Cost of the held resources.
    pub fn resource_cost(&self) -> f64 {
        self.resource_cost
    }

    /// Container dry mass.
    pub fn container_mass(&self) -> f64 {
        self.container_mass
    }

    /// Container dry cost.
    pub fn container_cost(&self) -> f64 {
        self.container_cost
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    // --- internals ------------------------------------------------------

    fn sub_index(&self, name: &str) -> Option<usize> {
        self.subs.iter().position(|s| s.name == name)
    }

    fn preset_ratios(&self, name: &str) -> Option<Vec<ResourceRatio>> {
        match self.fuel_presets.iter().find(|p| p.name == name) {
            Some(preset) => Some(preset.resource_ratios.clone()),
            None => {
                log::warn!(
                    "fuel preset '{}' is not applicable to container '{}'",
                    name,
                    self.name
                );
                None
            }
        }
    }

    fn apply_preset_ratios(&mut self, ratios: &[ResourceRatio], sign: i64) {
        for entry in ratios {
            if let Some(index) = self.sub_index(&entry.resource) {
                self.subs[index].add_ratio(sign * i64::from(entry.ratio));
            }
        }
        self.update_all();
        self.dirty = true;
    }

    fn update_all(&mut self) {
        self.update_total_ratio();
        self.update_volumes();
        self.update_mass_and_cost();
    }

    fn update_total_ratio(&mut self) {
        self.total_unit_ratio = self.subs.iter().map(|s| u64::from(s.ratio())).sum();
        self.total_volume_ratio = self.subs.iter().map(SubContainer::volume_ratio).sum();
    }

    fn update_volumes(&mut self) {
        let volume_modifier = self.current_modifier().volume_modifier;
        self.usable_volume =
            (self.raw_volume - self.raw_volume * self.tankage_volume) * volume_modifier;
        let total = self.total_volume_ratio;
        let usable = self.usable_volume;
        for sub in &mut self.subs {
            let volume = if total > 0.0 {
                sub.volume_ratio() / total * usable
            } else {
                0.0
            };
            sub.set_volume(volume);
        }
    }

    fn update_mass_and_cost(&mut self) {
        let modifier = self.current_modifier();
        let dry_mass_modifier = modifier.dry_mass_modifier;
        let cost_modifier = modifier.cost_modifier;
        let structural = modifier.use_volume_for_mass;

        self.resource_mass = 0.0;
        let mut zero_mass_extra = 0.0;
        for sub in &self.subs {
            let mass = sub.mass();
            if mass == 0.0 && sub.volume() > 0.0 {
                // Zero-mass resource; fake a dry-mass contribution from the
                // library's fallback amount.
                zero_mass_extra += sub.properties().zero_mass_fallback * sub.units();
            }
            self.resource_mass += mass;
        }

        self.container_mass = if structural {
            self.usable_volume * dry_mass_modifier * self.tankage_mass
        } else if self.total_unit_ratio == 0 {
            // Empty tank: config-specified dry mass per cubic meter.
            (self.usable_volume * 0.001) * self.empty_mass_per_cubic_meter * dry_mass_modifier
        } else {
            self.resource_mass * dry_mass_modifier * self.tankage_mass
        };

        self.resource_cost = 0.0;
        for sub in &self.subs {
            let mut cost = sub.cost();
            if cost == 0.0 && sub.units() > 0.0 {
                cost = sub.properties().zero_cost_fallback * sub.units();
            }
            self.resource_cost += cost;
        }

        // Dry cost derives from the dry mass before the zero-mass addend
        // lands; the ordering is load-bearing.
        self.container_cost = self.cost_per_dry_ton * cost_modifier * self.container_mass;
        self.container_mass += zero_mass_extra;
    }
}

fn normalized_percent(percent: f64) -> f64 {
    let percent = if percent > 1.0 { percent * 0.01 } else { percent };
    percent.max(0.0)
}

/// Construction-time configuration errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ContainerError {
    /// A resource name did not resolve in the resource library.
    UnknownResource(String),
    /// The default fuel preset is absent or not applicable to the
    /// container's eligible resources.
    UnknownFuelPreset(String),
    /// The default-resources CSV did not parse or named an ineligible
    /// resource.
    MalformedDefaultResources(String),
    /// Modifier resolution produced an empty set.
    NoModifiers,
}

impl std::fmt::Display for ContainerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerError::UnknownResource(name) => {
                write!(f, "resource '{}' is not defined in the resource library", name)
            }
            ContainerError::UnknownFuelPreset(name) => {
                write!(f, "fuel preset '{}' is not applicable to this container", name)
            }
            ContainerError::MalformedDefaultResources(detail) => {
                write!(f, "malformed default resources: {}", detail)
            }
            ContainerError::NoModifiers => {
                write!(f, "no applicable container modifiers were found in the catalog")
            }
        }
    }
}

impl std::error::Error for ContainerError {}
