//! Pure volume-container accounting logic.
//!
//! Given a part's total physical volume and catalogs of named resources,
//! resource sets, container modifiers, and fuel presets, this crate computes
//! how that volume is partitioned among resources and derives total dry
//! mass, resource mass, and monetary cost. Everything is plain data in and
//! plain data out: no engine, no UI, no global state. The host game owns
//! the part representation, the resource database, editor field binding,
//! and symmetry fan-out; it drives this engine through the mutation API and
//! reads back the aggregates.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Modifier/resource-set/fuel-preset records and the catalog registry/loader |
//! | [`container`] | Container definitions: ratio apportionment, mass and cost accounting |
//! | [`persistence`] | Delimited-string codec for a container's mutable save state |
//! | [`resources`] | Resource-database boundary: per-unit properties by resource name |

pub mod catalog;
pub mod container;
pub mod persistence;
pub mod resources;
