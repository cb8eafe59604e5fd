//! SeisClean - streamer cleaning coverage tracking.
//!
//! Records mechanical cleaning of marine seismic streamer sections across
//! vessels and projects, and folds the history into coverage maps and
//! summary statistics.
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────────┐
//!   AccessScope ─►│ CleaningService  │
//!                 └────────┬─────────┘
//!          ┌───────────────┼────────────────┬──────────────┐
//!          ▼               ▼                ▼              ▼
//!   ScopeResolver   ConfigResolver     section / eb     coverage
//!          │               │             (pure)          (pure)
//!          └───────┬───────┘
//!                  ▼
//!            dyn Store ◄──── BackupService (timer, gzip snapshots)
//! ```
//!
//! The addressing model ([`section`]), EB resolver ([`eb`]) and coverage
//! aggregator ([`coverage`]) are pure functions over a resolved
//! [`StreamerGeometry`](geometry::StreamerGeometry). Everything that reads
//! or writes state goes through the [`Store`](store::Store) trait.

pub mod backup;
pub mod config;
pub mod coverage;
pub mod eb;
pub mod error;
pub mod geometry;
pub mod logging;
pub mod model;
pub mod scope;
pub mod section;
pub mod service;
pub mod session;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use geometry::{ConfigResolver, GeometryOverrides, StreamerGeometry};
pub use scope::{AccessScope, Role, ScopeResolver, VesselScope};
pub use service::CleaningService;
pub use store::{JsonStore, Store};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
