//! Core-Domänentypen der Reise-Engine.
//!
//! Die Haupt-Datenstrukturen:
//! - WaypointRegistry: Container für alle Wegpunkte einer Serverinstanz
//! - Waypoint: Einzelner Wegpunkt mit Region, Ziel und Flags
//! - Coordinate: Welt-qualifizierte Position mit Blickrichtung

pub mod coordinate;
pub mod pricing;
pub mod registry;
pub mod safety;
pub mod travel;
pub mod waypoint;

pub use coordinate::{Coordinate, WorldId};
pub use pricing::{travel_cost, TravelOrigin};
pub use registry::{
    FlagUpdate, KindChange, KindUpdate, RegistryError, WaypointFilter, WaypointRegistry,
};
pub use safety::{make_safe, BlockAccess, BlockType};
pub use travel::{execute_travel, Economy, InsufficientFunds, PermissionSource, TravelError};
pub use waypoint::{RegionKind, Waypoint, WaypointId};
