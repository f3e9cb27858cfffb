//! QuickTravel Engine Library.
//! Wegpunkt-Registry, Reisekosten und Teleport-Sicherheitsprüfung als
//! Library exportiert; die Einbettung liefert Welt, Konto und Berechtigungen.

pub mod core;
pub mod shared;
pub mod store;

pub use core::{
    Coordinate, RegionKind, RegistryError, Waypoint, WaypointId, WaypointRegistry, WorldId,
};
pub use core::{execute_travel, make_safe, travel_cost};
pub use core::{BlockAccess, BlockType, Economy, PermissionSource, TravelOrigin};
pub use core::{FlagUpdate, InsufficientFunds, KindChange, KindUpdate, TravelError, WaypointFilter};
pub use shared::{EngineOptions, PricingOptions};
pub use store::{load_registry, write_locations};
