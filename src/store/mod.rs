//! Persistenz: Laden und Schreiben der Wegpunkt-Datei.
//!
//! Das Dateiformat stammt aus dem Altbestand; [`records`] bildet es ab,
//! [`loader`] und [`writer`] übersetzen zwischen Datei und Registry.

pub mod loader;
pub mod records;
pub mod writer;

pub use loader::{load_registry, parse_locations, registry_from_records};
pub use records::{CoordsRecord, DestRecord, LocationsFile, PointRecord, WaypointRecord};
pub use writer::{registry_to_records, write_locations};
