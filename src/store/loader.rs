//! Laden der Wegpunkt-Datei in eine Registry.
//!
//! Das Laden läuft in zwei Pässen: erst werden alle Wegpunkte angelegt,
//! danach die Preis-Overrides aufgelöst. Overrides verweisen per Name auf
//! andere Wegpunkte der selben Datei; erst nach dem ersten Pass stehen alle
//! Handles fest. Kaputte Einzeleinträge werden mit Warnung übersprungen,
//! die restliche Datei lädt trotzdem.

use std::path::Path;

use anyhow::Context;
use glam::DVec3;

use crate::core::{Coordinate, RegionKind, Waypoint, WaypointRegistry};
use crate::shared::EngineOptions;

use super::records::{LocationsFile, WaypointRecord};

/// Liest und parst eine Wegpunkt-Datei
pub fn parse_locations(path: &Path) -> anyhow::Result<LocationsFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Wegpunkt-Datei nicht lesbar: {}", path.display()))?;
    let file: LocationsFile = serde_json::from_str(&content)
        .with_context(|| format!("Wegpunkt-Datei fehlerhaft: {}", path.display()))?;
    Ok(file)
}

/// Baut eine Registry aus den geparsten Records auf.
///
/// Die Registrierungsreihenfolge folgt der Dateireihenfolge, damit
/// `locate` nach einem Neuladen dieselben Treffer liefert wie davor.
pub fn registry_from_records(file: &LocationsFile, options: EngineOptions) -> WaypointRegistry {
    let mut registry = WaypointRegistry::with_options(options);

    // Pass 1: Wegpunkte anlegen
    for (name, record) in &file.locations {
        if record.world.trim().is_empty() {
            log::warn!("Wegpunkt \"{}\" ohne Welt, übersprungen", name);
            continue;
        }

        let id = registry.allocate_id();
        let waypoint = instantiate(id, name, record, registry.options());
        if registry.insert_loaded(waypoint).is_err() {
            log::warn!("Wegpunkt \"{}\" doppelt in der Datei, übersprungen", name);
        }
    }

    // Pass 2: Preis-Overrides per Name auflösen
    let mut overrides = Vec::new();
    for (name, record) in &file.locations {
        let Ok(target) = registry.resolve(name) else {
            continue;
        };
        for (origin_name, price) in &record.charge_from {
            match registry.resolve(origin_name) {
                Ok(origin) => overrides.push((target, origin, *price)),
                Err(_) => log::warn!(
                    "Wegpunkt \"{}\": Preis-Override verweist auf unbekannten Wegpunkt \"{}\", verworfen",
                    name,
                    origin_name
                ),
            }
        }
    }
    for (target, origin, price) in overrides {
        // Beide Handles stammen aus Pass 2, das kann nicht mehr fehlschlagen
        let _ = registry.set_charge_from(target, origin, price);
    }

    log::info!("{} Wegpunkte geladen", registry.len());
    registry
}

/// Liest und lädt eine Wegpunkt-Datei in einem Schritt
pub fn load_registry(path: &Path, options: EngineOptions) -> anyhow::Result<WaypointRegistry> {
    let file = parse_locations(path)?;
    Ok(registry_from_records(&file, options))
}

/// Baut aus einem Record einen Wegpunkt (ohne Overrides, siehe Pass 2)
fn instantiate(
    id: crate::core::WaypointId,
    name: &str,
    record: &WaypointRecord,
    options: &EngineOptions,
) -> Waypoint {
    let primary = Coordinate::new(
        record.world.as_str(),
        record.coords.primary.x,
        record.coords.primary.y,
        record.coords.primary.z,
    );
    let radius = record.radius.unwrap_or(options.default_radius);
    let mut waypoint = Waypoint::new(id, name, &primary, radius);

    if record.is_cuboid() {
        waypoint.set_kind(RegionKind::Cuboid);
    }

    if let Some(secondary) = &record.coords.secondary {
        waypoint.set_secondary(&Coordinate::new(
            record.world.as_str(),
            secondary.x,
            secondary.y,
            secondary.z,
        ));
    }

    if let Some(dest) = &record.coords.dest {
        waypoint.set_destination(&Coordinate::with_look(
            record.world.as_str(),
            DVec3::new(dest.x, dest.y, dest.z),
            dest.yaw,
            dest.pitch,
        ));
    }

    waypoint.set_enabled_raw(record.enabled);
    waypoint.set_require_discovery_raw(record.require_discovery);
    waypoint.set_require_permissions_raw(record.require_permissions);
    waypoint.set_free_raw(record.free);
    waypoint.set_multiworld_raw(record.multiworld);

    for actor in &record.discovered_by {
        waypoint.mark_discovered(actor);
    }

    waypoint
}
