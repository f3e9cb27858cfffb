//! Schreiben der Registry als Wegpunkt-Datei.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;

use crate::core::{RegionKind, Waypoint, WaypointRegistry};

use super::records::{
    CoordsRecord, DestRecord, LocationsFile, PointRecord, WaypointRecord, KIND_CUBOID, KIND_RADIUS,
};

/// Bildet die Registry auf das Dateiformat ab.
///
/// Wegpunkte erscheinen in Registrierungsreihenfolge. Preis-Overrides werden
/// unter dem aktuellen Namen ihres Ursprungs-Wegpunkts abgelegt und dafür
/// alphabetisch sortiert, damit die Datei bei gleichem Bestand byte-gleich
/// bleibt.
pub fn registry_to_records(registry: &WaypointRegistry) -> LocationsFile {
    let mut locations = IndexMap::with_capacity(registry.len());
    for waypoint in registry.iter() {
        locations.insert(waypoint.name().to_string(), to_record(registry, waypoint));
    }
    LocationsFile { locations }
}

/// Schreibt die Registry als Wegpunkt-Datei
pub fn write_locations(registry: &WaypointRegistry, path: &Path) -> anyhow::Result<()> {
    let file = registry_to_records(registry);
    let content = serde_json::to_string_pretty(&file).context("Serialisierung fehlgeschlagen")?;
    std::fs::write(path, content)
        .with_context(|| format!("Wegpunkt-Datei nicht schreibbar: {}", path.display()))?;
    log::info!("{} Wegpunkte gespeichert nach: {}", registry.len(), path.display());
    Ok(())
}

fn to_record(registry: &WaypointRegistry, waypoint: &Waypoint) -> WaypointRecord {
    let primary = waypoint.primary();

    let mut charge_from: Vec<(String, f64)> = waypoint
        .charge_overrides()
        .filter_map(|(origin, price)| {
            // Overrides auf inzwischen gelöschte Wegpunkte kann es nicht
            // geben, die Registry räumt beim Löschen auf
            registry.get(origin).map(|wp| (wp.name().to_string(), price))
        })
        .collect();
    charge_from.sort_by(|a, b| a.0.cmp(&b.0));

    WaypointRecord {
        world: primary.world.as_str().to_string(),
        kind: match waypoint.kind() {
            RegionKind::Radius => KIND_RADIUS.to_string(),
            RegionKind::Cuboid => KIND_CUBOID.to_string(),
        },
        radius: Some(waypoint.radius()),
        enabled: waypoint.enabled(),
        require_discovery: waypoint.require_discovery(),
        require_permissions: waypoint.require_permissions(),
        free: waypoint.free(),
        multiworld: waypoint.multiworld(),
        coords: CoordsRecord {
            primary: PointRecord {
                x: primary.position.x,
                y: primary.position.y,
                z: primary.position.z,
            },
            secondary: waypoint.secondary().map(|secondary| PointRecord {
                x: secondary.position.x,
                y: secondary.position.y,
                z: secondary.position.z,
            }),
            dest: waypoint.destination().map(|dest| DestRecord {
                x: dest.position.x,
                y: dest.position.y,
                z: dest.position.z,
                yaw: dest.yaw,
                pitch: dest.pitch,
            }),
        },
        discovered_by: waypoint.discovered_by().iter().cloned().collect(),
        charge_from: charge_from.into_iter().collect(),
    }
}
