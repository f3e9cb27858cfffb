//! Serde-Abbild der Wegpunkt-Datei.
//!
//! Das Dateiformat ist vom historischen Bestand vorgegeben: Schlüssel in
//! Bindestrich-Schreibweise, Koordinaten als verschachtelte `coords`-Sektion,
//! Preis-Overrides unter dem Namen des Ursprungs-Wegpunkts. Die Records sind
//! reine Datenträger; Laden und Schreiben übernehmen [`super::loader`] und
//! [`super::writer`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Regionstyp-Wert von "type" bei Radius-Regionen
pub(crate) const KIND_RADIUS: &str = "radius";
/// Regionstyp-Wert von "type" bei Cuboid-Regionen
pub(crate) const KIND_CUBOID: &str = "cuboid";

/// Gesamte Wegpunkt-Datei: Name → Record, in Dateireihenfolge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationsFile {
    pub locations: IndexMap<String, WaypointRecord>,
}

/// Ein Wegpunkt wie er in der Datei steht.
///
/// Die fünf Verhaltens-Flags sind optional: fehlende Flags bedeuten
/// "Registry-Standard verwenden" und werden beim Schreiben auch wieder
/// weggelassen, damit spätere Standardänderungen greifen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointRecord {
    /// Welt des Wegpunkts
    pub world: String,
    /// Regionstyp, "radius" oder "cuboid" (alles andere zählt als Radius)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    /// Regionsradius; fehlt er, greift der konfigurierte Standard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(
        rename = "require-discovery",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub require_discovery: Option<bool>,
    #[serde(
        rename = "require-permissions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub require_permissions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiworld: Option<bool>,
    /// Anker und Teleportziel
    pub coords: CoordsRecord,
    /// Akteure die den Wegpunkt entdeckt haben; wird immer geschrieben
    #[serde(rename = "discovered-by", default)]
    pub discovered_by: Vec<String>,
    /// Feste Preise, Schlüssel ist der Name des Ursprungs-Wegpunkts
    #[serde(
        rename = "charge-from",
        default,
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub charge_from: IndexMap<String, f64>,
}

impl WaypointRecord {
    /// Regionstyp-Vergleich wie im Altbestand: nur "cuboid" zählt als Cuboid
    pub fn is_cuboid(&self) -> bool {
        self.kind.eq_ignore_ascii_case(KIND_CUBOID)
    }
}

fn default_kind() -> String {
    KIND_RADIUS.to_string()
}

/// Die `coords`-Sektion eines Wegpunkts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordsRecord {
    /// Primäranker
    pub primary: PointRecord,
    /// Sekundäranker für Cuboid-Regionen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<PointRecord>,
    /// Explizites Teleportziel mit Blickrichtung
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<DestRecord>,
}

/// Blockgerasterter Ankerpunkt (ohne Blickrichtung)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Teleportziel inklusive Blickrichtung
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DestRecord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub yaw: f32,
    #[serde(default)]
    pub pitch: f32,
}
