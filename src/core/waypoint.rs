//! Der Wegpunkt: benannte Entität mit Triggerregion, Teleportziel und Preis-Overrides.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::coordinate::Coordinate;

/// Stabiler, undurchsichtiger Handle eines Wegpunkts.
///
/// Wird bei der Erstellung von der Registry vergeben und nie wiederverwendet.
/// Preis-Overrides werden über diesen Handle statt über den Namen verknüpft,
/// damit ein Umbenennen des Ursprungs-Wegpunkts sie nicht invalidiert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WaypointId(pub(crate) u64);

impl WaypointId {
    /// Roher Zahlenwert des Handles (für Logausgaben)
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WaypointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Form der Triggerregion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionKind {
    /// Kugel um den Primäranker
    #[default]
    Radius,
    /// Achsenparalleler Quader zwischen Primär- und Sekundäranker
    Cuboid,
}

/// Ein benannter Wegpunkt in der Welt.
///
/// Die fünf Verhaltens-Flags sind `Option<bool>`: `None` bedeutet "Registry-
/// Standard verwenden" und wird erst beim Lesen durch die Registry aufgelöst,
/// damit eine spätere Änderung des Standards auch bestehende Wegpunkte erfasst.
#[derive(Debug, Clone)]
pub struct Waypoint {
    id: WaypointId,
    /// Eindeutiger Schlüssel, immer kleingeschrieben
    name: String,
    /// Anzeigename in Originalschreibweise
    display_name: String,
    kind: RegionKind,
    enabled: Option<bool>,
    require_discovery: Option<bool>,
    require_permissions: Option<bool>,
    free: Option<bool>,
    multiworld: Option<bool>,
    /// Primäranker, blockgerastert, immer vorhanden
    primary: Coordinate,
    /// Sekundäranker für Cuboid-Regionen
    secondary: Option<Coordinate>,
    /// Explizites Teleportziel; ohne dieses gilt der Primäranker
    destination: Option<Coordinate>,
    radius: f64,
    /// Abgeleiteter Cache, wird bei jeder Radiusänderung neu berechnet
    radius_squared: f64,
    /// Akteure die diesen Wegpunkt entdeckt haben
    discovered_by: BTreeSet<String>,
    /// Feste Preise pro Ursprungs-Wegpunkt, über Handles verknüpft
    charge_from: HashMap<WaypointId, f64>,
}

impl Waypoint {
    /// Erstellt einen neuen Wegpunkt an der angegebenen Position.
    ///
    /// Der Primäranker wird blockgerastert; das Teleportziel bleibt ungesetzt
    /// und fällt damit auf den Primäranker zurück.
    pub(crate) fn new(id: WaypointId, name: &str, location: &Coordinate, radius: f64) -> Self {
        let mut waypoint = Self {
            id,
            name: name.to_lowercase(),
            display_name: name.to_string(),
            kind: RegionKind::Radius,
            enabled: None,
            require_discovery: None,
            require_permissions: None,
            free: None,
            multiworld: None,
            primary: location.block_aligned(),
            secondary: None,
            destination: None,
            radius: 1.0,
            radius_squared: 1.0,
            discovered_by: BTreeSet::new(),
            charge_from: HashMap::new(),
        };
        waypoint.set_radius(radius);
        waypoint
    }

    /// Handle dieses Wegpunkts
    pub fn id(&self) -> WaypointId {
        self.id
    }

    /// Eindeutiger Schlüssel (kleingeschrieben)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Anzeigename in Originalschreibweise
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Setzt den Namen. Nur die Registry darf das, sonst läuft der
    /// Namensindex auseinander.
    pub(crate) fn set_name(&mut self, name: &str) {
        self.name = name.to_lowercase();
        self.display_name = name.to_string();
    }

    /// Form der Triggerregion
    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    /// Setzt die Form der Triggerregion
    pub fn set_kind(&mut self, kind: RegionKind) {
        self.kind = kind;
    }

    /// Wechselt zwischen Radius und Cuboid
    pub fn toggle_kind(&mut self) {
        self.kind = match self.kind {
            RegionKind::Radius => RegionKind::Cuboid,
            RegionKind::Cuboid => RegionKind::Radius,
        };
    }

    /// Radius der Kugel-Region
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Quadrierter Radius (Cache für Distanzvergleiche)
    pub fn radius_squared(&self) -> f64 {
        self.radius_squared
    }

    /// Setzt den Radius. Untergrenze 1.0, Vorzeichen wird verworfen;
    /// der quadrierte Cache wird im selben Schritt nachgezogen.
    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.abs().max(1.0);
        self.radius_squared = self.radius * self.radius;
    }

    /// Primäranker
    pub fn primary(&self) -> &Coordinate {
        &self.primary
    }

    /// Verschiebt den Primäranker.
    ///
    /// Liegt der Sekundäranker danach in einer anderen Welt, wird er
    /// verworfen. Mit `move_destination` wandert das Teleportziel mit.
    pub fn set_primary(&mut self, location: &Coordinate, move_destination: bool) {
        self.primary = location.block_aligned();

        if let Some(secondary) = &self.secondary {
            if secondary.world != location.world {
                self.secondary = None;
            }
        }

        if move_destination {
            self.destination = Some(location.clone());
        }
    }

    /// Sekundäranker (nur für Cuboid-Regionen relevant)
    pub fn secondary(&self) -> Option<&Coordinate> {
        self.secondary.as_ref()
    }

    /// Setzt den Sekundäranker, blockgerastert
    pub fn set_secondary(&mut self, location: &Coordinate) {
        self.secondary = Some(location.block_aligned());
    }

    /// Explizit gesetztes Teleportziel
    pub fn destination(&self) -> Option<&Coordinate> {
        self.destination.as_ref()
    }

    /// Setzt das Teleportziel inklusive Blickrichtung
    pub fn set_destination(&mut self, location: &Coordinate) {
        self.destination = Some(location.clone());
    }

    /// Das tatsächliche Teleportziel: explizites Ziel, sonst der Primäranker
    pub fn target_location(&self) -> &Coordinate {
        self.destination.as_ref().unwrap_or(&self.primary)
    }

    // ── Flags (roh; effektive Werte löst die Registry auf) ─────────

    pub fn enabled(&self) -> Option<bool> {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = Some(enabled);
    }

    pub fn require_discovery(&self) -> Option<bool> {
        self.require_discovery
    }

    pub fn set_require_discovery(&mut self, require_discovery: bool) {
        self.require_discovery = Some(require_discovery);
    }

    pub fn require_permissions(&self) -> Option<bool> {
        self.require_permissions
    }

    pub fn set_require_permissions(&mut self, require_permissions: bool) {
        self.require_permissions = Some(require_permissions);
    }

    pub fn free(&self) -> Option<bool> {
        self.free
    }

    pub fn set_free(&mut self, free: bool) {
        self.free = Some(free);
    }

    pub fn multiworld(&self) -> Option<bool> {
        self.multiworld
    }

    pub fn set_multiworld(&mut self, multiworld: bool) {
        self.multiworld = Some(multiworld);
    }

    /// Setzt ein Flag auf den rohen Optionswert (Laden aus Altbeständen)
    pub(crate) fn set_enabled_raw(&mut self, value: Option<bool>) {
        self.enabled = value;
    }

    pub(crate) fn set_require_discovery_raw(&mut self, value: Option<bool>) {
        self.require_discovery = value;
    }

    pub(crate) fn set_require_permissions_raw(&mut self, value: Option<bool>) {
        self.require_permissions = value;
    }

    pub(crate) fn set_free_raw(&mut self, value: Option<bool>) {
        self.free = value;
    }

    pub(crate) fn set_multiworld_raw(&mut self, value: Option<bool>) {
        self.multiworld = value;
    }

    // ── Entdeckung ──────────────────────────────────────────────────

    /// Prüft ob der Akteur diesen Wegpunkt entdeckt hat
    pub fn is_discovered_by(&self, actor: &str) -> bool {
        self.discovered_by.contains(actor)
    }

    /// Vermerkt die Entdeckung durch den Akteur
    pub fn mark_discovered(&mut self, actor: &str) {
        self.discovered_by.insert(actor.to_string());
    }

    /// Löscht sämtliche Entdeckungen
    pub fn reset_discovery(&mut self) {
        self.discovered_by.clear();
    }

    /// Alle Akteure die diesen Wegpunkt entdeckt haben
    pub fn discovered_by(&self) -> &BTreeSet<String> {
        &self.discovered_by
    }

    // ── Preis-Overrides ─────────────────────────────────────────────

    /// Fester Preis für Reisen vom angegebenen Ursprung, falls konfiguriert
    pub fn charge_from(&self, origin: WaypointId) -> Option<f64> {
        self.charge_from.get(&origin).copied()
    }

    /// Setzt einen festen Preis für Reisen vom angegebenen Ursprung
    pub fn set_charge_from(&mut self, origin: WaypointId, price: f64) {
        self.charge_from.insert(origin, price);
    }

    /// Entfernt den festen Preis für den angegebenen Ursprung
    pub fn reset_charge_from(&mut self, origin: WaypointId) {
        self.charge_from.remove(&origin);
    }

    /// Alle konfigurierten Overrides (Ursprungs-Handle → Preis)
    pub fn charge_overrides(&self) -> impl Iterator<Item = (WaypointId, f64)> + '_ {
        self.charge_from.iter().map(|(id, price)| (*id, *price))
    }

    /// Wird von der Registry gerufen wenn ein anderer Wegpunkt gelöscht
    /// wurde, damit kein Override auf einen toten Handle zeigt.
    pub(crate) fn notify_deleted(&mut self, other: WaypointId) {
        self.charge_from.remove(&other);
    }

    // ── Region ──────────────────────────────────────────────────────

    /// Prüft ob die Koordinate innerhalb der Triggerregion liegt.
    ///
    /// Radius-Modus (auch für Cuboid ohne Sekundäranker): volle 3D-Kugel,
    /// strikt `distanz² < radius²`. Der `height_modifier` spielt hier bewusst
    /// keine Rolle; er polstert ausschließlich die Oberseite einer
    /// Cuboid-Region, damit ein Akteur auf der obersten Blocklage mitsamt
    /// Augenhöhe noch als "im Wegpunkt" zählt.
    ///
    /// Kein Enabled-Check: den effektiven Wert kennt nur die Registry.
    /// Nebenwirkungsfrei, beliebig parallel für Lesezugriffe aufrufbar.
    pub fn region_contains(&self, coords: &Coordinate, height_modifier: i32) -> bool {
        if coords.world != self.primary.world {
            return false;
        }

        // Radius-Verhalten solange der zweite Punkt nicht gesetzt ist
        let secondary = match &self.secondary {
            Some(secondary) if self.kind == RegionKind::Cuboid => secondary,
            _ => return coords.distance_squared(&self.primary) < self.radius_squared,
        };

        let a = self.primary.block_pos();
        let b = secondary.block_pos();
        let min = a.min(b);
        let max = a.max(b);

        // Min inklusiv, Max+1 exklusiv: die Box umfasst beide Randblöcke.
        // Vertikal wird nur nach oben um height_modifier gepolstert.
        let p = coords.position;
        p.x >= f64::from(min.x)
            && p.x < f64::from(max.x + 1)
            && p.y >= f64::from(min.y)
            && p.y < f64::from(max.y + height_modifier)
            && p.z >= f64::from(min.z)
            && p.z < f64::from(max.z + 1)
    }

    /// Berechtigungsknoten dieses Wegpunkts ("qt.use" + Name, historisches
    /// Format ohne Trennzeichen — bestehende Berechtigungstabellen hängen daran)
    pub fn permission_node(&self) -> String {
        format!("qt.use{}", self.name)
    }
}
