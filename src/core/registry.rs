//! Die zentrale Wegpunkt-Registry mit Namensindex und Override-Graph.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::coordinate::{Coordinate, WorldId};
use super::pricing::{self, TravelOrigin};
use super::waypoint::{RegionKind, Waypoint, WaypointId};
use crate::shared::EngineOptions;

/// Namen die mit Befehls-Schlüsselwörtern der Kommandoschicht kollidieren
/// und deshalb nie als Wegpunkt-Name zulässig sind.
const RESERVED_NAMES: &[&str] = &[
    "create", "rename", "name", "type", "t", "radius", "r", "cuboid", "c", "update", "u", "dest",
    "enable", "e", "disable", "price", "charge", "free", "f", "discovery", "discover", "disc",
    "d", "perms", "perm", "p", "multiworld", "multi", "m",
];

/// Erwartete, behandelbare Fehler der Registry.
///
/// `CorruptedRegistryState` taucht hier bewusst nicht auf: ein
/// auseinandergelaufener Namensindex ist ein Programmierfehler, kein
/// Benutzerfehler, und führt zu einem Panic statt zu einem `Err`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Der Name ist bereits an einen anderen Wegpunkt vergeben
    #[error("Wegpunkt-Name \"{0}\" ist bereits vergeben")]
    DuplicateName(String),
    /// Kein Wegpunkt unter diesem Namen bekannt
    #[error("Unbekannter Wegpunkt: \"{0}\"")]
    NotFound(String),
    /// Name ohne Buchstaben oder mit reserviertem Schlüsselwort
    #[error("Ungültiger Wegpunkt-Name: \"{0}\"")]
    InvalidName(String),
    /// Mutation aus einer fremden Welt heraus (z.B. Anker verschieben)
    #[error("Wegpunkt \"{0}\" liegt in einer anderen Welt")]
    WrongWorld(String),
}

/// Auswahl der Wegpunkte für Sammel-Mutationen.
#[derive(Debug, Clone, Copy)]
pub enum WaypointFilter<'a> {
    /// Genau ein Wegpunkt
    One(WaypointId),
    /// Alle Wegpunkte in der angegebenen Welt
    World(&'a WorldId),
    /// Alle Wegpunkte
    All,
}

/// Neuer Wert für ein Bool-Flag bei Sammel-Mutationen.
#[derive(Debug, Clone, Copy)]
pub enum FlagUpdate {
    /// Expliziter Wert
    Set(bool),
    /// Effektiven Wert umkehren
    Toggle,
}

/// Neuer Regionstyp bei Sammel-Mutationen.
#[derive(Debug, Clone, Copy)]
pub enum KindUpdate {
    Radius,
    Cuboid,
    /// Zwischen beiden Formen wechseln
    Toggle,
}

/// Ergebnis einer Typänderung pro Wegpunkt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindChange {
    /// Betroffener Wegpunkt
    pub id: WaypointId,
    /// Neuer Regionstyp
    pub kind: RegionKind,
    /// Cuboid ohne Sekundäranker: verhält sich weiterhin wie Radius,
    /// der Aufrufer soll das melden
    pub treated_as_radius: bool,
}

/// Container für alle Wegpunkte einer Serverinstanz.
///
/// Registrierung, Namensindex und der Override-Graph laufen ausschließlich
/// über diese Struktur; Wegpunkte werden nie von außen direkt mutiert, sonst
/// verliert der Index seine Garantien. Lesezugriffe (`locate`, Kostenabfragen)
/// sind `&self` und beliebig parallel; jede Mutation serialisiert der
/// Besitzer über `&mut self`.
#[derive(Debug, Clone)]
pub struct WaypointRegistry {
    /// Alle Wegpunkte in Registrierungsreihenfolge (deterministischer Scan)
    waypoints: IndexMap<WaypointId, Waypoint>,
    /// Namensindex: kleingeschriebener Name → Handle
    names: HashMap<String, WaypointId>,
    /// Nächster zu vergebender Handle; wird nie wiederverwendet
    next_id: u64,
    /// Registry-weite Standards und Reiseparameter
    options: EngineOptions,
}

impl WaypointRegistry {
    /// Erstellt eine leere Registry mit Standard-Optionen
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Erstellt eine leere Registry mit den angegebenen Optionen
    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            waypoints: IndexMap::new(),
            names: HashMap::new(),
            next_id: 1,
            options,
        }
    }

    /// Aktuelle Engine-Optionen
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Mutable Zugriff auf die Optionen (z.B. Standards nachziehen)
    pub fn options_mut(&mut self) -> &mut EngineOptions {
        &mut self.options
    }

    /// Anzahl registrierter Wegpunkte
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Gibt `true` zurück wenn keine Wegpunkte registriert sind
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Iterator über alle Wegpunkte in Registrierungsreihenfolge
    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.values()
    }

    /// Wegpunkt per Handle
    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(&id)
    }

    /// Wegpunkt per Name (Groß-/Kleinschreibung egal)
    pub fn get_by_name(&self, name: &str) -> Option<&Waypoint> {
        let id = self.names.get(&name.to_lowercase())?;
        self.waypoints.get(id)
    }

    /// Löst einen vom Aufrufer gelieferten Namen zum Handle auf
    pub fn resolve(&self, name: &str) -> Result<WaypointId, RegistryError> {
        self.names
            .get(&name.to_lowercase())
            .copied()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    // ── Lebenszyklus ────────────────────────────────────────────────

    /// Erstellt einen neuen Wegpunkt an der angegebenen Position.
    ///
    /// Der neue Wegpunkt startet als Radius-Region mit dem konfigurierten
    /// Standardradius; Primäranker und Teleportziel sind die gerasterte
    /// Position, alle Flags folgen den Registry-Standards.
    pub fn create(&mut self, name: &str, location: &Coordinate) -> Result<WaypointId, RegistryError> {
        let key = validate_name(name)?;

        if self.names.contains_key(&key) {
            return Err(RegistryError::DuplicateName(key));
        }

        let id = self.allocate_id();
        let waypoint = Waypoint::new(id, name, location, self.options.default_radius);

        self.names.insert(key, id);
        self.waypoints.insert(id, waypoint);
        log::debug!("Wegpunkt \"{}\" erstellt ({})", name, id);
        Ok(id)
    }

    /// Benennt einen Wegpunkt um.
    ///
    /// Der Namensindex wird im selben Schritt aktualisiert — es gibt keinen
    /// Zwischenzustand, in dem der Wegpunkt unter keinem oder beiden Namen
    /// auffindbar wäre. Overrides anderer Wegpunkte zeigen über Handles auf
    /// diesen Wegpunkt und überleben die Umbenennung unverändert.
    pub fn rename(&mut self, id: WaypointId, new_name: &str) -> Result<(), RegistryError> {
        let key = validate_name(new_name)?;

        let old_key = self
            .waypoints
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?
            .name()
            .to_string();

        // Umbenennen auf den eigenen Namen ist ein No-op-Erfolg
        // (höchstens die Anzeigeschreibweise ändert sich)
        if old_key != key {
            if self.names.contains_key(&key) {
                return Err(RegistryError::DuplicateName(key));
            }
            self.names.remove(&old_key);
            self.names.insert(key, id);
        }

        if let Some(waypoint) = self.waypoints.get_mut(&id) {
            waypoint.set_name(new_name);
        }
        Ok(())
    }

    /// Löscht einen Wegpunkt und räumt alle Overrides auf, die auf ihn zeigen.
    ///
    /// # Panics
    ///
    /// Wenn Namensindex und Wegpunkt-Name nicht mehr zusammenpassen: das ist
    /// ein früherer Programmierfehler (jemand hat am Index vorbei mutiert),
    /// weiterlaufen würde die Invarianten nur weiter beschädigen.
    pub fn delete(&mut self, id: WaypointId) -> Result<(), RegistryError> {
        let name = self
            .waypoints
            .get(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?
            .name()
            .to_string();

        match self.names.get(&name) {
            Some(&stored) if stored == id => {}
            _ => panic!(
                "Korrupter Namensindex: Wegpunkt \"{}\" ({}) ist unter seinem eigenen Namen \
                 nicht oder falsch eingetragen",
                name, id
            ),
        }

        self.names.remove(&name);
        self.waypoints.shift_remove(&id);

        // Verbleibende Wegpunkte benachrichtigen, damit kein Override
        // auf den toten Handle zeigt
        for waypoint in self.waypoints.values_mut() {
            waypoint.notify_deleted(id);
        }

        log::debug!("Wegpunkt \"{}\" ({}) gelöscht", name, id);
        Ok(())
    }

    /// Vergibt den nächsten Handle (monoton, keine Wiederverwendung)
    pub(crate) fn allocate_id(&mut self) -> WaypointId {
        let id = WaypointId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Fügt einen fertig geladenen Wegpunkt ein (Lade-Pfad: keine
    /// Namensvalidierung, Altbestände dürfen krumme Namen tragen)
    pub(crate) fn insert_loaded(&mut self, waypoint: Waypoint) -> Result<WaypointId, RegistryError> {
        let key = waypoint.name().to_string();
        if self.names.contains_key(&key) {
            return Err(RegistryError::DuplicateName(key));
        }

        let id = waypoint.id();
        self.names.insert(key, id);
        self.waypoints.insert(id, waypoint);
        Ok(id)
    }

    // ── Räumliche Abfragen ──────────────────────────────────────────

    /// Findet den Wegpunkt dessen Region die Koordinate enthält.
    ///
    /// Linearer Scan in Registrierungsreihenfolge, erster Treffer gewinnt.
    /// Bei den erwarteten Wegpunktzahlen (zweistellig bis niedrig
    /// dreistellig) braucht es keinen räumlichen Index. Deaktivierte
    /// Wegpunkte werden nie gemeldet.
    pub fn locate(&self, coords: &Coordinate) -> Option<&Waypoint> {
        self.waypoints.values().find(|waypoint| {
            self.is_enabled(waypoint)
                && waypoint.region_contains(coords, self.options.height_modifier)
        })
    }

    // ── Effektive Flags ─────────────────────────────────────────────

    /// Effektiver Enabled-Zustand (Flag oder Registry-Standard)
    pub fn is_enabled(&self, waypoint: &Waypoint) -> bool {
        waypoint.enabled().unwrap_or(self.options.enabled_by_default)
    }

    /// Effektive Entdeckungspflicht
    pub fn requires_discovery(&self, waypoint: &Waypoint) -> bool {
        waypoint
            .require_discovery()
            .unwrap_or(self.options.require_discovery_by_default)
    }

    /// Effektive Berechtigungspflicht
    pub fn requires_permission(&self, waypoint: &Waypoint) -> bool {
        waypoint
            .require_permissions()
            .unwrap_or(self.options.require_permissions_by_default)
    }

    /// Effektiver Gratis-Zustand
    pub fn is_free(&self, waypoint: &Waypoint) -> bool {
        waypoint.free().unwrap_or(self.options.free_by_default)
    }

    /// Effektive weltübergreifende Nutzbarkeit
    pub fn is_multiworld(&self, waypoint: &Waypoint) -> bool {
        waypoint
            .multiworld()
            .unwrap_or(self.options.multiworld_by_default)
    }

    // ── Sammel-Mutationen ───────────────────────────────────────────

    /// Handles aller Wegpunkte die der Filter trifft, in Registrierungsreihenfolge
    fn matching_ids(&self, filter: WaypointFilter<'_>) -> Vec<WaypointId> {
        match filter {
            WaypointFilter::One(id) => {
                self.waypoints.contains_key(&id).then_some(id).into_iter().collect()
            }
            WaypointFilter::World(world) => self
                .waypoints
                .values()
                .filter(|wp| &wp.primary().world == world)
                .map(|wp| wp.id())
                .collect(),
            WaypointFilter::All => self.waypoints.keys().copied().collect(),
        }
    }

    /// Setzt den Regionstyp der getroffenen Wegpunkte.
    ///
    /// Meldet pro Wegpunkt den neuen Typ und ob ein Cuboid mangels
    /// Sekundäranker vorerst als Radius behandelt wird. Leeres Ergebnis:
    /// der Filter hat nichts getroffen.
    pub fn set_kind(&mut self, filter: WaypointFilter<'_>, update: KindUpdate) -> Vec<KindChange> {
        let ids = self.matching_ids(filter);
        let mut changes = Vec::with_capacity(ids.len());

        for id in ids {
            let Some(waypoint) = self.waypoints.get_mut(&id) else {
                continue;
            };
            match update {
                KindUpdate::Radius => waypoint.set_kind(RegionKind::Radius),
                KindUpdate::Cuboid => waypoint.set_kind(RegionKind::Cuboid),
                KindUpdate::Toggle => waypoint.toggle_kind(),
            }
            changes.push(KindChange {
                id,
                kind: waypoint.kind(),
                treated_as_radius: waypoint.kind() == RegionKind::Cuboid
                    && waypoint.secondary().is_none(),
            });
        }

        changes
    }

    /// Setzt den Radius der getroffenen Wegpunkte und erzwingt Radius-Typ
    pub fn set_radius(&mut self, filter: WaypointFilter<'_>, radius: f64) -> Vec<WaypointId> {
        let ids = self.matching_ids(filter);
        for id in &ids {
            if let Some(waypoint) = self.waypoints.get_mut(id) {
                waypoint.set_kind(RegionKind::Radius);
                waypoint.set_radius(radius);
            }
        }
        ids
    }

    /// Setzt oder toggelt das Enabled-Flag der getroffenen Wegpunkte
    pub fn set_enabled(&mut self, filter: WaypointFilter<'_>, update: FlagUpdate) -> Vec<WaypointId> {
        let ids = self.matching_ids(filter);
        for &id in &ids {
            let value = self.resolve_flag_update(id, update, Self::is_enabled);
            if let Some(waypoint) = self.waypoints.get_mut(&id) {
                waypoint.set_enabled(value);
            }
        }
        ids
    }

    /// Setzt oder toggelt das Gratis-Flag der getroffenen Wegpunkte
    pub fn set_free(&mut self, filter: WaypointFilter<'_>, update: FlagUpdate) -> Vec<WaypointId> {
        let ids = self.matching_ids(filter);
        for &id in &ids {
            let value = self.resolve_flag_update(id, update, Self::is_free);
            if let Some(waypoint) = self.waypoints.get_mut(&id) {
                waypoint.set_free(value);
            }
        }
        ids
    }

    /// Setzt oder toggelt die Entdeckungspflicht der getroffenen Wegpunkte
    pub fn set_requires_discovery(
        &mut self,
        filter: WaypointFilter<'_>,
        update: FlagUpdate,
    ) -> Vec<WaypointId> {
        let ids = self.matching_ids(filter);
        for &id in &ids {
            let value = self.resolve_flag_update(id, update, Self::requires_discovery);
            if let Some(waypoint) = self.waypoints.get_mut(&id) {
                waypoint.set_require_discovery(value);
            }
        }
        ids
    }

    /// Setzt oder toggelt die Berechtigungspflicht der getroffenen Wegpunkte
    pub fn set_requires_permission(
        &mut self,
        filter: WaypointFilter<'_>,
        update: FlagUpdate,
    ) -> Vec<WaypointId> {
        let ids = self.matching_ids(filter);
        for &id in &ids {
            let value = self.resolve_flag_update(id, update, Self::requires_permission);
            if let Some(waypoint) = self.waypoints.get_mut(&id) {
                waypoint.set_require_permissions(value);
            }
        }
        ids
    }

    /// Setzt oder toggelt das Multiworld-Flag der getroffenen Wegpunkte
    pub fn set_multiworld(
        &mut self,
        filter: WaypointFilter<'_>,
        update: FlagUpdate,
    ) -> Vec<WaypointId> {
        let ids = self.matching_ids(filter);
        for &id in &ids {
            let value = self.resolve_flag_update(id, update, Self::is_multiworld);
            if let Some(waypoint) = self.waypoints.get_mut(&id) {
                waypoint.set_multiworld(value);
            }
        }
        ids
    }

    /// Neuer expliziter Flag-Wert: direkt übernommen oder aus dem
    /// effektiven Wert gekippt
    fn resolve_flag_update(
        &self,
        id: WaypointId,
        update: FlagUpdate,
        effective: fn(&Self, &Waypoint) -> bool,
    ) -> bool {
        match update {
            FlagUpdate::Set(value) => value,
            FlagUpdate::Toggle => {
                let current = self
                    .waypoints
                    .get(&id)
                    .map(|wp| effective(self, wp))
                    .unwrap_or_default();
                !current
            }
        }
    }

    // ── Anker ───────────────────────────────────────────────────────

    /// Verschiebt den Primäranker auf die Position des Akteurs.
    ///
    /// Der Akteur muss dazu in der Welt des Wegpunkts stehen — ein Wegpunkt
    /// wandert nicht per Fernbefehl in eine andere Welt.
    pub fn update_primary(
        &mut self,
        id: WaypointId,
        actor_location: &Coordinate,
        move_destination: bool,
    ) -> Result<(), RegistryError> {
        let waypoint = self
            .waypoints
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        if actor_location.world != waypoint.primary().world {
            return Err(RegistryError::WrongWorld(waypoint.name().to_string()));
        }

        waypoint.set_primary(actor_location, move_destination);
        Ok(())
    }

    /// Setzt den Sekundäranker auf die Position des Akteurs (gleiche Weltregel)
    pub fn update_secondary(
        &mut self,
        id: WaypointId,
        actor_location: &Coordinate,
    ) -> Result<(), RegistryError> {
        let waypoint = self
            .waypoints
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        if actor_location.world != waypoint.primary().world {
            return Err(RegistryError::WrongWorld(waypoint.name().to_string()));
        }

        waypoint.set_secondary(actor_location);
        Ok(())
    }

    /// Setzt das Teleportziel eines Wegpunkts
    pub fn update_destination(
        &mut self,
        id: WaypointId,
        location: &Coordinate,
    ) -> Result<(), RegistryError> {
        let waypoint = self
            .waypoints
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        waypoint.set_destination(location);
        Ok(())
    }

    // ── Preis-Overrides ─────────────────────────────────────────────

    /// Setzt einen festen Preis für Reisen von `origin` nach `target`
    pub fn set_charge_from(
        &mut self,
        target: WaypointId,
        origin: WaypointId,
        price: f64,
    ) -> Result<(), RegistryError> {
        if !self.waypoints.contains_key(&origin) {
            return Err(RegistryError::NotFound(origin.to_string()));
        }
        let waypoint = self
            .waypoints
            .get_mut(&target)
            .ok_or_else(|| RegistryError::NotFound(target.to_string()))?;
        waypoint.set_charge_from(origin, price);
        Ok(())
    }

    /// Fester Preis für Reisen von `origin` nach `target`, falls konfiguriert
    pub fn charge_from(
        &self,
        target: WaypointId,
        origin: WaypointId,
    ) -> Result<Option<f64>, RegistryError> {
        let waypoint = self
            .waypoints
            .get(&target)
            .ok_or_else(|| RegistryError::NotFound(target.to_string()))?;
        Ok(waypoint.charge_from(origin))
    }

    /// Entfernt den festen Preis für Reisen von `origin` nach `target`
    pub fn reset_charge_from(
        &mut self,
        target: WaypointId,
        origin: WaypointId,
    ) -> Result<(), RegistryError> {
        let waypoint = self
            .waypoints
            .get_mut(&target)
            .ok_or_else(|| RegistryError::NotFound(target.to_string()))?;
        waypoint.reset_charge_from(origin);
        Ok(())
    }

    // ── Entdeckung ──────────────────────────────────────────────────

    /// Vermerkt dass der Akteur den Wegpunkt entdeckt hat
    pub fn mark_discovered(&mut self, id: WaypointId, actor: &str) -> Result<(), RegistryError> {
        let waypoint = self
            .waypoints
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        waypoint.mark_discovered(actor);
        Ok(())
    }

    /// Löscht sämtliche Entdeckungen eines Wegpunkts
    pub fn reset_discovery(&mut self, id: WaypointId) -> Result<(), RegistryError> {
        let waypoint = self
            .waypoints
            .get_mut(&id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        waypoint.reset_discovery();
        Ok(())
    }

    // ── Kosten ──────────────────────────────────────────────────────

    /// Reisekosten zum Zielwegpunkt, mit aufgelösten Gratis-Flags.
    ///
    /// Die eigentliche Formel lebt in [`pricing::travel_cost`]; hier werden
    /// nur die effektiven Flags beider Endpunkte aufgelöst.
    pub fn travel_cost(
        &self,
        origin: TravelOrigin<'_>,
        destination: WaypointId,
    ) -> Result<i64, RegistryError> {
        let target = self
            .waypoints
            .get(&destination)
            .ok_or_else(|| RegistryError::NotFound(destination.to_string()))?;

        let origin_free = match origin {
            TravelOrigin::Waypoint(waypoint) => self.is_free(waypoint),
            TravelOrigin::Position(_) => false,
        };
        let free_travel = origin_free || self.is_free(target);

        Ok(pricing::travel_cost(origin, target, free_travel, &self.options.pricing))
    }
}

impl Default for WaypointRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Prüft einen vom Aufrufer gelieferten Namen und liefert den
/// kleingeschriebenen Schlüssel.
///
/// Die Kommandoschicht validiert Namen bereits, aber die Registry verteidigt
/// sich zusätzlich gegen direkten Missbrauch: mindestens ein Buchstabe,
/// kein reserviertes Schlüsselwort.
fn validate_name(name: &str) -> Result<String, RegistryError> {
    let key = name.trim().to_lowercase();

    if key.is_empty() || !key.chars().any(|c| c.is_alphabetic()) {
        return Err(RegistryError::InvalidName(name.to_string()));
    }

    if RESERVED_NAMES.contains(&key.as_str()) {
        return Err(RegistryError::InvalidName(name.to_string()));
    }

    Ok(key)
}
