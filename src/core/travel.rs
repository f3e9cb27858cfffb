//! Der Reiseablauf: Gates, Bezahlung, Zielreparatur.
//!
//! [`execute_travel`] bündelt die komplette Prüfkette einer Reise. Die
//! Einbettung liefert Berechtigungen, Konto und Weltzugriff über Traits;
//! die Engine entscheidet nur, nicht wie teleportiert wird.

use super::coordinate::Coordinate;
use super::pricing::TravelOrigin;
use super::registry::{RegistryError, WaypointRegistry};
use super::safety::{self, BlockAccess};

/// Berechtigungsabfrage der Einbettung
pub trait PermissionSource {
    /// Prüft ob der Akteur den Berechtigungsknoten trägt
    fn has_permission(&self, actor: &str, node: &str) -> bool;
}

/// Kontozugriff der Einbettung
pub trait Economy {
    /// Prüft ob der Akteur den Betrag aufbringen kann
    fn has(&self, actor: &str, amount: i64) -> bool;

    /// Bucht den Betrag vom Konto des Akteurs ab
    fn withdraw(&mut self, actor: &str, amount: i64) -> Result<(), InsufficientFunds>;
}

/// Das Konto deckt die Reisekosten nicht.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Guthaben reicht nicht: {required} benötigt")]
pub struct InsufficientFunds {
    /// Geforderter Betrag
    pub required: i64,
}

/// Gründe aus denen eine Reise abgelehnt wird.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TravelError {
    /// Fehler beim Auflösen des Ziels
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Das Ziel ist deaktiviert
    #[error("Wegpunkt \"{0}\" ist deaktiviert")]
    Disabled(String),
    /// Der Akteur steht bereits in der Region des Ziels
    #[error("Bereits bei Wegpunkt \"{0}\"")]
    AlreadyThere(String),
    /// Der Akteur hat das Ziel noch nicht entdeckt
    #[error("Wegpunkt \"{0}\" wurde noch nicht entdeckt")]
    NotDiscovered(String),
    /// Dem Akteur fehlt der Berechtigungsknoten des Ziels
    #[error("Keine Berechtigung für Wegpunkt \"{0}\"")]
    NoPermission(String),
    /// Das Ziel liegt in einer anderen Welt und ist nicht multiworld-fähig
    #[error("Wegpunkt \"{0}\" ist aus dieser Welt nicht erreichbar")]
    WrongWorld(String),
    /// Das Konto deckt die Kosten nicht
    #[error(transparent)]
    InsufficientFunds(#[from] InsufficientFunds),
}

/// Führt die komplette Prüfkette einer Reise aus und liefert die Koordinate
/// an die die Einbettung den Akteur teleportieren soll.
///
/// Reihenfolge der Gates: Ziel auflösen, Enabled, Entdeckung, Berechtigung,
/// Weltgrenze, Bezahlung. Erst wenn alles passiert ist, wird abgebucht und
/// das Zielumfeld repariert. Schlägt ein Gate fehl, wurde weder Geld bewegt
/// noch ein Block verändert.
pub fn execute_travel(
    registry: &WaypointRegistry,
    actor: &str,
    actor_location: &Coordinate,
    destination_name: &str,
    permissions: &dyn PermissionSource,
    economy: &mut dyn Economy,
    blocks: &mut dyn BlockAccess,
) -> Result<Coordinate, TravelError> {
    let destination_id = registry.resolve(destination_name)?;
    let destination = registry
        .get(destination_id)
        .ok_or_else(|| RegistryError::NotFound(destination_name.to_string()))?;

    if !registry.is_enabled(destination) {
        return Err(TravelError::Disabled(destination.display_name().to_string()));
    }

    if registry.requires_discovery(destination) && !destination.is_discovered_by(actor) {
        return Err(TravelError::NotDiscovered(
            destination.display_name().to_string(),
        ));
    }

    if registry.requires_permission(destination)
        && !permissions.has_permission(actor, &destination.permission_node())
    {
        return Err(TravelError::NoPermission(
            destination.display_name().to_string(),
        ));
    }

    // Steht der Akteur in der Region eines Wegpunkts, zählt dieser als
    // Ursprung (Teleportziel als Messpunkt, Overrides erreichbar)
    let origin_waypoint = registry.locate(actor_location);

    // Reise zum eigenen Standort-Wegpunkt ist sinnlos und würde über einen
    // Override trotzdem Geld kosten
    if origin_waypoint.map(|waypoint| waypoint.id()) == Some(destination_id) {
        return Err(TravelError::AlreadyThere(
            destination.display_name().to_string(),
        ));
    }

    let origin = match origin_waypoint {
        Some(waypoint) => TravelOrigin::Waypoint(waypoint),
        None => TravelOrigin::Position(actor_location),
    };

    // Weltgrenze: weltübergreifend nur wenn beide Endpunkte es erlauben;
    // eine freie Position erlaubt es genau dann, wenn der Registry-Standard
    // weltübergreifende Reisen vorsieht
    if actor_location.world != destination.target_location().world {
        let origin_allows = origin_waypoint
            .map(|waypoint| registry.is_multiworld(waypoint))
            .unwrap_or(registry.options().multiworld_by_default);
        if !origin_allows || !registry.is_multiworld(destination) {
            return Err(TravelError::WrongWorld(
                destination.display_name().to_string(),
            ));
        }
    }

    let cost = registry.travel_cost(origin, destination_id)?;
    if cost > 0 {
        economy.withdraw(actor, cost)?;
        log::debug!(
            "{} zahlt {} für Reise nach \"{}\"",
            actor,
            cost,
            destination.display_name()
        );
    }

    let target = destination.target_location();
    if registry.options().enable_safety_checks {
        Ok(safety::make_safe(target, blocks))
    } else {
        Ok(target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::registry::{FlagUpdate, WaypointFilter};
    use crate::core::safety::BlockType;
    use glam::IVec3;
    use std::collections::{HashMap, HashSet};

    struct AllowAll;

    impl PermissionSource for AllowAll {
        fn has_permission(&self, _actor: &str, _node: &str) -> bool {
            true
        }
    }

    struct NodeSet(HashSet<String>);

    impl PermissionSource for NodeSet {
        fn has_permission(&self, _actor: &str, node: &str) -> bool {
            self.0.contains(node)
        }
    }

    struct Wallet {
        balance: i64,
        withdrawn: i64,
    }

    impl Wallet {
        fn with(balance: i64) -> Self {
            Self {
                balance,
                withdrawn: 0,
            }
        }
    }

    impl Economy for Wallet {
        fn has(&self, _actor: &str, amount: i64) -> bool {
            self.balance >= amount
        }

        fn withdraw(&mut self, _actor: &str, amount: i64) -> Result<(), InsufficientFunds> {
            if self.balance < amount {
                return Err(InsufficientFunds { required: amount });
            }
            self.balance -= amount;
            self.withdrawn += amount;
            Ok(())
        }
    }

    /// Luft-Welt mit festem Boden überall
    struct FlatWorld {
        changed: HashMap<IVec3, BlockType>,
    }

    impl FlatWorld {
        fn new() -> Self {
            Self {
                changed: HashMap::new(),
            }
        }
    }

    impl BlockAccess for FlatWorld {
        fn block_type(&self, _world: &WorldId, pos: IVec3) -> BlockType {
            if let Some(block) = self.changed.get(&pos) {
                return *block;
            }
            if pos.y < 64 {
                BlockType::Solid
            } else {
                BlockType::Air
            }
        }

        fn set_block_type(&mut self, _world: &WorldId, pos: IVec3, block: BlockType) {
            self.changed.insert(pos, block);
        }
    }

    use crate::core::coordinate::WorldId;

    fn registry_with_market() -> WaypointRegistry {
        let mut registry = WaypointRegistry::new();
        registry
            .create("market", &Coordinate::new("world", 100.0, 64.0, 0.0))
            .expect("Erstellung fehlgeschlagen");
        // Entdeckungspflicht global aus, Tests aktivieren sie gezielt
        registry.options_mut().require_discovery_by_default = false;
        registry
    }

    fn here() -> Coordinate {
        Coordinate::new("world", 0.0, 64.0, 0.0)
    }

    #[test]
    fn successful_travel_charges_and_returns_target() {
        let registry = registry_with_market();
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        let target = execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");

        assert_eq!(target.position.x, 100.0);
        // Distanz 100, Faktor 0.8 → 80
        assert_eq!(wallet.withdrawn, 80);
    }

    #[test]
    fn unknown_destination_is_rejected() {
        let registry = registry_with_market();
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        let err = execute_travel(
            &registry,
            "alice",
            &here(),
            "nowhere",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TravelError::Registry(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn disabled_destination_is_rejected() {
        let mut registry = registry_with_market();
        let id = registry.resolve("market").expect("market fehlt");
        registry.set_enabled(WaypointFilter::One(id), FlagUpdate::Set(false));
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        let err = execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();

        assert_eq!(err, TravelError::Disabled("market".to_string()));
        assert_eq!(wallet.withdrawn, 0);
    }

    #[test]
    fn undiscovered_destination_is_rejected_until_marked() {
        let mut registry = registry_with_market();
        let id = registry.resolve("market").expect("market fehlt");
        registry.set_requires_discovery(WaypointFilter::One(id), FlagUpdate::Set(true));
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        let err = execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();
        assert_eq!(err, TravelError::NotDiscovered("market".to_string()));

        registry.mark_discovered(id, "alice").expect("market fehlt");
        execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");
    }

    #[test]
    fn permission_gate_uses_the_legacy_node() {
        let mut registry = registry_with_market();
        let id = registry.resolve("market").expect("market fehlt");
        registry.set_requires_permission(WaypointFilter::One(id), FlagUpdate::Set(true));
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        let err = execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &NodeSet(HashSet::new()),
            &mut wallet,
            &mut world,
        )
        .unwrap_err();
        assert_eq!(err, TravelError::NoPermission("market".to_string()));

        let mut nodes = HashSet::new();
        nodes.insert("qt.usemarket".to_string());
        execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &NodeSet(nodes),
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");
    }

    #[test]
    fn cross_world_needs_multiworld_on_both_ends() {
        let mut registry = registry_with_market();
        registry
            .create("nexus", &Coordinate::new("world_nether", 0.0, 64.0, 0.0))
            .expect("Erstellung fehlgeschlagen");
        let nexus = registry.resolve("nexus").expect("nexus fehlt");
        let market = registry.resolve("market").expect("market fehlt");
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        // Akteur steht in der Market-Region, Ziel in anderer Welt
        let in_market = Coordinate::new("world", 101.0, 64.0, 0.0);

        let err = execute_travel(
            &registry,
            "alice",
            &in_market,
            "nexus",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();
        assert_eq!(err, TravelError::WrongWorld("nexus".to_string()));

        // Nur das Ziel multiworld: immer noch abgelehnt
        registry.set_multiworld(WaypointFilter::One(nexus), FlagUpdate::Set(true));
        let err = execute_travel(
            &registry,
            "alice",
            &in_market,
            "nexus",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();
        assert_eq!(err, TravelError::WrongWorld("nexus".to_string()));

        // Beide Enden multiworld: Reise klappt
        registry.set_multiworld(WaypointFilter::One(market), FlagUpdate::Set(true));
        execute_travel(
            &registry,
            "alice",
            &in_market,
            "nexus",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");
    }

    #[test]
    fn cross_world_from_free_position_follows_the_registry_default() {
        let mut registry = registry_with_market();
        registry
            .create("nexus", &Coordinate::new("world_nether", 0.0, 64.0, 0.0))
            .expect("Erstellung fehlgeschlagen");
        let nexus = registry.resolve("nexus").expect("nexus fehlt");
        registry.set_multiworld(WaypointFilter::One(nexus), FlagUpdate::Set(true));
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        // Standard "kein multiworld": freie Position wird abgelehnt
        let err = execute_travel(
            &registry,
            "alice",
            &here(),
            "nexus",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();
        assert_eq!(err, TravelError::WrongWorld("nexus".to_string()));

        // Mit multiworld-Standard an zählt die freie Position als fähig
        registry.options_mut().multiworld_by_default = true;
        execute_travel(
            &registry,
            "alice",
            &here(),
            "nexus",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");
    }

    #[test]
    fn insufficient_funds_abort_before_any_block_change() {
        let mut registry = registry_with_market();
        let id = registry.resolve("market").expect("market fehlt");
        // Ziel absichtlich in einen verschütteten Punkt legen
        registry
            .update_destination(id, &Coordinate::new("world", 100.0, 60.0, 0.0))
            .expect("market fehlt");
        let mut wallet = Wallet::with(5);
        let mut world = FlatWorld::new();

        let err = execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();

        assert!(matches!(err, TravelError::InsufficientFunds(_)));
        assert_eq!(wallet.withdrawn, 0);
        assert!(world.changed.is_empty());
    }

    #[test]
    fn free_destination_skips_the_wallet() {
        let mut registry = registry_with_market();
        let id = registry.resolve("market").expect("market fehlt");
        registry.set_free(WaypointFilter::One(id), FlagUpdate::Set(true));
        let mut wallet = Wallet::with(0);
        let mut world = FlatWorld::new();

        execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");
        assert_eq!(wallet.withdrawn, 0);
    }

    #[test]
    fn safety_repair_runs_on_the_destination() {
        let mut registry = registry_with_market();
        let id = registry.resolve("market").expect("market fehlt");
        // Ziel unter der Bodenlinie: Füße und Kopf stecken im Fels
        registry
            .update_destination(id, &Coordinate::new("world", 100.0, 60.0, 0.0))
            .expect("market fehlt");
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");

        assert_eq!(
            world.changed.get(&IVec3::new(100, 60, 0)),
            Some(&BlockType::Air)
        );
        assert_eq!(
            world.changed.get(&IVec3::new(100, 61, 0)),
            Some(&BlockType::Air)
        );
    }

    #[test]
    fn safety_repair_can_be_disabled() {
        let mut registry = registry_with_market();
        registry.options_mut().enable_safety_checks = false;
        let id = registry.resolve("market").expect("market fehlt");
        registry
            .update_destination(id, &Coordinate::new("world", 100.0, 60.0, 0.0))
            .expect("market fehlt");
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        execute_travel(
            &registry,
            "alice",
            &here(),
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");

        assert!(world.changed.is_empty());
    }

    #[test]
    fn travel_to_the_waypoint_one_stands_at_is_rejected() {
        let mut registry = registry_with_market();
        let market = registry.resolve("market").expect("market fehlt");
        // Selbst mit Override darf die Null-Reise nichts kosten
        registry
            .set_charge_from(market, market, 5.0)
            .expect("Override fehlgeschlagen");
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        // Akteur steht mitten in der Market-Region
        let in_market = Coordinate::new("world", 101.0, 64.0, 0.0);
        let err = execute_travel(
            &registry,
            "alice",
            &in_market,
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .unwrap_err();

        assert_eq!(err, TravelError::AlreadyThere("market".to_string()));
        assert_eq!(wallet.withdrawn, 0);
    }

    #[test]
    fn origin_override_prices_the_trip() {
        let mut registry = registry_with_market();
        registry
            .create("harbour", &Coordinate::new("world", 0.0, 64.0, 0.0))
            .expect("Erstellung fehlgeschlagen");
        let harbour = registry.resolve("harbour").expect("harbour fehlt");
        let market = registry.resolve("market").expect("market fehlt");
        registry
            .set_charge_from(market, harbour, 3.0)
            .expect("Override fehlgeschlagen");
        let mut wallet = Wallet::with(1000);
        let mut world = FlatWorld::new();

        // Akteur steht in der Harbour-Region: Override greift
        let in_harbour = Coordinate::new("world", 1.0, 64.0, 0.0);
        execute_travel(
            &registry,
            "alice",
            &in_harbour,
            "market",
            &AllowAll,
            &mut wallet,
            &mut world,
        )
        .expect("Reise fehlgeschlagen");

        assert_eq!(wallet.withdrawn, 3);
    }
}
