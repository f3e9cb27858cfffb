//! Integrationstests: kompletter Reiseablauf über die Library-Schnittstelle.

use std::collections::{HashMap, HashSet};

use glam::IVec3;
use quicktravel_engine::core::TravelOrigin;
use quicktravel_engine::{
    execute_travel, BlockAccess, BlockType, Coordinate, Economy, EngineOptions, FlagUpdate,
    InsufficientFunds, PermissionSource, TravelError, WaypointFilter, WaypointRegistry, WorldId,
};

struct Permissions(HashSet<String>);

impl Permissions {
    fn none() -> Self {
        Self(HashSet::new())
    }

    fn with(node: &str) -> Self {
        let mut nodes = HashSet::new();
        nodes.insert(node.to_string());
        Self(nodes)
    }
}

impl PermissionSource for Permissions {
    fn has_permission(&self, _actor: &str, node: &str) -> bool {
        self.0.contains(node)
    }
}

struct Wallet {
    balance: i64,
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
        Ok(())
    }
}

/// Flache Welt: fester Boden unter y=64, Lava-Seen wo konfiguriert
struct TestWorld {
    lava: HashSet<IVec3>,
    changed: HashMap<IVec3, BlockType>,
}

impl TestWorld {
    fn flat() -> Self {
        Self {
            lava: HashSet::new(),
            changed: HashMap::new(),
        }
    }

    fn with_lava(mut self, x: i32, y: i32, z: i32) -> Self {
        self.lava.insert(IVec3::new(x, y, z));
        self
    }
}

impl BlockAccess for TestWorld {
    fn block_type(&self, _world: &WorldId, pos: IVec3) -> BlockType {
        if let Some(block) = self.changed.get(&pos) {
            return *block;
        }
        if self.lava.contains(&pos) {
            return BlockType::Lava;
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

fn setup() -> WaypointRegistry {
    let mut options = EngineOptions::default();
    options.require_discovery_by_default = false;
    let mut registry = WaypointRegistry::with_options(options);
    registry
        .create("spawn", &Coordinate::new("world", 0.0, 64.0, 0.0))
        .expect("Erstellung fehlgeschlagen");
    registry
        .create("market", &Coordinate::new("world", 100.0, 64.0, 0.0))
        .expect("Erstellung fehlgeschlagen");
    registry
}

#[test]
fn full_trip_from_waypoint_to_waypoint() {
    let registry = setup();
    let mut wallet = Wallet { balance: 1000 };
    let mut world = TestWorld::flat();

    // Akteur steht in der Spawn-Region
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);
    let target = execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .expect("Reise fehlgeschlagen");

    assert_eq!(target.world.as_str(), "world");
    assert_eq!(target.position.x, 100.0);
    // Gemessen ab dem Spawn-Anker: Distanz 100, ×0.8 = 80
    assert_eq!(wallet.balance, 920);
}

#[test]
fn discovery_gate_blocks_until_the_waypoint_is_found() {
    let mut registry = setup();
    let market = registry.resolve("market").expect("market fehlt");
    registry.set_requires_discovery(WaypointFilter::One(market), FlagUpdate::Set(true));
    let mut wallet = Wallet { balance: 1000 };
    let mut world = TestWorld::flat();
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);

    let err = execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .unwrap_err();
    assert!(matches!(err, TravelError::NotDiscovered(_)));
    assert_eq!(wallet.balance, 1000);

    // Akteur betritt die Region: Einbettung meldet die Entdeckung
    registry.mark_discovered(market, "alice").expect("market fehlt");
    execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .expect("Reise fehlgeschlagen");
}

#[test]
fn permission_gate_checks_the_destination_node() {
    let mut registry = setup();
    let market = registry.resolve("market").expect("market fehlt");
    registry.set_requires_permission(WaypointFilter::One(market), FlagUpdate::Set(true));
    let mut wallet = Wallet { balance: 1000 };
    let mut world = TestWorld::flat();
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);

    let err = execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .unwrap_err();
    assert_eq!(err, TravelError::NoPermission("market".to_string()));

    execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::with("qt.usemarket"),
        &mut wallet,
        &mut world,
    )
    .expect("Reise fehlgeschlagen");
}

#[test]
fn lava_at_the_destination_is_repaired_before_arrival() {
    let mut registry = setup();
    let market = registry.resolve("market").expect("market fehlt");
    registry
        .update_destination(market, &Coordinate::new("world", 100.0, 64.0, 0.0))
        .expect("market fehlt");
    let mut wallet = Wallet { balance: 1000 };
    let mut world = TestWorld::flat().with_lava(101, 64, 0).with_lava(100, 63, 0);
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);

    execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .expect("Reise fehlgeschlagen");

    // Lava im Fußring verglast, brennender Boden wird zur Glasplatte
    assert_eq!(world.changed.get(&IVec3::new(101, 64, 0)), Some(&BlockType::Glass));
    assert_eq!(world.changed.get(&IVec3::new(100, 63, 0)), Some(&BlockType::Glass));
}

#[test]
fn charged_trip_fails_cleanly_on_an_empty_wallet() {
    let registry = setup();
    let mut wallet = Wallet { balance: 10 };
    let mut world = TestWorld::flat();
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);

    let err = execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .unwrap_err();

    assert!(matches!(err, TravelError::InsufficientFunds(_)));
    assert_eq!(wallet.balance, 10);
    assert!(world.changed.is_empty());
}

#[test]
fn free_origin_makes_the_whole_trip_free() {
    let mut registry = setup();
    let spawn = registry.resolve("spawn").expect("spawn fehlt");
    registry.set_free(WaypointFilter::One(spawn), FlagUpdate::Set(true));
    let mut wallet = Wallet { balance: 0 };
    let mut world = TestWorld::flat();
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);

    execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .expect("Reise fehlgeschlagen");
    assert_eq!(wallet.balance, 0);
}

#[test]
fn cost_preview_matches_what_the_trip_charges() {
    let registry = setup();
    let market = registry.resolve("market").expect("market fehlt");
    let here = Coordinate::new("world", 1.0, 64.0, 0.0);

    let origin = registry.locate(&here).expect("Treffer erwartet");
    let preview = registry
        .travel_cost(TravelOrigin::Waypoint(origin), market)
        .expect("Kosten fehlgeschlagen");

    let mut wallet = Wallet { balance: 1000 };
    let mut world = TestWorld::flat();
    execute_travel(
        &registry,
        "alice",
        &here,
        "market",
        &Permissions::none(),
        &mut wallet,
        &mut world,
    )
    .expect("Reise fehlgeschlagen");

    assert_eq!(1000 - wallet.balance, preview);
}
