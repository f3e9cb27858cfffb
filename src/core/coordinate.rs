//! Welt-qualifizierte Koordinaten und Blockpositionen.

use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};

/// Bezeichner einer Welt (z.B. "world" oder "world_nether").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(String);

impl WorldId {
    /// Erstellt einen neuen Welt-Bezeichner
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Gibt den Namen der Welt zurück
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

/// Eine welt-qualifizierte Position mit Blickrichtung.
///
/// Reiner Wert ohne Verhalten; Distanz- und Block-Helfer sind die einzigen
/// Operationen. Yaw/Pitch sind nur für Teleport-Ziele relevant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Welt in der die Position liegt
    pub world: WorldId,
    /// Position in Welteinheiten
    pub position: DVec3,
    /// Blickrichtung horizontal (Grad)
    pub yaw: f32,
    /// Blickrichtung vertikal (Grad)
    pub pitch: f32,
}

impl Coordinate {
    /// Erstellt eine Koordinate ohne Blickrichtung
    pub fn new(world: impl Into<WorldId>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            position: DVec3::new(x, y, z),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Erstellt eine Koordinate mit Blickrichtung
    pub fn with_look(world: impl Into<WorldId>, position: DVec3, yaw: f32, pitch: f32) -> Self {
        Self {
            world: world.into(),
            position,
            yaw,
            pitch,
        }
    }

    /// Blockposition: komponentenweise abgerundet (auch für negative Achsen korrekt)
    pub fn block_pos(&self) -> IVec3 {
        self.position.floor().as_ivec3()
    }

    /// Kopie dieser Koordinate, auf die Blockposition gerastert, Blickrichtung verworfen
    pub fn block_aligned(&self) -> Coordinate {
        Coordinate {
            world: self.world.clone(),
            position: self.position.floor(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    /// Prüft ob beide Koordinaten in derselben Welt liegen
    pub fn same_world(&self, other: &Coordinate) -> bool {
        self.world == other.world
    }

    /// Quadrierte euklidische Distanz (für Radius-Vergleiche ohne Wurzel)
    pub fn distance_squared(&self, other: &Coordinate) -> f64 {
        self.position.distance_squared(other.position)
    }

    /// Manhattan-Distanz über Blockkoordinaten (Basis der Reisekosten)
    pub fn manhattan_block_distance(&self, other: &Coordinate) -> i64 {
        let a = self.block_pos();
        let b = other.block_pos();
        (a.x - b.x).unsigned_abs() as i64
            + (a.y - b.y).unsigned_abs() as i64
            + (a.z - b.z).unsigned_abs() as i64
    }
}
