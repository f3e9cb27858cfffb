//! Sicherheitsreparatur des Teleportziels.
//!
//! Vor jedem Teleport wird eine 3×3-Säule um das Ziel (fünf Lagen, von zwei
//! unter den Füßen bis zwei über dem Kopf) inspiziert und so repariert, dass
//! der Akteur weder erstickt noch fällt noch in Lava landet. Die Reparatur
//! mutiert die Welt über [`BlockAccess`]; die Zielkoordinate selbst bleibt
//! unverändert.

use glam::IVec3;

use super::coordinate::{Coordinate, WorldId};

/// Blocktypen die für die Reparatur unterschieden werden.
///
/// Alles was die Reparatur nicht kennt, meldet der Welt-Adapter als
/// [`BlockType::Solid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// Leerer Block, begehbar
    Air,
    /// Fließende Lava
    Lava,
    /// Stehende Lava
    StationaryLava,
    /// Reparaturmaterial für Lava-Abdichtung und Bodenplatten
    Glass,
    /// Jeder sonstige Block
    Solid,
}

impl BlockType {
    /// Fließende oder stehende Lava
    pub fn is_lava(self) -> bool {
        matches!(self, BlockType::Lava | BlockType::StationaryLava)
    }
}

/// Lese- und Schreibzugriff auf Blöcke der Welt.
///
/// Die Engine kennt keine Weltdaten; der Einbettende liefert den Adapter.
pub trait BlockAccess {
    /// Blocktyp an der angegebenen Position
    fn block_type(&self, world: &WorldId, pos: IVec3) -> BlockType;

    /// Setzt den Blocktyp an der angegebenen Position
    fn set_block_type(&mut self, world: &WorldId, pos: IVec3, block: BlockType);

    /// Prüft ob die Position leer (Luft) ist
    fn is_empty(&self, world: &WorldId, pos: IVec3) -> bool {
        self.block_type(world, pos) == BlockType::Air
    }
}

/// Die acht horizontalen Nachbarn einer Zelle (x/z-Versatz)
const LATERAL_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

/// Repariert das Umfeld des Teleportziels und gibt das Ziel zurück.
///
/// Ablauf, Lage für Lage (Basis ist die Blockposition des Ziels):
///
/// 1. Fuß- und Kopfzelle werden freigeräumt, Lava im jeweiligen Ring wird
///    verglast.
/// 2. Lava in der Deckenlage wird verglast; brennt der Deckenring, wird
///    zusätzlich die Deckenmitte abgedichtet.
/// 3. Fehlt der Boden oder besteht er aus Lava, entsteht eine Glasplatte;
///    sonst wird die Platte nur dort erweitert, wo der Fußring frisch
///    verglast wurde.
/// 4. Lava direkt unter frisch gelegtem Glasboden wird ebenfalls verglast,
///    damit die Platte nicht auf offener Lava schwimmt.
///
/// Die Sub-Boden-Abdichtung greift nur wenn vorher tatsächlich etwas
/// repariert wurde; ein bereits sicheres Ziel bleibt komplett unangetastet.
pub fn make_safe(target: &Coordinate, blocks: &mut dyn BlockAccess) -> Coordinate {
    let world = &target.world;
    let feet = target.block_pos();
    let head = feet + IVec3::Y;
    let ceiling = feet + IVec3::new(0, 2, 0);
    let floor = feet - IVec3::Y;
    let sub_floor = feet - IVec3::new(0, 2, 0);

    let ring = |center: IVec3| {
        LATERAL_OFFSETS.map(|(dx, dz)| IVec3::new(center.x + dx, center.y, center.z + dz))
    };

    let mut fixed = false;

    // Fußlage: Mitte freiräumen, Lava im Ring verglasen
    if !blocks.is_empty(world, feet) {
        blocks.set_block_type(world, feet, BlockType::Air);
        fixed = true;
    }
    for cell in ring(feet) {
        if blocks.block_type(world, cell).is_lava() {
            blocks.set_block_type(world, cell, BlockType::Glass);
            fixed = true;
        }
    }

    // Kopflage: gleiche Behandlung
    if !blocks.is_empty(world, head) {
        blocks.set_block_type(world, head, BlockType::Air);
        fixed = true;
    }
    for cell in ring(head) {
        if blocks.block_type(world, cell).is_lava() {
            blocks.set_block_type(world, cell, BlockType::Glass);
            fixed = true;
        }
    }

    // Deckenlage: Lava verglasen; Ringfunde dichten zusätzlich die Mitte ab,
    // damit von schräg oben nichts in die Säule nachfließt
    if blocks.block_type(world, ceiling).is_lava() {
        blocks.set_block_type(world, ceiling, BlockType::Glass);
        fixed = true;
    }
    for cell in ring(ceiling) {
        if blocks.block_type(world, cell).is_lava() {
            blocks.set_block_type(world, cell, BlockType::Glass);
            blocks.set_block_type(world, ceiling, BlockType::Glass);
            fixed = true;
        }
    }

    // Bodenlage: fehlender oder brennender Boden wird zur Glasplatte
    let floor_center = blocks.block_type(world, floor);
    if floor_center.is_lava() || floor_center == BlockType::Air {
        blocks.set_block_type(world, floor, BlockType::Glass);
        fixed = true;
        for cell in ring(floor) {
            if blocks.block_type(world, cell).is_lava() {
                blocks.set_block_type(world, cell, BlockType::Glass);
            }
        }
    } else if fixed {
        // Boden trägt, aber der Fußring wurde frisch verglast: die Platte
        // darunter fortsetzen, damit man neben dem Glas nicht durchfällt
        for (index, cell) in ring(feet).into_iter().enumerate() {
            if blocks.block_type(world, cell) == BlockType::Glass {
                let below = ring(floor)[index];
                blocks.set_block_type(world, below, BlockType::Glass);
            }
        }
    }

    // Sub-Bodenlage: Lava direkt unter frisch gelegtem Glas wird verglast
    if fixed {
        if blocks.block_type(world, sub_floor).is_lava()
            && blocks.block_type(world, floor) == BlockType::Glass
        {
            blocks.set_block_type(world, sub_floor, BlockType::Glass);
        }
        for (index, cell) in ring(sub_floor).into_iter().enumerate() {
            let above = ring(floor)[index];
            if blocks.block_type(world, cell).is_lava()
                && blocks.block_type(world, above) == BlockType::Glass
            {
                blocks.set_block_type(world, cell, BlockType::Glass);
            }
        }
    }

    target.clone()
}
