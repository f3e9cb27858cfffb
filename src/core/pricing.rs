//! Reisekostenberechnung.
//!
//! Die Formel arbeitet durchgehend auf `f64` und rundet erst am Ende auf die
//! nächste ganze Währungseinheit auf. Overrides und der Multiworld-Aufschlag
//! greifen an fest definierten Stellen, siehe [`travel_cost`].

use super::coordinate::Coordinate;
use super::waypoint::{Waypoint, WaypointId};
use crate::shared::PricingOptions;

/// Ausgangspunkt einer Reise.
///
/// Steht der Akteur in der Region eines Wegpunkts, zählt dessen Teleportziel
/// als Startpunkt und dessen Handle kann einen Preis-Override treffen. Sonst
/// zählt die freie Position des Akteurs und Overrides sind unerreichbar.
#[derive(Debug, Clone, Copy)]
pub enum TravelOrigin<'a> {
    /// Reise aus der Region eines Wegpunkts heraus
    Waypoint(&'a Waypoint),
    /// Reise von freier Position
    Position(&'a Coordinate),
}

impl<'a> TravelOrigin<'a> {
    /// Der Punkt von dem aus die Distanz gemessen wird
    pub fn effective_point(&self) -> &'a Coordinate {
        match self {
            TravelOrigin::Waypoint(waypoint) => waypoint.target_location(),
            TravelOrigin::Position(coords) => coords,
        }
    }

    /// Handle des Ursprungs-Wegpunkts, falls vorhanden
    pub fn waypoint_id(&self) -> Option<WaypointId> {
        match self {
            TravelOrigin::Waypoint(waypoint) => Some(waypoint.id()),
            TravelOrigin::Position(_) => None,
        }
    }
}

/// Berechnet die Kosten einer Reise zum Zielwegpunkt.
///
/// `free_travel` ist der bereits aufgelöste Gratis-Zustand (Ursprung ODER
/// Ziel effektiv gratis). Reihenfolge der Formel:
///
/// 1. Gratis-Reise kostet 0, bei Weltwechsel nur den aufgerundeten Aufschlag.
/// 2. Basis ist der Override des Ziels für diesen Ursprung, sonst die
///    aufgerundete Manhattan-Distanz mal Faktor. Bei Weltwechsel gilt der
///    Multiworld-Faktor und die Distanz wird in der Zielwelt gemessen.
/// 3. Bei Weltwechsel kommt der Aufschlag dazu, dann wird final aufgerundet.
pub fn travel_cost(
    origin: TravelOrigin<'_>,
    destination: &Waypoint,
    free_travel: bool,
    options: &PricingOptions,
) -> i64 {
    let from = origin.effective_point();
    let to = destination.target_location();
    let cross_world = from.world != to.world;

    if free_travel {
        if cross_world {
            return options.multiworld_tax.ceil() as i64;
        }
        return 0;
    }

    let base = match origin.waypoint_id().and_then(|id| destination.charge_from(id)) {
        Some(price) => price,
        None => {
            let multiplier = if cross_world {
                options.multiworld_multiplier
            } else {
                options.price_multiplier
            };
            let distance = from.manhattan_block_distance(to) as f64;
            (distance * multiplier).ceil()
        }
    };

    let total = if cross_world {
        base + options.multiworld_tax
    } else {
        base
    };

    total.ceil() as i64
}
