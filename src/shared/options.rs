//! Zentrale Konfiguration der QuickTravel-Engine.
//!
//! `EngineOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten; bestehende
//! Installationen verlassen sich auf genau diese Zahlenwerte.

use serde::{Deserialize, Serialize};

// ── Regionen ────────────────────────────────────────────────────────

/// Standardradius neuer Wegpunkte (Welteinheiten).
pub const DEFAULT_RADIUS: f64 = 5.0;
/// Vertikale Polsterung der Oberseite von Cuboid-Regionen (Blöcke).
pub const HEIGHT_MODIFIER: i32 = 2;

// ── Flag-Standards ──────────────────────────────────────────────────

/// Wegpunkte ohne explizites Enabled-Flag gelten als aktiv.
pub const ENABLED_BY_DEFAULT: bool = true;
/// Wegpunkte müssen standardmäßig entdeckt werden bevor man sie nutzen kann.
pub const REQUIRE_DISCOVERY_BY_DEFAULT: bool = true;
/// Berechtigungsprüfung ist standardmäßig aus.
pub const REQUIRE_PERMISSIONS_BY_DEFAULT: bool = false;
/// Weltübergreifende Reisen sind standardmäßig aus.
pub const MULTIWORLD_BY_DEFAULT: bool = false;
/// Wegpunkte sind standardmäßig kostenpflichtig.
pub const FREE_BY_DEFAULT: bool = false;

// ── Reisen ──────────────────────────────────────────────────────────

/// Sicherheitsprüfung des Ziels vor jedem Teleport.
pub const ENABLE_SAFETY_CHECKS: bool = true;
/// Preisfaktor auf die Manhattan-Distanz innerhalb einer Welt.
pub const PRICE_MULTIPLIER: f64 = 0.8;
/// Preisfaktor auf die Manhattan-Distanz bei weltübergreifender Reise.
pub const MULTIWORLD_MULTIPLIER: f64 = 1.2;
/// Pauschaler Aufschlag für weltübergreifende Reisen.
pub const MULTIWORLD_TAX: f64 = 0.0;

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Kostenparameter der Preisberechnung.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricingOptions {
    /// Preisfaktor innerhalb einer Welt
    pub price_multiplier: f64,
    /// Preisfaktor bei weltübergreifender Reise
    pub multiworld_multiplier: f64,
    /// Pauschaler Aufschlag bei weltübergreifender Reise
    #[serde(default = "default_multiworld_tax")]
    pub multiworld_tax: f64,
}

impl Default for PricingOptions {
    fn default() -> Self {
        Self {
            price_multiplier: PRICE_MULTIPLIER,
            multiworld_multiplier: MULTIWORLD_MULTIPLIER,
            multiworld_tax: MULTIWORLD_TAX,
        }
    }
}

/// Serde-Default für `multiworld_tax` (Abwärtskompatibilität bestehender Dateien).
fn default_multiworld_tax() -> f64 {
    MULTIWORLD_TAX
}

/// Alle zur Laufzeit änderbaren Engine-Optionen.
///
/// Die `*_by_default`-Werte greifen für jeden Wegpunkt, dessen jeweiliges
/// Flag nie explizit gesetzt wurde — auch rückwirkend nach einem Neuladen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineOptions {
    // ── Regionen ────────────────────────────────────────────────
    /// Standardradius neuer Wegpunkte
    pub default_radius: f64,
    /// Vertikale Polsterung der Cuboid-Oberseite (Blöcke)
    pub height_modifier: i32,

    // ── Flag-Standards ──────────────────────────────────────────
    /// Standard für das Enabled-Flag
    pub enabled_by_default: bool,
    /// Standard für die Entdeckungspflicht
    pub require_discovery_by_default: bool,
    /// Standard für die Berechtigungspflicht
    pub require_permissions_by_default: bool,
    /// Standard für weltübergreifende Nutzbarkeit
    pub multiworld_by_default: bool,
    /// Standard für kostenlose Nutzung
    pub free_by_default: bool,

    // ── Reisen ──────────────────────────────────────────────────
    /// Ziel vor dem Teleport reparieren
    #[serde(default = "default_enable_safety_checks")]
    pub enable_safety_checks: bool,
    /// Kostenparameter
    #[serde(default)]
    pub pricing: PricingOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_radius: DEFAULT_RADIUS,
            height_modifier: HEIGHT_MODIFIER,
            enabled_by_default: ENABLED_BY_DEFAULT,
            require_discovery_by_default: REQUIRE_DISCOVERY_BY_DEFAULT,
            require_permissions_by_default: REQUIRE_PERMISSIONS_BY_DEFAULT,
            multiworld_by_default: MULTIWORLD_BY_DEFAULT,
            free_by_default: FREE_BY_DEFAULT,
            enable_safety_checks: ENABLE_SAFETY_CHECKS,
            pricing: PricingOptions::default(),
        }
    }
}

/// Serde-Default für `enable_safety_checks` (Abwärtskompatibilität).
fn default_enable_safety_checks() -> bool {
    ENABLE_SAFETY_CHECKS
}

impl EngineOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }
}
