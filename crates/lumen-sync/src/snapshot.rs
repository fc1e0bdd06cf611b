use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::Result;

/// The player's game mode as shown on the peripheral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameMode {
    Creative,
    Adventure,
    Spectator,
    Survival,
    /// No player, or the mode could not be determined.
    #[default]
    Unknown,
}

impl GameMode {
    /// The string the peripheral displays for this mode.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Creative => "Creative",
            Self::Adventure => "Adventure",
            Self::Spectator => "Spectator",
            Self::Survival => "Survival",
            Self::Unknown => "-----",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for GameMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Returned when a string names no game mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game mode '{0}' (expected creative, adventure, spectator, survival or unknown)")]
pub struct ParseGameModeError(String);

impl FromStr for GameMode {
    type Err = ParseGameModeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "creative" => Ok(Self::Creative),
            "adventure" => Ok(Self::Adventure),
            "spectator" => Ok(Self::Spectator),
            "survival" => Ok(Self::Survival),
            "unknown" | "-----" => Ok(Self::Unknown),
            _ => Err(ParseGameModeError(s.to_string())),
        }
    }
}

/// Scalar player state, sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Snapshot {
    pub mode: GameMode,
    pub health: f64,
    pub max_health: f64,
}

impl Snapshot {
    pub fn new(mode: GameMode, health: f64, max_health: f64) -> Self {
        Self {
            mode,
            health,
            max_health,
        }
    }

    /// Encode as the `sync` frame payload.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_snapshot_wire_form() {
        let json = Snapshot::default().to_json().unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"mode":"-----","health":0.0,"max_health":0.0}"#
        );
    }

    #[test]
    fn keys_keep_declaration_order() {
        let json = Snapshot::new(GameMode::Survival, 17.5, 20.0)
            .to_json()
            .unwrap();
        assert_eq!(
            String::from_utf8(json).unwrap(),
            r#"{"mode":"Survival","health":17.5,"max_health":20.0}"#
        );
    }

    #[test]
    fn mode_labels() {
        assert_eq!(GameMode::Creative.label(), "Creative");
        assert_eq!(GameMode::Adventure.to_string(), "Adventure");
        assert_eq!(GameMode::Spectator.label(), "Spectator");
        assert_eq!(GameMode::default().label(), "-----");
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("CREATIVE".parse::<GameMode>(), Ok(GameMode::Creative));
        assert_eq!(" survival ".parse::<GameMode>(), Ok(GameMode::Survival));
        assert_eq!("-----".parse::<GameMode>(), Ok(GameMode::Unknown));
        assert!("hardcore".parse::<GameMode>().is_err());
    }
}
