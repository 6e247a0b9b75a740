//! Signal kinds reported by outdoor sensors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when parsing an unrecognised signal kind
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signal kind: {0}")]
pub struct UnknownSignalKind(pub String);

/// The kind of environmental signal a sensor reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    /// Cumulative rain gauge
    Rain,
    /// Outdoor temperature, optionally with relative humidity
    Temperature,
    /// Stand-alone relative humidity
    Humidity,
    /// Wind speed in m/s
    Wind,
}

impl SignalKind {
    /// All signal kinds
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Rain,
        SignalKind::Temperature,
        SignalKind::Humidity,
        SignalKind::Wind,
    ];

    /// Name of the signal kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Rain => "rain",
            SignalKind::Temperature => "temperature",
            SignalKind::Humidity => "humidity",
            SignalKind::Wind => "wind",
        }
    }

    /// The bus topic readings of this kind are published on
    pub fn topic(&self) -> &'static str {
        match self {
            SignalKind::Rain => crate::events::RAIN,
            SignalKind::Temperature => crate::events::TEMP,
            SignalKind::Humidity => crate::events::HUMIDITY,
            SignalKind::Wind => crate::events::WIND,
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = UnknownSignalKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rain" => Ok(SignalKind::Rain),
            "temperature" | "temp" => Ok(SignalKind::Temperature),
            "humidity" => Ok(SignalKind::Humidity),
            "wind" => Ok(SignalKind::Wind),
            other => Err(UnknownSignalKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for kind in SignalKind::ALL {
            assert_eq!(kind.as_str().parse::<SignalKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_parse_topic_alias() {
        assert_eq!("temp".parse::<SignalKind>(), Ok(SignalKind::Temperature));
        assert_eq!(
            "pressure".parse::<SignalKind>(),
            Err(UnknownSignalKind("pressure".to_string()))
        );
    }
}
