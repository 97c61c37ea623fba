//! Sensor entity
//!
//! A sensor is identified by its name and type. The activation flag is
//! mutable state and does not take part in equality, hashing or ordering,
//! so a sensor set never holds two entries for the same physical sensor.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Kind of physical detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensorType {
    Door,
    Window,
    Motion,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [SensorType::Door, SensorType::Window, SensorType::Motion];
}

impl fmt::Display for SensorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorType::Door => write!(f, "DOOR"),
            SensorType::Window => write!(f, "WINDOW"),
            SensorType::Motion => write!(f, "MOTION"),
        }
    }
}

impl FromStr for SensorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "door" => Ok(SensorType::Door),
            "window" => Ok(SensorType::Window),
            "motion" => Ok(SensorType::Motion),
            _ => Err(format!("unknown sensor type: {}", s)),
        }
    }
}

/// A single binary detector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    name: String,
    sensor_type: SensorType,
    #[serde(default)]
    active: bool,
}

impl Sensor {
    /// Create an inactive sensor
    pub fn new(name: impl Into<String>, sensor_type: SensorType) -> Self {
        Self {
            name: name.into(),
            sensor_type,
            active: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sensor_type(&self) -> SensorType {
        self.sensor_type
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Assign the activation flag. Consequences for the alarm are applied
    /// by the security service, not here.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether this sensor has the given identity
    pub fn matches(&self, name: &str, sensor_type: SensorType) -> bool {
        self.name == name && self.sensor_type == sensor_type
    }
}

impl PartialEq for Sensor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.sensor_type == other.sensor_type
    }
}

impl Eq for Sensor {}

impl Hash for Sensor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.sensor_type.hash(state);
    }
}

impl PartialOrd for Sensor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Sensor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.sensor_type.cmp(&other.sensor_type))
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}",
            self.name,
            self.sensor_type,
            if self.active { "Active" } else { "Inactive" }
        )
    }
}
