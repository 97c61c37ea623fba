//! Alarm and arming status enumerations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current escalation level of the alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmStatus {
    /// Nothing is wrong
    #[default]
    NoAlarm,
    /// A sensor tripped, waiting for confirmation
    PendingAlarm,
    /// The alarm is sounding; only disarming clears it
    Alarm,
}

impl AlarmStatus {
    /// All variants, in escalation order
    pub const ALL: [AlarmStatus; 3] = [
        AlarmStatus::NoAlarm,
        AlarmStatus::PendingAlarm,
        AlarmStatus::Alarm,
    ];

    /// Human-readable text shown on the panel display
    pub fn description(&self) -> &'static str {
        match self {
            AlarmStatus::NoAlarm => "Cool and Good",
            AlarmStatus::PendingAlarm => "I'm in Danger...",
            AlarmStatus::Alarm => "Awooga!",
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            AlarmStatus::NoAlarm => "NO_ALARM",
            AlarmStatus::PendingAlarm => "PENDING_ALARM",
            AlarmStatus::Alarm => "ALARM",
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlarmStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "NO_ALARM" => Ok(AlarmStatus::NoAlarm),
            "PENDING_ALARM" | "PENDING" => Ok(AlarmStatus::PendingAlarm),
            "ALARM" => Ok(AlarmStatus::Alarm),
            _ => Err(format!("unknown alarm status: {}", s)),
        }
    }
}

/// Arming mode selected on the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArmingStatus {
    #[default]
    Disarmed,
    ArmedHome,
    ArmedAway,
}

impl ArmingStatus {
    /// All variants, in panel order
    pub const ALL: [ArmingStatus; 3] = [
        ArmingStatus::Disarmed,
        ArmingStatus::ArmedHome,
        ArmingStatus::ArmedAway,
    ];

    /// Human-readable text shown on the panel buttons
    pub fn description(&self) -> &'static str {
        match self {
            ArmingStatus::Disarmed => "Disarmed",
            ArmingStatus::ArmedHome => "Armed - At Home",
            ArmingStatus::ArmedAway => "Armed - Away",
        }
    }

    /// Whether sensor and camera events can escalate the alarm
    pub fn is_armed(&self) -> bool {
        !matches!(self, ArmingStatus::Disarmed)
    }

    fn as_str(&self) -> &'static str {
        match self {
            ArmingStatus::Disarmed => "DISARMED",
            ArmingStatus::ArmedHome => "ARMED_HOME",
            ArmingStatus::ArmedAway => "ARMED_AWAY",
        }
    }
}

impl fmt::Display for ArmingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArmingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "DISARMED" => Ok(ArmingStatus::Disarmed),
            "ARMED_HOME" | "HOME" => Ok(ArmingStatus::ArmedHome),
            "ARMED_AWAY" | "AWAY" => Ok(ArmingStatus::ArmedAway),
            _ => Err(format!("unknown arming status: {}", s)),
        }
    }
}

fn normalize(s: &str) -> String {
    s.trim().replace('-', "_").to_ascii_uppercase()
}
