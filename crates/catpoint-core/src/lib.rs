//! Catpoint Core - alarm decision logic for a home security panel
//!
//! Given sensor activity, the arming mode and camera-based cat detection,
//! the [`SecurityService`] decides the alarm status, persists it through a
//! [`SecurityRepository`] and notifies every registered [`StatusListener`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Security Service                         │
//! │  - alarm state machine (NO_ALARM / PENDING_ALARM / ALARM)       │
//! │  - arming rules, cat-detection rules                            │
//! └─────────────────────────────────────────────────────────────────┘
//!           │                       │                      │
//! ┌─────────▼─────────┐   ┌─────────▼────────┐   ┌─────────▼────────┐
//! │ SecurityRepository│   │ ImageAnalyzer    │   │ StatusListener   │
//! │  - in memory      │   │  - fake (random) │   │  - event log     │
//! │  - JSON file      │   │                  │   │  - your panel    │
//! └───────────────────┘   └──────────────────┘   └──────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use catpoint_core::{
//!     AlarmStatus, ArmingStatus, CameraImage, FakeImageAnalyzer, InMemorySecurityRepository,
//!     SecurityService, Sensor, SensorType, StatusEventLog,
//! };
//!
//! let analyzer = FakeImageAnalyzer::new(1.0, None).unwrap();
//! let mut service = SecurityService::new(InMemorySecurityRepository::new(), analyzer);
//! let events = Arc::new(StatusEventLog::new());
//! service.add_status_listener(events.clone());
//!
//! service.add_sensor(Sensor::new("Front Door", SensorType::Door)).unwrap();
//! service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
//! service.process_image(&CameraImage::new(vec![0u8; 16])).unwrap();
//!
//! assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
//! assert!(!events.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms, clippy::all)]

pub mod config;
pub mod error;
pub mod image;
pub mod listener;
pub mod repository;
pub mod sensor;
pub mod service;
pub mod shared;
pub mod status;

pub use config::{AnalyzerSettings, CatpointConfig};
pub use error::{CatpointError, Result};
pub use image::{CameraImage, FakeImageAnalyzer, ImageAnalyzer, CAT_CONFIDENCE_THRESHOLD};
pub use listener::{ListenerId, ListenerRegistry, StatusEvent, StatusEventLog, StatusListener};
pub use repository::{
    FileSecurityRepository, InMemorySecurityRepository, SecurityRepository, SecurityState,
};
pub use sensor::{Sensor, SensorType};
pub use service::SecurityService;
pub use shared::SharedSecurityService;
pub use status::{AlarmStatus, ArmingStatus};

/// Catpoint version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default location of the JSON security store
pub const DEFAULT_STORE_PATH: &str = "catpoint.json";
