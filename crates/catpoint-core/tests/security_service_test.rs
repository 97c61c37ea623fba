//! Behaviour of the alarm state machine, observed through the repository
//! writes it issues and the notifications its listeners receive.

use std::collections::BTreeSet;
use std::sync::Arc;

use catpoint_core::{
    AlarmStatus, ArmingStatus, CameraImage, CatpointError, FileSecurityRepository, ImageAnalyzer,
    InMemorySecurityRepository, Result, SecurityRepository, SecurityService, Sensor, SensorType,
    StatusEvent, StatusEventLog, CAT_CONFIDENCE_THRESHOLD,
};
use proptest::prelude::*;

/// A write that reached the repository
#[derive(Debug, Clone, PartialEq)]
enum Write {
    AddSensor(String),
    RemoveSensor(String),
    UpdateSensor(String, bool),
    AlarmStatus(AlarmStatus),
    ArmingStatus(ArmingStatus),
}

#[derive(Debug, Default)]
struct RecordingRepository {
    inner: InMemorySecurityRepository,
    writes: Vec<Write>,
}

impl RecordingRepository {
    fn alarm_writes(&self) -> Vec<AlarmStatus> {
        self.writes
            .iter()
            .filter_map(|w| match w {
                Write::AlarmStatus(s) => Some(*s),
                _ => None,
            })
            .collect()
    }
}

impl SecurityRepository for RecordingRepository {
    fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        self.writes.push(Write::AddSensor(sensor.name().to_string()));
        self.inner.add_sensor(sensor)
    }

    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        self.writes.push(Write::RemoveSensor(sensor.name().to_string()));
        self.inner.remove_sensor(sensor)
    }

    fn update_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        self.writes
            .push(Write::UpdateSensor(sensor.name().to_string(), sensor.is_active()));
        self.inner.update_sensor(sensor)
    }

    fn sensors(&self) -> Result<BTreeSet<Sensor>> {
        self.inner.sensors()
    }

    fn alarm_status(&self) -> Result<AlarmStatus> {
        self.inner.alarm_status()
    }

    fn set_alarm_status(&mut self, status: AlarmStatus) -> Result<()> {
        self.writes.push(Write::AlarmStatus(status));
        self.inner.set_alarm_status(status)
    }

    fn arming_status(&self) -> Result<ArmingStatus> {
        self.inner.arming_status()
    }

    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<()> {
        self.writes.push(Write::ArmingStatus(status));
        self.inner.set_arming_status(status)
    }
}

/// Analyzer returning a fixed verdict, or failing
struct ScriptedAnalyzer(Option<bool>);

impl ImageAnalyzer for ScriptedAnalyzer {
    fn image_contains_cat(&self, _image: &CameraImage, confidence_threshold: f32) -> Result<bool> {
        assert_eq!(confidence_threshold, CAT_CONFIDENCE_THRESHOLD);
        self.0
            .ok_or_else(|| CatpointError::ImageAnalysis("camera offline".to_string()))
    }
}

type Service = SecurityService<RecordingRepository, ScriptedAnalyzer>;

fn service_with(cat: Option<bool>) -> (Service, Arc<StatusEventLog>) {
    let mut service = SecurityService::new(RecordingRepository::default(), ScriptedAnalyzer(cat));
    let log = Arc::new(StatusEventLog::new());
    service.add_status_listener(log.clone());
    (service, log)
}

fn image() -> CameraImage {
    CameraImage::new(vec![0u8; 64]).with_source("test")
}

fn door() -> Sensor {
    Sensor::new("Front Door", SensorType::Door)
}

#[test]
fn sensor_activated_with_no_alarm_goes_pending() {
    let (mut service, _) = service_with(Some(false));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

    service.change_sensor_activation_status(&mut sensor, true).unwrap();

    assert!(sensor.is_active());
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::PendingAlarm);
    assert_eq!(
        service.repository().writes.last(),
        Some(&Write::AlarmStatus(AlarmStatus::PendingAlarm))
    );
}

#[test]
fn another_sensor_activated_while_pending_raises_alarm() {
    let (mut service, _) = service_with(Some(false));
    let mut first = door();
    let mut second = Sensor::new("Garage", SensorType::Motion);
    service.add_sensor(first.clone()).unwrap();
    service.add_sensor(second.clone()).unwrap();

    service.change_sensor_activation_status(&mut first, true).unwrap();
    service.change_sensor_activation_status(&mut second, true).unwrap();

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
}

#[test]
fn sensor_reactivated_while_pending_raises_alarm() {
    // the pending state came from elsewhere; the sensor itself was off
    let (mut service, _) = service_with(Some(false));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

    service.change_sensor_activation_status(&mut sensor, true).unwrap();

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
}

#[test]
fn last_sensor_deactivated_while_pending_clears_alarm() {
    let (mut service, _) = service_with(Some(false));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.change_sensor_activation_status(&mut sensor, true).unwrap();
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::PendingAlarm);

    service.change_sensor_activation_status(&mut sensor, false).unwrap();
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);

    // deactivating again is a no-op
    let writes = service.repository().writes.len();
    service.change_sensor_activation_status(&mut sensor, false).unwrap();
    assert_eq!(service.repository().writes.len(), writes);
}

#[test]
fn deactivation_while_pending_with_other_sensor_active_keeps_pending() {
    let (mut service, _) = service_with(Some(false));
    let mut first = door();
    let mut second = Sensor::new("Hall", SensorType::Motion);
    service.add_sensor(first.clone()).unwrap();
    service.add_sensor(second.clone()).unwrap();
    service.change_sensor_activation_status(&mut first, true).unwrap();
    service.change_sensor_activation_status(&mut second, true).unwrap();
    service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

    service.change_sensor_activation_status(&mut first, false).unwrap();
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::PendingAlarm);

    service.change_sensor_activation_status(&mut second, false).unwrap();
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);
}

#[test]
fn sensor_changes_never_touch_an_active_alarm() {
    let (mut service, _) = service_with(Some(false));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.set_alarm_status(AlarmStatus::Alarm).unwrap();
    let alarm_writes = service.repository().alarm_writes().len();

    service.change_sensor_activation_status(&mut sensor, true).unwrap();
    service.change_sensor_activation_status(&mut sensor, false).unwrap();

    assert_eq!(service.repository().alarm_writes().len(), alarm_writes);
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
}

#[test]
fn redundant_activation_change_writes_and_notifies_nothing() {
    let (mut service, log) = service_with(Some(false));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    log.drain();
    let writes = service.repository().writes.len();

    service.change_sensor_activation_status(&mut sensor, false).unwrap();

    assert_eq!(service.repository().writes.len(), writes);
    assert!(log.is_empty());
}

#[test]
fn disarming_always_clears_alarm() {
    for status in AlarmStatus::ALL {
        let (mut service, _) = service_with(Some(false));
        service.set_alarm_status(status).unwrap();

        service.set_arming_status(ArmingStatus::Disarmed).unwrap();

        assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);
        assert_eq!(service.arming_status().unwrap(), ArmingStatus::Disarmed);
    }
}

#[test]
fn arming_resets_every_sensor() {
    for mode in [ArmingStatus::ArmedHome, ArmingStatus::ArmedAway] {
        let (mut service, _) = service_with(Some(false));
        let mut active = door();
        let idle = Sensor::new("Window", SensorType::Window);
        service.add_sensor(active.clone()).unwrap();
        service.add_sensor(idle.clone()).unwrap();
        service.change_sensor_activation_status(&mut active, true).unwrap();
        let before = service.repository().writes.len();

        service.set_arming_status(mode).unwrap();

        let writes = &service.repository().writes[before..];
        assert_eq!(
            writes,
            &[
                Write::UpdateSensor("Front Door".to_string(), false),
                Write::UpdateSensor("Window".to_string(), false),
                Write::ArmingStatus(mode),
            ]
        );
        assert!(service.sensors().unwrap().iter().all(|s| !s.is_active()));
    }
}

#[test]
fn arming_notifies_sensor_change_after_persisting() {
    let (mut service, log) = service_with(Some(false));
    service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
    assert_eq!(log.drain(), vec![StatusEvent::SensorStatusChanged]);

    service.set_arming_status(ArmingStatus::Disarmed).unwrap();
    assert_eq!(
        log.drain(),
        vec![
            StatusEvent::StatusChanged {
                status: AlarmStatus::NoAlarm
            },
            StatusEvent::SensorStatusChanged,
        ]
    );
}

#[test]
fn cat_detected_while_armed_home_raises_alarm() {
    let (mut service, log) = service_with(Some(true));
    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
    log.drain();

    assert!(service.process_image(&image()).unwrap());

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
    assert_eq!(
        log.events(),
        vec![
            StatusEvent::StatusChanged {
                status: AlarmStatus::Alarm
            },
            StatusEvent::CatDetected { cat_detected: true },
        ]
    );
}

#[test]
fn no_cat_and_no_active_sensor_clears_alarm() {
    let (mut service, _) = service_with(Some(false));
    service.add_sensor(door()).unwrap();
    service.set_alarm_status(AlarmStatus::PendingAlarm).unwrap();

    assert!(!service.process_image(&image()).unwrap());

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);
}

#[test]
fn no_cat_with_active_sensor_leaves_alarm_alone() {
    let (mut service, log) = service_with(Some(false));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.change_sensor_activation_status(&mut sensor, true).unwrap();
    let alarm_writes = service.repository().alarm_writes().len();
    log.drain();

    service.process_image(&image()).unwrap();

    assert_eq!(service.repository().alarm_writes().len(), alarm_writes);
    assert_eq!(
        log.events(),
        vec![StatusEvent::CatDetected {
            cat_detected: false
        }]
    );
}

#[test]
fn cat_seen_before_arming_home_raises_alarm_on_arm() {
    let (mut service, _) = service_with(Some(true));
    service.process_image(&image()).unwrap();
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);

    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
}

#[test]
fn cat_seen_before_arming_away_does_not_raise_alarm() {
    let (mut service, _) = service_with(Some(true));
    service.process_image(&image()).unwrap();

    service.set_arming_status(ArmingStatus::ArmedAway).unwrap();

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);
}

#[test]
fn scenario_door_sensor_armed_home_cat_on_camera() {
    let (mut service, _) = service_with(Some(true));
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);
    assert_eq!(service.arming_status().unwrap(), ArmingStatus::Disarmed);

    service.add_sensor(door()).unwrap();
    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();
    service.process_image(&image()).unwrap();

    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::Alarm);
}

#[test]
fn analyzer_failure_propagates_without_side_effects() {
    let (mut service, log) = service_with(None);
    let writes = service.repository().writes.len();

    let err = service.process_image(&image()).unwrap_err();

    assert!(matches!(err, CatpointError::ImageAnalysis(_)));
    assert_eq!(service.repository().writes.len(), writes);
    assert!(log.is_empty());
    assert!(!service.is_cat_detected());
}

/// Repository whose alarm-status writes always fail
#[derive(Default)]
struct BrokenAlarmRepository(InMemorySecurityRepository);

impl SecurityRepository for BrokenAlarmRepository {
    fn add_sensor(&mut self, sensor: Sensor) -> Result<()> {
        self.0.add_sensor(sensor)
    }
    fn remove_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        self.0.remove_sensor(sensor)
    }
    fn update_sensor(&mut self, sensor: &Sensor) -> Result<()> {
        self.0.update_sensor(sensor)
    }
    fn sensors(&self) -> Result<BTreeSet<Sensor>> {
        self.0.sensors()
    }
    fn alarm_status(&self) -> Result<AlarmStatus> {
        self.0.alarm_status()
    }
    fn set_alarm_status(&mut self, _status: AlarmStatus) -> Result<()> {
        Err(CatpointError::Repository("disk full".to_string()))
    }
    fn arming_status(&self) -> Result<ArmingStatus> {
        self.0.arming_status()
    }
    fn set_arming_status(&mut self, status: ArmingStatus) -> Result<()> {
        self.0.set_arming_status(status)
    }
}

#[test]
fn repository_failure_propagates_and_skips_notification() {
    let mut service =
        SecurityService::new(BrokenAlarmRepository::default(), ScriptedAnalyzer(Some(false)));
    let log = Arc::new(StatusEventLog::new());
    service.add_status_listener(log.clone());
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();

    let err = service
        .change_sensor_activation_status(&mut sensor, true)
        .unwrap_err();
    assert!(matches!(err, CatpointError::Repository(_)));
    assert!(log.is_empty());

    // disarming fails before the arming status is written
    assert!(service.set_arming_status(ArmingStatus::Disarmed).is_err());
    assert!(log.is_empty());
}

#[test]
fn removed_listener_stops_receiving() {
    let (mut service, log) = service_with(Some(true));
    let other = Arc::new(StatusEventLog::new());
    let id = service.add_status_listener(other.clone());
    assert_eq!(service.listener_count(), 2);

    service.process_image(&image()).unwrap();
    assert_eq!(log.len(), other.len());

    assert!(service.remove_status_listener(id));
    service.process_image(&image()).unwrap();
    assert_eq!(log.len(), 4);
    assert_eq!(other.len(), 2);
}

#[test]
fn removed_sensor_no_longer_counts() {
    let (mut service, _) = service_with(Some(false));
    let sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.remove_sensor(&sensor).unwrap();

    assert!(service.sensors().unwrap().is_empty());
    assert!(service.find_sensor("Front Door", SensorType::Door).is_err());
    assert_eq!(
        &service.repository().writes[..],
        &[
            Write::AddSensor("Front Door".to_string()),
            Write::RemoveSensor("Front Door".to_string()),
        ]
    );
}

#[test]
fn failed_sensor_write_can_be_retried() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    let repository = FileSecurityRepository::open(&path).unwrap();
    let mut service = SecurityService::new(repository, ScriptedAnalyzer(Some(false)));
    let mut sensor = door();
    service.add_sensor(sensor.clone()).unwrap();
    service.set_arming_status(ArmingStatus::ArmedHome).unwrap();

    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();
    assert!(service
        .change_sensor_activation_status(&mut sensor, true)
        .is_err());

    assert!(!sensor.is_active());
    assert!(!service.sensors().unwrap().iter().any(Sensor::is_active));
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::NoAlarm);

    std::fs::remove_dir(&path).unwrap();
    service
        .change_sensor_activation_status(&mut sensor, true)
        .unwrap();
    assert!(sensor.is_active());
    assert_eq!(service.alarm_status().unwrap(), AlarmStatus::PendingAlarm);

    let reopened = FileSecurityRepository::open(&path).unwrap();
    assert_eq!(reopened.alarm_status().unwrap(), AlarmStatus::PendingAlarm);
}

const NAMES: [&str; 3] = ["Door", "Window", "Hall"];

proptest! {
    #[test]
    fn activation_changes_follow_the_transition_rules(
        ops in proptest::collection::vec((0usize..3, any::<bool>()), 1..40)
    ) {
        let (mut service, log) = service_with(Some(false));
        for name in NAMES {
            service.add_sensor(Sensor::new(name, SensorType::Motion)).unwrap();
        }
        service.set_arming_status(ArmingStatus::ArmedAway).unwrap();
        log.drain();

        for (index, active) in ops {
            let mut sensor = service.find_sensor(NAMES[index], SensorType::Motion).unwrap();
            let before_status = service.alarm_status().unwrap();
            let before_writes = service.repository().writes.len();
            let was_active = sensor.is_active();

            service.change_sensor_activation_status(&mut sensor, active).unwrap();
            let after = service.alarm_status().unwrap();

            if was_active == active {
                prop_assert_eq!(service.repository().writes.len(), before_writes);
                prop_assert!(log.is_empty());
                prop_assert_eq!(after, before_status);
                continue;
            }

            let any_active = service.sensors().unwrap().iter().any(Sensor::is_active);
            let expected = match (before_status, active) {
                (AlarmStatus::Alarm, _) => AlarmStatus::Alarm,
                (AlarmStatus::NoAlarm, true) => AlarmStatus::PendingAlarm,
                (AlarmStatus::PendingAlarm, true) => AlarmStatus::Alarm,
                (AlarmStatus::PendingAlarm, false) if !any_active => AlarmStatus::NoAlarm,
                (status, false) => status,
            };
            prop_assert_eq!(after, expected);
            log.drain();
        }
    }
}
