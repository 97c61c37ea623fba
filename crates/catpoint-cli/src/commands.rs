//! Panel commands and their execution against a security service

use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};
use std::path::PathBuf;

use catpoint_core::{
    ArmingStatus, CameraImage, ImageAnalyzer, SecurityRepository, SecurityService, SecurityState,
    Sensor, SensorType,
};

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Show alarm status, arming mode and sensors
    Status {
        /// Output in JSON format for integrations
        #[arg(long)]
        json: bool,
    },

    /// Arm the system
    Arm {
        #[arg(value_enum)]
        mode: ArmMode,
    },

    /// Disarm the system and clear any alarm
    Disarm,

    /// Manage sensors
    Sensor {
        #[command(subcommand)]
        action: SensorCommand,
    },

    /// Analyze a camera image for cats
    Scan {
        /// Image file to analyze
        image: PathBuf,
    },

    /// Start an interactive panel reading commands from stdin
    Panel,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum SensorCommand {
    /// List all sensors
    List,

    /// Add a new (inactive) sensor
    Add { name: String, sensor_type: SensorType },

    /// Remove a sensor
    Remove { name: String, sensor_type: SensorType },

    /// Mark a sensor as active
    Activate { name: String, sensor_type: SensorType },

    /// Mark a sensor as inactive
    Deactivate { name: String, sensor_type: SensorType },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmMode {
    /// Armed, someone is at home
    Home,
    /// Armed, nobody is at home
    Away,
}

impl From<ArmMode> for ArmingStatus {
    fn from(mode: ArmMode) -> Self {
        match mode {
            ArmMode::Home => ArmingStatus::ArmedHome,
            ArmMode::Away => ArmingStatus::ArmedAway,
        }
    }
}

/// Run one command. `Panel` is handled by the caller.
pub fn execute<R, I>(service: &mut SecurityService<R, I>, command: Commands) -> anyhow::Result<()>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    match command {
        Commands::Status { json } => print_status(service, json)?,
        Commands::Arm { mode } => {
            service.set_arming_status(mode.into())?;
            println!("Armed: {}", ArmingStatus::from(mode).description());
        }
        Commands::Disarm => {
            service.set_arming_status(ArmingStatus::Disarmed)?;
            println!("Disarmed");
        }
        Commands::Sensor { action } => execute_sensor(service, action)?,
        Commands::Scan { image } => {
            let image = CameraImage::from_file(&image)?;
            let cat = service
                .process_image(&image)
                .with_context(|| format!("failed to analyze {}", image.source().unwrap_or("image")))?;
            println!(
                "{}",
                if cat {
                    "DANGER - CAT DETECTED"
                } else {
                    "No cats detected"
                }
            );
        }
        Commands::Panel => bail!("the panel is already running"),
    }
    Ok(())
}

fn execute_sensor<R, I>(service: &mut SecurityService<R, I>, action: SensorCommand) -> anyhow::Result<()>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    match action {
        SensorCommand::List => {
            let sensors = service.sensors()?;
            if sensors.is_empty() {
                println!("No sensors");
            }
            for sensor in sensors {
                println!("  {}", sensor);
            }
        }
        SensorCommand::Add { name, sensor_type } => {
            if service.find_sensor(&name, sensor_type).is_ok() {
                bail!("sensor already exists: {} ({})", name, sensor_type);
            }
            service.add_sensor(Sensor::new(name.clone(), sensor_type))?;
            println!("Added {} ({})", name, sensor_type);
        }
        SensorCommand::Remove { name, sensor_type } => {
            let sensor = service.find_sensor(&name, sensor_type)?;
            service.remove_sensor(&sensor)?;
            println!("Removed {} ({})", name, sensor_type);
        }
        SensorCommand::Activate { name, sensor_type } => {
            let mut sensor = service.find_sensor(&name, sensor_type)?;
            service.change_sensor_activation_status(&mut sensor, true)?;
            println!("{}", sensor);
        }
        SensorCommand::Deactivate { name, sensor_type } => {
            let mut sensor = service.find_sensor(&name, sensor_type)?;
            service.change_sensor_activation_status(&mut sensor, false)?;
            println!("{}", sensor);
        }
    }
    Ok(())
}

fn print_status<R, I>(service: &SecurityService<R, I>, json: bool) -> anyhow::Result<()>
where
    R: SecurityRepository,
    I: ImageAnalyzer,
{
    let state = SecurityState {
        alarm_status: service.alarm_status()?,
        arming_status: service.arming_status()?,
        sensors: service.sensors()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return Ok(());
    }

    println!(
        "System status: {} ({})",
        state.alarm_status.description(),
        state.alarm_status
    );
    println!(
        "Arming: {} ({})",
        state.arming_status.description(),
        state.arming_status
    );
    println!("Sensors:");
    if state.sensors.is_empty() {
        println!("  (none)");
    }
    for sensor in &state.sensors {
        println!("  {}", sensor);
    }
    Ok(())
}
