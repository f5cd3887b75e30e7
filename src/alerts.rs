//! Threshold evaluation for sensor readings.
//!
//! Pure functions deriving display statuses and alert conditions from a
//! single reading. The thresholds mirror what the dashboard shows on its
//! sensor cards and in its alert center; nothing here keeps state or fires
//! timers.

use serde::Serialize;

use crate::generator::{PestRisk, SensorReading};

/// Display status for an individual sensor value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Normal,
    Warning,
    Critical,
}

impl std::fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SensorStatus::Normal => write!(f, "normal"),
            SensorStatus::Warning => write!(f, "warning"),
            SensorStatus::Critical => write!(f, "critical"),
        }
    }
}

/// Severity of a derived alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// A single derived alert condition.
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub severity: AlertSeverity,

    pub title: String,

    pub message: String,
}

/// Above 30°C ventilation is needed; below 18°C the heating has failed.
pub fn temperature_status(temperature: f64) -> SensorStatus {
    if temperature > 30.0 {
        SensorStatus::Warning
    } else if temperature < 18.0 {
        SensorStatus::Critical
    } else {
        SensorStatus::Normal
    }
}

/// Comfortable band is 50-80%.
pub fn humidity_status(humidity: f64) -> SensorStatus {
    if !(50.0..=80.0).contains(&humidity) {
        SensorStatus::Warning
    } else {
        SensorStatus::Normal
    }
}

/// Below 40% plants are wilting; below 60% irrigation is due.
pub fn soil_moisture_status(soil_moisture: f64) -> SensorStatus {
    if soil_moisture < 40.0 {
        SensorStatus::Critical
    } else if soil_moisture < 60.0 {
        SensorStatus::Warning
    } else {
        SensorStatus::Normal
    }
}

/// Below 40% supplemental lighting is worthwhile.
pub fn light_level_status(light_level: f64) -> SensorStatus {
    if light_level < 40.0 {
        SensorStatus::Warning
    } else {
        SensorStatus::Normal
    }
}

/// Derive the active alert conditions for a reading.
///
/// Returns alerts in severity-relevant display order: watering first, then
/// climate, pests, and lighting.
pub fn evaluate(reading: &SensorReading) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if reading.soil_moisture < 40.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Critical,
            title: "Low Soil Moisture".to_string(),
            message: format!(
                "Soil moisture is at {:.0}%. Immediate watering required.",
                reading.soil_moisture
            ),
        });
    }

    if reading.temperature > 30.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Warning,
            title: "High Temperature".to_string(),
            message: format!(
                "Temperature is {:.1}°C. Consider increasing ventilation.",
                reading.temperature
            ),
        });
    }

    if reading.pest_detection == PestRisk::High {
        alerts.push(Alert {
            severity: AlertSeverity::Critical,
            title: "Pest Detection Alert".to_string(),
            message: "High pest activity detected. Immediate attention required.".to_string(),
        });
    }

    if reading.light_level < 30.0 {
        alerts.push(Alert {
            severity: AlertSeverity::Info,
            title: "Low Light Levels".to_string(),
            message: format!(
                "Light level is {:.0}%. Supplemental lighting recommended.",
                reading.light_level
            ),
        });
    }

    alerts
}
