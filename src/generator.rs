//! Sensor reading generator for simulated greenhouse telemetry.
//!
//! This module fabricates plausible greenhouse sensor readings: temperature
//! follows a sinusoidal day/night cycle, humidity is inversely coupled to
//! temperature, and pest risk is derived from both. Readings are generated
//! statelessly; the only inputs are the injected clock, a source of
//! randomness, and the fixed baselines in [`GeneratorConfig`].

use chrono::{DateTime, Duration, Timelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

/// Lower clamp for generated temperatures, degrees Celsius.
const MIN_TEMPERATURE: f64 = 18.0;

/// Humidity clamp bounds, percent.
const MIN_HUMIDITY: f64 = 30.0;
const MAX_HUMIDITY: f64 = 90.0;

/// Lower clamp for soil moisture, percent.
const MIN_SOIL_MOISTURE: f64 = 20.0;

/// Lower clamp for daytime light level, percent.
const MIN_DAY_LIGHT: f64 = 20.0;

/// Daylight window, hours of day (inclusive on both ends).
const DAY_START_HOUR: u32 = 6;
const DAY_END_HOUR: u32 = 18;

/// Soil dries out by this much per hour without irrigation.
const MOISTURE_DEPLETION_PER_HOUR: f64 = 0.5;
const MAX_HOURS_SINCE_WATERING: f64 = 12.0;

/// Pest risk scoring: contributions and classification thresholds.
const HOT_TEMPERATURE_CONTRIBUTION: f64 = 0.3;
const DAMP_HUMIDITY_CONTRIBUTION: f64 = 0.4;
const HOT_TEMPERATURE_THRESHOLD: f64 = 28.0;
const DAMP_HUMIDITY_THRESHOLD: f64 = 80.0;
const PEST_HIGH_THRESHOLD: f64 = 0.6;
const PEST_MEDIUM_THRESHOLD: f64 = 0.3;

/// Topic used for the simulated AWS IoT envelope.
const IOT_TOPIC: &str = "greenhouse/sensors";

/// Pest risk level derived from environmental conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PestRisk {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for PestRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PestRisk::Low => write!(f, "Low"),
            PestRisk::Medium => write!(f, "Medium"),
            PestRisk::High => write!(f, "High"),
        }
    }
}

/// One synthetic snapshot of greenhouse sensor values at a point in time.
///
/// Field names serialize in camelCase, matching the shape the dashboard and
/// the simulated DynamoDB item both expect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Identifier of the greenhouse device this reading is attributed to
    pub device_id: String,

    /// Milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Air temperature in degrees Celsius, one decimal
    pub temperature: f64,

    /// Relative humidity in percent, whole number
    pub humidity: f64,

    /// Soil moisture in percent, whole number
    pub soil_moisture: f64,

    /// Light level in percent, whole number
    pub light_level: f64,

    /// Derived pest risk level
    pub pest_detection: PestRisk,

    /// Soil pH, one decimal
    pub ph: f64,

    /// CO2 concentration in ppm, whole number
    pub co2_level: f64,
}

/// Simulated AWS IoT message wrapping a sensor reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IotMessage {
    /// MQTT-style topic the reading would be published on
    pub topic: String,

    /// Client-generated message ID
    pub message_id: Uuid,

    /// Quality-of-service level (always 1, at-least-once)
    pub qos: u8,

    /// Whether the broker would retain the message (always false)
    pub retain: bool,

    /// The wrapped sensor reading
    pub payload: SensorReading,
}

impl IotMessage {
    /// Wrap an existing reading in the simulated IoT envelope.
    pub fn for_reading(payload: SensorReading) -> Self {
        Self {
            topic: IOT_TOPIC.to_string(),
            message_id: Uuid::new_v4(),
            qos: 1,
            retain: false,
            payload,
        }
    }
}

/// Baseline parameters for the reading generator.
///
/// These are the fixed set points the simulation oscillates around. They are
/// plain configuration, not mutable state: the generator never updates them
/// between calls.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Device identifier stamped on every reading
    pub device_id: String,

    /// Temperature set point, degrees Celsius
    pub base_temperature: f64,

    /// Amplitude of the day/night temperature swing
    pub day_temperature_swing: f64,

    /// Humidity set point, percent
    pub base_humidity: f64,

    /// Soil moisture level right after irrigation, percent
    pub base_soil_moisture: f64,

    /// Midday light base level, percent
    pub base_day_light: f64,

    /// Amplitude of the daytime light swing
    pub day_light_swing: f64,

    /// Nighttime light level (grow lamps on standby), percent
    pub night_light_level: f64,

    /// Soil pH set point
    pub base_ph: f64,

    /// CO2 set point, ppm
    pub base_co2: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            device_id: "greenhouse-01".to_string(),
            base_temperature: 22.0,
            day_temperature_swing: 8.0,
            base_humidity: 60.0,
            base_soil_moisture: 70.0,
            base_day_light: 60.0,
            day_light_swing: 40.0,
            night_light_level: 15.0,
            base_ph: 6.5,
            base_co2: 400.0,
        }
    }
}

/// Classify pest risk from environmental conditions.
///
/// Warm, damp greenhouses attract pests: temperature above 28°C contributes
/// 0.3 to the score, humidity above 80% contributes 0.4, and `random_term`
/// (drawn from `[0, 0.3]` in normal operation) stands in for everything the
/// simulation does not model. Scores above 0.6 map to `High`, above 0.3 to
/// `Medium`, anything else to `Low`.
pub fn classify_pest_risk(temperature: f64, humidity: f64, random_term: f64) -> PestRisk {
    let mut score = random_term;
    if temperature > HOT_TEMPERATURE_THRESHOLD {
        score += HOT_TEMPERATURE_CONTRIBUTION;
    }
    if humidity > DAMP_HUMIDITY_THRESHOLD {
        score += DAMP_HUMIDITY_CONTRIBUTION;
    }

    if score > PEST_HIGH_THRESHOLD {
        PestRisk::High
    } else if score > PEST_MEDIUM_THRESHOLD {
        PestRisk::Medium
    } else {
        PestRisk::Low
    }
}

/// Generator for simulated greenhouse sensor readings.
///
/// Every call produces an independent reading; no state is carried between
/// calls beyond the fixed baselines in [`GeneratorConfig`].
pub struct ReadingGenerator {
    config: GeneratorConfig,
}

impl ReadingGenerator {
    /// Create a new generator with the given baselines.
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Create a new generator with default baselines.
    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    /// The device identifier stamped on generated readings.
    pub fn device_id(&self) -> &str {
        &self.config.device_id
    }

    /// Generate a single reading using the system clock and thread RNG.
    pub fn generate(&self) -> SensorReading {
        self.generate_at(Utc::now(), &mut rand::thread_rng())
    }

    /// Generate a single reading for an explicit point in time.
    ///
    /// This is the deterministic core: the hour of day drives the temperature
    /// and light cycles, and all noise comes from `rng`, so tests can fix
    /// both.
    pub fn generate_at(&self, now: DateTime<Utc>, rng: &mut impl Rng) -> SensorReading {
        let hour = now.hour();
        let temperature = self.daily_temperature(hour, rng);
        let humidity = self.humidity(temperature, rng);
        let soil_moisture = self.soil_moisture(rng);
        let light_level = self.light_level(hour, rng);
        let pest_detection = classify_pest_risk(temperature, humidity, rng.gen::<f64>() * 0.3);

        SensorReading {
            device_id: self.config.device_id.clone(),
            timestamp: now.timestamp_millis(),
            temperature: round_to_tenth(temperature),
            humidity: humidity.round(),
            soil_moisture: soil_moisture.round(),
            light_level: light_level.round(),
            pest_detection,
            ph: round_to_tenth(self.config.base_ph + noise(rng, 1.0)),
            co2_level: (self.config.base_co2 + noise(rng, 200.0)).round(),
        }
    }

    /// Generate one reading per hour for the window ending now.
    ///
    /// Returns `hours + 1` entries ordered oldest first. Each slot is
    /// generated independently at its own point in time; consecutive entries
    /// are not guaranteed to be physically consistent with each other.
    pub fn generate_history(&self, hours: u32) -> Vec<SensorReading> {
        self.generate_history_at(Utc::now(), &mut rand::thread_rng(), hours)
    }

    /// Generate hourly history for an explicit "now" and RNG.
    pub fn generate_history_at(
        &self,
        now: DateTime<Utc>,
        rng: &mut impl Rng,
        hours: u32,
    ) -> Vec<SensorReading> {
        let mut readings = Vec::with_capacity(hours as usize + 1);
        for offset in (0..=i64::from(hours)).rev() {
            let slot = now - Duration::hours(offset);
            readings.push(self.generate_at(slot, rng));
        }
        readings
    }

    /// Generate a fresh reading wrapped in the simulated IoT envelope.
    pub fn iot_message(&self) -> IotMessage {
        IotMessage::for_reading(self.generate())
    }

    // Temperature rises through the morning, peaks mid-afternoon, and falls
    // back to the base overnight. Floor of 18°C (heated greenhouse).
    fn daily_temperature(&self, hour: u32, rng: &mut impl Rng) -> f64 {
        let swing = day_cycle(hour) * self.config.day_temperature_swing;
        (self.config.base_temperature + swing + noise(rng, 2.0)).max(MIN_TEMPERATURE)
    }

    // Humidity drops as temperature climbs above the set point.
    fn humidity(&self, temperature: f64, rng: &mut impl Rng) -> f64 {
        let adjustment = (temperature - self.config.base_temperature) * -1.5;
        (self.config.base_humidity + adjustment + noise(rng, 5.0)).clamp(MIN_HUMIDITY, MAX_HUMIDITY)
    }

    // Each call redraws an independent "hours since last watering" term
    // rather than tracking elapsed time; irrigation resets moisture to the
    // base level, so depletion never accumulates across readings.
    fn soil_moisture(&self, rng: &mut impl Rng) -> f64 {
        let hours_since_watering = rng.gen::<f64>() * MAX_HOURS_SINCE_WATERING;
        let depletion = hours_since_watering * MOISTURE_DEPLETION_PER_HOUR;
        (self.config.base_soil_moisture - depletion + noise(rng, 3.0)).max(MIN_SOIL_MOISTURE)
    }

    // Daytime light follows the same sinusoid as temperature; nighttime is a
    // low constant from standby grow lamps.
    fn light_level(&self, hour: u32, rng: &mut impl Rng) -> f64 {
        if (DAY_START_HOUR..=DAY_END_HOUR).contains(&hour) {
            let swing = day_cycle(hour) * self.config.day_light_swing;
            (self.config.base_day_light + swing + noise(rng, 10.0)).max(MIN_DAY_LIGHT)
        } else {
            (self.config.night_light_level + noise(rng, 10.0)).max(0.0)
        }
    }
}

impl Default for ReadingGenerator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Sinusoid over the daylight window: 0 at 6:00, 1 at 12:00, 0 at 18:00,
/// negative overnight.
fn day_cycle(hour: u32) -> f64 {
    ((f64::from(hour) - f64::from(DAY_START_HOUR)) * PI / 12.0).sin()
}

/// Uniform noise in `[-span / 2, span / 2)`.
fn noise(rng: &mut impl Rng, span: f64) -> f64 {
    (rng.gen::<f64>() - 0.5) * span
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
