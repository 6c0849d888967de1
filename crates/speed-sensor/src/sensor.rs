//! Async Speed Sensor Task
//!
//! Raw samples arrive at irregular intervals (typically every 250-500 ms)
//! from the location collaborator. The task filters them and publishes the
//! latest speed in km/h on a watch cell. Readers never block and only ever
//! see the most recent value.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::kalman::{KalmanConfig, SpeedFilter};
use crate::validator::{ValidationConfig, Validator};
use crate::ValidationError;

/// Conversion factor from m/s to km/h
pub const MS_TO_KMH: f64 = 3.6;

/// Speed sensor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedSensorConfig {
    /// Kalman filter parameters
    pub kalman: KalmanConfig,
    /// Sample validation
    pub validation: ValidationConfig,
    /// Pending sample capacity before samples are dropped
    pub channel_capacity: usize,
}

impl Default for SpeedSensorConfig {
    fn default() -> Self {
        Self {
            kalman: KalmanConfig::default(),
            validation: ValidationConfig::default(),
            channel_capacity: 32,
        }
    }
}

#[derive(Debug)]
enum Command {
    Sample(f64),
    Start,
    Stop,
    Reset,
}

/// Speed sensor owning the filter state
pub struct SpeedSensor {
    filter: SpeedFilter,
    validator: Validator,
    running: bool,
    speed_tx: watch::Sender<f64>,
}

impl SpeedSensor {
    /// Create a sensor and the watch cell it publishes to (initial value 0.0)
    pub fn new(config: &SpeedSensorConfig) -> (Self, watch::Receiver<f64>) {
        let (speed_tx, speed_rx) = watch::channel(0.0);
        let sensor = Self {
            filter: SpeedFilter::new(config.kalman),
            validator: Validator::new(config.validation.clone()),
            running: true,
            speed_tx,
        };
        (sensor, speed_rx)
    }

    /// Spawn the sensor task on the current runtime
    pub fn spawn(config: SpeedSensorConfig) -> (SpeedHandle, JoinHandle<()>) {
        let capacity = config.channel_capacity.max(1);
        let (tx, rx) = mpsc::channel(capacity);
        let (sensor, speed_rx) = Self::new(&config);

        info!("Spawning speed sensor (capacity={})", capacity);
        let task = tokio::spawn(sensor.run(rx));

        (SpeedHandle { tx, speed_rx }, task)
    }

    /// Filter one raw sample (m/s) and publish the result in km/h
    pub fn handle_sample(&mut self, raw_ms: f64) -> Result<f64, ValidationError> {
        let speed_ms = self.validator.sanitize_speed(raw_ms)?;
        let filtered_ms = self.filter.filter(speed_ms);
        let speed_kmh = filtered_ms * MS_TO_KMH;

        self.speed_tx.send_replace(speed_kmh);
        metrics::gauge!("speed_filtered_kmh").set(speed_kmh);
        Ok(speed_kmh)
    }

    /// Clear the filter and publish 0 km/h
    pub fn reset(&mut self) {
        self.filter.reset();
        self.speed_tx.send_replace(0.0);
    }

    /// Whether samples are currently accepted
    pub fn is_running(&self) -> bool {
        self.running
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!("Starting speed sensor");

        while let Some(command) = rx.recv().await {
            match command {
                Command::Sample(_) if !self.running => {
                    debug!("Speed sensor stopped, sample ignored");
                }
                Command::Sample(raw) => match self.handle_sample(raw) {
                    Ok(kmh) => debug!("Speed sample {:.2} m/s -> {:.2} km/h", raw, kmh),
                    Err(e) => warn!("Speed sample rejected: {}", e),
                },
                Command::Start => {
                    info!("Speed sensor started");
                    self.running = true;
                }
                Command::Stop => {
                    info!("Speed sensor stopped");
                    self.running = false;
                }
                Command::Reset => {
                    info!("Speed sensor reset");
                    self.reset();
                }
            }
        }

        info!("Speed sensor task finished");
    }
}

/// Cloneable handle to a running speed sensor
#[derive(Debug, Clone)]
pub struct SpeedHandle {
    tx: mpsc::Sender<Command>,
    speed_rx: watch::Receiver<f64>,
}

impl SpeedHandle {
    /// Submit a raw sample (m/s) without waiting. Returns false if the
    /// sample was dropped.
    pub fn send(&self, raw_ms: f64) -> bool {
        match self.tx.try_send(Command::Sample(raw_ms)) {
            Ok(()) => true,
            Err(e) => {
                debug!("Speed sample dropped: {}", e);
                false
            }
        }
    }

    /// Resume accepting samples
    pub async fn start(&self) -> bool {
        self.tx.send(Command::Start).await.is_ok()
    }

    /// Ignore samples until started again
    pub async fn stop(&self) -> bool {
        self.tx.send(Command::Stop).await.is_ok()
    }

    /// Clear the filter and publish 0 km/h
    pub async fn reset(&self) -> bool {
        self.tx.send(Command::Reset).await.is_ok()
    }

    /// Latest filtered speed (km/h)
    pub fn speed_kmh(&self) -> f64 {
        *self.speed_rx.borrow()
    }

    /// Independent receiver for observing speed updates
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.speed_rx.clone()
    }
}
