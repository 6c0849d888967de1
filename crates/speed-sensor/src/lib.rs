//! Speed Sensor
//!
//! Turns noisy GPS speed samples into a smoothed speed value:
//! - Sample validation and range checking
//! - Scalar Kalman filter
//! - Async sensor task publishing the latest filtered speed (km/h)

mod error;
mod kalman;
mod sensor;
mod validator;

pub use error::ValidationError;
pub use kalman::{kalman_step, KalmanConfig, KalmanState, SpeedFilter};
pub use sensor::{SpeedHandle, SpeedSensor, SpeedSensorConfig, MS_TO_KMH};
pub use validator::{ValidationConfig, Validator};
