pub mod calibration;
pub mod classifier;
pub mod config;
pub mod connection;
pub mod cooldown;
pub mod delta_classifier;
pub mod indicator;
pub mod model_classifier;
pub mod replay;
pub mod sensor;
pub mod session;
pub mod telemetry;
pub mod types;
