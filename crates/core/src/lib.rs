#![forbid(unsafe_code)]

pub mod error;
pub mod grading;
pub mod model;
pub mod settings;
pub mod time;

pub use error::Error;
pub use settings::{SessionSettings, SettingsError};
pub use time::{Clock, Countdown, CountdownTick};
