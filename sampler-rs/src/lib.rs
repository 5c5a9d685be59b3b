//! # Crate sampler-rs
//!
//! ## sampler-rs
//!
//! The `sampler-rs` crate records accelerometer and gyroscope readings for a bounded time window,
//! keeps them in memory while a display shows live progress, and forwards the finished batch to an
//! HTTP endpoint when asked to.
//!
//! Features include:
//! - A [`SamplingSession`] with an `Idle -> Collecting -> Stopped` lifecycle. Collection stops on its
//!   own once the configured duration elapses; `start()` clears the buffers and starts over.
//! - Sensor sources injected through the [`SensorSource`] port: a manual [`SensorMock`], a simulated
//!   source with Gaussian noise and a source backed by the [`Phyphox`](https://phyphox.org/) phone app
//!   REST API.
//! - Upload of the collected batch as JSON with a classification of failures
//!   (rejected, unreachable, malformed request). Failed uploads never touch the buffer.
//! - Layered configuration (defaults, optional `sampler_config` file, `SAMPLER_*` environment).
//!
//! **NOTE** Samples are only appended while the session is collecting. Tearing down a session (or
//! starting a new one) releases both sensor subscriptions before returning.

pub mod adapters;
pub mod config;
pub mod constants;
pub mod errors;
pub(crate) mod helpers;
pub(crate) mod http_client;
pub mod models;
pub mod ports;
pub mod services;
pub mod session;
pub mod upload;

pub use adapters::mock::SensorMock;
pub use adapters::polling::PollingSource;
pub use adapters::production::PhyphoxReader;
pub use adapters::simulated::GaussianReader;
pub use config::{SamplerConfig, SessionConfig};
pub use errors::{SamplerError, UploadError};
pub use models::{SessionSnapshot, SessionStatus, UploadPayload};
pub use ports::{SampleReader, SensorSource};
pub use session::SamplingSession;
pub use upload::{UploadReceipt, Uploader};
