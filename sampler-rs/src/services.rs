use std::sync::Arc;

use tokio::task::JoinHandle;
use uuid::Uuid;

use common::types::SensorType;

use crate::adapters::polling::PollingSource;
use crate::adapters::production::PhyphoxReader;
use crate::adapters::simulated::GaussianReader;
use crate::config::{SamplerConfig, SourceConfig};
use crate::errors::{SamplerError, UploadError};
use crate::models::SessionStatus;
use crate::ports::SensorSource;
use crate::session::SamplingSession;
use crate::upload::{UploadReceipt, Uploader};

/// Uploads the samples buffered in `session` to `endpoint`.
///
/// Refuses while the session is collecting or when no accelerometer sample was buffered. Every
/// failure is logged and returned; the session is never modified, so the upload can be retried
/// by calling this again.
pub async fn upload_session(
    session: &SamplingSession,
    uploader: &Uploader,
    endpoint: &str,
) -> Result<UploadReceipt, SamplerError> {
    let snapshot = session.snapshot();
    if snapshot.status.is_collecting() {
        log::warn!("Upload requested while collecting");
        return Err(SamplerError::StillCollecting);
    }
    if !snapshot.can_upload() {
        log::warn!("Upload requested without accelerometer samples");
        return Err(SamplerError::NothingToUpload);
    }

    let payload = session.build_upload_payload()?;
    match uploader.upload(endpoint, &payload).await {
        Ok(receipt) => {
            log::info!(
                "Data sent to server successfully (status {}): {}",
                receipt.status,
                receipt.body
            );
            Ok(receipt)
        }
        Err(e) => {
            log_upload_error(&e);
            Err(e.into())
        }
    }
}

/// Fire-and-forget variant of [`upload_session`].
pub fn spawn_upload(
    session: Arc<SamplingSession>,
    uploader: Uploader,
    endpoint: String,
) -> JoinHandle<Result<UploadReceipt, SamplerError>> {
    tokio::spawn(async move { upload_session(&session, &uploader, &endpoint).await })
}

fn log_upload_error(error: &UploadError) {
    match error {
        UploadError::Rejected {
            status,
            body,
            headers,
        } => {
            log::error!("Error sending data. Server answered {}", status);
            log::error!("Response data: {}", body);
            log::error!("Response headers: {:?}", headers);
        }
        UploadError::Unreachable(reason) => {
            log::error!("Error sending data. No response received: {}", reason);
        }
        UploadError::Request(reason) => {
            log::error!("Error setting up the upload request: {}", reason);
        }
    }
}

/// Builds the accelerometer and gyroscope sources: phyphox when `phyphox_url` is set,
/// simulated readers otherwise.
///
/// # Errors
/// - SensorUnavailable if phyphox cannot be reached or does not export one of the sensors
pub async fn build_sources(
    config: &SourceConfig,
) -> Result<(Arc<dyn SensorSource>, Arc<dyn SensorSource>), SamplerError> {
    let accelerometer = SensorType::Accelerometer(Uuid::new_v4());
    let gyroscope = SensorType::Gyroscope(Uuid::new_v4());

    match config.phyphox_url.as_deref() {
        Some(base_url) => {
            log::info!("Reading sensors from phyphox at {}", base_url);
            let acc_reader =
                PhyphoxReader::connect(base_url, accelerometer.clone(), config.timeout()).await?;
            let gyro_reader =
                PhyphoxReader::connect(base_url, gyroscope.clone(), config.timeout()).await?;
            Ok((
                Arc::new(PollingSource::new(accelerometer, acc_reader)),
                Arc::new(PollingSource::new(gyroscope, gyro_reader)),
            ))
        }
        None => {
            log::info!(
                "Using simulated sensors (noise {})",
                if config.add_sensor_noise { "on" } else { "off" }
            );
            Ok((
                Arc::new(PollingSource::new(
                    accelerometer,
                    GaussianReader::accelerometer(config.add_sensor_noise)?,
                )),
                Arc::new(PollingSource::new(
                    gyroscope,
                    GaussianReader::gyroscope(config.add_sensor_noise)?,
                )),
            ))
        }
    }
}

/// Builds the sources, creates a session and starts it.
///
/// # Returns
///
/// Returns a tuple containing:
/// * A `JoinHandle` resolving with the final status once the session stops collecting.
/// * The running session, shared with the caller for snapshots, teardown and upload.
pub async fn run_session(
    config: &SamplerConfig,
) -> Result<(JoinHandle<SessionStatus>, Arc<SamplingSession>), SamplerError> {
    let (accelerometer, gyroscope) = build_sources(&config.source).await?;
    let session = Arc::new(SamplingSession::new(
        config.session.clone(),
        accelerometer,
        gyroscope,
    )?);
    session.start()?;

    let handle = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.wait_until_stopped().await }
    });
    Ok((handle, session))
}
