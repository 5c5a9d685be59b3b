// Runs one sampling session and uploads the result.
//
//   SAMPLER_UPLOAD__URL=http://localhost:3000/create cargo run --bin collect
//   SAMPLER_SOURCE__PHYPHOX_URL=http://192.168.1.34 cargo run --bin collect

use env_logger::Env;
use tokio::time::{interval, MissedTickBehavior};

use sampler_rs::services::{run_session, upload_session};
use sampler_rs::{SamplerConfig, SamplerError, Uploader};

#[tokio::main]
async fn main() -> Result<(), SamplerError> {
    let config = SamplerConfig::load()?;
    env_logger::Builder::from_env(Env::default().default_filter_or(config.logging.level.as_str()))
        .init();

    let (mut handle, session) = run_session(&config).await?;

    let mut progress = interval(config.session.update_interval());
    progress.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let status = loop {
        tokio::select! {
            result = &mut handle => {
                break result.unwrap_or_else(|_| session.status());
            }
            _ = tokio::signal::ctrl_c() => {
                log::info!("Ctrl+C received. Stopping collection...");
                session.teardown();
            }
            _ = progress.tick() => {
                let snapshot = session.snapshot();
                log::info!(
                    "{}: {} accelerometer / {} gyroscope samples",
                    snapshot.status,
                    snapshot.accelerometer.len(),
                    snapshot.gyroscope.len()
                );
            }
        }
    };

    let snapshot = session.snapshot();
    println!("{}", snapshot.render());
    log::info!("Session finished: {}", status);

    match config.upload.url.as_deref() {
        Some(endpoint) if snapshot.can_upload() => {
            let uploader = Uploader::from_config(&config.upload)?;
            upload_session(&session, &uploader, endpoint).await?;
        }
        Some(_) => log::warn!("Nothing to upload"),
        None => log::info!("No upload url configured, skipping upload"),
    }
    Ok(())
}
