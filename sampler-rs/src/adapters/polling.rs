use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use common::traits::{IMUSample, Notifiable};
use common::types::{Clock, Sample3D, SensorType};
use publisher::{Publishable, Publisher, Subscription};

use crate::constants::DEFAULT_UPDATE_INTERVAL_MS;
use crate::errors::SamplerError;
use crate::helpers::lock;
use crate::ports::{SampleReader, SensorSource};

/// Sensor source that polls a [`SampleReader`] once per update interval.
///
/// The polling task is spawned on the first subscription and exits at the first tick with no
/// listener left, calling [`SampleReader::finish`]. Subscribing again spawns a new task once the
/// previous one has finished.
pub struct PollingSource<R: SampleReader> {
    inner: Arc<PollingInner<R>>,
}

struct PollingInner<R: SampleReader> {
    sensor_type: SensorType,
    reader: R,
    publisher: Publisher<Sample3D>,
    period_millis: AtomicU64,
    poller: Mutex<Option<JoinHandle<()>>>,
    // Serializes prepare/finish of consecutive polling runs.
    lifecycle: tokio::sync::Mutex<()>,
}

impl<R: SampleReader> PollingSource<R> {
    pub fn new(sensor_type: SensorType, reader: R) -> Self {
        Self {
            inner: Arc::new(PollingInner {
                sensor_type,
                reader,
                publisher: Publisher::new(),
                period_millis: AtomicU64::new(DEFAULT_UPDATE_INTERVAL_MS),
                poller: Mutex::new(None),
                lifecycle: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn reader(&self) -> &R {
        &self.inner.reader
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.inner.poller).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.inner.publisher.len()
    }
}

impl<R: SampleReader> PollingInner<R> {
    fn period(&self) -> Duration {
        Duration::from_millis(self.period_millis.load(Ordering::Acquire))
    }
}

impl<R: SampleReader> SensorSource for PollingSource<R> {
    fn get_sensor_type(&self) -> &SensorType {
        &self.inner.sensor_type
    }

    fn set_update_interval(&self, period: Duration) {
        // A zero period would spin the polling task.
        let millis = (period.as_millis() as u64).max(1);
        self.inner.period_millis.store(millis, Ordering::Release);
    }

    fn add_listener(
        &self,
        listener: &mut dyn Notifiable<Sample3D>,
    ) -> Result<Subscription, SamplerError> {
        let runtime = Handle::try_current().map_err(|e| {
            SamplerError::SensorUnavailable(format!(
                "{} needs a tokio runtime to poll: {}",
                self.inner.sensor_type.kind(),
                e
            ))
        })?;

        let mut poller = lock(&self.inner.poller);
        let subscription = self.inner.publisher.subscribe(listener);
        if poller.is_none() {
            log::info!("Start polling {}", self.inner.sensor_type);
            *poller = Some(runtime.spawn(poll(Arc::clone(&self.inner))));
        }
        Ok(subscription)
    }
}

async fn poll<R: SampleReader>(inner: Arc<PollingInner<R>>) {
    let _run = inner.lifecycle.lock().await;

    if let Err(e) = inner.reader.prepare().await {
        log::error!("Could not prepare {}: {}", inner.sensor_type, e);
        lock(&inner.poller).take();
        return;
    }

    loop {
        tokio::time::sleep(inner.period()).await;

        {
            let mut poller = lock(&inner.poller);
            if inner.publisher.is_empty() {
                poller.take();
                break;
            }
        }

        match inner.reader.read_latest().await {
            Ok(Some(measurement)) => {
                let sample = Sample3D::from_measurement(Clock::now().as_secs(), measurement);
                log::debug!("{}: {}", inner.sensor_type, sample);
                inner.publisher.notify_listeners(Arc::new(sample));
            }
            Ok(None) => {}
            Err(e) => log::warn!("Error reading {}: {}", inner.sensor_type, e),
        }
    }

    inner.reader.finish().await;
    log::info!("Stop polling {}", inner.sensor_type);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::types::XYZ;
    use publisher::Listener;
    use std::sync::atomic::AtomicUsize;
    use uuid::Uuid;

    #[derive(Default)]
    struct CountingReader {
        prepared: AtomicUsize,
        reads: AtomicUsize,
        finished: AtomicUsize,
    }

    #[async_trait]
    impl SampleReader for CountingReader {
        async fn prepare(&self) -> Result<(), SamplerError> {
            self.prepared.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn read_latest(&self) -> Result<Option<XYZ>, SamplerError> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(Some(XYZ::new([n as f64, 0.0, 0.0])))
        }

        async fn finish(&self) {
            self.finished.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting_source() -> PollingSource<CountingReader> {
        PollingSource::new(
            SensorType::Accelerometer(Uuid::new_v4()),
            CountingReader::default(),
        )
    }

    fn collecting_listener() -> (Listener<Sample3D>, Arc<Mutex<Vec<Sample3D>>>) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let listener = Listener::new({
            let received = received.clone();
            move |_id, sample: Arc<Sample3D>| received.lock().unwrap().push((*sample).clone())
        });
        (listener, received)
    }

    #[test]
    fn test_add_listener_outside_runtime() {
        let source = counting_source();
        let (mut listener, _) = collecting_listener();
        let result = source.add_listener(&mut listener);
        assert!(matches!(result, Err(SamplerError::SensorUnavailable(_))));
        assert_eq!(source.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_at_update_interval() {
        let source = counting_source();
        source.set_update_interval(Duration::from_millis(100));
        let (mut listener, received) = collecting_listener();

        let _subscription = source.add_listener(&mut listener).unwrap();
        assert!(source.is_polling());

        tokio::time::sleep(Duration::from_millis(350)).await;

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 3);
        let xs: Vec<f64> = received.iter().map(|s| s.measurement().x()).collect();
        assert_eq!(xs, vec![0.0, 1.0, 2.0]);
        assert_eq!(source.reader().prepared.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_polling_without_listeners() {
        let source = counting_source();
        source.set_update_interval(Duration::from_millis(100));
        let (mut listener, received) = collecting_listener();

        let subscription = source.add_listener(&mut listener).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        subscription.remove();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(!source.is_polling());
        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(source.reader().finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_starts_new_run() {
        let source = counting_source();
        source.set_update_interval(Duration::from_millis(100));
        let (mut listener, _) = collecting_listener();

        let subscription = source.add_listener(&mut listener).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;
        drop(subscription);
        tokio::time::sleep(Duration::from_millis(200)).await;

        let _subscription = source.add_listener(&mut listener).unwrap();
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(source.is_polling());
        assert_eq!(source.reader().prepared.load(Ordering::SeqCst), 2);
        assert_eq!(source.reader().finished.load(Ordering::SeqCst), 1);
    }
}
