// Reads accelerometer and gyroscope samples from the phyphox phone app REST API.
// The app must run an experiment that exports the sensor buffers (for example "Acceleration
// without g" or "Gyroscope") with remote access enabled.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use common::types::{SensorType, XYZ};

use crate::errors::SamplerError;
use crate::helpers::{self, lock, EPS_MEASUREMENT_TIME};
use crate::http_client::HttpClient;
use crate::ports::SampleReader;

/// Constants for HTTP endpoints.
const GET_CMD: &str = "/get?";
const CONTROL_CMD: &str = "/control?cmd=";
const START_CMD: &str = "start";
const STOP_CMD: &str = "stop";
const CLEAR_CMD: &str = "clear";
const CONFIG_CMD: &str = "/config?";

/// Reader for one phyphox sensor
pub struct PhyphoxReader {
    client: HttpClient,
    sensor_type: SensorType,
    last_time: Mutex<f64>,
}

impl PhyphoxReader {
    /// Creates a reader without contacting the phone.
    /// Returns a ClientBuild error if the http client cannot be created.
    pub fn new(
        base_url: &str,
        sensor_type: SensorType,
        timeout: Duration,
    ) -> Result<Self, SamplerError> {
        helpers::control_str(&sensor_type)?;
        let client = HttpClient::new(base_url, timeout)?;

        Ok(Self {
            client,
            sensor_type,
            last_time: Mutex::new(0.0),
        })
    }

    /// Creates a reader and checks that the running experiment exports `sensor_type`.
    /// # Errors
    /// - SensorUnavailable if the phone is unreachable or does not export the sensor
    pub async fn connect(
        base_url: &str,
        sensor_type: SensorType,
        timeout: Duration,
    ) -> Result<Self, SamplerError> {
        let reader = Self::new(base_url, sensor_type, timeout)?;
        let config = reader.client.fetch_json(CONFIG_CMD).await.map_err(|e| {
            SamplerError::SensorUnavailable(format!(
                "phyphox at {} unreachable: {}",
                reader.client.base_url(),
                e
            ))
        })?;

        if !helpers::exports_sensor(&config, &reader.sensor_type) {
            return Err(SamplerError::SensorUnavailable(format!(
                "phyphox experiment does not export {}",
                reader.sensor_type.kind()
            )));
        }
        Ok(reader)
    }

    pub fn sensor_type(&self) -> &SensorType {
        &self.sensor_type
    }

    /// Returns the buffer sets exported by the running experiment
    pub async fn get_available_sensors(&self) -> Result<Vec<String>, SamplerError> {
        let json = self.client.fetch_json(CONFIG_CMD).await?;
        let available_sensors = json
            .get("export")
            .and_then(|e| e.as_array())
            .map(|exports| {
                exports
                    .iter()
                    .filter_map(|entry| entry.get("set").and_then(|s| s.as_str()))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(available_sensors)
    }

    /// Returns the samples recorded after `since` and a flag indicating if the phone is still measuring
    /// # Errors
    /// - FetchData if there is an error connecting to REST API
    /// - IncorrectDataFormat if the data retrieved from the API has an unexpected format
    async fn get_data(&self, since: Option<f64>) -> Result<(Vec<f64>, Vec<XYZ>, bool), SamplerError> {
        let (time_var, variables) = helpers::control_str(&self.sensor_type)?;
        let query = helpers::build_query(&variables, time_var, since);
        let data: Value = self.client.fetch_json(&format!("{GET_CMD}{}", query)).await?;
        let status = helpers::get_status_from_json(&data)?;
        let results = helpers::parse_results(&data, &variables, time_var)?;
        let (timestamp, untimed_data) = helpers::combine_results(&results);

        Ok((timestamp, untimed_data, status))
    }

    async fn control(&self, command: &str) -> Result<(), SamplerError> {
        self.client
            .fetch_json(&format!("{CONTROL_CMD}{}", command))
            .await?;
        Ok(())
    }

    // Clears recorded data on the phone
    async fn clear_cmd(&self) -> Result<(), SamplerError> {
        log::info!("Clearing data...");
        self.control(CLEAR_CMD).await
    }

    async fn start_cmd(&self) -> Result<(), SamplerError> {
        log::info!("Starting recording...");
        self.control(START_CMD).await
    }

    async fn stop_cmd(&self) -> Result<(), SamplerError> {
        log::info!("Stopping recording...");
        self.control(STOP_CMD).await
    }
}

#[async_trait]
impl SampleReader for PhyphoxReader {
    async fn prepare(&self) -> Result<(), SamplerError> {
        self.clear_cmd().await?;
        self.start_cmd().await?;
        *lock(&self.last_time) = 0.0;
        Ok(())
    }

    async fn read_latest(&self) -> Result<Option<XYZ>, SamplerError> {
        let since = *lock(&self.last_time);
        let (timestamps, mut data, is_measuring) = self.get_data(Some(since)).await?;

        if !is_measuring {
            log::warn!("Phyphox is not measuring {}", self.sensor_type.kind());
            return Ok(None);
        }

        if let Some(last) = timestamps.last() {
            *lock(&self.last_time) = last + EPS_MEASUREMENT_TIME;
        }
        Ok(data.pop())
    }

    async fn finish(&self) {
        if let Err(e) = self.stop_cmd().await {
            log::warn!("Could not stop phyphox recording: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(2);

    fn accelerometer() -> SensorType {
        SensorType::Accelerometer(Uuid::new_v4())
    }

    fn acc_buffer(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>, t: Vec<f64>, measuring: bool) -> Value {
        json!({
            "buffer": {
                "accX": { "buffer": x, "size": 0, "updateMode": "partial" },
                "accY": { "buffer": y, "size": 0, "updateMode": "partial" },
                "accZ": { "buffer": z, "size": 0, "updateMode": "partial" },
                "acc_time": { "buffer": t, "size": 0, "updateMode": "partial" }
            },
            "status": { "measuring": measuring }
        })
    }

    #[test]
    fn test_phyphox_new() {
        PhyphoxReader::new("http://localhost", accelerometer(), TIMEOUT)
            .expect("Error creating Phyphox reader");
    }

    #[test]
    fn test_phyphox_new_rejects_unsupported_sensor() {
        let result = PhyphoxReader::new(
            "http://localhost",
            SensorType::Other(Uuid::new_v4(), "magnetometer".to_string()),
            TIMEOUT,
        );
        assert!(matches!(result, Err(SamplerError::SensorUnavailable(_))));
    }

    #[tokio::test]
    async fn test_connect_checks_exports() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "export": [{ "set": "Accelerometer" }]
            })))
            .mount(&mock_server)
            .await;

        let reader = PhyphoxReader::connect(&mock_server.uri(), accelerometer(), TIMEOUT).await;
        assert!(reader.is_ok());

        let reader = PhyphoxReader::connect(
            &mock_server.uri(),
            SensorType::Gyroscope(Uuid::new_v4()),
            TIMEOUT,
        )
        .await;
        assert!(matches!(reader, Err(SamplerError::SensorUnavailable(_))));
    }

    #[tokio::test]
    async fn test_get_available_sensors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/config"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "export": [{ "set": "Accelerometer" }, { "set": "Gyroscope" }]
            })))
            .mount(&mock_server)
            .await;

        let reader = PhyphoxReader::new(&mock_server.uri(), accelerometer(), TIMEOUT).unwrap();
        let sensors = reader.get_available_sensors().await.unwrap();
        assert_eq!(sensors, vec!["Accelerometer", "Gyroscope"]);
    }

    #[tokio::test]
    async fn test_prepare_sends_clear_and_start() {
        let mock_server = MockServer::start().await;
        for cmd in ["clear", "start"] {
            Mock::given(method("GET"))
                .and(path("/control"))
                .and(query_param("cmd", cmd))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": true })))
                .expect(1)
                .mount(&mock_server)
                .await;
        }

        let reader = PhyphoxReader::new(&mock_server.uri(), accelerometer(), TIMEOUT).unwrap();
        assert!(reader.prepare().await.is_ok());
    }

    #[tokio::test]
    async fn test_read_latest_returns_last_complete_row() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(acc_buffer(
                vec![1.0, 2.0, 3.0],
                vec![4.0, 5.0],
                vec![7.0, 8.0, 9.0],
                vec![0.5, 1.0, 1.5],
                true,
            )))
            .mount(&mock_server)
            .await;

        let reader = PhyphoxReader::new(&mock_server.uri(), accelerometer(), TIMEOUT).unwrap();
        let latest = reader.read_latest().await.unwrap();

        assert_eq!(latest, Some(XYZ::new([2.0, 5.0, 8.0])));
        assert_eq!(*lock(&reader.last_time), 1.0 + EPS_MEASUREMENT_TIME);
    }

    #[tokio::test]
    async fn test_read_latest_when_not_measuring() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/get"))
            .respond_with(ResponseTemplate::new(200).set_body_json(acc_buffer(
                vec![1.0],
                vec![2.0],
                vec![3.0],
                vec![0.5],
                false,
            )))
            .mount(&mock_server)
            .await;

        let reader = PhyphoxReader::new(&mock_server.uri(), accelerometer(), TIMEOUT).unwrap();
        assert_eq!(reader.read_latest().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_latest_with_bad_format() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": { "measuring": true }
            })))
            .mount(&mock_server)
            .await;

        let reader = PhyphoxReader::new(&mock_server.uri(), accelerometer(), TIMEOUT).unwrap();
        let result = reader.read_latest().await;
        assert!(matches!(result, Err(SamplerError::IncorrectDataFormat(_))));
    }
}
