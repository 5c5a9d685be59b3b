use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use common::constants::N_XYZ_COORDINATES;
use common::types::{SensorType, XYZ};

use crate::errors::SamplerError;

const ACC_VARIABLES: [&str; N_XYZ_COORDINATES] = ["accX", "accY", "accZ"];
const ACC_TIME: &str = "acc_time";
const GYRO_VARIABLES: [&str; N_XYZ_COORDINATES] = ["gyroX", "gyroY", "gyroZ"];
const GYRO_TIME: &str = "gyro_time";

const STATUS: &str = "status";
const MEASURING: &str = "measuring";
const BUFFER: &str = "buffer";
const EXPORT: &str = "export";
const SET: &str = "set";

pub(crate) const EPS_MEASUREMENT_TIME: f64 = 10e-5;

/// Locks a mutex, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Phyphox buffer names (time, x, y, z) for a sensor
pub(crate) fn control_str(
    sensor: &SensorType,
) -> Result<(&'static str, [&'static str; N_XYZ_COORDINATES]), SamplerError> {
    match sensor {
        SensorType::Accelerometer(_) => Ok((ACC_TIME, ACC_VARIABLES)),
        SensorType::Gyroscope(_) => Ok((GYRO_TIME, GYRO_VARIABLES)),
        SensorType::Other(_, kind) => Err(SamplerError::SensorUnavailable(format!(
            "Sensor {} is not supported by phyphox",
            kind
        ))),
    }
}

/// Whether the phyphox experiment exports a buffer set for `sensor`.
pub(crate) fn exports_sensor(config: &Value, sensor: &SensorType) -> bool {
    let prefix = match sensor {
        SensorType::Accelerometer(_) => "acc",
        SensorType::Gyroscope(_) => "gyr",
        SensorType::Other(..) => return false,
    };
    config
        .get(EXPORT)
        .and_then(|e| e.as_array())
        .map(|exports| {
            exports.iter().any(|entry| {
                entry
                    .get(SET)
                    .and_then(|s| s.as_str())
                    .map(|s| s.to_lowercase().starts_with(prefix))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

pub(crate) fn get_status_from_json(data: &Value) -> Result<bool, SamplerError> {
    let status = data[STATUS][MEASURING]
        .as_bool()
        .ok_or(SamplerError::IncorrectDataFormat(
            "Missing status.measuring".to_string(),
        ))?;
    Ok(status)
}

pub(crate) fn parse_results(
    data: &Value,
    variables: &[&str],
    time_var: &str,
) -> Result<Vec<Vec<f64>>, SamplerError> {
    let buffers = data.get(BUFFER).ok_or(SamplerError::IncorrectDataFormat(
        "Missing buffer".to_string(),
    ))?;
    let mut results: Vec<Vec<f64>> = Vec::with_capacity(variables.len() + 1);
    for var in std::iter::once(time_var).chain(variables.iter().copied()) {
        let buffer = buffers.get(var).and_then(|v| v.get(BUFFER)).ok_or(
            SamplerError::IncorrectDataFormat(format!("Missing buffer for {}", var)),
        )?;
        let values: Vec<f64> = buffer
            .as_array()
            .ok_or(SamplerError::IncorrectDataFormat(format!(
                "Invalid buffer format for {}",
                var
            )))?
            .iter()
            .filter_map(|v| v.as_f64())
            .collect();
        results.push(values);
    }
    Ok(results)
}

/// Transposes column buffers into rows. Input is
/// results[0] : time
/// results[1] : x component
/// results[2] : y component
/// results[3] : z component
///
/// and the output pairs each timestamp with its (x, y, z). Rows missing a component are dropped.
pub(crate) fn combine_results(results: &[Vec<f64>]) -> (Vec<f64>, Vec<XYZ>) {
    let Some((time, components)) = results.split_first() else {
        return (vec![], vec![]);
    };
    if components.len() != N_XYZ_COORDINATES {
        return (vec![], vec![]);
    }

    let n_samples = results.iter().map(Vec::len).min().unwrap_or(0);
    let mut timestamp = Vec::with_capacity(n_samples);
    let mut untimed_data = Vec::with_capacity(n_samples);

    for row in 0..n_samples {
        let values: Vec<f64> = components.iter().map(|col| col[row]).collect();
        if let Ok(xyz) = XYZ::try_from(values) {
            untimed_data.push(xyz);
            timestamp.push(time[row]);
        }
    }
    (timestamp, untimed_data)
}

pub(crate) fn build_query(variables: &[&str], time_var: &str, since: Option<f64>) -> String {
    let mut query = match since {
        Some(since_val) => format!("{}={:.4}", time_var, since_val),
        None => time_var.to_string(),
    };

    for var in variables {
        match since {
            Some(since_val) => query.push_str(&format!("&{}={:.4}|{}", var, since_val, time_var)),
            None => query.push_str(&format!("&{}", var)),
        }
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_control_str() {
        let (time, vars) = control_str(&SensorType::Gyroscope(Uuid::new_v4())).unwrap();
        assert_eq!(time, "gyro_time");
        assert_eq!(vars, ["gyroX", "gyroY", "gyroZ"]);
        assert!(control_str(&SensorType::Other(Uuid::new_v4(), "mag".to_string())).is_err());
    }

    #[test]
    fn test_build_query() {
        assert_eq!(
            build_query(&ACC_VARIABLES, ACC_TIME, None),
            "acc_time&accX&accY&accZ"
        );
        assert_eq!(
            build_query(&ACC_VARIABLES, ACC_TIME, Some(2.0412)),
            "acc_time=2.0412&accX=2.0412|acc_time&accY=2.0412|acc_time&accZ=2.0412|acc_time"
        );
    }

    #[test]
    fn test_combine_results_uneven_columns() {
        let results = vec![
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0],
            vec![7.0, 8.0, 9.0],
        ];
        let (time, data) = combine_results(&results);
        assert_eq!(time, vec![1.0, 2.0]);
        assert_eq!(data, vec![XYZ::new([1.0, 4.0, 7.0]), XYZ::new([2.0, 5.0, 8.0])]);
    }

    #[test]
    fn test_combine_results_empty() {
        let (time, data) = combine_results(&[]);
        assert!(time.is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn test_status_and_exports() {
        let data = json!({"status": {"measuring": false}});
        assert!(!get_status_from_json(&data).unwrap());
        assert!(get_status_from_json(&json!({})).is_err());

        let config = json!({"export": [{"set": "Accelerometer"}, {"set": "Location"}]});
        assert!(exports_sensor(&config, &SensorType::Accelerometer(Uuid::new_v4())));
        assert!(!exports_sensor(&config, &SensorType::Gyroscope(Uuid::new_v4())));
    }

    #[test]
    fn test_lock_recovers_poisoned_mutex() {
        let mutex = std::sync::Arc::new(Mutex::new(1));
        let cloned = mutex.clone();
        let _ = std::thread::spawn(move || {
            let _guard = cloned.lock().unwrap();
            panic!("poison");
        })
        .join();
        assert!(mutex.is_poisoned());
        assert_eq!(*lock(&mutex), 1);
    }
}
