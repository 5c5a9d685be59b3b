use chrono::{DateTime, Utc};

use common::types::Sample3D;

use crate::models::status::SessionStatus;

/// Point-in-time copy of a session, used by displays to render progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub accelerometer: Vec<Sample3D>,
    pub gyroscope: Vec<Sample3D>,
}

impl SessionSnapshot {
    /// Upload trigger rule: not collecting and at least one accelerometer sample.
    pub fn can_upload(&self) -> bool {
        !self.status.is_collecting() && !self.accelerometer.is_empty()
    }

    /// Text shown by a display: status line followed by one `X: .. Y: .. Z: ..` line per sample.
    pub fn render(&self) -> String {
        let mut lines = vec![format!("Data Collection Status: {}", self.status)];
        render_samples(&mut lines, "Accelerometer Data:", &self.accelerometer);
        render_samples(&mut lines, "Gyroscope Data:", &self.gyroscope);
        lines.join("\n")
    }
}

fn render_samples(lines: &mut Vec<String>, title: &str, samples: &[Sample3D]) {
    lines.push(title.to_string());
    lines.extend(samples.iter().map(|sample| sample.to_string()));
}
