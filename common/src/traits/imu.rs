/// Timed sample from an IMU (Inertial Measurement Unit).
pub trait IMUSample: Send + Sync + Clone + Default + 'static {
    type Untimed;

    ///  Returns the timestamp of the sample.
    fn get_timestamp(&self) -> f64;
    ///  Returns the measurement data
    fn get_measurement(&self) -> Self::Untimed;
    /// Returns a IMUSample
    fn from_measurement(timestamp: f64, measurement: Self::Untimed) -> Self;
}
