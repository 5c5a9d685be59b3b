/// Default time between two sensor emissions
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 1000;
/// Default length of a collection window
pub const DEFAULT_COLLECTION_DURATION_MS: u64 = 10000;
/// Default timeout for HTTP requests
pub const DEFAULT_CLIENT_TIMEOUT_SECS: u64 = 5;
/// Standard gravity [m/s^2]
pub const STANDARD_GRAVITY: f64 = 9.80665;
