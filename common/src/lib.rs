//! General functionality for the `imu-sampler` workspace

pub mod constants;

#[doc(hidden)]
pub mod traits;
#[doc(hidden)]
pub mod types;

// Re-export traits
#[doc(inline)]
pub use traits::{IMUSample, Notifiable};

// Re-export types
#[doc(inline)]
pub use types::{Callback, Clock, Sample3D, SensorType, XYZ};
