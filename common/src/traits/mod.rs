pub mod imu;
pub mod publisher;

pub use crate::traits::imu::IMUSample;
pub use crate::traits::publisher::Notifiable;
