pub mod payload;
pub mod snapshot;
pub mod status;

pub use payload::UploadPayload;
pub use snapshot::SessionSnapshot;
pub use status::SessionStatus;
