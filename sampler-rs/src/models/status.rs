use std::fmt;

/// Lifecycle state of a [`SamplingSession`](crate::SamplingSession).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Idle,
    Collecting,
    Stopped,
    /// A sensor could not be subscribed when the session was started.
    Failed(String),
}

impl SessionStatus {
    pub fn is_collecting(&self) -> bool {
        matches!(self, SessionStatus::Collecting)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Idle => write!(f, "Idle"),
            SessionStatus::Collecting => write!(f, "Collecting..."),
            SessionStatus::Stopped => write!(f, "Stopped"),
            SessionStatus::Failed(reason) => write!(f, "Failed: {}", reason),
        }
    }
}
