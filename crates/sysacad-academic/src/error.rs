#[derive(Debug, thiserror::Error)]
pub enum AcademicError {
    /// The breaker rejected the call without touching the network.
    #[error("academic service circuit is open")]
    CircuitOpen,

    #[error("academic service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("academic service returned unexpected status {0}")]
    UnexpectedStatus(u16),
}

impl AcademicError {
    /// True when the upstream answered but with a status outside 200/404.
    pub fn is_bad_gateway(&self) -> bool {
        matches!(self, Self::UnexpectedStatus(_))
    }
}
