//! Error types for HodlYield

use thiserror::Error;

#[derive(Error, Debug)]
pub enum YieldError {
    /// Non-positive or non-finite spot, strike, volatility or time handed to the pricing model.
    #[error("Invalid pricing input: {0}")]
    InvalidPricingInput(String),

    /// Implied volatility cannot be recovered from the observed premium.
    #[error("No implied volatility solution: {0}")]
    NoSolutionFound(String),

    /// The quote collection as a whole is absent or unusable.
    #[error("Malformed chain data: {0}")]
    MalformedChainData(String),

    #[error("Data error: {0}")]
    Data(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type YieldResult<T> = Result<T, YieldError>;

impl YieldError {
    pub fn invalid_pricing_input(msg: impl Into<String>) -> Self {
        Self::InvalidPricingInput(msg.into())
    }

    pub fn no_solution(msg: impl Into<String>) -> Self {
        Self::NoSolutionFound(msg.into())
    }

    pub fn malformed_chain(msg: impl Into<String>) -> Self {
        Self::MalformedChainData(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = YieldError::no_solution("premium 0 not above intrinsic 0");
        assert!(err.to_string().contains("premium 0 not above intrinsic 0"));

        let err = YieldError::malformed_chain("empty chain");
        assert!(err.to_string().starts_with("Malformed chain data"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: YieldError = io.into();
        assert!(matches!(err, YieldError::IO(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<YieldError>();
    }
}
