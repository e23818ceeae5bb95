use thiserror::Error;

/// Errors that can occur while computing a chart
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    /// Malformed date, time, offset or coordinates supplied by the caller
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
    /// The ephemeris oracle reported a computation error
    #[error("Ephemeris error for {context} at JD {julian_day}: {message}")]
    Oracle {
        context: String,
        julian_day: f64,
        message: String,
    },
    /// Cusp data missing or malformed after an oracle call
    #[error("House calculation failed: {message}")]
    HouseCalculation { message: String },
    /// Phase angle fell outside every phase bucket
    #[error("Could not determine moon phase for angle {angle}")]
    PhaseLookup { angle: f64 },
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ChartError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn oracle(context: impl Into<String>, julian_day: f64, message: impl Into<String>) -> Self {
        Self::Oracle {
            context: context.into(),
            julian_day,
            message: message.into(),
        }
    }

    pub fn house_calculation(message: impl Into<String>) -> Self {
        Self::HouseCalculation {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
