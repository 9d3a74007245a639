use crate::assessment::InvalidInputError;
use crate::config::ConfigError;
use crate::hazards::DataLoadError;
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    DataLoad(DataLoadError),
    InvalidInput(InvalidInputError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::DataLoad(err) => write!(f, "hazard data error: {}", err),
            AppError::InvalidInput(err) => {
                write!(f, "could not analyze this product: {}", err)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::DataLoad(err) => Some(err),
            AppError::InvalidInput(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::DataLoad(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "status": "error", "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<DataLoadError> for AppError {
    fn from(value: DataLoadError) -> Self {
        Self::DataLoad(value)
    }
}

impl From<InvalidInputError> for AppError {
    fn from(value: InvalidInputError) -> Self {
        Self::InvalidInput(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::Nutrient;

    #[test]
    fn invalid_input_maps_to_unprocessable() {
        let error = AppError::from(InvalidInputError::NegativeNutrient {
            nutrient: Nutrient::Sodium,
            value: -1.0,
        });
        assert!(error.to_string().starts_with("could not analyze this product"));
        assert_eq!(
            error.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn data_load_is_a_server_failure() {
        let error = AppError::from(DataLoadError::DuplicateName("bha".to_string()));
        assert_eq!(
            error.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
