use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status} for {endpoint}")]
    ApiStatusError { status: u16, endpoint: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid input '{field}' = {value}: {reason}")]
    InvalidInputError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Module '{module}' references unknown unit type '{unit_type_id}'")]
    UnknownUnitTypeError { module: String, unit_type_id: String },

    #[error("Unit type '{unit_type_id}' is still used by module '{module}'")]
    UnitTypeInUseError { unit_type_id: String, module: String },

    #[error("No {kind} with id '{id}'")]
    NotFoundError { kind: String, id: String },

    #[error("Duplicate {kind} id '{id}'")]
    DuplicateIdError { kind: String, id: String },

    #[error("Invalid date '{value}': {reason}")]
    InvalidDateError { value: String, reason: String },

    #[error("Validation failed: {}", errors.join("; "))]
    ValidationError { errors: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Network,
    Configuration,
    Validation,
    Domain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PricingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PricingError::ZipError(_)
            | PricingError::CsvError(_)
            | PricingError::IoError(_)
            | PricingError::SerializationError(_) => ErrorCategory::Io,
            PricingError::ApiError(_) | PricingError::ApiStatusError { .. } => {
                ErrorCategory::Network
            }
            PricingError::ConfigError { .. }
            | PricingError::ConfigValidationError { .. }
            | PricingError::InvalidConfigValueError { .. }
            | PricingError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PricingError::ValidationError { .. } => ErrorCategory::Validation,
            PricingError::InvalidInputError { .. }
            | PricingError::UnknownUnitTypeError { .. }
            | PricingError::UnitTypeInUseError { .. }
            | PricingError::NotFoundError { .. }
            | PricingError::DuplicateIdError { .. }
            | PricingError::InvalidDateError { .. } => ErrorCategory::Domain,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Validation | ErrorCategory::Domain => {
                ErrorSeverity::High
            }
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PricingError::ApiError(_) | PricingError::ApiStatusError { .. } => {
                format!("Could not fetch the pricing model: {}", self)
            }
            PricingError::ValidationError { errors } => {
                let mut message = format!("The pricing model has {} problem(s):", errors.len());
                for error in errors {
                    message.push_str("\n  - ");
                    message.push_str(error);
                }
                message
            }
            PricingError::UnknownUnitTypeError { module, unit_type_id } => format!(
                "Module '{}' is priced by unit type '{}', which does not exist in this model",
                module, unit_type_id
            ),
            _ => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Io => "Check that the paths exist and are writable",
            ErrorCategory::Network => "Check the model endpoint URL and that the API is reachable",
            ErrorCategory::Configuration => "Review the command line flags or the TOML config file",
            ErrorCategory::Validation => "Fix the listed problems in the model and run again",
            ErrorCategory::Domain => "Check the model's unit types, modules and the projection inputs",
        }
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;
