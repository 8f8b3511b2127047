//! Error types for farmer operations.

/// Errors raised by the farmer entity and its repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FarmerError {
    /// No farmer is registered under the requested identifier.
    NotFound,
    /// A farmer with the same identifier already exists.
    AlreadyRegistered,
    /// The agricultural and vegetation areas exceed the total area.
    AreaInvalid {
        /// Total farm area in hectares.
        total: i32,
        /// Agricultural area in hectares.
        agricultural: i32,
        /// Vegetation area in hectares.
        vegetation: i32,
    },
    /// Any other persistence failure, carrying the underlying message.
    Persistence(String),
}

impl std::fmt::Display for FarmerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "Farmer not found."),
            Self::AlreadyRegistered => write!(f, "Farmer already registered"),
            Self::AreaInvalid {
                total,
                agricultural,
                vegetation,
            } => write!(
                f,
                "Agricultural area {} plus vegetation area {} cannot be greater than total area {}",
                agricultural, vegetation, total
            ),
            Self::Persistence(msg) => write!(f, "{}", msg),
        }
    }
}

impl From<sqlx::Error> for FarmerError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => FarmerError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                FarmerError::AlreadyRegistered
            }
            _ => FarmerError::Persistence(e.to_string()),
        }
    }
}

impl std::error::Error for FarmerError {}
