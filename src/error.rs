use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                ServiceError::Internal(format!("Database error: {}", db_err.message()))
            }
            _ => ServiceError::Internal(format!("Database error: {}", err)),
        }
    }
}
