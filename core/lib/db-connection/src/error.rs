/// Classified database error, mirroring the taxonomy in §7 of the design:
/// `NotFound` and `KeyConflict` are distinguished so callers can decide,
/// everything else is `Transient` and should bubble up to roll back the
/// enclosing transaction.
#[derive(Debug, thiserror::Error)]
pub enum DalError {
    #[error("{context}: row not found")]
    NotFound { context: String },
    #[error("{context}: unique constraint violated ({constraint})")]
    KeyConflict { context: String, constraint: String },
    #[error("{context}: {source}")]
    Transient {
        context: String,
        #[source]
        source: sqlx::Error,
    },
}

impl DalError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, DalError::NotFound { .. })
    }

    pub fn is_key_conflict(&self) -> bool {
        matches!(self, DalError::KeyConflict { .. })
    }

    pub fn wrap(context: impl Into<String>, source: sqlx::Error) -> Self {
        let context = context.into();
        match &source {
            sqlx::Error::RowNotFound => DalError::NotFound { context },
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                DalError::KeyConflict { context, constraint }
            }
            _ => DalError::Transient { context, source },
        }
    }
}

pub type DalResult<T> = Result<T, DalError>;
