//! SQLite error mapping.
//!
//! Maps `tokio_rusqlite::Error` and `rusqlite::Error` to `RepositoryError`.
//! Constraint failures become semantic variants: a duplicate row is
//! `AlreadyExists`, a dangling reference is `InvalidData`.

use pinboard_core::storage::RepositoryError;
use rusqlite::ffi;

/// Extracts `table.column` from a message such as
/// `UNIQUE constraint failed: users.email`.
fn constraint_target(message: Option<&str>) -> Option<&str> {
    message?
        .split_once("constraint failed: ")
        .map(|(_, target)| target.trim())
        .filter(|target| !target.is_empty())
}

/// Maps a rusqlite error to a RepositoryError.
///
/// `id` names the offending record when the call site knows it; otherwise
/// the violated column is reported.
fn map_rusqlite_error(
    err: &rusqlite::Error,
    entity_type: &'static str,
    id: Option<&str>,
) -> RepositoryError {
    let describe = |message: Option<&String>| {
        id.map(str::to_string)
            .or_else(|| constraint_target(message.map(String::as_str)).map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    };

    match err {
        rusqlite::Error::SqliteFailure(sqlite_err, message)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepositoryError::AlreadyExists {
                entity_type,
                id: describe(message.as_ref()),
            }
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if sqlite_err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepositoryError::InvalidData(format!(
                "{entity_type} references a record that does not exist"
            ))
        }

        rusqlite::Error::SqliteFailure(sqlite_err, _)
            if matches!(
                sqlite_err.code,
                rusqlite::ErrorCode::CannotOpen
                    | rusqlite::ErrorCode::DatabaseBusy
                    | rusqlite::ErrorCode::DatabaseLocked
            ) =>
        {
            RepositoryError::ConnectionFailed(err.to_string())
        }

        rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
            entity_type,
            id: describe(None),
        },

        rusqlite::Error::FromSqlConversionFailure(..) | rusqlite::Error::InvalidColumnType(..) => {
            RepositoryError::Serialization(err.to_string())
        }

        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

fn map_tokio_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: Option<&str>,
) -> RepositoryError {
    match &err {
        tokio_rusqlite::Error::Rusqlite(rusqlite_err) => {
            map_rusqlite_error(rusqlite_err, entity_type, id)
        }
        tokio_rusqlite::Error::ConnectionClosed | tokio_rusqlite::Error::Close(_) => {
            RepositoryError::ConnectionFailed("Connection closed unexpectedly".to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

/// Maps a tokio_rusqlite error to a RepositoryError.
///
/// This is the main entry point for error mapping in async code.
pub fn map_tokio_rusqlite_error(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
) -> RepositoryError {
    map_tokio_error(err, entity_type, None)
}

/// Maps a tokio_rusqlite error with a known ID to a RepositoryError.
pub fn map_tokio_rusqlite_error_with_id(
    err: tokio_rusqlite::Error,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    let id = id.into();
    map_tokio_error(err, entity_type, Some(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraint(extended_code: i32, message: &str) -> tokio_rusqlite::Error {
        let sqlite_err = ffi::Error {
            code: rusqlite::ErrorCode::ConstraintViolation,
            extended_code,
        };
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
            sqlite_err,
            Some(message.to_string()),
        ))
    }

    #[test]
    fn test_unique_constraint_reports_column() {
        let err = constraint(
            ffi::SQLITE_CONSTRAINT_UNIQUE,
            "UNIQUE constraint failed: users.email",
        );

        match map_tokio_rusqlite_error(err, "User") {
            RepositoryError::AlreadyExists { entity_type, id } => {
                assert_eq!(entity_type, "User");
                assert_eq!(id, "users.email");
            }
            other => panic!("Expected AlreadyExists, got {other:?}"),
        }
    }

    #[test]
    fn test_primary_key_with_id_prefers_id() {
        let err = constraint(
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY,
            "UNIQUE constraint failed: interactions.kind, interactions.pin_id, interactions.user_id",
        );

        let result = map_tokio_rusqlite_error_with_id(err, "Interaction", "like:p:u");
        assert_eq!(
            result,
            RepositoryError::AlreadyExists {
                entity_type: "Interaction",
                id: "like:p:u".to_string(),
            }
        );
    }

    #[test]
    fn test_foreign_key_maps_to_invalid_data() {
        let err = constraint(
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
            "FOREIGN KEY constraint failed",
        );

        let result = map_tokio_rusqlite_error(err, "Comment");

        assert!(matches!(result, RepositoryError::InvalidData(_)));
    }

    #[test]
    fn test_no_rows_maps_to_not_found() {
        let err = tokio_rusqlite::Error::Rusqlite(rusqlite::Error::QueryReturnedNoRows);

        let result = map_tokio_rusqlite_error_with_id(err, "Board", "abc-123");

        assert_eq!(
            result,
            RepositoryError::NotFound {
                entity_type: "Board",
                id: "abc-123".to_string(),
            }
        );
    }

    #[test]
    fn test_other_error_maps_to_query_failed() {
        let err = tokio_rusqlite::Error::Other(Box::new(std::io::Error::other("test error")));

        let result = map_tokio_rusqlite_error(err, "User");

        assert!(matches!(result, RepositoryError::QueryFailed(_)));
    }

    #[test]
    fn test_constraint_target() {
        assert_eq!(
            constraint_target(Some("UNIQUE constraint failed: users.username")),
            Some("users.username")
        );
        assert_eq!(constraint_target(Some("database is locked")), None);
        assert_eq!(constraint_target(None), None);
    }
}
