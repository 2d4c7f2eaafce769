//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.
//! These are testable in isolation without database access.

use chrono::{DateTime, SecondsFormat, Utc};
use pinboard_core::domain::{Board, Comment, InteractionKind, Pin, User};
use pinboard_core::storage::RepositoryError;
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

// ============================================================================
// Row conversions
// ============================================================================

/// Convert a SQLite row to a User.
///
/// Expected columns: id, username, display_name, email, img, created_at
pub fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let created_at: String = row.get(5)?;

    Ok(User {
        id: parse_uuid(&id)?,
        username: row.get(1)?,
        display_name: row.get(2)?,
        email: row.get(3)?,
        img: row.get(4)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Pin.
///
/// Expected columns: id, user_id, board_id, title, description, link, media,
/// width, height, tags, created_at
pub fn row_to_pin(row: &Row) -> rusqlite::Result<Pin> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let board_id: Option<String> = row.get(2)?;
    let tags: String = row.get(9)?;
    let created_at: String = row.get(10)?;

    Ok(Pin {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        board_id: board_id.as_deref().map(parse_uuid).transpose()?,
        title: row.get(3)?,
        description: row.get(4)?,
        link: row.get(5)?,
        media: row.get(6)?,
        width: row.get(7)?,
        height: row.get(8)?,
        tags: json_to_tags(&tags)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Comment.
///
/// Expected columns: id, pin_id, user_id, description, created_at
pub fn row_to_comment(row: &Row) -> rusqlite::Result<Comment> {
    let id: String = row.get(0)?;
    let pin_id: String = row.get(1)?;
    let user_id: String = row.get(2)?;
    let created_at: String = row.get(4)?;

    Ok(Comment {
        id: parse_uuid(&id)?,
        pin_id: parse_uuid(&pin_id)?,
        user_id: parse_uuid(&user_id)?,
        description: row.get(3)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Convert a SQLite row to a Board.
///
/// Expected columns: id, user_id, title, description, is_private, created_at
pub fn row_to_board(row: &Row) -> rusqlite::Result<Board> {
    let id: String = row.get(0)?;
    let user_id: String = row.get(1)?;
    let created_at: String = row.get(5)?;

    Ok(Board {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        title: row.get(2)?,
        description: row.get(3)?,
        is_private: row.get(4)?,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Read a `COUNT(*)` column.
pub fn row_to_count(row: &Row) -> rusqlite::Result<u64> {
    let count: i64 = row.get(0)?;
    u64::try_from(count).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e))
    })
}

// ============================================================================
// Value conversions
// ============================================================================

/// Parse a UUID from string.
fn parse_uuid(s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse a datetime from RFC 3339 string.
fn parse_datetime(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Parse the JSON array stored in `pins.tags`.
fn json_to_tags(s: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

/// Serialize tags to the JSON array stored in `pins.tags`.
pub fn tags_to_json(tags: &[String]) -> Result<String, RepositoryError> {
    serde_json::to_string(tags).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

/// Format a DateTime<Utc> for SQLite storage.
///
/// Fixed-width RFC 3339 in UTC with microseconds, so string order matches
/// time order.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Value of the `interactions.kind` column.
pub fn kind_to_string(kind: InteractionKind) -> &'static str {
    kind.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        let fractional = whole + chrono::Duration::milliseconds(5);

        assert_eq!(format_datetime(&whole), "2024-06-15T10:30:00.000000Z");
        assert_eq!(format_datetime(&fractional), "2024-06-15T10:30:00.005000Z");
        assert!(format_datetime(&whole) < format_datetime(&fractional));
    }

    #[test]
    fn test_format_datetime_round_trips() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap();
        assert_eq!(parse_datetime(&format_datetime(&dt)).unwrap(), dt);
    }

    #[test]
    fn test_tags_json() {
        let tags = vec!["sky".to_string(), "sea".to_string()];
        let json = tags_to_json(&tags).unwrap();
        assert_eq!(json, r#"["sky","sea"]"#);
        assert_eq!(json_to_tags(&json).unwrap(), tags);
        assert!(json_to_tags("not json").is_err());
    }

    #[test]
    fn test_kind_to_string() {
        assert_eq!(kind_to_string(InteractionKind::Like), "like");
        assert_eq!(kind_to_string(InteractionKind::Save), "save");
    }

    #[test]
    fn test_parse_uuid_valid() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let result = parse_uuid(uuid_str);
        assert_eq!(result.unwrap().to_string(), uuid_str);
    }

    #[test]
    fn test_parse_uuid_invalid() {
        assert!(parse_uuid("not-a-uuid").is_err());
    }

    #[test]
    fn test_parse_datetime_invalid() {
        assert!(parse_datetime("not-a-datetime").is_err());
    }
}
