//! SQLite schema definitions and SQL query constants.
//!
//! This module contains all SQL statements used by the SQLite repository,
//! following the Functional Core pattern - pure data, no I/O.
//!
//! Timestamps are fixed-width RFC 3339 strings, so `ORDER BY created_at`
//! is chronological. `rowid` breaks ties in insertion order.

/// SQL statement to create all tables.
pub const CREATE_TABLES: &str = r#"
PRAGMA foreign_keys = ON;

-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    img TEXT,
    created_at TEXT NOT NULL
);

-- Boards table
CREATE TABLE IF NOT EXISTS boards (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    is_private INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Pins table
CREATE TABLE IF NOT EXISTS pins (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    board_id TEXT,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    link TEXT,
    media TEXT NOT NULL,
    width INTEGER NOT NULL,
    height INTEGER NOT NULL,
    tags TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (board_id) REFERENCES boards(id) ON DELETE SET NULL
);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    pin_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (pin_id) REFERENCES pins(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Likes and saves, one row per (kind, pin, user)
CREATE TABLE IF NOT EXISTS interactions (
    kind TEXT NOT NULL,
    pin_id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (kind, pin_id, user_id),
    FOREIGN KEY (pin_id) REFERENCES pins(id) ON DELETE CASCADE,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Follow edges
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    followee_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (follower_id, followee_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (followee_id) REFERENCES users(id) ON DELETE CASCADE
);

-- Indexes for efficient queries
CREATE INDEX IF NOT EXISTS idx_pins_created_at ON pins(created_at);
CREATE INDEX IF NOT EXISTS idx_pins_user_id ON pins(user_id);
CREATE INDEX IF NOT EXISTS idx_pins_board_id ON pins(board_id);
CREATE INDEX IF NOT EXISTS idx_comments_pin_created ON comments(pin_id, created_at);
CREATE INDEX IF NOT EXISTS idx_boards_user_id ON boards(user_id);
CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id);
"#;

// User queries
pub const INSERT_USER: &str = r#"
INSERT INTO users (id, username, display_name, email, img, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_USER_BY_ID: &str = r#"
SELECT id, username, display_name, email, img, created_at
FROM users
WHERE id = ?1
"#;

pub const SELECT_USER_BY_USERNAME: &str = r#"
SELECT id, username, display_name, email, img, created_at
FROM users
WHERE username = ?1
"#;

pub const SELECT_USER_BY_EMAIL: &str = r#"
SELECT id, username, display_name, email, img, created_at
FROM users
WHERE email = ?1
"#;

// Pin queries
pub const INSERT_PIN: &str = r#"
INSERT INTO pins (id, user_id, board_id, title, description, link, media, width, height, tags, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

pub const SELECT_PIN_BY_ID: &str = r#"
SELECT id, user_id, board_id, title, description, link, media, width, height, tags, created_at
FROM pins
WHERE id = ?1
"#;

pub const SELECT_PINS_PAGE: &str = r#"
SELECT id, user_id, board_id, title, description, link, media, width, height, tags, created_at
FROM pins
ORDER BY created_at DESC, rowid DESC
LIMIT ?1 OFFSET ?2
"#;

pub const COUNT_PINS: &str = "SELECT COUNT(*) FROM pins";

pub const COUNT_PINS_BY_USER: &str = "SELECT COUNT(*) FROM pins WHERE user_id = ?1";

pub const COUNT_PINS_IN_BOARD: &str = "SELECT COUNT(*) FROM pins WHERE board_id = ?1";

pub const SELECT_FIRST_PIN_IN_BOARD: &str = r#"
SELECT id, user_id, board_id, title, description, link, media, width, height, tags, created_at
FROM pins
WHERE board_id = ?1
ORDER BY created_at ASC, rowid ASC
LIMIT 1
"#;

// Comment queries
pub const INSERT_COMMENT: &str = r#"
INSERT INTO comments (id, pin_id, user_id, description, created_at)
VALUES (?1, ?2, ?3, ?4, ?5)
"#;

pub const SELECT_COMMENTS_PAGE: &str = r#"
SELECT id, pin_id, user_id, description, created_at
FROM comments
WHERE pin_id = ?1
ORDER BY created_at DESC, rowid DESC
LIMIT ?2 OFFSET ?3
"#;

pub const COUNT_COMMENTS: &str = "SELECT COUNT(*) FROM comments WHERE pin_id = ?1";

// Board queries
pub const INSERT_BOARD: &str = r#"
INSERT INTO boards (id, user_id, title, description, is_private, created_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

pub const SELECT_BOARD_BY_ID: &str = r#"
SELECT id, user_id, title, description, is_private, created_at
FROM boards
WHERE id = ?1
"#;

pub const SELECT_BOARDS_BY_USER: &str = r#"
SELECT id, user_id, title, description, is_private, created_at
FROM boards
WHERE user_id = ?1
ORDER BY created_at ASC, rowid ASC
"#;

// Interaction queries
pub const INSERT_INTERACTION: &str = r#"
INSERT INTO interactions (kind, pin_id, user_id, created_at)
VALUES (?1, ?2, ?3, ?4)
"#;

pub const EXISTS_INTERACTION: &str = r#"
SELECT EXISTS(SELECT 1 FROM interactions WHERE kind = ?1 AND pin_id = ?2 AND user_id = ?3)
"#;

pub const DELETE_INTERACTION: &str = r#"
DELETE FROM interactions
WHERE kind = ?1 AND pin_id = ?2 AND user_id = ?3
"#;

pub const COUNT_INTERACTIONS: &str =
    "SELECT COUNT(*) FROM interactions WHERE kind = ?1 AND pin_id = ?2";

// Follow queries
pub const INSERT_FOLLOW: &str = r#"
INSERT INTO follows (follower_id, followee_id, created_at)
VALUES (?1, ?2, ?3)
"#;

pub const EXISTS_FOLLOW: &str = r#"
SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2)
"#;

pub const DELETE_FOLLOW: &str = r#"
DELETE FROM follows
WHERE follower_id = ?1 AND followee_id = ?2
"#;

pub const COUNT_FOLLOWERS: &str = "SELECT COUNT(*) FROM follows WHERE followee_id = ?1";

pub const COUNT_FOLLOWING: &str = "SELECT COUNT(*) FROM follows WHERE follower_id = ?1";
