//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of the repository traits
//! that stores all data in collections wrapped in `Arc<RwLock<_>>`. This is
//! the default backend for development, and the one tests run against.
//!
//! # Example
//!
//! ```rust,ignore
//! use pinboard::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new();
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
