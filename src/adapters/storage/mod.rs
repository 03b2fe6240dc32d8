//! Storage Adapters
//!
//! In-process implementations of the outbox ports.
//!
//! ## Available Adapters
//!
//! - **InMemoryOutboxStore** - Event log and health summary in memory
//!   (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::InMemoryOutboxStore;
//!
//! let store = InMemoryOutboxStore::new().with_max_attempts(Some(10));
//! ```

mod in_memory_outbox_store;

pub use in_memory_outbox_store::InMemoryOutboxStore;
