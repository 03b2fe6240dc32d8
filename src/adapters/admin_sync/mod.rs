//! Admin sync adapters - Implementations of the AdminSyncClient port.
//!
//! - `HttpAdminSyncClient` - reqwest client for the real admin system
//! - `MockAdminSyncClient` - Recording client for tests

mod http_client;
mod mock_client;

pub use http_client::{join_url, AdminSyncClientConfig, HttpAdminSyncClient, ADMIN_SYNC_SECRET_HEADER};
pub use mock_client::{MockAdminSyncClient, RecordedCall};
