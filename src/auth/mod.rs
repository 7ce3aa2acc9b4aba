// Authentication module
// Credential storage, the refresh exchange, and refresh coordination

mod coordinator;
mod refresh;
mod sqlite;
mod store;
mod types;

pub use coordinator::{RefreshCoordinator, RefreshOutcome, RefreshPermit, RefreshTicket};
pub use refresh::RefreshClient;
pub use sqlite::SqliteCredentialStore;
pub use store::{CredentialStore, MemoryCredentialStore};
pub use types::{RefreshRequest, RefreshResponse, TokenData};
