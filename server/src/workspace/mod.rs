//! Session workspaces: cloned repositories on disk and safe access to them.

pub mod files;
pub mod listing;
pub mod policy;
pub mod store;
pub mod types;
pub(crate) mod validate;

pub use files::OpenedFile;
pub use listing::METADATA_DIR;
pub use policy::{PathResolver, PolicyError};
pub use store::SessionStore;
pub use types::{ErrorKind, FileEntry, Session, SessionError, SessionId, SessionSummary};
