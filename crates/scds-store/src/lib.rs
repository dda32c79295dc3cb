//! Object storage for SCDS.
//!
//! Objects are stored whole (current value plus full history) and looked up
//! by key. Writers never overwrite blindly: every mutation of an existing
//! object goes through [`ObjectStore::conditional_update`], which checks the
//! expected prior version and applies the patch in one indivisible step.
//!
//! # Storage Backends
//!
//! All backends implement [`ObjectStore`] and [`SubscriberStore`]:
//!
//! - [`InMemoryStore`] -- lock-guarded maps for tests and embedding
//! - [`FileStore`] -- the same maps, snapshotted to a JSON file after every
//!   mutation via write-to-temp-then-rename

pub mod error;
pub mod file;
pub mod memory;
pub mod model;
mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use model::{ObjectPatch, Projection, Subscriber};
pub use traits::{ObjectStore, SubscriberStore};
