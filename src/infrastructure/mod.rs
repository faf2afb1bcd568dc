pub mod storage;

pub use storage::{MemoryStore, Session, Storage, StorageError};
