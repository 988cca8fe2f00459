//! External-service clients and domain policy

pub mod classifier;
pub mod reward;
pub mod storage;

pub use classifier::{Classification, ClassifierClient, ClassifierConfig};
pub use storage::{StorageClient, StorageConfig, StoredObject};
