pub mod local_index_storage;

pub use local_index_storage::LocalIndexStorage;
