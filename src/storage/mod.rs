pub mod access_keys;
pub mod cookie;
pub mod file_store;
pub mod kv;

pub use access_keys::AccessKeyStore;
pub use cookie::GuestCookieJar;
pub use file_store::FileStore;
pub use kv::{KeyValueStore, MemoryStore};
