pub mod access_key;
pub mod claims;
pub mod jwt;
pub mod token_store;

pub use access_key::normalize_access_key;
pub use claims::Claims;
pub use jwt::TokenDecoder;
pub use token_store::TokenStore;
