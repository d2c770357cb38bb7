pub mod credential;

pub use credential::{HashedCredential, hash_credential, verify_credential};
