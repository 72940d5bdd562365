pub mod cipher;
pub mod credentials;
pub mod error;
pub mod progress;
