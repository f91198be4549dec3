pub mod credentials;

pub use credentials::{load_credentials, ServiceAccount};
