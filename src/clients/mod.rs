pub mod auth;
pub mod firestore_client;

pub use auth::TokenProvider;
pub use firestore_client::FirestoreClient;
