mod crypto;
mod extractor;

pub use crypto::hash_token;
pub use extractor::{AuthError, Viewer};
