mod error;
mod extractor;
pub mod password;
mod token;

pub use error::{AuthError, CredentialError};
pub use extractor::{VerifiedUser, cookie_value};
pub use password::{hash_password, verify_password};
pub use token::{CredentialClaims, TokenService};
