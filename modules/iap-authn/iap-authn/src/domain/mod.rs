pub mod authenticator;
pub mod principal;
pub mod verifier;

pub use authenticator::{AUTHENTICATED_MESSAGE, RequestAuthenticator};
pub use principal::PrincipalFactory;
pub use verifier::JwtAssertionVerifier;
