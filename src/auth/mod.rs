/// Authentication module
///
/// Password hashing, access token issuance/verification, refresh token
/// generation, Authorization header parsing, and the session manager that
/// orchestrates them.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use bearer::{get_api_key, get_bearer_token};
pub use claims::{Claims, TOKEN_ISSUER};
pub use jwt::{issue_access_token, verify_access_token};
pub use password::{hash_password, verify_password, PASSWORD_HASH_COST};
pub use refresh_token::{generate_refresh_token, REFRESH_TOKEN_BYTES};
pub use session::{ensure_owner, Credential, SessionManager, SessionTokens};
