// postgremote authentication library
// Role credentials as JWTs, the HttpOnly cookie that carries them, and the
// mapping from a request credential to a database role.

pub mod cookie;
pub mod error;
pub mod extractor;
pub mod jwt_auth;
pub mod role_resolver;

pub use cookie::{create_auth_cookie, create_logout_cookie, CookieConfig, AUTH_COOKIE_NAME};
pub use error::{AuthError, AuthResult};
pub use extractor::{extract_credential, Credential, CredentialSource};
pub use jwt_auth::{create_and_sign_token, validate_jwt_token, JwtClaims, POSTGREMOTE_ISSUER};
pub use role_resolver::{ResolvedRole, RoleResolver, RoleSource};
