pub mod auth;
pub mod errors;
pub mod tokens;
pub mod user;

pub use auth::{
    AccessGrantRequest, AuthSession, Credentials, LogoutRequest, ProfileUpdate,
    ResetPasswordRequest, SignupRequest, VerifyAuthRequest,
};
pub use errors::ErrorResponse;
pub use tokens::{BearerToken, TokenPair};
pub use user::{AccessFlags, AuthenticationFlags, UserProfile};
