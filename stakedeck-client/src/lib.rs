#![cfg_attr(not(test), forbid(unsafe_code))]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]

pub mod api;
pub mod bootstrap;
pub mod error;
pub mod feeds;
pub mod session;
pub mod store;
pub mod wallet;

pub use api::{IdentityApi, IdentityClient};
pub use bootstrap::{AppPhase, Bootstrapper};
pub use error::{IdentityError, IdentityResult};
pub use session::controller::SessionController;
pub use session::state::SessionState;
pub use store::{FileStore, MemoryStore, SessionStore, USER_DATA_KEY};
pub use wallet::WalletLink;
