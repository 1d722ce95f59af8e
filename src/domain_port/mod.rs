mod clock;
mod token_issuer;

pub use clock::*;
pub use token_issuer::*;

// store

mod refresh_token_store;
mod session_registry;
mod token_blacklist;

pub use refresh_token_store::*;
pub use session_registry::*;
pub use token_blacklist::*;
