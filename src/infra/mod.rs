mod clock_impl;
mod jwt_issuer;
mod refresh_token_store_impl;
mod session_registry_impl;
mod token_blacklist_impl;

pub use clock_impl::*;
pub use jwt_issuer::*;
pub use refresh_token_store_impl::*;
pub use session_registry_impl::*;
pub use token_blacklist_impl::*;
