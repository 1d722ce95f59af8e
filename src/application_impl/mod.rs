mod token_issuer_fake;
mod token_service_impl;

pub use token_issuer_fake::*;
pub use token_service_impl::*;
