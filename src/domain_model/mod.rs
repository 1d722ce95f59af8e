mod session;
mod token;
mod user;

pub use session::*;
pub use token::*;
pub use user::*;
