//! Domain data model for delegated authentication attempts.

pub mod assertion;
pub mod identity;
pub mod request;
pub mod token;

pub use assertion::*;
pub use identity::*;
pub use request::*;
pub use token::*;
