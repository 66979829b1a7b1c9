//! Auth-domain identifiers, scope lists, access tokens, and inbound principals.

pub mod id;
pub mod principal;
pub mod scope;
pub mod token;

pub use id::*;
pub use principal::*;
pub use scope::*;
pub use token::*;
