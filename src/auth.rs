//! Session credentials, cached identity, and access-token claim introspection.

pub mod claims;
pub mod secret;
pub mod session;

pub use claims::*;
pub use secret::*;
pub use session::*;
