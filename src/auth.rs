//! Credential primitives: bearer candidates, guest tokens, and OAuth 1.0a signing.

pub mod bearer;
pub mod guest;
pub mod oauth1;

pub use bearer::*;
pub use guest::*;
pub use oauth1::*;
