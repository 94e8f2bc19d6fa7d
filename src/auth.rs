//! Auth-domain identifiers, bearer headers, and cached credential models.

pub mod id;
pub mod token;

pub use id::*;
pub use token::{header::*, payload::*, record::*};
