//! Service descriptors: the validated set of identity and REST endpoints the broker talks to.
//!
//! [`ServiceDescriptor`] captures the identity authority, tenant, public client id, token
//! scope, and Power BI API base. Everything else (device-code and token endpoints, REST
//! URLs) is derived from it so that a single validated value configures the whole pipeline.

pub mod descriptor;

pub use descriptor::*;
