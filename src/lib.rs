//! Power BI REST automation broker: device-code sign-in, a cached bearer credential, and
//! dashboard-ready JSON envelopes behind one command.
//!
//! The pipeline is deliberately flat. [`cli::run`] validates the [`api::ModeRequest`],
//! asks the [`flows::Broker`] for a bearer header (served from the [`store::TokenCache`] or
//! minted through a [`flows::SignIn`]), issues exactly one REST call through
//! [`api::ApiClient`], and hands the body to [`shape::shape`] which returns the
//! [`envelope::Envelope`] printed on standard output.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod envelope;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod shape;
pub mod store;

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		path::{Path, PathBuf},
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value as JsonValue};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {assert_cmd as _, color_eyre as _, httpmock as _, predicates as _};
