//! OAuth 2.0 client authorization contexts for web backends acting on behalf of signed-in users.
//!
//! The crate decides whether a client context lives for a browser session or a single inbound
//! request, seeds request-scoped contexts from tokens already carried by the authenticated
//! principal, performs the authorization-code grant lazily when no token is available, and routes
//! every outbound call (and every token endpoint call) through a pipeline that insists on JSON.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
#[cfg(feature = "reqwest")] pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
#[cfg(feature = "reqwest")] pub mod runtime;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::ReqwestOAuth2Client,
		flows::ReqwestTokenProvider,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::ResourceDetails,
	};

	/// Builds a reqwest client that accepts the self-signed certificates produced by `httpmock`
	/// during tests.
	pub fn test_reqwest_client() -> ReqwestClient {
		ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.")
	}

	/// Wraps [`test_reqwest_client`] for token endpoint calls.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::with_client(test_reqwest_client())
	}

	/// Constructs an authorization-code provider and the outbound client that shares it, both
	/// backed by the insecure reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		details: ResourceDetails,
	) -> (ReqwestOAuth2Client, Arc<ReqwestTokenProvider>) {
		let provider = Arc::new(ReqwestTokenProvider::with_http_client(
			details,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		));
		let client = ReqwestOAuth2Client::new(test_reqwest_client(), provider.clone());

		(client, provider)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
