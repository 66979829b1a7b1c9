//! Transport primitives for token endpoint calls.
//!
//! [`TokenHttpClient`] is the crate's only dependency on an HTTP stack for the
//! authorization-code exchange. Implementations hand out [`AsyncHttpClient`] handles that
//! record the response status and content type in a [`ResponseMetadataSlot`], so token
//! endpoint failures can be reported with the context needed to diagnose them (most
//! commonly an authorization server answering in something other than JSON).

// std
use std::ops::Deref;
// crates.io
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{HeaderMap, header::CONTENT_TYPE},
};
// self
use crate::_prelude::*;

/// Media type every token endpoint and outbound call asks for.
pub const APPLICATION_JSON: &str = "application/json";

/// Abstraction over HTTP transports capable of executing token exchanges while publishing
/// response metadata.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back the
/// acquisition provider for every context in the process. The handles they return must own
/// whatever state they need so the request futures stay `Send`.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// [`AsyncHttpClient`] handle tied to a [`ResponseMetadataSlot`].
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Builds an [`AsyncHttpClient`] handle that records outcomes in `slot`.
	///
	/// # Metadata Contract
	///
	/// - Call [`ResponseMetadataSlot::take`] before submitting the HTTP request.
	/// - Once a response (successful or not) arrives, save its status and content type with
	///   [`ResponseMetadataSlot::store`].
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// Metadata from the most recent token endpoint response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code, if available.
	pub status: Option<u16>,
	/// `Content-Type` reported by the server, if any.
	pub content_type: Option<String>,
}
impl ResponseMetadata {
	/// Captures status and content type from a response head.
	pub fn from_parts(status: u16, headers: &HeaderMap) -> Self {
		let content_type = headers
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.map(ToOwned::to_owned);

		Self { status: Some(status), content_type }
	}
}

/// Thread-safe slot for sharing [`ResponseMetadata`] between transport and error layers.
///
/// The provider creates a fresh slot per token request and reads it right after `oauth2`
/// resolves.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Stores new metadata for the current request.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// Handle wrapper that forces enhancer-produced headers onto every request.
///
/// Headers in `overrides` replace whatever the OAuth client put there.
pub(crate) struct EnhancedHandle<H> {
	inner: H,
	overrides: HeaderMap,
}
impl<H> EnhancedHandle<H> {
	pub(crate) fn new(inner: H, overrides: HeaderMap) -> Self {
		Self { inner, overrides }
	}
}
impl<'c, H> AsyncHttpClient<'c> for EnhancedHandle<H>
where
	H: AsyncHttpClient<'c>,
{
	type Error = H::Error;
	type Future = H::Future;

	fn call(&'c self, mut request: HttpRequest) -> Self::Future {
		override_headers(request.headers_mut(), &self.overrides);

		self.inner.call(request)
	}
}

/// Replaces every header named in `overrides`, keeping multi-valued overrides intact.
pub(crate) fn override_headers(target: &mut HeaderMap, overrides: &HeaderMap) {
	for name in overrides.keys() {
		target.remove(name);

		for value in overrides.get_all(name) {
			target.append(name.clone(), value.clone());
		}
	}
}

/// Thin wrapper around [`ReqwestClient`] used for token endpoint calls.
///
/// Token endpoints answer directly, so custom clients should disable redirect following.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

#[cfg(feature = "reqwest")]
struct InstrumentedHttpClient {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}

/// Handle returned by [`ReqwestHttpClient`] that satisfies [`TokenHttpClient`].
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct InstrumentedHandle(Arc<InstrumentedHttpClient>);
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for InstrumentedHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		let client = Arc::clone(&self.0);

		Box::pin(async move {
			client.slot.take();

			let response = client
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();

			client.slot.store(ResponseMetadata::from_parts(status.as_u16(), &headers));

			let mut converted =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = InstrumentedHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		InstrumentedHandle(Arc::new(InstrumentedHttpClient { client: self.0.clone(), slot }))
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::{HeaderValue, header::ACCEPT};
	// self
	use super::*;

	#[test]
	fn overrides_replace_all_previous_values() {
		let mut target = HeaderMap::new();
		let mut overrides = HeaderMap::new();

		target.append(ACCEPT, HeaderValue::from_static("text/html"));
		target.append(ACCEPT, HeaderValue::from_static("application/xml"));
		target.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
		overrides.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
		override_headers(&mut target, &overrides);

		assert_eq!(target.get_all(ACCEPT).iter().count(), 1);
		assert_eq!(target.get(ACCEPT), Some(&HeaderValue::from_static(APPLICATION_JSON)));
		assert_eq!(
			target.get(CONTENT_TYPE),
			Some(&HeaderValue::from_static("application/x-www-form-urlencoded"))
		);
	}

	#[test]
	fn metadata_captures_content_type() {
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain;charset=UTF-8"));

		let meta = ResponseMetadata::from_parts(200, &headers);

		assert_eq!(meta.status, Some(200));
		assert_eq!(meta.content_type.as_deref(), Some("text/plain;charset=UTF-8"));

		let slot = ResponseMetadataSlot::default();

		slot.store(meta.clone());

		assert_eq!(slot.take(), Some(meta));
		assert_eq!(slot.take(), None);
	}
}
