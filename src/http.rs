//! Outbound transport used to fetch provider signing-key material.
//!
//! The key-publishing endpoint is the only suspension point in the crate:
//! every request carries an explicit timeout, and a timeout or transport
//! failure surfaces as [`Error::ProviderUnavailable`]. No retries happen
//! here; retry policy belongs to the host.

// self
use crate::{_prelude::*, error::TransportError, trust::SigningKey};

/// Boxed future returned by [`ProviderHttpClient`] requests.
pub type HttpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of fetching provider documents.
///
/// The trait is the crate's only dependency on an HTTP stack. Implementations
/// must honor the supplied timeout themselves so a stalled provider can never
/// consume a calling task indefinitely.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Fetches the document at `url`, failing once `timeout` elapses.
	fn get(&self, url: Url, timeout: Duration) -> HttpFuture<'_, Vec<u8>>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestProviderClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestProviderClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestProviderClient {
	fn get(&self, url: Url, timeout: Duration) -> HttpFuture<'_, Vec<u8>> {
		let client = self.0.clone();

		Box::pin(async move {
			let request_timeout =
				std::time::Duration::try_from(timeout).unwrap_or(std::time::Duration::ZERO);
			let response = client.get(url).timeout(request_timeout).send().await.map_err(|e| {
				if e.is_timeout() {
					TransportError::Timeout { timeout }
				} else {
					TransportError::network(e)
				}
			})?;
			let status = response.status();

			if !status.is_success() {
				return Err(TransportError::Status { status: status.as_u16() });
			}

			Ok(response.bytes().await.map_err(TransportError::network)?.to_vec())
		})
	}
}

#[derive(Deserialize)]
struct KeyDocument {
	key_id: String,
	key: String,
}

/// Fetches and decodes a signing key from the provider's key-publishing endpoint.
///
/// Returns the key id alongside the decoded material so callers can log which
/// key generation is installed.
pub async fn fetch_signing_key<C>(
	client: &C,
	url: Url,
	timeout: Duration,
) -> Result<(String, SigningKey)>
where
	C: ?Sized + ProviderHttpClient,
{
	let body = client.get(url, timeout).await?;
	let mut deserializer = serde_json::Deserializer::from_slice(&body);
	let document: KeyDocument = serde_path_to_error::deserialize(&mut deserializer)
		.map_err(|source| Error::KeyDocumentParse { source })?;
	let key = SigningKey::from_base64(&document.key)
		.map_err(|source| Error::KeyMaterialDecode { source })?;

	Ok((document.key_id, key))
}
