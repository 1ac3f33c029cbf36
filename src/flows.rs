//! High-level flow orchestration: redirect initiation and callback verification.

pub mod callback;
pub mod common;
pub mod redirect;
pub mod signing;

pub use callback::*;
pub use redirect::*;
pub use signing::*;

// self
use crate::{
	_prelude::*,
	auth::{ProviderAssertion, VerifiedIdentity},
	config::AuthenticationConfig,
	http::{self, ProviderHttpClient},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::PendingStore,
	trust::TrustAnchors,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestProviderClient;

#[cfg(feature = "reqwest")]
/// Authenticator specialized for the crate's default reqwest transport.
pub type ReqwestAuthenticator = Authenticator<ReqwestProviderClient>;

/// Coordinates delegated authentication flows against one Signicat deployment.
///
/// The authenticator owns the resolved configuration, the pending-request
/// store, the trust anchors, and the outbound transport so the individual
/// flows can focus on their own semantics. It is safe to share across
/// concurrent independent authentication attempts; the only cross-flow state
/// is the pending store, whose take is atomic.
pub struct Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Immutable configuration snapshot for this deployment.
	pub config: AuthenticationConfig,
	/// Pending-request store shared between redirect and callback flows.
	pub store: Arc<dyn PendingStore>,
	/// Signing keys trusted per environment host.
	pub trust: Arc<TrustAnchors>,
	/// Transport used to fetch provider signing-key material.
	pub http_client: Arc<C>,
}
impl<C> Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	/// Creates an authenticator that reuses a caller-provided transport.
	pub fn with_http_client(
		config: AuthenticationConfig,
		store: Arc<dyn PendingStore>,
		trust: Arc<TrustAnchors>,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		Self { config, store, trust, http_client: http_client.into() }
	}

	/// Starts an authentication attempt and returns the redirect session.
	///
	/// The pending request is registered in the store before the session is
	/// returned, so the callback can never outrun the registration.
	pub async fn start_authentication(&self, callback_base: &Url) -> Result<RedirectSession> {
		let span = FlowSpan::new(FlowKind::Redirect, "start_authentication");
		let fut = async {
			obs::record_flow_outcome(FlowKind::Redirect, FlowOutcome::Attempt);

			let now = OffsetDateTime::now_utc();
			let (request, session) = redirect::build_session(&self.config, callback_base, now)?;

			self.store.put(request).await?;

			#[cfg(feature = "tracing")]
			tracing::debug!(
				callback = %session.callback_url,
				expires_at = %session.expires_at,
				"Redirecting to Signicat.",
			);

			Ok(session)
		};
		let result = span.instrument(fut).await;

		obs::record_flow_outcome(
			FlowKind::Redirect,
			if result.is_ok() { FlowOutcome::Success } else { FlowOutcome::Failure },
		);

		result
	}

	/// Verifies a provider callback and produces the verified identity.
	///
	/// Runs the callback state machine: the correlation token is consumed
	/// atomically (single use), expiry is checked before any signature work,
	/// and the assertion's claims are mapped only after the signature
	/// verifies. Duplicate or replayed callbacks are rejected.
	pub async fn handle_callback(&self, assertion: ProviderAssertion) -> Result<VerifiedIdentity> {
		let span = FlowSpan::new(FlowKind::Callback, "handle_callback");
		let fut = async {
			obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::Attempt);

			let now = OffsetDateTime::now_utc();

			callback::process(
				self.store.as_ref(),
				&self.trust,
				&self.config.environment,
				assertion,
				now,
			)
			.await
		};
		let result = span.instrument(fut).await;

		obs::record_flow_outcome(FlowKind::Callback, FlowOutcome::from_result(&result));

		result
	}

	/// Builds the document-signing redirect for an issued signing request.
	///
	/// The signing request is created against Signicat's document service by
	/// the host; this turns the returned request id into the `docaction` URL
	/// the user agent is sent to. Fails unless the configuration enables
	/// signing.
	pub fn signing_redirect(&self, request_id: &str) -> Result<Url> {
		Ok(signing::build_signing_redirect(&self.config, request_id)?)
	}

	/// Fetches the provider's current signing key and installs it for this
	/// deployment's environment, returning the installed key id.
	pub async fn refresh_signing_key(&self, key_url: Url) -> Result<String> {
		let (key_id, key) =
			http::fetch_signing_key(self.http_client.as_ref(), key_url, self.config.http_timeout)
				.await?;

		self.trust.install(self.config.environment.host(), key);

		#[cfg(feature = "tracing")]
		tracing::debug!(key_id = %key_id, "Installed provider signing key.");

		Ok(key_id)
	}

	/// Reclaims expired pending requests, returning the count removed.
	///
	/// Correctness never depends on calling this; expiry is also enforced
	/// lazily on every callback lookup.
	pub async fn sweep_pending(&self) -> Result<usize> {
		Ok(self.store.sweep(OffsetDateTime::now_utc()).await?)
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<ReqwestProviderClient> {
	/// Creates an authenticator with the crate's default reqwest transport.
	pub fn new(
		config: AuthenticationConfig,
		store: Arc<dyn PendingStore>,
		trust: Arc<TrustAnchors>,
	) -> Self {
		Self::with_http_client(config, store, trust, ReqwestProviderClient::default())
	}
}
impl<C> Clone for Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			config: self.config.clone(),
			store: self.store.clone(),
			trust: self.trust.clone(),
			http_client: self.http_client.clone(),
		}
	}
}
impl<C> Debug for Authenticator<C>
where
	C: ?Sized + ProviderHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("country", &self.config.country)
			.field("service_name", &self.config.service_name)
			.field("environment", &self.config.environment)
			.finish()
	}
}
