#![cfg(feature = "reqwest")]

// std
use std::{collections::HashMap, sync::Arc};
// crates.io
use time::{Duration, OffsetDateTime};
use url::Url;
// self
use signicat_authn::{
	auth::{
		AuthenticationRequest, CORRELATION_CLAIM, CorrelationToken, ProviderAssertion,
		SUBJECT_CLAIM,
	},
	config::{AuthenticationConfig, Country, MapConfigSource, keys},
	error::{Error, VerifyError},
	flows::{Authenticator, CORRELATION_PARAM, ReqwestAuthenticator},
	store::{MemoryStore, PendingStore},
	trust::{self, SigningKey, TrustAnchors},
};

const SIGNING_KEY: &[u8] = b"callback-flow-signing-key";

fn resolve_config(extra: &[(&str, &str)]) -> AuthenticationConfig {
	let mut entries = vec![
		(keys::SERVICE_NAME, "demo"),
		(keys::AUTHENTICATION_URL, "https://preprod.signicat.com/std/method"),
	];

	entries.extend_from_slice(extra);

	AuthenticationConfig::resolve(&MapConfigSource::from_iter(entries))
		.expect("Callback flow test configuration should resolve.")
}

fn build_authenticator(config: AuthenticationConfig) -> (ReqwestAuthenticator, Arc<MemoryStore>) {
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn PendingStore> = backend.clone();
	let anchors = Arc::new(TrustAnchors::new());

	anchors.install(config.environment.host(), SigningKey::new(SIGNING_KEY));

	(Authenticator::new(config, store, anchors), backend)
}

fn signed_assertion(correlation: &str, subject: Option<&str>) -> ProviderAssertion {
	let raw = format!("assertion-for:{correlation}").into_bytes();
	let signature = trust::sign(&SigningKey::new(SIGNING_KEY), &raw);
	let mut claims =
		HashMap::from_iter([(CORRELATION_CLAIM.to_owned(), correlation.to_owned())]);

	if let Some(subject) = subject {
		claims.insert(SUBJECT_CLAIM.to_owned(), subject.to_owned());
	}

	ProviderAssertion::new(raw, signature, claims, OffsetDateTime::now_utc())
}

fn callback_base() -> Url {
	Url::parse("https://idsvr.example.com/authn/signicat/callback")
		.expect("Callback base fixture should parse.")
}

#[tokio::test]
async fn verified_callback_maps_the_asserted_subject() {
	let (authenticator, store) = build_authenticator(resolve_config(&[]));
	let session = authenticator
		.start_authentication(&callback_base())
		.await
		.expect("Starting an authentication attempt should succeed.");
	let reference = session
		.callback_url
		.query_pairs()
		.find(|(name, _)| name == CORRELATION_PARAM)
		.map(|(_, value)| value.into_owned())
		.expect("Callback URL should carry the correlation reference.");

	assert_eq!(reference, session.correlation_token.as_str());
	assert_eq!(store.len(), 1);

	let assertion = signed_assertion(session.correlation_token.as_str(), Some("alice"));
	let identity = authenticator
		.handle_callback(assertion)
		.await
		.expect("A signed callback for a pending request should verify.");

	assert_eq!(identity.subject_id, "alice");
	assert!(identity.attribute(SUBJECT_CLAIM).is_none());
	assert!(identity.attribute(CORRELATION_CLAIM).is_none());
	assert!(store.is_empty(), "verification must consume the pending request");
}

#[tokio::test]
async fn duplicate_callback_is_rejected() {
	let (authenticator, _store) = build_authenticator(resolve_config(&[]));
	let session = authenticator
		.start_authentication(&callback_base())
		.await
		.expect("Starting an authentication attempt should succeed.");
	let assertion = signed_assertion(session.correlation_token.as_str(), Some("alice"));

	authenticator
		.handle_callback(assertion.clone())
		.await
		.expect("The first callback should verify.");

	let err = authenticator
		.handle_callback(assertion)
		.await
		.expect_err("A replayed callback must be rejected.");

	assert!(matches!(err, Error::Verify(VerifyError::UnknownOrReusedRequest)));
}

#[tokio::test]
async fn tampered_response_fails_signature_verification() {
	let (authenticator, store) = build_authenticator(resolve_config(&[]));
	let session = authenticator
		.start_authentication(&callback_base())
		.await
		.expect("Starting an authentication attempt should succeed.");
	let mut assertion = signed_assertion(session.correlation_token.as_str(), Some("alice"));

	assertion.raw_response[0] ^= 0x01;

	let err = authenticator
		.handle_callback(assertion)
		.await
		.expect_err("A tampered assertion must be rejected.");

	assert!(matches!(err, Error::Verify(VerifyError::SignatureVerification)));
	assert!(store.is_empty(), "a rejected callback still consumes the pending request");

	let retry = signed_assertion(session.correlation_token.as_str(), Some("alice"));
	let err = authenticator
		.handle_callback(retry)
		.await
		.expect_err("The consumed request must not verify on a later valid callback.");

	assert!(matches!(err, Error::Verify(VerifyError::UnknownOrReusedRequest)));
}

#[tokio::test]
async fn expired_request_is_rejected_before_signature_checks() {
	let (authenticator, store) = build_authenticator(resolve_config(&[]));
	let token = CorrelationToken::generate();
	let now = OffsetDateTime::now_utc();

	store
		.put(AuthenticationRequest {
			correlation_token: token.clone(),
			callback_url: callback_base(),
			country: Country::Sweden,
			created_at: now - Duration::minutes(10),
			expires_at: now - Duration::minutes(5),
		})
		.await
		.expect("Storing the expired request should succeed.");

	let mut assertion = signed_assertion(token.as_str(), Some("alice"));

	// Garbage signature; expiry must be decided before any signature work.
	assertion.signature = vec![0; 32];

	let err = authenticator
		.handle_callback(assertion)
		.await
		.expect_err("An expired request must not verify.");

	assert!(matches!(err, Error::Verify(VerifyError::RequestExpired)));
	assert!(store.is_empty(), "an expired entry is reclaimed on lookup");
}

#[tokio::test]
async fn unknown_correlation_token_is_rejected() {
	let (authenticator, _store) = build_authenticator(resolve_config(&[]));
	let assertion = signed_assertion("token-that-was-never-issued", Some("alice"));
	let err = authenticator
		.handle_callback(assertion)
		.await
		.expect_err("A callback without a pending request must be rejected.");

	assert!(matches!(err, Error::Verify(VerifyError::UnknownOrReusedRequest)));
}

#[tokio::test]
async fn missing_subject_claim_is_rejected() {
	let (authenticator, _store) = build_authenticator(resolve_config(&[]));
	let session = authenticator
		.start_authentication(&callback_base())
		.await
		.expect("Starting an authentication attempt should succeed.");
	let assertion = signed_assertion(session.correlation_token.as_str(), None);
	let err = authenticator
		.handle_callback(assertion)
		.await
		.expect_err("An assertion without a subject must be rejected.");

	assert!(matches!(
		err,
		Error::Verify(VerifyError::MissingRequiredClaim { claim: SUBJECT_CLAIM })
	));
}

#[tokio::test]
async fn missing_trust_anchor_is_rejected() {
	let config = resolve_config(&[]);
	let store: Arc<dyn PendingStore> = Arc::new(MemoryStore::default());
	let authenticator = Authenticator::new(config, store, Arc::new(TrustAnchors::new()));
	let session = authenticator
		.start_authentication(&callback_base())
		.await
		.expect("Starting an authentication attempt should succeed.");
	let assertion = signed_assertion(session.correlation_token.as_str(), Some("alice"));
	let err = authenticator
		.handle_callback(assertion)
		.await
		.expect_err("Verification without a signing key must be rejected.");

	assert!(matches!(
		err,
		Error::Verify(VerifyError::MissingTrustAnchor { ref host }) if host == "preprod.signicat.com"
	));
}

#[test]
fn signing_redirect_follows_the_docaction_grammar() {
	let config = resolve_config(&[
		(keys::USE_SIGNING, "true"),
		(keys::SIGNING_SECRET, "document-service-secret"),
	]);
	let (authenticator, _store) = build_authenticator(config);
	let url = authenticator
		.signing_redirect("request-42")
		.expect("Signing redirect should build when signing is enabled.");

	assert_eq!(url.host_str(), Some("preprod.signicat.com"));
	assert_eq!(url.path(), "/std/docaction/demo");

	let (authenticator, _store) = build_authenticator(resolve_config(&[]));
	let err = authenticator
		.signing_redirect("request-42")
		.expect_err("Signing redirect must be rejected when signing is disabled.");

	assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn concurrent_duplicate_callbacks_have_a_single_winner() {
	let (authenticator, store) = build_authenticator(resolve_config(&[]));
	let session = authenticator
		.start_authentication(&callback_base())
		.await
		.expect("Starting an authentication attempt should succeed.");
	let assertion = signed_assertion(session.correlation_token.as_str(), Some("alice"));
	let tasks = (0..4)
		.map(|_| {
			let authenticator = authenticator.clone();
			let assertion = assertion.clone();

			tokio::spawn(async move { authenticator.handle_callback(assertion).await })
		})
		.collect::<Vec<_>>();
	let mut verified = 0;
	let mut reused = 0;

	for task in tasks {
		match task.await.expect("Callback task should not panic.") {
			Ok(identity) => {
				assert_eq!(identity.subject_id, "alice");

				verified += 1;
			},
			Err(Error::Verify(VerifyError::UnknownOrReusedRequest)) => reused += 1,
			Err(e) => panic!("Unexpected callback failure: {e}."),
		}
	}

	assert_eq!(verified, 1, "exactly one duplicate callback may verify");
	assert_eq!(reused, 3);
	assert!(store.is_empty());
}
