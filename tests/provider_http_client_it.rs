#![cfg(all(feature = "reqwest", feature = "test"))]

// self
use oauth2_gate::{
	_preludet::*,
	auth::{ProviderId, Token},
	config::GateConfig,
	error::{ConfigError, Error, TransientError, TransportError},
	flows::OAuthGate,
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	obs::FlowKind,
	provider::{ClientAuthMethod, DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	status: u16,
}
impl FakeHttpClient {
	fn throttled(status: u16) -> Self {
		Self { status }
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, status: self.status }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	status: u16,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let status = self.status;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata { status: Some(status) });

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	calls: Arc<Mutex<Vec<(FlowKind, Option<ResponseMetadata>)>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded(&self) -> Vec<(FlowKind, Option<ResponseMetadata>)> {
		self.calls.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);

		self.calls.lock().push((flow, meta.cloned()));

		match err {
			HttpClientError::Reqwest(inner) => TransientError::Endpoint {
				endpoint: "fake",
				message: format!("Fake transport error: {inner}"),
				status,
			}
			.into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransientError::Endpoint {
				endpoint: "fake",
				message: format!("Unhandled HTTP client error: {other:?}"),
				status,
			}
			.into(),
		}
	}
}

type FakeGate = OAuthGate<FakeHttpClient, RecordingTransportErrorMapper>;

fn build_descriptor() -> ProviderDescriptor {
	let provider_id =
		ProviderId::new("mock-provider-http").expect("Failed to build mock provider identifier.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse("https://mock.example.com/authorize")
				.expect("Failed to parse mock authorization endpoint URL."),
		)
		.token_endpoint(
			Url::parse("https://mock.example.com/token")
				.expect("Failed to parse mock token endpoint URL."),
		)
		.userinfo_endpoint(
			Url::parse("https://mock.example.com/userinfo")
				.expect("Failed to parse mock user-info endpoint URL."),
		)
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Failed to build mock provider descriptor.")
}

fn build_gate(status: u16, mapper: Arc<RecordingTransportErrorMapper>) -> FakeGate {
	let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);

	OAuthGate::with_http_client(
		build_descriptor(),
		strategy,
		GateConfig::new("throttled-client", "throttled-secret"),
		Arc::new(FakeHttpClient::throttled(status)),
		mapper,
	)
	.expect("Fake gate configuration should be valid.")
}

#[tokio::test]
async fn fake_provider_http_client_surfaces_metadata() {
	let gate = build_gate(429, Arc::default());
	let redirect_uri =
		Url::parse("https://app.example.com/login").expect("Redirect URI should parse.");
	let mut flow = gate.flow(Some("code".into()), None);
	let err = flow
		.authenticate(&redirect_uri, None)
		.await
		.expect_err("Exchange should be throttled with HTTP 429.");

	match err {
		Error::Transient(TransientError::Endpoint { status, .. }) => {
			assert_eq!(status, Some(429));
		},
		other => panic!("Unexpected error variant: {other:?}."),
	}

	assert!(flow.user.is_none(), "Profile fetch must not run after a failed exchange.");
}

#[tokio::test]
async fn fake_mapper_captures_metadata_per_flow() {
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let gate = build_gate(503, mapper.clone());
	let redirect_uri =
		Url::parse("https://app.example.com/login").expect("Redirect URI should parse.");
	let _ = gate
		.flow(Some("code".into()), None)
		.exchange(&redirect_uri, None)
		.await
		.expect_err("Exchange should fail with HTTP 503.");
	let _ = gate
		.fetch_user(&Token::new("access", None))
		.await
		.expect_err("Profile fetch should fail with HTTP 503.");
	let observed = mapper.recorded();

	assert_eq!(observed.len(), 2, "Mapper must record one call per request.");
	assert_eq!(observed[0].0, FlowKind::TokenExchange);
	assert_eq!(observed[1].0, FlowKind::Profile);

	for (_, meta) in observed {
		let meta = meta.expect("Response metadata should be recorded for every request.");

		assert_eq!(meta.status, Some(503));
	}
}
