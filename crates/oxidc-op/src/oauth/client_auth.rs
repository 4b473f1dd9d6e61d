//! Client authentication for the code exchange.
//!
//! Exactly one of three mutually exclusive strategies authenticates the
//! requesting client, selected by the request's declared evidence and the
//! client's registered method:
//!
//! - **JWT-bearer assertion** (`private_key_jwt`): selected whenever the
//!   request carries the JWT-bearer assertion type URN. Checked before any
//!   client lookup, because assertion requests may omit `client_id`
//!   entirely (the client is derived from the assertion).
//! - **Public client + PKCE** (`none`): the grant's stored code challenge
//!   is verified against the presented `code_verifier`.
//! - **Shared secret** (`client_secret_basic` / `client_secret_post`):
//!   secret verification is delegated to the client storage backend.
//!
//! A client presenting evidence for a method it is not registered for is
//! rejected, never silently downgraded. Every successful branch also fetches
//! (and thereby consumes) the grant addressed by `code`; the cross-checks
//! between grant, client, and request happen afterwards in the grant
//! validator.

use std::sync::Arc;

use crate::AuthResult;
use crate::config::ExchangeConfig;
use crate::error::AuthError;
use crate::oauth::client_assertion::{CLIENT_ASSERTION_TYPE_JWT_BEARER, ClientAssertionVerifier};
use crate::oauth::grant::AuthorizationGrant;
use crate::oauth::pkce::{PkceChallenge, PkceChallengeMethod, PkceVerifier};
use crate::oauth::token::AccessTokenRequest;
use crate::storage::{ClientStorage, GrantStorage};
use crate::types::{Client, TokenEndpointAuthMethod};

/// Authenticates clients at the token endpoint and retrieves the grant
/// addressed by the request's authorization code.
pub struct ClientAuthenticator {
    /// Storage for registered clients (lookup and secret verification).
    client_storage: Arc<dyn ClientStorage>,

    /// Storage for authorization grants (atomic consume-by-code).
    grant_storage: Arc<dyn GrantStorage>,

    /// Verifier for JWT client assertions.
    /// Only present when the deployment supports `private_key_jwt`.
    assertion_verifier: Option<Arc<dyn ClientAssertionVerifier>>,

    /// Deployment capability flags.
    config: ExchangeConfig,
}

impl ClientAuthenticator {
    /// Creates a new authenticator.
    #[must_use]
    pub fn new(
        client_storage: Arc<dyn ClientStorage>,
        grant_storage: Arc<dyn GrantStorage>,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            client_storage,
            grant_storage,
            assertion_verifier: None,
            config,
        }
    }

    /// Configures the verifier required for `private_key_jwt` support.
    #[must_use]
    pub fn with_assertion_verifier(mut self, verifier: Arc<dyn ClientAssertionVerifier>) -> Self {
        self.assertion_verifier = Some(verifier);
        self
    }

    /// Authenticates the requesting client and fetches the grant for the
    /// request's code.
    ///
    /// # Errors
    ///
    /// - `InvalidClient` for unknown/inactive clients, wrong secrets,
    ///   method/evidence mismatches, and methods the deployment does not
    ///   support
    /// - `InvalidGrant` for unknown, consumed, or expired codes and for
    ///   PKCE mismatches
    /// - `InvalidRequest` for a missing `code_verifier` on a PKCE exchange
    pub async fn authenticate(
        &self,
        request: &AccessTokenRequest,
    ) -> AuthResult<(AuthorizationGrant, Client)> {
        if request.client_assertion_type.as_deref() == Some(CLIENT_ASSERTION_TYPE_JWT_BEARER) {
            return self.authenticate_assertion(request).await;
        }

        let client_id = request
            .client_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AuthError::invalid_client("client_id missing"))?;

        let client = self
            .client_storage
            .find_by_client_id(client_id)
            .await?
            .ok_or_else(|| AuthError::invalid_client("unknown client"))?;

        if !client.active {
            return Err(AuthError::invalid_client("client is inactive"));
        }

        match client.auth_method {
            // A registered private_key_jwt client may not fall back to any
            // other evidence.
            TokenEndpointAuthMethod::PrivateKeyJwt => Err(AuthError::invalid_client(
                "private_key_jwt not allowed for this client",
            )),
            TokenEndpointAuthMethod::None => {
                let grant = self.grant_by_code(request.code()).await?;
                verify_code_challenge(request, &grant)?;
                Ok((grant, client))
            }
            TokenEndpointAuthMethod::ClientSecretBasic | TokenEndpointAuthMethod::ClientSecretPost => {
                if client.auth_method == TokenEndpointAuthMethod::ClientSecretPost
                    && !self.config.auth_method_post_supported
                {
                    return Err(AuthError::invalid_client("auth_method post not supported"));
                }
                self.verify_client_secret(&client, request).await?;
                let grant = self.grant_by_code(request.code()).await?;
                Ok((grant, client))
            }
        }
    }

    /// Authenticates via JWT client assertion.
    ///
    /// The grant/client cross-checks are not performed here; they run in the
    /// grant validator like for every other branch.
    async fn authenticate_assertion(
        &self,
        request: &AccessTokenRequest,
    ) -> AuthResult<(AuthorizationGrant, Client)> {
        let verifier = match &self.assertion_verifier {
            Some(verifier) if self.config.auth_method_private_key_jwt_supported => verifier,
            _ => {
                return Err(AuthError::invalid_client(
                    "auth_method private_key_jwt not supported",
                ));
            }
        };

        let assertion = request
            .client_assertion
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| AuthError::invalid_request("client_assertion missing"))?;

        let client = verifier.verify(assertion).await?;
        if !client.active {
            return Err(AuthError::invalid_client("client is inactive"));
        }

        let grant = self.grant_by_code(request.code()).await?;
        Ok((grant, client))
    }

    /// Verifies a shared client secret through the storage backend.
    async fn verify_client_secret(
        &self,
        client: &Client,
        request: &AccessTokenRequest,
    ) -> AuthResult<()> {
        let secret = request
            .client_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AuthError::invalid_client("client secret required"))?;

        let valid = self
            .client_storage
            .verify_secret(&client.client_id, secret)
            .await?;
        if !valid {
            return Err(AuthError::invalid_client("invalid client secret"));
        }
        Ok(())
    }

    /// Consumes the grant for an authorization code.
    ///
    /// Every failure (unknown code, replay, expiry, backend trouble) is
    /// reported uniformly as `invalid code`, so the response never reveals
    /// why a code was rejected. The underlying cause goes to the log only.
    async fn grant_by_code(&self, code: &str) -> AuthResult<AuthorizationGrant> {
        match self.grant_storage.consume(code).await {
            Ok(grant) if !grant.is_expired() => Ok(grant),
            Ok(_) => {
                tracing::debug!("consumed grant was already expired");
                Err(AuthError::invalid_grant("invalid code"))
            }
            Err(err) => {
                tracing::debug!(cause = %err, "authorization code lookup failed");
                Err(AuthError::invalid_grant("invalid code"))
            }
        }
    }
}

/// Verifies the PKCE code challenge bound to a grant against the verifier
/// presented in the token request.
///
/// # Errors
///
/// - `InvalidRequest` if the request carries no `code_verifier` or it is
///   malformed
/// - `InvalidGrant` if the grant has no bound challenge or the verifier
///   does not match
fn verify_code_challenge(
    request: &AccessTokenRequest,
    grant: &AuthorizationGrant,
) -> AuthResult<()> {
    let verifier = request
        .code_verifier
        .as_deref()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AuthError::invalid_request("code_verifier required"))?;

    let challenge = grant
        .code_challenge
        .as_deref()
        .ok_or_else(|| AuthError::invalid_grant("no code challenge bound to the grant"))?;

    if let Some(method) = grant.code_challenge_method.as_deref() {
        PkceChallengeMethod::parse(method)?;
    }

    let verifier = PkceVerifier::new(verifier.to_string())?;
    let challenge = PkceChallenge::new(challenge.to_string())?;
    challenge.verify(&verifier)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GrantType;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::RwLock;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    /// Mock client storage for testing.
    struct MockClientStorage {
        clients: RwLock<HashMap<String, (Client, String)>>,
    }

    impl MockClientStorage {
        fn new() -> Self {
            Self {
                clients: RwLock::new(HashMap::new()),
            }
        }

        fn add_client(&self, client: Client, secret: Option<&str>) {
            self.clients.write().unwrap().insert(
                client.client_id.clone(),
                (client, secret.unwrap_or_default().to_string()),
            );
        }
    }

    #[async_trait]
    impl ClientStorage for MockClientStorage {
        async fn find_by_client_id(&self, client_id: &str) -> AuthResult<Option<Client>> {
            Ok(self
                .clients
                .read()
                .unwrap()
                .get(client_id)
                .map(|(c, _)| c.clone()))
        }

        async fn verify_secret(&self, client_id: &str, secret: &str) -> AuthResult<bool> {
            Ok(self
                .clients
                .read()
                .unwrap()
                .get(client_id)
                .is_some_and(|(_, s)| s == secret))
        }
    }

    /// Mock grant storage with single-use consume semantics.
    struct MockGrantStorage {
        grants: RwLock<HashMap<String, AuthorizationGrant>>,
    }

    impl MockGrantStorage {
        fn new() -> Self {
            Self {
                grants: RwLock::new(HashMap::new()),
            }
        }

        fn add_grant(&self, grant: AuthorizationGrant) {
            self.grants
                .write()
                .unwrap()
                .insert(grant.code.clone(), grant);
        }
    }

    #[async_trait]
    impl GrantStorage for MockGrantStorage {
        async fn create(&self, grant: &AuthorizationGrant) -> AuthResult<()> {
            self.add_grant(grant.clone());
            Ok(())
        }

        async fn consume(&self, code: &str) -> AuthResult<AuthorizationGrant> {
            let mut grants = self.grants.write().unwrap();
            let grant = grants
                .get_mut(code)
                .ok_or_else(|| AuthError::invalid_grant("code not found"))?;
            if grant.is_consumed() {
                return Err(AuthError::invalid_grant("code already consumed"));
            }
            if grant.is_expired() {
                return Err(AuthError::invalid_grant("code expired"));
            }
            grant.consumed_at = Some(OffsetDateTime::now_utc());
            Ok(grant.clone())
        }

        async fn cleanup_expired(&self) -> AuthResult<u64> {
            let mut grants = self.grants.write().unwrap();
            let before = grants.len();
            grants.retain(|_, g| !g.is_expired());
            Ok((before - grants.len()) as u64)
        }
    }

    /// Assertion verifier that accepts one fixed assertion string.
    struct MockAssertionVerifier {
        expected: String,
        client: Client,
    }

    #[async_trait]
    impl ClientAssertionVerifier for MockAssertionVerifier {
        async fn verify(&self, assertion: &str) -> AuthResult<Client> {
            if assertion == self.expected {
                Ok(self.client.clone())
            } else {
                Err(AuthError::invalid_client("assertion signature invalid"))
            }
        }
    }

    fn public_client(id: &str) -> Client {
        Client {
            client_id: id.to_string(),
            client_secret: None,
            name: "Public".to_string(),
            auth_method: TokenEndpointAuthMethod::None,
            grant_types: vec![GrantType::AuthorizationCode],
            redirect_uris: vec!["https://app.example.com/callback".to_string()],
            active: true,
            access_token_lifetime: None,
            jwks: None,
            jwks_uri: None,
        }
    }

    fn post_client(id: &str) -> Client {
        Client {
            auth_method: TokenEndpointAuthMethod::ClientSecretPost,
            client_secret: Some("hash".to_string()),
            ..public_client(id)
        }
    }

    fn jwt_client(id: &str) -> Client {
        Client {
            auth_method: TokenEndpointAuthMethod::PrivateKeyJwt,
            jwks_uri: Some("https://client.example.com/jwks.json".to_string()),
            ..public_client(id)
        }
    }

    fn grant_for(client_id: &str, code: &str, challenge: Option<PkceChallenge>) -> AuthorizationGrant {
        let now = OffsetDateTime::now_utc();
        AuthorizationGrant {
            id: Uuid::new_v4(),
            code: code.to_string(),
            client_id: client_id.to_string(),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scope: "openid".to_string(),
            code_challenge_method: challenge.as_ref().map(|_| "S256".to_string()),
            code_challenge: challenge.map(PkceChallenge::into_inner),
            subject: "user-1".to_string(),
            nonce: None,
            amr: vec![],
            auth_time: now,
            created_at: now,
            expires_at: now + Duration::minutes(10),
            consumed_at: None,
        }
    }

    fn code_request(client_id: Option<&str>, code: &str) -> AccessTokenRequest {
        AccessTokenRequest {
            grant_type: "authorization_code".to_string(),
            code: Some(code.to_string()),
            redirect_uri: Some("https://app.example.com/callback".to_string()),
            code_verifier: None,
            client_id: client_id.map(str::to_string),
            client_secret: None,
            client_assertion_type: None,
            client_assertion: None,
        }
    }

    struct Fixture {
        clients: Arc<MockClientStorage>,
        grants: Arc<MockGrantStorage>,
    }

    fn authenticator(config: ExchangeConfig) -> (ClientAuthenticator, Fixture) {
        let clients = Arc::new(MockClientStorage::new());
        let grants = Arc::new(MockGrantStorage::new());
        let auth = ClientAuthenticator::new(clients.clone(), grants.clone(), config);
        (auth, Fixture { clients, grants })
    }

    #[tokio::test]
    async fn test_public_client_pkce_success() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(public_client("spa"), None);

        let verifier = PkceVerifier::generate();
        let challenge = PkceChallenge::from_verifier(&verifier);
        fx.grants.add_grant(grant_for("spa", "code1", Some(challenge)));

        let mut request = code_request(Some("spa"), "code1");
        request.code_verifier = Some(verifier.as_str().to_string());

        let (grant, client) = auth.authenticate(&request).await.unwrap();
        assert_eq!(grant.client_id, "spa");
        assert_eq!(client.client_id, "spa");
    }

    #[tokio::test]
    async fn test_public_client_missing_verifier() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(public_client("spa"), None);

        let challenge = PkceChallenge::from_verifier(&PkceVerifier::generate());
        fx.grants.add_grant(grant_for("spa", "code1", Some(challenge)));

        let request = code_request(Some("spa"), "code1");
        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
        assert!(err.to_string().contains("code_verifier required"));
    }

    #[tokio::test]
    async fn test_public_client_wrong_verifier() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(public_client("spa"), None);

        let challenge = PkceChallenge::from_verifier(&PkceVerifier::generate());
        fx.grants.add_grant(grant_for("spa", "code1", Some(challenge)));

        let mut request = code_request(Some("spa"), "code1");
        request.code_verifier = Some(PkceVerifier::generate().as_str().to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
    }

    #[tokio::test]
    async fn test_secret_post_success() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(post_client("backend"), Some("s3cret"));
        fx.grants.add_grant(grant_for("backend", "code2", None));

        let mut request = code_request(Some("backend"), "code2");
        request.client_secret = Some("s3cret".to_string());

        let (grant, client) = auth.authenticate(&request).await.unwrap();
        assert_eq!(grant.client_id, "backend");
        assert_eq!(
            client.auth_method,
            TokenEndpointAuthMethod::ClientSecretPost
        );
    }

    #[tokio::test]
    async fn test_secret_post_wrong_secret() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(post_client("backend"), Some("s3cret"));
        fx.grants.add_grant(grant_for("backend", "code2", None));

        let mut request = code_request(Some("backend"), "code2");
        request.client_secret = Some("wrong".to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_secret_post_not_supported_by_deployment() {
        let (auth, fx) =
            authenticator(ExchangeConfig::default().with_auth_method_post(false));
        fx.clients.add_client(post_client("backend"), Some("s3cret"));
        fx.grants.add_grant(grant_for("backend", "code2", None));

        let mut request = code_request(Some("backend"), "code2");
        request.client_secret = Some("s3cret".to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(err.to_string().contains("auth_method post not supported"));
    }

    #[tokio::test]
    async fn test_basic_client_allowed_when_post_disabled() {
        let (auth, fx) =
            authenticator(ExchangeConfig::default().with_auth_method_post(false));
        let mut client = post_client("backend");
        client.auth_method = TokenEndpointAuthMethod::ClientSecretBasic;
        fx.clients.add_client(client, Some("s3cret"));
        fx.grants.add_grant(grant_for("backend", "code2", None));

        let mut request = code_request(Some("backend"), "code2");
        request.client_secret = Some("s3cret".to_string());

        assert!(auth.authenticate(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_client() {
        let (auth, _fx) = authenticator(ExchangeConfig::default());
        let request = code_request(Some("ghost"), "code1");
        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_missing_client_id() {
        let (auth, _fx) = authenticator(ExchangeConfig::default());
        let request = code_request(None, "code1");
        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_inactive_client() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        let mut client = public_client("spa");
        client.active = false;
        fx.clients.add_client(client, None);

        let request = code_request(Some("spa"), "code1");
        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(err.to_string().contains("inactive"));
    }

    #[tokio::test]
    async fn test_jwt_client_without_assertion_rejected() {
        let (auth, fx) = authenticator(
            ExchangeConfig::default().with_auth_method_private_key_jwt(true),
        );
        fx.clients.add_client(jwt_client("service"), None);

        // No assertion presented: the registered method may not be bypassed.
        let request = code_request(Some("service"), "code1");
        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(
            err.to_string()
                .contains("private_key_jwt not allowed for this client")
        );
    }

    #[tokio::test]
    async fn test_assertion_without_deployment_support() {
        let (auth, _fx) = authenticator(ExchangeConfig::default());

        let mut request = code_request(None, "code1");
        request.client_assertion_type = Some(CLIENT_ASSERTION_TYPE_JWT_BEARER.to_string());
        request.client_assertion = Some("jwt".to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(
            err.to_string()
                .contains("auth_method private_key_jwt not supported")
        );
    }

    #[tokio::test]
    async fn test_assertion_flag_without_verifier_still_unsupported() {
        // The capability flag alone is not enough; a verifier must be wired.
        let (auth, _fx) = authenticator(
            ExchangeConfig::default().with_auth_method_private_key_jwt(true),
        );

        let mut request = code_request(None, "code1");
        request.client_assertion_type = Some(CLIENT_ASSERTION_TYPE_JWT_BEARER.to_string());
        request.client_assertion = Some("jwt".to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidClient { .. }));
    }

    #[tokio::test]
    async fn test_assertion_success_without_client_id() {
        let (auth, fx) = authenticator(
            ExchangeConfig::default().with_auth_method_private_key_jwt(true),
        );
        let auth = auth.with_assertion_verifier(Arc::new(MockAssertionVerifier {
            expected: "good-jwt".to_string(),
            client: jwt_client("service"),
        }));
        fx.grants.add_grant(grant_for("service", "code3", None));

        let mut request = code_request(None, "code3");
        request.client_assertion_type = Some(CLIENT_ASSERTION_TYPE_JWT_BEARER.to_string());
        request.client_assertion = Some("good-jwt".to_string());

        let (grant, client) = auth.authenticate(&request).await.unwrap();
        assert_eq!(client.client_id, "service");
        assert_eq!(grant.client_id, "service");
    }

    #[tokio::test]
    async fn test_assertion_verifier_failure_propagates() {
        let (auth, fx) = authenticator(
            ExchangeConfig::default().with_auth_method_private_key_jwt(true),
        );
        let auth = auth.with_assertion_verifier(Arc::new(MockAssertionVerifier {
            expected: "good-jwt".to_string(),
            client: jwt_client("service"),
        }));
        fx.grants.add_grant(grant_for("service", "code3", None));

        let mut request = code_request(None, "code3");
        request.client_assertion_type = Some(CLIENT_ASSERTION_TYPE_JWT_BEARER.to_string());
        request.client_assertion = Some("forged-jwt".to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert!(err.to_string().contains("assertion signature invalid"));
    }

    #[tokio::test]
    async fn test_code_replay_reported_uniformly() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(post_client("backend"), Some("s3cret"));
        fx.grants.add_grant(grant_for("backend", "code2", None));

        let mut request = code_request(Some("backend"), "code2");
        request.client_secret = Some("s3cret".to_string());

        assert!(auth.authenticate(&request).await.is_ok());

        let err = auth.authenticate(&request).await.unwrap_err();
        // Replay and unknown codes are indistinguishable to the caller.
        assert_eq!(err.to_string(), "Invalid grant: invalid code");
    }

    #[tokio::test]
    async fn test_unknown_code_reported_uniformly() {
        let (auth, fx) = authenticator(ExchangeConfig::default());
        fx.clients.add_client(post_client("backend"), Some("s3cret"));

        let mut request = code_request(Some("backend"), "nope");
        request.client_secret = Some("s3cret".to_string());

        let err = auth.authenticate(&request).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid grant: invalid code");
    }
}
