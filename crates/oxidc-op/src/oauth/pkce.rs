//! PKCE (Proof Key for Code Exchange), RFC 7636.
//!
//! S256 only; the `plain` method is rejected. Verification compares the
//! base64url-encoded SHA-256 hash of the presented verifier against the
//! challenge bound to the grant at authorization time.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use sha2::{Digest, Sha256};

use crate::error::AuthError;

/// Errors that can occur during PKCE operations.
#[derive(Debug, thiserror::Error)]
pub enum PkceError {
    /// Verifier length is outside the valid range (43-128 characters).
    #[error("invalid code_verifier length: must be 43-128 characters, got {0}")]
    InvalidVerifierLength(usize),

    /// Verifier contains characters outside `[A-Za-z0-9-._~]`.
    #[error("invalid code_verifier characters")]
    InvalidVerifierCharacters,

    /// Challenge is not valid base64url.
    #[error("invalid code_challenge format")]
    InvalidChallengeFormat,

    /// Unsupported challenge method (only S256 is supported).
    #[error("unsupported code_challenge_method: {0}")]
    UnsupportedMethod(String),

    /// The verifier does not hash to the stored challenge.
    #[error("code_verifier does not match the code_challenge")]
    VerificationFailed,
}

impl PkceError {
    /// Returns the OAuth 2.0 error code this failure maps to.
    ///
    /// Malformed inputs are request errors; a hash mismatch invalidates the
    /// grant exchange.
    #[must_use]
    pub fn oauth_error_code(&self) -> &'static str {
        match self {
            Self::InvalidVerifierLength(_)
            | Self::InvalidVerifierCharacters
            | Self::InvalidChallengeFormat
            | Self::UnsupportedMethod(_) => "invalid_request",
            Self::VerificationFailed => "invalid_grant",
        }
    }
}

impl From<PkceError> for AuthError {
    fn from(err: PkceError) -> Self {
        match err.oauth_error_code() {
            "invalid_grant" => AuthError::invalid_grant(err.to_string()),
            _ => AuthError::invalid_request(err.to_string()),
        }
    }
}

/// PKCE challenge method. Only S256 is accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PkceChallengeMethod {
    /// `BASE64URL(SHA256(ASCII(code_verifier)))`.
    #[default]
    S256,
}

impl PkceChallengeMethod {
    /// Parses a challenge method from its wire form.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::UnsupportedMethod` for anything other than
    /// `"S256"`, including the downgrade-prone `plain` method.
    pub fn parse(method: &str) -> Result<Self, PkceError> {
        match method {
            "S256" => Ok(Self::S256),
            other => Err(PkceError::UnsupportedMethod(other.to_string())),
        }
    }

    /// Returns the wire form of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        "S256"
    }
}

impl std::fmt::Display for PkceChallengeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// PKCE code verifier.
///
/// RFC 7636 Section 4.1: 43-128 characters drawn from the unreserved set
/// `[A-Z] / [a-z] / [0-9] / "-" / "." / "_" / "~"`.
#[derive(Debug, Clone)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Validates and wraps a verifier string received from a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the length or character set violates RFC 7636.
    pub fn new(verifier: String) -> Result<Self, PkceError> {
        let len = verifier.len();
        if !(43..=128).contains(&len) {
            return Err(PkceError::InvalidVerifierLength(len));
        }
        if !verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'))
        {
            return Err(PkceError::InvalidVerifierCharacters);
        }
        Ok(Self(verifier))
    }

    /// Generates a cryptographically random verifier (43 characters).
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Returns the verifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// PKCE code challenge (S256).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Derives the S256 challenge for a verifier.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let hash = Sha256::digest(verifier.0.as_bytes());
        Self(URL_SAFE_NO_PAD.encode(hash))
    }

    /// Wraps a challenge string bound to a grant at authorization time.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::InvalidChallengeFormat` if it is not base64url.
    pub fn new(challenge: String) -> Result<Self, PkceError> {
        if URL_SAFE_NO_PAD.decode(&challenge).is_err() {
            return Err(PkceError::InvalidChallengeFormat);
        }
        Ok(Self(challenge))
    }

    /// Verifies that a presented verifier hashes to this challenge.
    ///
    /// # Errors
    ///
    /// Returns `PkceError::VerificationFailed` on mismatch.
    pub fn verify(&self, verifier: &PkceVerifier) -> Result<(), PkceError> {
        if Self::from_verifier(verifier).0 == self.0 {
            Ok(())
        } else {
            Err(PkceError::VerificationFailed)
        }
    }

    /// Returns the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the challenge and returns the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc7636_appendix_b_vector() {
        let verifier =
            PkceVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string()).unwrap();
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert_eq!(
            challenge.as_str(),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );

        let stored =
            PkceChallenge::new("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string()).unwrap();
        assert!(stored.verify(&verifier).is_ok());
    }

    #[test]
    fn test_verifier_length_bounds() {
        assert!(PkceVerifier::new("a".repeat(42)).is_err());
        assert!(PkceVerifier::new("a".repeat(43)).is_ok());
        assert!(PkceVerifier::new("a".repeat(128)).is_ok());
        assert!(matches!(
            PkceVerifier::new("a".repeat(129)),
            Err(PkceError::InvalidVerifierLength(129))
        ));
    }

    #[test]
    fn test_verifier_character_set() {
        let ok = "abcDEF0123456789-._~".repeat(3);
        assert!(PkceVerifier::new(ok).is_ok());

        let bad = "a!@#$%".repeat(10);
        assert!(matches!(
            PkceVerifier::new(bad),
            Err(PkceError::InvalidVerifierCharacters)
        ));
    }

    #[test]
    fn test_generated_verifier_round_trips() {
        let verifier = PkceVerifier::generate();
        assert_eq!(verifier.as_str().len(), 43);
        let challenge = PkceChallenge::from_verifier(&verifier);
        assert!(challenge.verify(&verifier).is_ok());
    }

    #[test]
    fn test_verification_failure() {
        let challenge = PkceChallenge::from_verifier(&PkceVerifier::generate());
        let other = PkceVerifier::generate();
        assert!(matches!(
            challenge.verify(&other),
            Err(PkceError::VerificationFailed)
        ));
    }

    #[test]
    fn test_plain_method_rejected() {
        assert!(matches!(
            PkceChallengeMethod::parse("plain"),
            Err(PkceError::UnsupportedMethod(_))
        ));
        assert!(PkceChallengeMethod::parse("S256").is_ok());
    }

    #[test]
    fn test_challenge_format_validation() {
        assert!(PkceChallenge::new("not valid base64url!!!".to_string()).is_err());
        assert!(PkceChallenge::new("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM".to_string()).is_ok());
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            PkceError::VerificationFailed.oauth_error_code(),
            "invalid_grant"
        );
        assert_eq!(
            PkceError::InvalidVerifierLength(10).oauth_error_code(),
            "invalid_request"
        );

        let err: AuthError = PkceError::VerificationFailed.into();
        assert!(matches!(err, AuthError::InvalidGrant { .. }));
        let err: AuthError = PkceError::InvalidChallengeFormat.into();
        assert!(matches!(err, AuthError::InvalidRequest { .. }));
    }
}
