use std::fs;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, decode_header,
    errors::{Error as JwtError, ErrorKind},
};

use crate::config::{ConfigError, JwtConfig, JwtKey};
use crate::domain::models::claims::ClaimSet;

use super::{TokenError, TokenVerifier, strip_bearer};

/// `TokenVerifier` backed by signed JSON Web Tokens.
///
/// Holds the decoding key and validation rules; both are immutable after construction.
pub struct JwtTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenVerifier {
    /// Builds a verifier from configuration, reading PEM key material from disk when the
    /// algorithm is asymmetric.
    ///
    /// # Errors
    /// * `ConfigError::Invalid` - The key source does not fit the algorithm family
    /// * `ConfigError::KeyFile` - The public key file could not be read
    /// * `ConfigError::Key` - The key material could not be decoded
    pub fn new(config: &JwtConfig) -> Result<Self, ConfigError> {
        use Algorithm::*;

        let decoding_key = match (&config.key, config.algorithm) {
            (JwtKey::Secret(secret), HS256 | HS384 | HS512) => {
                DecodingKey::from_secret(secret.as_bytes())
            }
            (JwtKey::PublicKeyFile(path), RS256 | RS384 | RS512 | PS256 | PS384 | PS512) => {
                DecodingKey::from_rsa_pem(&read_key(path)?)?
            }
            (JwtKey::PublicKeyFile(path), ES256 | ES384) => {
                DecodingKey::from_ec_pem(&read_key(path)?)?
            }
            (JwtKey::PublicKeyFile(path), EdDSA) => DecodingKey::from_ed_pem(&read_key(path)?)?,
            (key, algorithm) => {
                let source = match key {
                    JwtKey::Secret(_) => "a shared secret",
                    JwtKey::PublicKeyFile(_) => "a public key file",
                };
                return Err(ConfigError::Invalid {
                    name: "JWT_ALGORITHM",
                    reason: format!("{algorithm:?} cannot be verified with {source}"),
                });
            }
        };

        let mut validation = Validation::new(config.algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_nbf = true;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Tokens may carry an audience we have no opinion about
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

impl TokenVerifier for JwtTokenVerifier {
    fn verify(&self, header_value: &str) -> Result<ClaimSet, TokenError> {
        let token = strip_bearer(header_value);
        check_structure(token)?;
        decode::<ClaimSet>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::from)
    }
}

impl From<JwtError> for TokenError {
    fn from(err: JwtError) -> Self {
        match err.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => TokenError::Parse(err.to_string()),
            _ => TokenError::Verification(err.to_string()),
        }
    }
}

/// Decodes every segment of `token` without looking at the signature.
///
/// `decode` checks the signature before it decodes the claims, so an undecodable claims or
/// signature segment would otherwise surface as a verification failure.
fn check_structure(token: &str) -> Result<(), TokenError> {
    decode_header(token)?;

    let mut segments = token.split('.');
    let (Some(_), Some(claims), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Parse("token must have three segments".to_string()));
    };

    let claims = URL_SAFE_NO_PAD
        .decode(claims)
        .map_err(|err| TokenError::Parse(format!("claims segment: {err}")))?;
    serde_json::from_slice::<ClaimSet>(&claims)
        .map_err(|err| TokenError::Parse(format!("claims segment: {err}")))?;
    URL_SAFE_NO_PAD
        .decode(signature)
        .map_err(|err| TokenError::Parse(format!("signature segment: {err}")))?;

    Ok(())
}

fn read_key(path: &std::path::Path) -> Result<Vec<u8>, ConfigError> {
    fs::read(path).map_err(|source| ConfigError::KeyFile {
        path: path.to_path_buf(),
        source,
    })
}
