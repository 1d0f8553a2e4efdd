use std::collections::HashSet;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::{auth::claims::Claims, errors::AppResult};

/// Reads claims out of backend-issued tokens.
///
/// Signatures are verified by the backend on every request; the client only
/// needs the payload (user id, expiry) and never holds the signing secret.
#[derive(Clone)]
pub struct TokenDecoder {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenDecoder {
    pub fn new() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            decoding_key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    pub fn decode(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}

impl Default for TokenDecoder {
    fn default() -> Self {
        Self::new()
    }
}
