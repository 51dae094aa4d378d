use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::{Method, Url};
use serde::Serialize;

use crate::WalletError;

/// How long a request token stays valid, in seconds.
const TOKEN_TTL: u64 = 120;

#[derive(Serialize)]
struct Claims<'a> {
    sub: &'a str,
    iss: &'static str,
    aud: [&'static str; 1],
    nbf: u64,
    exp: u64,
    uri: String,
}

/// Signs a short-lived bearer token for every request.
pub struct Signer {
    key_name: String,
    key: EncodingKey,
}

impl Signer {
    pub fn new(key_name: &str, private_key: &str) -> Result<Self, WalletError> {
        let key = EncodingKey::from_ec_pem(private_key.as_bytes())
            .map_err(|err| WalletError::InvalidApiKey(err.to_string()))?;
        Ok(Self {
            key_name: key_name.to_owned(),
            key,
        })
    }

    pub fn token(&self, method: &Method, url: &str) -> Result<String, WalletError> {
        let mut header = Header::new(Algorithm::ES256);
        header.kid = Some(self.key_name.clone());
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: &self.key_name,
            iss: "cdp",
            aud: ["cdp_service"],
            nbf: now,
            exp: now + TOKEN_TTL,
            uri: token_uri(method, url)?,
        };
        jsonwebtoken::encode(&header, &claims, &self.key)
            .map_err(|err| WalletError::InvalidApiKey(err.to_string()))
    }
}

/// The token is bound to the request line, e.g.
/// `GET api.cdp.coinbase.com/platform/v1/wallets/w-1`.
fn token_uri(method: &Method, url: &str) -> Result<String, WalletError> {
    let url = Url::parse(url)
        .map_err(|err| WalletError::InvalidResponse(format!("bad url: {err}")))?;
    let host = url.host_str().unwrap_or_default();
    Ok(format!("{method} {host}{}", url.path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_uri() {
        let uri = token_uri(
            &Method::GET,
            "https://api.cdp.coinbase.com/platform/v1/wallets/w-1/balances/eth",
        )
        .unwrap();
        assert_eq!(
            uri,
            "GET api.cdp.coinbase.com/platform/v1/wallets/w-1/balances/eth"
        );

        // The query string is not part of the bound uri.
        let uri = token_uri(
            &Method::POST,
            "https://api.cdp.coinbase.com/platform/v1/networks/base-sepolia/addresses/0xabc/faucet?asset_id=usdc",
        )
        .unwrap();
        assert!(uri.ends_with("/faucet"));
    }

    #[test]
    fn test_rejects_bad_key() {
        assert!(matches!(
            Signer::new("key", "not a pem"),
            Err(WalletError::InvalidApiKey(_))
        ));
    }
}
