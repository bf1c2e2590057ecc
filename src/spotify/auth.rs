use std::sync::Arc;

use serde_json::Value;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    error::SpotifyError,
    transport::{HttpRequest, Transport, send_cancellable},
    types::{ClientCredentials, GrantRequest, TokenResponse},
    utils,
};

const ACCESS_TOKEN_KEY: &str = "access_token";

/// Performs OAuth 2.0 grant exchanges against the token endpoint.
///
/// The client holds no per-call state, so one instance can serve concurrent
/// callers with different credentials.
///
/// # Example
///
/// ```
/// let client = TokenClient::new(Arc::new(ReqwestTransport::new()), config::SPOTIFY_TOKEN_URL);
/// let token = client
///     .request_token(&config::client_credentials(), &GrantRequest::ClientCredentials, &cancel)
///     .await?;
/// ```
#[derive(Clone)]
pub struct TokenClient {
    transport: Arc<dyn Transport>,
    token_url: String,
}

impl TokenClient {
    pub fn new(transport: Arc<dyn Transport>, token_url: impl Into<String>) -> Self {
        Self {
            transport,
            token_url: token_url.into(),
        }
    }

    /// Exchanges `grant` for an access token.
    ///
    /// Sends a single `POST` with a Basic authorization header built from
    /// `creds` and a form-encoded body for the grant type.
    ///
    /// # Errors
    ///
    /// - [`SpotifyError::Config`] if the credentials are empty or placeholders;
    ///   nothing is sent in that case
    /// - [`SpotifyError::Transport`] on network failure or when `cancel` fires
    /// - [`SpotifyError::TokenExchange`] for a non-2xx status, carrying status and body
    /// - [`SpotifyError::MalformedResponse`] for a 2xx body without `access_token`
    pub async fn request_token(
        &self,
        creds: &ClientCredentials,
        grant: &GrantRequest,
        cancel: &CancellationToken,
    ) -> Result<TokenResponse, SpotifyError> {
        if !creds.is_configured() {
            return Err(SpotifyError::Config(
                "client id and secret must be set and must not be the placeholder defaults"
                    .to_string(),
            ));
        }

        let request = HttpRequest::post(&self.token_url, grant_form(grant))
            .header(
                "Authorization",
                utils::basic_auth_header(&creds.client_id, &creds.client_secret),
            )
            .header("Content-Type", "application/x-www-form-urlencoded");

        tracing::debug!(url = %self.token_url, grant = grant_name(grant), "requesting access token");

        let response = send_cancellable(self.transport.as_ref(), request, cancel).await?;
        if !response.is_success() {
            return Err(SpotifyError::TokenExchange {
                status: response.status,
                body: response.body,
            });
        }

        match extract_access_token(&response.body) {
            Some(access_token) => Ok(TokenResponse {
                access_token,
                raw_body: response.body,
            }),
            None => Err(SpotifyError::MalformedResponse {
                body: response.body,
            }),
        }
    }
}

fn grant_name(grant: &GrantRequest) -> &'static str {
    match grant {
        GrantRequest::ClientCredentials => "client_credentials",
        GrantRequest::AuthorizationCode { .. } => "authorization_code",
    }
}

/// Form body for the token endpoint.
pub fn grant_form(grant: &GrantRequest) -> String {
    match grant {
        GrantRequest::ClientCredentials => "grant_type=client_credentials".to_string(),
        GrantRequest::AuthorizationCode { code, redirect_uri } => format!(
            "grant_type=authorization_code&code={}&redirect_uri={}",
            utils::encode(code),
            utils::encode(redirect_uri)
        ),
    }
}

/// Pulls the top-level `access_token` string out of a token response body.
///
/// Well-formed JSON goes through `serde_json`, ignoring any other fields. A
/// body that does not parse falls back to a scan for the literal
/// `"access_token"` key at the top level of the outermost object, so nested
/// objects and look-alike keys such as `"x_access_token"` never match on
/// either path. Empty values count as missing.
pub fn extract_access_token(body: &str) -> Option<String> {
    match serde_json::from_str::<Value>(body) {
        Ok(json) => json
            .get(ACCESS_TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string),
        Err(_) => scan_access_token(body),
    }
}

fn scan_access_token(body: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match c {
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            '"' => {
                let end = string_end(body, i + 1)?;
                while chars.next_if(|&(j, _)| j <= end).is_some() {}

                if depth != 1 || &body[i + 1..end] != ACCESS_TOKEN_KEY {
                    continue;
                }
                // a key only when a colon follows
                let Some(rest) = body[end + 1..].trim_start().strip_prefix(':') else {
                    continue;
                };
                let value = rest.trim_start().strip_prefix('"')?;
                let start = body.len() - value.len();
                let close = string_end(body, start)?;
                return (close > start).then(|| body[start..close].to_string());
            }
            _ => {}
        }
    }

    None
}

/// Byte offset of the quote closing a string whose content starts at `start`.
fn string_end(body: &str, start: usize) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in body[start..].char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(start + i),
            _ => {}
        }
    }
    None
}

/// Builds the browser redirect for the authorization-code flow.
#[derive(Debug, Clone)]
pub struct AuthorizeUrlBuilder {
    authorize_url: String,
}

impl AuthorizeUrlBuilder {
    pub fn new(authorize_url: impl Into<String>) -> Self {
        Self {
            authorize_url: authorize_url.into(),
        }
    }

    /// Returns
    /// `<authorize>?response_type=code&client_id=..&redirect_uri=..[&scope=..][&state=..]`
    /// with every value percent-encoded. Empty `scope` or `state` are left out.
    /// An endpoint that already carries a query keeps it and gets the
    /// parameters appended with `&`.
    ///
    /// Fails only when the configured authorize endpoint itself is not a valid
    /// absolute URL; any parameter value can be encoded.
    pub fn build(
        &self,
        client_id: &str,
        redirect_uri: &str,
        state: &str,
        scope: &str,
    ) -> Result<String, SpotifyError> {
        let parsed = Url::parse(&self.authorize_url)
            .map_err(|e| SpotifyError::AuthorizeUrl(format!("{}: {e}", self.authorize_url)))?;
        let separator = match parsed.query() {
            None => "?",
            Some("") if self.authorize_url.ends_with('?') => "",
            Some(_) => "&",
        };

        let mut url = format!(
            "{base}{separator}response_type=code&client_id={client_id}&redirect_uri={redirect_uri}",
            base = self.authorize_url,
            client_id = utils::encode(client_id),
            redirect_uri = utils::encode(redirect_uri),
        );
        if !scope.is_empty() {
            url.push_str("&scope=");
            url.push_str(&utils::encode(scope));
        }
        if !state.is_empty() {
            url.push_str("&state=");
            url.push_str(&utils::encode(state));
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_json_ignores_other_fields() {
        let body = r#"{"token_type":"Bearer","expires_in":3600,"access_token":"abc123","scope":""}"#;
        assert_eq!(extract_access_token(body).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_extract_ignores_nested_and_similar_keys() {
        let body = r#"{"meta":{"access_token":"nested"},"x_access_token":"nope"}"#;
        assert_eq!(extract_access_token(body), None);
    }

    #[test]
    fn test_scan_fallback_on_invalid_json() {
        // trailing garbage makes serde reject it
        let body = r#"{"x_access_token":"nope", "access_token" : "abc123", }garbage"#;
        assert_eq!(extract_access_token(body).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_scan_skips_key_used_as_value() {
        let body = r#"{"note":"access_token", "access_token":"tok" ,}"#;
        assert_eq!(scan_access_token(body).as_deref(), Some("tok"));
    }

    #[test]
    fn test_scan_ignores_nested_key() {
        let body = r#"{"meta":{"access_token":"nested"}, "access_token":"outer",}"#;
        assert_eq!(extract_access_token(body).as_deref(), Some("outer"));

        let body = r#"{"meta":{"access_token":"nested"},}"#;
        assert_eq!(extract_access_token(body), None);

        let body = r#"[{"access_token":"in-array"},]"#;
        assert_eq!(extract_access_token(body), None);
    }

    #[test]
    fn test_scan_handles_escaped_quotes_and_braces_in_strings() {
        let body = r#"{"note":"say \"{\" here", "access_token":"tok\"en",}"#;
        assert_eq!(extract_access_token(body).as_deref(), Some(r#"tok\"en"#));
    }

    #[test]
    fn test_empty_token_is_missing() {
        assert_eq!(extract_access_token(r#"{"access_token":""}"#), None);
        assert_eq!(scan_access_token(r#"{"access_token":"" ,"#), None);
    }

    #[test]
    fn test_grant_form_encodes_values() {
        let form = grant_form(&GrantRequest::AuthorizationCode {
            code: "a b&c".to_string(),
            redirect_uri: "http://localhost:8080/cb".to_string(),
        });
        assert_eq!(
            form,
            "grant_type=authorization_code&code=a%20b%26c&redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fcb"
        );
        assert_eq!(
            grant_form(&GrantRequest::ClientCredentials),
            "grant_type=client_credentials"
        );
    }
}
