//! Request descriptors handed to the host for notarization.

use crate::error::{PluginError, PluginResult};
use crate::host::SessionCredentials;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::debug;

/// One outbound header. Secret headers carry session credentials and must
/// never appear in the revealed transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    value: String,
    secret: bool,
}

impl Header {
    pub fn public<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            secret: false,
        }
    }

    pub fn secret<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            secret: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// The header as it appears on the wire (HTTP/1.1 lower-cased name).
    pub fn line(&self) -> String {
        format!("{}: {}", self.name.to_ascii_lowercase(), self.value)
    }
}

/// A complete HTTP request for the host to perform and notarize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    pub url: String,
    pub method: String,
    #[serde(serialize_with = "headers_as_map")]
    pub headers: Vec<Header>,
    pub secret_headers: Vec<String>,
}

impl RequestDescriptor {
    pub fn new<U: Into<String>, M: Into<String>>(url: U, method: M, headers: Vec<Header>) -> Self {
        let secret_headers = headers
            .iter()
            .filter(|header| header.is_secret())
            .map(Header::line)
            .collect();

        Self {
            url: url.into(),
            method: method.into(),
            headers,
            secret_headers,
        }
    }

    /// Reorder the secret lines so names listed in `order` come first, in
    /// that order. Other secret lines keep their header order after them.
    pub fn with_secret_order(mut self, order: &[&str]) -> Self {
        let rank = |line: &String| {
            let name = line.split_once(':').map_or(line.as_str(), |(name, _)| name);
            order
                .iter()
                .position(|wanted| wanted.eq_ignore_ascii_case(name))
                .unwrap_or(order.len())
        };
        self.secret_headers.sort_by_key(rank);
        self
    }

    /// Header value by name, ASCII case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(Header::value)
    }
}

fn headers_as_map<S: Serializer>(headers: &[Header], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(headers.len()))?;
    for header in headers {
        map.serialize_entry(&header.name, &header.value)?;
    }
    map.end()
}

/// Order the web client lists credential headers in the notarized transcript.
pub const SECRET_HEADER_ORDER: [&str; 3] = ["x-csrf-token", "cookie", "authorization"];

/// The session credentials every private X API call is authenticated with.
#[derive(Clone)]
pub struct SessionAuth {
    auth_token: String,
    ct0: String,
    csrf_token: String,
    authorization: String,
}

impl std::fmt::Debug for SessionAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuth").finish_non_exhaustive()
    }
}

impl SessionAuth {
    /// Collect the required cookies and headers captured for `hostname`.
    ///
    /// Every field must be present and non-empty; the first missing one is
    /// reported.
    pub fn from_session(
        hostname: &str,
        cookies: &SessionCredentials,
        headers: &SessionCredentials,
    ) -> PluginResult<Self> {
        let require = |source: &SessionCredentials, field: &str| -> PluginResult<String> {
            match source.get(field) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                _ => Err(PluginError::missing(hostname, field)),
            }
        };

        Ok(Self {
            auth_token: require(cookies, "auth_token")?,
            ct0: require(cookies, "ct0")?,
            csrf_token: require(headers, "x-csrf-token")?,
            authorization: require(headers, "authorization")?,
        })
    }

    /// Request headers for a call to `host`, in the order the web client sends them.
    pub fn headers(&self, host: &str, language: &str) -> Vec<Header> {
        let headers = vec![
            Header::public("x-twitter-client-language", language),
            Header::secret("x-csrf-token", &self.csrf_token),
            Header::public("Host", host),
            Header::secret("authorization", &self.authorization),
            Header::secret(
                "Cookie",
                format!(
                    "lang={language}; auth_token={}; ct0={}",
                    self.auth_token, self.ct0
                ),
            ),
            Header::public("Accept-Encoding", "identity"),
            Header::public("Connection", "close"),
        ];

        debug!(
            host,
            secret = headers.iter().filter(|h| h.is_secret()).count(),
            "Assembled session headers"
        );

        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn session() -> (SessionCredentials, SessionCredentials) {
        let cookies = [("auth_token", "tok"), ("ct0", "ct")].into_iter().collect();
        let headers = [("x-csrf-token", "csrf"), ("authorization", "Bearer b")]
            .into_iter()
            .collect();
        (cookies, headers)
    }

    #[test]
    fn test_secret_lines_cover_credential_headers() {
        let (cookies, headers) = session();
        let auth = SessionAuth::from_session("api.x.com", &cookies, &headers).unwrap();
        let request =
            RequestDescriptor::new("https://api.x.com/", "GET", auth.headers("api.x.com", "en"))
                .with_secret_order(&SECRET_HEADER_ORDER);

        assert_eq!(
            request.secret_headers,
            vec![
                "x-csrf-token: csrf",
                "cookie: lang=en; auth_token=tok; ct0=ct",
                "authorization: Bearer b",
            ]
        );
        let names: Vec<&str> = request.headers.iter().map(Header::name).collect();
        assert_eq!(names[1..5], ["x-csrf-token", "Host", "authorization", "Cookie"]);
        for header in request.headers.iter().filter(|h| !h.is_secret()) {
            assert!(!request.secret_headers.contains(&header.line()));
        }
    }

    #[test]
    fn test_headers_serialize_as_ordered_map() {
        let request = RequestDescriptor::new(
            "https://x.com/",
            "GET",
            vec![Header::public("b", "1"), Header::secret("a", "2")],
        );

        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"url":"https://x.com/","method":"GET","headers":{"b":"1","a":"2"},"secretHeaders":["a: 2"]}"#
        );
    }

    #[test]
    fn test_unlisted_secrets_follow_listed_ones() {
        let request = RequestDescriptor::new(
            "https://x.com/",
            "GET",
            vec![
                Header::secret("x-extra", "1"),
                Header::secret("Cookie", "c"),
                Header::public("Host", "x.com"),
                Header::secret("x-csrf-token", "t"),
            ],
        )
        .with_secret_order(&SECRET_HEADER_ORDER);

        assert_eq!(
            request.secret_headers,
            vec!["x-csrf-token: t", "cookie: c", "x-extra: 1"]
        );
    }

    #[rstest]
    #[case::auth_token("auth_token")]
    #[case::ct0("ct0")]
    #[case::csrf("x-csrf-token")]
    #[case::authorization("authorization")]
    fn test_any_missing_field_is_refused(#[case] dropped: &str) {
        let (cookies, headers) = session();
        let strip = |source: SessionCredentials, names: &[&str]| -> SessionCredentials {
            names
                .iter()
                .filter(|name| **name != dropped)
                .filter_map(|name| source.get(name).map(|v| (name.to_string(), v.to_string())))
                .collect()
        };
        let cookies = strip(cookies, &["auth_token", "ct0"]);
        let headers = strip(headers, &["x-csrf-token", "authorization"]);

        match SessionAuth::from_session("x.com", &cookies, &headers) {
            Err(PluginError::MissingCredential { hostname, field }) => {
                assert_eq!(hostname, "x.com");
                assert_eq!(field, dropped);
            }
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let (_, headers) = session();
        let cookies = [("auth_token", ""), ("ct0", "ct")].into_iter().collect();

        assert!(matches!(
            SessionAuth::from_session("x.com", &cookies, &headers),
            Err(PluginError::MissingCredential { .. })
        ));
    }

    #[test]
    fn test_debug_hides_credentials() {
        let (cookies, headers) = session();
        let auth = SessionAuth::from_session("x.com", &cookies, &headers).unwrap();
        assert!(!format!("{auth:?}").contains("tok"));
    }
}
