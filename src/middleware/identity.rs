use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::net::SocketAddr;

pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Caller identity used for admission control and record ownership. Session
/// issuance is an external collaborator; this service only needs a stable
/// key per caller: the `x-client-id` header when a gateway supplies one,
/// otherwise the peer address.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub String);

pub fn identity_from(headers: &HeaderMap, peer: Option<&ConnectInfo<SocketAddr>>) -> String {
    if let Some(id) = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return id.to_string();
    }
    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts.extensions.get::<ConnectInfo<SocketAddr>>();
        Ok(ClientIdentity(identity_from(&parts.headers, peer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_wins_over_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, HeaderValue::from_static("alice"));
        let peer = ConnectInfo("10.0.0.7:4242".parse::<SocketAddr>().unwrap());
        assert_eq!(identity_from(&headers, Some(&peer)), "alice");
    }

    #[test]
    fn falls_back_to_peer_ip() {
        let peer = ConnectInfo("10.0.0.7:4242".parse::<SocketAddr>().unwrap());
        assert_eq!(identity_from(&HeaderMap::new(), Some(&peer)), "10.0.0.7");
    }

    #[test]
    fn unknown_without_any_source() {
        assert_eq!(identity_from(&HeaderMap::new(), None), "unknown");
    }
}
