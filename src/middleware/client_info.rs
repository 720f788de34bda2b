// src/middleware/client_info.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::models::activity::ClientMetadata;

// IP e User-Agent para o log de atividades
pub struct ClientInfo(pub ClientMetadata);

impl ClientInfo {
    pub fn from_headers(headers: &HeaderMap) -> ClientMetadata {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        // Atrás de proxy: o primeiro IP do x-forwarded-for é o do cliente
        let ip_address = header_str("x-forwarded-for")
            .and_then(|list| list.split(',').next())
            .map(|ip| ip.trim().to_string())
            .or_else(|| header_str("x-real-ip").map(str::to_string));

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        ClientMetadata { ip_address, user_agent }
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientInfo(ClientInfo::from_headers(&parts.headers)))
    }
}
