// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

const DEFAULT_LANG: &str = "en";

// Idioma da resposta, vindo do Accept-Language
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Locale {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let lang = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first() // Pega o idioma de maior prioridade (ex: "pt-BR")
                    .map(|tag| {
                        // "pt-BR" -> "pt"
                        tag.split('-').next().unwrap_or(tag.as_str()).to_lowercase()
                    })
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}
