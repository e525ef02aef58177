// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::common::i18n::DEFAULT_LANG;

// Extrator de idioma: primeira tag do Accept-Language, sem a região.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl Locale {
    pub fn from_header(raw: Option<&str>) -> Self {
        raw.and_then(|header_str| {
            accept_language::parse(header_str)
                .first()
                // "pt-BR" -> "pt", "en" -> "en"
                .map(|tag| tag.split('-').next().unwrap_or(tag).to_ascii_lowercase())
        })
        .map(Locale)
        .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(Locale::from_header(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_is_dropped_and_missing_header_falls_back() {
        assert_eq!(Locale::from_header(Some("pt-BR,pt;q=0.9,en;q=0.8")).0, "pt");
        assert_eq!(Locale::from_header(Some("en")).0, "en");
        assert_eq!(Locale::from_header(None).0, DEFAULT_LANG);
    }
}
