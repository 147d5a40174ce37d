//! Payload encoding helpers used by typed operations.

use crate::Result;

/// Serialize a value to a query string.
///
/// Uses `serde_html_form`, so `Vec<T>` fields become repeated parameters
/// (e.g., `lang=eng&lang=deu`) and `None` fields marked with
/// `skip_serializing_if` disappear.
///
/// # Errors
///
/// Returns an error if query serialization fails.
///
/// # Example
///
/// ```
/// use newsapi_core::to_query_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Search {
///     keyword: String,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     page: Option<u32>,
/// }
///
/// let search = Search { keyword: "rust".to_string(), page: Some(1) };
/// let query = to_query_string(&search).expect("serialize");
/// assert_eq!(query, "keyword=rust&page=1");
/// ```
pub fn to_query_string<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_html_form::to_string(value).map_err(Into::into)
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` so the error names the exact field that failed
/// (e.g., `articles.results[3].date`).
///
/// # Errors
///
/// Returns [`crate::Error::JsonDeserialization`] if the payload does not match.
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_query_string_with_repeated_values() {
        #[derive(serde::Serialize)]
        struct Filter {
            lang: Vec<&'static str>,
            #[serde(skip_serializing_if = "Option::is_none")]
            page: Option<u32>,
        }

        let query = to_query_string(&Filter {
            lang: vec!["eng", "deu"],
            page: None,
        })
        .expect("serialize");
        assert_eq!(query, "lang=eng&lang=deu");
    }

    #[test]
    fn from_json_deserialize() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Source {
            uri: String,
        }

        let source: Source = from_json(br#"{"uri":"bbc.co.uk"}"#).expect("deserialize");
        assert_eq!(
            source,
            Source {
                uri: "bbc.co.uk".to_string()
            }
        );
    }

    #[test]
    fn from_json_reports_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Page {
            #[allow(dead_code)]
            page: u32,
        }

        #[derive(Debug, serde::Deserialize)]
        struct Envelope {
            #[allow(dead_code)]
            articles: Page,
        }

        let err = from_json::<Envelope>(br#"{"articles":{"page":"one"}}"#).expect_err("type mismatch");
        let msg = err.to_string();
        assert!(msg.contains("articles.page"), "unexpected message: {msg}");
    }
}
