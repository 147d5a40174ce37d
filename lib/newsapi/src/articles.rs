//! Schema types of the `getArticles` operation.

use bytes::Bytes;
use newsapi_core::HeaderFields;
use serde::{Deserialize, Serialize};

/// Query parameters of `GET /article/getArticles`.
///
/// Unset fields are left out of the query string; list fields become
/// repeated keys (`lang=eng&lang=deu`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetArticlesQuery {
    /// API key, sent as a query parameter as well.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// What kind of result to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_type: Option<ResultType>,
    /// Page of results, starting at 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_page: Option<u32>,
    /// Articles per page (at most 100).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_count: Option<u32>,
    /// Sort order of the articles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_sort_by: Option<SortBy>,
    /// Ascending sort when `true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_sort_by_asc: Option<bool>,
    /// Characters of body to return, `-1` for the full body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_body_len: Option<i32>,
    /// Concepts the articles must mention.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub concept_uri: Vec<String>,
    /// Free-text keywords.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keyword: Vec<String>,
    /// Article languages.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lang: Vec<Language>,
    /// Include the article body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_article_body: Option<bool>,
    /// Include the links found in the article.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_article_links: Option<bool>,
}

/// Shape of the `getArticles` result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResultType {
    /// A page of articles.
    Articles,
    /// Article URIs only.
    UriWgtList,
    /// Article counts over time.
    TimeAggr,
}

/// Sort key for articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Publication date.
    Date,
    /// Relevance to the query.
    Rel,
    /// Source importance.
    SourceImportance,
    /// Number of social shares.
    SocialScore,
}

/// ISO 639-2 language codes accepted by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    Eng,
    /// German.
    Deu,
    /// French.
    Fra,
    /// Spanish.
    Spa,
    /// Italian.
    Ita,
    /// Chinese.
    Zho,
}

/// Body of a `200` response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArticlesResponse {
    /// Pagination data and the current page of results.
    pub articles: Articles,
}

/// One page of articles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Articles {
    /// Current page.
    #[serde(default)]
    pub page: u32,
    /// Total number of pages.
    #[serde(default)]
    pub pages: u32,
    /// Number of articles per page.
    #[serde(default)]
    pub count: u32,
    /// Number of matching articles.
    #[serde(default)]
    pub total_results: u64,
    /// Articles of the current page.
    #[serde(default)]
    pub results: Vec<Article>,
}

/// A news article.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct Article {
    pub uri: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub is_duplicate: bool,
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub event_uri: Option<String>,
    #[serde(default)]
    pub sentiment: Option<f64>,
    #[serde(default)]
    pub links: Vec<String>,
}

/// Publisher of an article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// Source identifier (usually its domain).
    pub uri: String,
    /// Kind of source (`news`, `blog`, ...).
    #[serde(default)]
    pub data_type: Option<String>,
    /// Display name.
    #[serde(default)]
    pub title: Option<String>,
}

/// Author of an article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Author identifier.
    #[serde(default)]
    pub uri: Option<String>,
    /// Display name.
    pub name: String,
    /// `true` for news agencies.
    #[serde(default)]
    pub is_agency: bool,
}

/// Outcome of `getArticles`.
#[derive(Debug, Clone, PartialEq)]
pub enum GetArticlesOutput {
    /// `200`: a decoded page of articles.
    Ok(ArticlesResponse),
    /// Any status without a schema; not an error.
    Undocumented {
        /// Response status code.
        status: u16,
        /// Raw response.
        payload: UndocumentedPayload,
    },
}

/// Raw content of an undocumented response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndocumentedPayload {
    /// Response header fields.
    pub headers: HeaderFields,
    /// Response body, empty when there was none.
    pub body: Bytes,
}
