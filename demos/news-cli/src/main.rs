//! News CLI
//!
//! Fetches the latest English articles about Isaac Newton. The API key is
//! read from `NEWSAPI_KEY`; set `RUST_LOG=newsapi=info` to see the exchange.

#![allow(clippy::print_stdout)]

use newsapi::middleware::{AuthenticationMiddleware, LoggingMiddleware};
use newsapi::prelude::*;
use newsapi::url::Url;
use tracing_subscriber::EnvFilter;

const API_KEY_VAR: &str = "NEWSAPI_KEY";
const NEWTON: &str = "https://en.wikipedia.org/wiki/Isaac_Newton";

fn newton_query(api_key: &str) -> GetArticlesQuery {
    GetArticlesQuery {
        api_key: Some(api_key.to_string()),
        result_type: Some(ResultType::Articles),
        articles_page: Some(1),
        articles_count: Some(20),
        articles_sort_by: Some(SortBy::Date),
        articles_sort_by_asc: Some(false),
        article_body_len: Some(-1),
        concept_uri: vec![NEWTON.to_string()],
        lang: vec![Language::Eng],
        include_article_body: Some(false),
        include_article_links: Some(true),
        ..GetArticlesQuery::default()
    }
}

fn build_client(server_url: Url, api_key: &str) -> Result<NewsClient> {
    NewsClient::builder()
        .server_url(server_url)
        .middleware(AuthenticationMiddleware::new(api_key))
        .middleware(LoggingMiddleware::new().with_logging_policy(LoggingPolicy::FULL))
        .build()
}

fn render(output: &GetArticlesOutput) -> String {
    match output {
        GetArticlesOutput::Ok(page) => {
            let articles = &page.articles;
            let mut lines = vec![format!(
                "Pagination: page {} of {} ({} results)",
                articles.page, articles.pages, articles.total_results
            )];
            for article in &articles.results {
                let title = article.title.as_deref().unwrap_or("<untitled>");
                let source = article
                    .source
                    .as_ref()
                    .and_then(|source| source.title.as_deref())
                    .unwrap_or("unknown source");
                lines.push(format!("- {title} ({source})"));
            }
            lines.join("\n")
        }
        GetArticlesOutput::Undocumented { status, .. } => format!("error: {status}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("newsapi=info")),
        )
        .init();

    let Ok(api_key) = std::env::var(API_KEY_VAR) else {
        tracing::error!("{API_KEY_VAR} is not set");
        return Err(Error::invalid_request(format!("{API_KEY_VAR} is not set")));
    };

    let server_url = newsapi::servers::server1()?;
    println!("{server_url}");

    let client = build_client(server_url, &api_key)?;
    let output = client.get_articles(&newton_query(&api_key)).await?;
    println!("{}", render(&output));

    Ok(())
}
