use std::time::Duration;

use anyhow::Result;
use log::{error, info};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT},
    Client,
};
use thiserror::Error;

pub mod export;
mod parse;

pub use parse::{PageStatus, Vote};

// the site serves a stub page to clients that don't look like a browser
const USER_AGENT_VALUE: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const ACCEPT_LANGUAGE_VALUE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";
const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const REFERER_VALUE: &str = "https://www.kinopoisk.ru/";

const BOT_CHECK_MARKER: &str = "captcha";

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub page_delay: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://www.kinopoisk.ru".to_owned(),
            page_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Why the page loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    BotCheck,
    MissingContainer,
    NoItems,
    LastPage,
    RequestFailed,
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::BotCheck => "bot check",
                Self::MissingContainer => "films container missing",
                Self::NoItems => "no films on page",
                Self::LastPage => "last page reached",
                Self::RequestFailed => "request failed",
            }
        )
    }
}

/// Everything one run collected, plus how far it got and why it stopped.
#[derive(Debug)]
pub struct Harvest {
    pub votes: Vec<Vote>,
    pub pages: usize,
    pub stop: StopReason,
}

#[derive(Debug, Error)]
enum PageError {
    #[error("redirected to bot check at {0}")]
    BotCheck(String),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

pub struct Kinopoisk {
    client: Client,
    config: Config,
}

impl Kinopoisk {
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_VALUE));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn page_url(&self, user_id: &str, page: usize) -> String {
        let root = format!("{}/user/{}/votes/", self.config.base_url, user_id);
        if page == 1 {
            root
        } else {
            format!("{root}list/ord/date/page/{page}/")
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, PageError> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        if response.url().as_str().contains(BOT_CHECK_MARKER) {
            return Err(PageError::BotCheck(response.url().to_string()));
        }

        Ok(response.text().await?)
    }

    /// Walks the user's votes listing page by page. Failures never lose what
    /// was already collected; the returned [`Harvest`] says why the loop
    /// ended.
    pub async fn scrape_user_votes(&self, user_id: &str) -> Harvest {
        let mut votes = Vec::new();
        let mut page = 1;

        let stop = loop {
            let url = self.page_url(user_id, page);

            let html = match self.fetch_page(&url).await {
                Ok(html) => html,
                Err(PageError::BotCheck(url)) => {
                    error!("{url}: aborting collection");
                    break StopReason::BotCheck;
                }
                Err(PageError::Request(err)) => {
                    error!("request for page {page} failed: {err}");
                    break StopReason::RequestFailed;
                }
            };

            match parse::page_status(&html) {
                PageStatus::MissingContainer => {
                    info!("films container not found on page {page}");
                    break StopReason::MissingContainer;
                }
                PageStatus::Empty => {
                    info!("no films found on page {page}");
                    break StopReason::NoItems;
                }
                PageStatus::Listing { votes: found, has_next } => {
                    info!("page {page}: found {} films", found.len());
                    votes.extend(found);

                    if !has_next {
                        break StopReason::LastPage;
                    }
                }
            }

            page += 1;
            tokio::time::sleep(self.config.page_delay).await;
        };

        Harvest { votes, pages: page, stop }
    }
}
