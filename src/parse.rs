use select::{
    document::Document,
    node::Node,
    predicate::{Class, Name, Predicate},
};
use serde::Serialize;

const UNKNOWN: &str = "Unknown";
const NO_RATING: &str = "No rating";

/// One film rated by the user. All fields are kept as the raw text found in
/// the markup; the site's number formatting varies by locale so no
/// normalization happens here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Vote {
    #[serde(rename = "Film name and year")]
    pub film_name: String,
    #[serde(rename = "Number of ratings")]
    pub rating_count: String,
    #[serde(rename = "User rating")]
    pub user_rating: String,
    #[serde(rename = "Average rading")]
    pub average_rating: String,
}

/// Outcome of parsing one listing page.
#[derive(Debug)]
pub enum PageStatus {
    Listing { votes: Vec<Vote>, has_next: bool },
    MissingContainer,
    Empty,
}

type Strategy = fn(&Node) -> Option<String>;

fn text_of(item: &Node, predicate: impl Predicate) -> Option<String> {
    item.find(predicate)
        .next()
        .map(|node| node.text().trim().to_owned())
}

fn russian_title(item: &Node) -> Option<String> {
    text_of(item, Name("div").and(Class("nameRus")).descendant(Name("a")))
}

fn english_title(item: &Node) -> Option<String> {
    text_of(item, Name("div").and(Class("nameEng")).descendant(Name("a")))
}

fn rating_count(item: &Node) -> Option<String> {
    text_of(item, Name("div").and(Class("rating")).descendant(Name("span")))
}

fn user_vote(item: &Node) -> Option<String> {
    text_of(item, Name("div").and(Class("vote")))
}

fn average_rating(item: &Node) -> Option<String> {
    text_of(item, Name("div").and(Class("rating")).descendant(Name("b")))
}

fn extract(item: &Node, strategies: &[Strategy], fallback: &str) -> String {
    strategies
        .iter()
        .find_map(|strategy| strategy(item))
        .unwrap_or_else(|| fallback.to_owned())
}

impl Vote {
    fn from_node(item: &Node) -> Self {
        Self {
            film_name: extract(item, &[russian_title, english_title], UNKNOWN),
            rating_count: extract(item, &[rating_count], UNKNOWN),
            user_rating: extract(item, &[user_vote], NO_RATING),
            average_rating: extract(item, &[average_rating], NO_RATING),
        }
    }
}

pub fn page_status(source: &str) -> PageStatus {
    let document = Document::from(source);

    let container = match document
        .find(Name("div").and(Class("profileFilmsList")))
        .next()
    {
        Some(node) => node,
        None => return PageStatus::MissingContainer,
    };

    let votes = container
        .find(Name("div").and(Class("item")))
        .map(|item| Vote::from_node(&item))
        .collect::<Vec<_>>();

    if votes.is_empty() {
        return PageStatus::Empty;
    }

    let has_next = document
        .find(Name("a").and(Class("arrow")))
        .any(|anchor| anchor.text().trim() == "»");

    PageStatus::Listing { votes, has_next }
}
