use anyhow::{Context, Result};
use log::{info, warn};

use kinopoisk_ratings::{export, Config, Kinopoisk};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let user_id = std::env::args()
        .nth(1)
        .context("usage: kinopoisk-ratings <user-id>")?;

    info!("collecting ratings for user {user_id}");
    let kinopoisk = Kinopoisk::new(Config::default())?;
    let harvest = kinopoisk.scrape_user_votes(&user_id).await;

    if harvest.votes.is_empty() {
        warn!(
            "no ratings collected ({} after {} pages); check the user id and that the profile is reachable",
            harvest.stop, harvest.pages,
        );
        return Ok(());
    }

    info!(
        "collected {} ratings over {} pages ({})",
        harvest.votes.len(),
        harvest.pages,
        harvest.stop,
    );

    export::to_csv(&harvest.votes, "kinopoisk_ratings.csv")?;
    export::to_xlsx(&harvest.votes, "kinopoisk_ratings.xlsx")?;

    Ok(())
}
