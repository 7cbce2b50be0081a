use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("scraper error: {0}")]
    Scraper(#[from] postintel_scraper::ScraperError),

    #[error("database error: {0}")]
    Db(#[from] postintel_db::DbError),

    #[error("competitor not found: {username}")]
    UnknownCompetitor { username: String },
}
