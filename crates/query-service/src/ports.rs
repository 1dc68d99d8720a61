use async_trait::async_trait;
use connectors::sql::base::error::DbError;
use model::entity::{ActivityCount, Entreprise};

/// Which legal units a paged listing selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityFilter {
    /// Main activity code equal to the given code.
    Activity(String),
    /// Case-insensitive substring of the person name or the legal name.
    Name(String),
}

/// One page of a filtered listing plus the size of the whole listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    MostRepresented,
    LeastRepresented,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn find_by_siren(&self, siren: &str) -> Result<Option<Entreprise>, DbError>;

    async fn fetch_page(
        &self,
        filter: &EntityFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Entreprise>, DbError>;
}

/// Client of the per-activity aggregate view.
///
/// Must be opened before use and closed when the owner shuts down.
#[async_trait]
pub trait ActivityAnalytics: Send + Sync {
    async fn open(&mut self) -> Result<(), DbError>;

    async fn close(&mut self) -> Result<(), DbError>;

    fn is_open(&self) -> bool;

    /// Counts per activity code, largest first, NULL codes excluded.
    async fn count_by_activity(&self, offset: u64, limit: u64)
    -> Result<Page<ActivityCount>, DbError>;

    async fn find(&self, code: &str) -> Result<Option<ActivityCount>, DbError>;

    async fn ranked(&self, order: RankOrder, limit: u64) -> Result<Vec<ActivityCount>, DbError>;
}
