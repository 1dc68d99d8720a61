use crate::{
    error::QueryError,
    jsonld::{AggregateRating, Organization},
    ports::{ActivityAnalytics, EntityFilter, EntityStore, RankOrder},
    view::{self, CollectionView},
};
use model::pagination::page::{MAX_PAGE_LIMIT, PageRequest};
use planner::pagination::plan;
use tracing::{debug, info};

pub const SIREN_LEN: usize = 9;
pub const MIN_SEARCH_LEN: usize = 3;

pub fn validate_siren(siren: &str) -> Result<(), QueryError> {
    if siren.len() == SIREN_LEN && siren.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(QueryError::InvalidSiren(siren.to_string()))
    }
}

/// Lookups and listings over stored legal units.
pub struct EntrepriseService<S> {
    store: S,
}

impl<S: EntityStore> EntrepriseService<S> {
    pub fn new(store: S) -> Self {
        EntrepriseService { store }
    }

    pub async fn get_by_siren(&self, siren: &str) -> Result<Organization, QueryError> {
        validate_siren(siren)?;
        let entreprise = self
            .store
            .find_by_siren(siren)
            .await?
            .ok_or_else(|| QueryError::NotFound(format!("Entreprise {siren} not found")))?;
        Ok(Organization::document(&entreprise))
    }

    /// `base_url` is the collection URL the page links are built on.
    pub async fn list_by_activity(
        &self,
        code: &str,
        page: PageRequest,
        base_url: &str,
    ) -> Result<CollectionView<Organization>, QueryError> {
        self.list(EntityFilter::Activity(code.to_string()), page, base_url)
            .await
    }

    pub async fn search_by_name(
        &self,
        term: &str,
        page: PageRequest,
        base_url: &str,
    ) -> Result<CollectionView<Organization>, QueryError> {
        if term.chars().count() < MIN_SEARCH_LEN {
            return Err(QueryError::InvalidSearchTerm {
                term: term.to_string(),
                min: MIN_SEARCH_LEN,
            });
        }
        self.list(EntityFilter::Name(term.to_string()), page, base_url)
            .await
    }

    async fn list(
        &self,
        filter: EntityFilter,
        page: PageRequest,
        base_url: &str,
    ) -> Result<CollectionView<Organization>, QueryError> {
        let result = self
            .store
            .fetch_page(&filter, page.offset(), page.limit())
            .await?;
        debug!(?filter, page = page.page(), total = result.total, "Listing fetched");

        let items = result.items.iter().map(Organization::item).collect();
        Ok(view::build(
            items,
            result.total,
            plan(&page, result.total, base_url),
        ))
    }
}

/// Statistics over the per-activity aggregate.
///
/// Owns its analytics client: [`start`](Self::start) opens it and
/// [`stop`](Self::stop) closes it.
pub struct StatsService<A> {
    analytics: A,
}

impl<A: ActivityAnalytics> StatsService<A> {
    pub async fn start(mut analytics: A) -> Result<Self, QueryError> {
        analytics.open().await?;
        info!("Analytics client opened");
        Ok(StatsService { analytics })
    }

    pub async fn stop(mut self) -> Result<(), QueryError> {
        self.analytics.close().await?;
        info!("Analytics client closed");
        Ok(())
    }

    pub async fn count_by_activity(
        &self,
        page: PageRequest,
        base_url: &str,
    ) -> Result<CollectionView<AggregateRating>, QueryError> {
        self.ensure_open()?;
        let result = self
            .analytics
            .count_by_activity(page.offset(), page.limit())
            .await?;

        let items = result.items.iter().map(AggregateRating::item).collect();
        Ok(view::build(
            items,
            result.total,
            plan(&page, result.total, base_url),
        ))
    }

    pub async fn filter_by_activity(&self, code: &str) -> Result<AggregateRating, QueryError> {
        self.ensure_open()?;
        let count = self.analytics.find(code).await?.ok_or_else(|| {
            QueryError::NotFound(format!("No data found for activity code: {code}"))
        })?;
        Ok(AggregateRating::document(&count))
    }

    pub async fn top(&self, limit: u64) -> Result<CollectionView<AggregateRating>, QueryError> {
        self.ranked(RankOrder::MostRepresented, limit).await
    }

    pub async fn bottom(&self, limit: u64) -> Result<CollectionView<AggregateRating>, QueryError> {
        self.ranked(RankOrder::LeastRepresented, limit).await
    }

    async fn ranked(
        &self,
        order: RankOrder,
        limit: u64,
    ) -> Result<CollectionView<AggregateRating>, QueryError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(QueryError::InvalidLimit {
                limit,
                max: MAX_PAGE_LIMIT,
            });
        }
        self.ensure_open()?;

        let counts = self.analytics.ranked(order, limit).await?;
        Ok(view::unpaged(
            counts.iter().map(AggregateRating::item).collect(),
        ))
    }

    fn ensure_open(&self) -> Result<(), QueryError> {
        if self.analytics.is_open() {
            Ok(())
        } else {
            Err(QueryError::AnalyticsClosed)
        }
    }
}
