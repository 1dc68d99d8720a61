//! In-memory stand-ins for the MySQL store, used to drive the transfer and
//! read paths without a database.

use async_trait::async_trait;
use connectors::sql::base::error::DbError;
use engine_core::connectors::destination::{Destination, LoadSession};
use model::{
    core::value::Value,
    entity::{ActivityCount, Entreprise},
};
use planner::query::ast::{expr::Expr, insert::Insert};
use query_service::ports::{ActivityAnalytics, EntityFilter, EntityStore, Page, RankOrder};
use std::{
    collections::{BTreeMap, HashMap},
    io,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

pub type StoredRow = HashMap<String, Value>;

/// A scripted insert failure.
#[derive(Debug, Clone, Copy)]
pub struct InsertFailure {
    /// 1-based insert number within a session.
    pub on_insert: usize,
    /// Transient failures look like a MySQL deadlock, others like a
    /// rejected statement.
    pub transient: bool,
    /// How many sessions the failure fires in.
    pub times: usize,
}

impl InsertFailure {
    fn error(&self) -> DbError {
        if self.transient {
            DbError::MySqlError(mysql_async::Error::Server(mysql_async::ServerError {
                code: 1213,
                message: "Deadlock found when trying to get lock".into(),
                state: "40001".into(),
            }))
        } else {
            DbError::Write(format!("insert {} rejected", self.on_insert))
        }
    }
}

#[derive(Debug, Default)]
pub struct StoreState {
    pub rows: BTreeMap<String, StoredRow>,
    /// Row count of every insert received, committed or not.
    pub insert_sizes: Vec<usize>,
    pub sessions: usize,
    pub commits: usize,
    pub rollbacks: usize,
    pub truncations: usize,
    failure: Option<InsertFailure>,
    unreachable: bool,
    truncate_denied: bool,
}

/// Keyed by `siren`, with `INSERT IGNORE` semantics and per-session staging.
#[derive(Clone, Default)]
pub struct MemoryDestination {
    state: Arc<Mutex<StoreState>>,
    insert_delay: Option<Duration>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self, failure: InsertFailure) -> Self {
        self.lock().failure = Some(failure);
        self
    }

    /// Every `begin` fails as if the server refused the connection.
    pub fn unreachable(self) -> Self {
        self.lock().unreachable = true;
        self
    }

    /// `truncate` fails as if the user lacked the DROP privilege.
    pub fn refusing_truncate(self) -> Self {
        self.lock().truncate_denied = true;
        self
    }

    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = Some(delay);
        self
    }

    /// Seeds a committed row holding only its key.
    pub fn seed(&self, siren: &str) {
        let row = HashMap::from([("siren".to_string(), Value::from(siren))]);
        self.lock().rows.insert(siren.to_string(), row);
    }

    pub fn lock(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap()
    }

    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn row(&self, siren: &str) -> Option<StoredRow> {
        self.lock().rows.get(siren).cloned()
    }

    pub fn insert_sizes(&self) -> Vec<usize> {
        self.lock().insert_sizes.clone()
    }
}

#[async_trait]
impl Destination for MemoryDestination {
    fn name(&self) -> String {
        "memory".to_string()
    }

    async fn truncate(&self, table: &str) -> Result<(), DbError> {
        let mut state = self.lock();
        if state.truncate_denied {
            return Err(DbError::MySqlError(mysql_async::Error::Server(
                mysql_async::ServerError {
                    code: 1142,
                    message: format!("DROP command denied for table '{table}'"),
                    state: "42000".into(),
                },
            )));
        }
        state.rows.clear();
        state.truncations += 1;
        Ok(())
    }

    async fn begin(&self) -> Result<Box<dyn LoadSession>, DbError> {
        let mut state = self.lock();
        if state.unreachable {
            return Err(DbError::MySqlError(mysql_async::Error::from(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))));
        }
        state.sessions += 1;
        drop(state);
        Ok(Box::new(MemorySession {
            state: self.state.clone(),
            staged: BTreeMap::new(),
            inserts: 0,
            delay: self.insert_delay,
        }))
    }
}

struct MemorySession {
    state: Arc<Mutex<StoreState>>,
    staged: BTreeMap<String, StoredRow>,
    inserts: usize,
    delay: Option<Duration>,
}

fn key_of(row: &[Expr], key_index: usize) -> Result<String, DbError> {
    match row.get(key_index) {
        Some(Expr::Value(Value::String(s))) => Ok(s.clone()),
        other => Err(DbError::Write(format!("unusable key {other:?}"))),
    }
}

#[async_trait]
impl LoadSession for MemorySession {
    async fn execute_insert(&mut self, insert: &Insert) -> Result<u64, DbError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.inserts += 1;

        let mut state = self.state.lock().unwrap();
        state.insert_sizes.push(insert.row_count());

        if let Some(failure) = state.failure.as_mut()
            && failure.on_insert == self.inserts
            && failure.times > 0
        {
            failure.times -= 1;
            return Err(failure.error());
        }

        let key_index = insert
            .columns
            .iter()
            .position(|c| c == "siren")
            .ok_or_else(|| DbError::Write("insert without a siren column".into()))?;

        let mut affected = 0;
        for row in &insert.values {
            let key = key_of(row, key_index)?;
            if !insert.ignores_conflicts()
                && (state.rows.contains_key(&key) || self.staged.contains_key(&key))
            {
                return Err(DbError::Write(format!("duplicate key {key}")));
            }
            if state.rows.contains_key(&key) || self.staged.contains_key(&key) {
                continue;
            }

            let stored = insert
                .columns
                .iter()
                .cloned()
                .zip(row.iter().map(|e| match e {
                    Expr::Value(v) => v.clone(),
                    _ => Value::Null,
                }))
                .collect();
            self.staged.insert(key, stored);
            affected += 1;
        }

        Ok(affected)
    }

    async fn commit(self: Box<Self>) -> Result<(), DbError> {
        let mut state = self.state.lock().unwrap();
        state.rows.extend(self.staged);
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), DbError> {
        self.state.lock().unwrap().rollbacks += 1;
        Ok(())
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

#[derive(Clone, Default)]
pub struct MemoryEntityStore {
    entreprises: Vec<Entreprise>,
}

impl MemoryEntityStore {
    pub fn new(mut entreprises: Vec<Entreprise>) -> Self {
        entreprises.sort_by(|a, b| a.siren.cmp(&b.siren));
        MemoryEntityStore { entreprises }
    }
}

#[async_trait]
impl EntityStore for MemoryEntityStore {
    async fn find_by_siren(&self, siren: &str) -> Result<Option<Entreprise>, DbError> {
        Ok(self.entreprises.iter().find(|e| e.siren == siren).cloned())
    }

    async fn fetch_page(
        &self,
        filter: &EntityFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Entreprise>, DbError> {
        let matching: Vec<&Entreprise> = self
            .entreprises
            .iter()
            .filter(|e| match filter {
                EntityFilter::Activity(code) => e.activite_principale.as_deref() == Some(code),
                EntityFilter::Name(term) => {
                    contains_ignore_case(e.nom.as_deref(), term)
                        || contains_ignore_case(e.denomination.as_deref(), term)
                }
            })
            .collect();

        Ok(Page {
            total: matching.len() as u64,
            items: matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }
}

/// Aggregates the given legal units by activity code. The open flag is
/// shared so tests can observe the lifecycle after the owner drops it.
pub struct MemoryAnalytics {
    counts: Vec<ActivityCount>,
    open: Arc<AtomicBool>,
}

impl MemoryAnalytics {
    pub fn new(entreprises: &[Entreprise]) -> Self {
        let mut by_code: BTreeMap<String, u64> = BTreeMap::new();
        for code in entreprises.iter().filter_map(|e| e.activite_principale.clone()) {
            *by_code.entry(code).or_default() += 1;
        }
        let mut counts: Vec<ActivityCount> = by_code
            .into_iter()
            .map(|(code, siren_count)| ActivityCount { code, siren_count })
            .collect();
        counts.sort_by(|a, b| b.siren_count.cmp(&a.siren_count).then(a.code.cmp(&b.code)));

        MemoryAnalytics {
            counts,
            open: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn open_flag(&self) -> Arc<AtomicBool> {
        self.open.clone()
    }
}

#[async_trait]
impl ActivityAnalytics for MemoryAnalytics {
    async fn open(&mut self) -> Result<(), DbError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn count_by_activity(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Page<ActivityCount>, DbError> {
        Ok(Page {
            total: self.counts.len() as u64,
            items: self
                .counts
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }

    async fn find(&self, code: &str) -> Result<Option<ActivityCount>, DbError> {
        Ok(self.counts.iter().find(|c| c.code == code).cloned())
    }

    async fn ranked(&self, order: RankOrder, limit: u64) -> Result<Vec<ActivityCount>, DbError> {
        let mut counts = self.counts.clone();
        if order == RankOrder::LeastRepresented {
            counts.sort_by(|a, b| a.siren_count.cmp(&b.siren_count).then(a.code.cmp(&b.code)));
        }
        counts.truncate(limit as usize);
        Ok(counts)
    }
}
