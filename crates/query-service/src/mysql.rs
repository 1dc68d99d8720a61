//! MySQL implementations of the read ports.

use crate::ports::{ActivityAnalytics, EntityFilter, EntityStore, Page, RankOrder};
use async_trait::async_trait;
use chrono::NaiveDate;
use connectors::sql::{base::error::DbError, mysql::adapter::MySqlAdapter};
use model::{
    core::value::Value,
    entity::{ActivityCount, Entreprise},
};
use mysql_async::{Row, prelude::FromValue};
use planner::query::{
    ast::{
        common::{OrderDir, TableRef},
        expr::{BinaryOperator, Expr},
        select::{FromClause, OrderByExpr, Select},
    },
    dialect::MySql,
    ident,
    renderer::render,
    value,
};
use tracing::{debug, warn};

pub const UNITE_LEGALE: &str = "unite_legale";
const ACTIVITY: &str = "activite_principale_unite_legale";
const SIREN_COUNT: &str = "siren_count";

const ENTREPRISE_COLUMNS: [&str; 12] = [
    "siren",
    "nom_unite_legale",
    "denomination_unite_legale",
    "sigle_unite_legale",
    "date_creation_unite_legale",
    "activite_principale_unite_legale",
    "nomenclature_activite_principale_unite_legale",
    "tranche_effectifs_unite_legale",
    "categorie_juridique_unite_legale",
    "categorie_entreprise",
    "economie_sociale_solidaire_unite_legale",
    "caractere_employeur_unite_legale",
];

fn from_table() -> Option<FromClause> {
    Some(FromClause {
        table: TableRef::new(UNITE_LEGALE),
        alias: None,
    })
}

/// Escapes LIKE wildcards so the term matches literally, then wraps it for
/// a substring match.
pub fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// WHERE clause of a listing. Name matching relies on the table's
/// case-insensitive collation.
pub fn filter_expr(filter: &EntityFilter) -> Expr {
    match filter {
        EntityFilter::Activity(code) => Expr::binary(
            ident(ACTIVITY),
            BinaryOperator::Eq,
            value(Value::String(code.clone())),
        ),
        EntityFilter::Name(term) => {
            let pattern = contains_pattern(term);
            Expr::binary(
                Expr::binary(
                    ident("nom_unite_legale"),
                    BinaryOperator::Like,
                    value(Value::String(pattern.clone())),
                ),
                BinaryOperator::Or,
                Expr::binary(
                    ident("denomination_unite_legale"),
                    BinaryOperator::Like,
                    value(Value::String(pattern)),
                ),
            )
        }
    }
}

pub fn page_query(filter: &EntityFilter, offset: u64, limit: u64) -> Select {
    Select {
        columns: ENTREPRISE_COLUMNS.iter().map(|c| ident(c)).collect(),
        from: from_table(),
        where_clause: Some(filter_expr(filter)),
        order_by: vec![OrderByExpr {
            expr: ident("siren"),
            direction: Some(OrderDir::Asc),
        }],
        limit: Some(value(Value::Uint(limit))),
        offset: Some(value(Value::Uint(offset))),
        ..Default::default()
    }
}

pub fn count_query(filter: &EntityFilter) -> Select {
    Select {
        columns: vec![Expr::count_star()],
        from: from_table(),
        where_clause: Some(filter_expr(filter)),
        ..Default::default()
    }
}

fn column<T: FromValue>(row: &mut Row, name: &str) -> Result<T, DbError> {
    match row.take_opt::<T, _>(name) {
        Some(Ok(v)) => Ok(v),
        Some(Err(e)) => Err(DbError::Decode(format!("column `{name}`: {e:?}"))),
        None => Err(DbError::Decode(format!("missing column `{name}`"))),
    }
}

/// Zero or otherwise invalid dates stored by a lenient insert read as NULL.
fn date_column(row: &mut Row, name: &str) -> Option<NaiveDate> {
    match row.take_opt::<Option<NaiveDate>, _>(name) {
        Some(Ok(date)) => date,
        Some(Err(e)) => {
            warn!(column = name, value = ?e, "Unreadable date, treated as NULL");
            None
        }
        None => None,
    }
}

fn entreprise_from_row(mut row: Row) -> Result<Entreprise, DbError> {
    Ok(Entreprise {
        siren: column(&mut row, "siren")?,
        nom: column(&mut row, "nom_unite_legale")?,
        denomination: column(&mut row, "denomination_unite_legale")?,
        sigle: column(&mut row, "sigle_unite_legale")?,
        date_creation: date_column(&mut row, "date_creation_unite_legale"),
        activite_principale: column(&mut row, ACTIVITY)?,
        nomenclature_activite: column(&mut row, "nomenclature_activite_principale_unite_legale")?,
        tranche_effectifs: column(&mut row, "tranche_effectifs_unite_legale")?,
        categorie_juridique: column(&mut row, "categorie_juridique_unite_legale")?,
        categorie_entreprise: column(&mut row, "categorie_entreprise")?,
        economie_sociale_solidaire: column(&mut row, "economie_sociale_solidaire_unite_legale")?,
        caractere_employeur: column(&mut row, "caractere_employeur_unite_legale")?,
    })
}

#[derive(Clone)]
pub struct MySqlEntityStore {
    adapter: MySqlAdapter,
}

impl MySqlEntityStore {
    pub fn new(adapter: MySqlAdapter) -> Self {
        MySqlEntityStore { adapter }
    }
}

#[async_trait]
impl EntityStore for MySqlEntityStore {
    async fn find_by_siren(&self, siren: &str) -> Result<Option<Entreprise>, DbError> {
        let query = Select {
            columns: ENTREPRISE_COLUMNS.iter().map(|c| ident(c)).collect(),
            from: from_table(),
            where_clause: Some(Expr::binary(
                ident("siren"),
                BinaryOperator::Eq,
                value(Value::String(siren.to_string())),
            )),
            limit: Some(value(Value::Uint(1))),
            ..Default::default()
        };
        let (sql, params) = render(&query, &MySql);
        let rows = self.adapter.query_rows(&sql, &params).await?;
        rows.into_iter().next().map(entreprise_from_row).transpose()
    }

    async fn fetch_page(
        &self,
        filter: &EntityFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Page<Entreprise>, DbError> {
        let (count_sql, count_params) = render(&count_query(filter), &MySql);
        let total = self.adapter.query_count(&count_sql, &count_params).await?;

        // Nothing past the end; skip the second round-trip.
        if offset >= total {
            return Ok(Page {
                items: Vec::new(),
                total,
            });
        }

        let (sql, params) = render(&page_query(filter, offset, limit), &MySql);
        let items = self
            .adapter
            .query_rows(&sql, &params)
            .await?
            .into_iter()
            .map(entreprise_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page { items, total })
    }
}

fn not_null_activity() -> Expr {
    Expr::IsNotNull(Box::new(ident(ACTIVITY)))
}

/// `code, COUNT(*) AS siren_count ... GROUP BY code`, the aggregate view
/// every analytics query starts from.
pub fn aggregate_query(where_clause: Expr, direction: OrderDir) -> Select {
    Select {
        columns: vec![ident(ACTIVITY), Expr::count_star().alias(SIREN_COUNT)],
        from: from_table(),
        where_clause: Some(where_clause),
        group_by: vec![ident(ACTIVITY)],
        order_by: vec![
            OrderByExpr {
                expr: ident(SIREN_COUNT),
                direction: Some(direction),
            },
            OrderByExpr {
                expr: ident(ACTIVITY),
                direction: Some(OrderDir::Asc),
            },
        ],
        ..Default::default()
    }
}

fn count_from_row(mut row: Row) -> Result<ActivityCount, DbError> {
    Ok(ActivityCount {
        code: column(&mut row, ACTIVITY)?,
        siren_count: column(&mut row, SIREN_COUNT)?,
    })
}

/// Per-activity counts computed with `GROUP BY` over the loaded table.
///
/// Holds no connection until [`open`](ActivityAnalytics::open).
pub struct MySqlActivityAnalytics {
    url: String,
    adapter: Option<MySqlAdapter>,
}

impl MySqlActivityAnalytics {
    pub fn new(url: impl Into<String>) -> Self {
        MySqlActivityAnalytics {
            url: url.into(),
            adapter: None,
        }
    }

    fn adapter(&self) -> Result<&MySqlAdapter, DbError> {
        self.adapter
            .as_ref()
            .ok_or_else(|| DbError::Unknown("analytics client is not open".into()))
    }

    async fn fetch_counts(&self, query: Select) -> Result<Vec<ActivityCount>, DbError> {
        let (sql, params) = render(&query, &MySql);
        self.adapter()?
            .query_rows(&sql, &params)
            .await?
            .into_iter()
            .map(count_from_row)
            .collect()
    }
}

#[async_trait]
impl ActivityAnalytics for MySqlActivityAnalytics {
    async fn open(&mut self) -> Result<(), DbError> {
        if self.adapter.is_none() {
            let adapter = MySqlAdapter::connect(&self.url).await?;
            adapter.ping().await?;
            self.adapter = Some(adapter);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<(), DbError> {
        if let Some(adapter) = self.adapter.take() {
            adapter.disconnect().await?;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.adapter.is_some()
    }

    async fn count_by_activity(
        &self,
        offset: u64,
        limit: u64,
    ) -> Result<Page<ActivityCount>, DbError> {
        let count = Select {
            columns: vec![Expr::count_distinct(ident(ACTIVITY))],
            from: from_table(),
            where_clause: Some(not_null_activity()),
            ..Default::default()
        };
        let (count_sql, count_params) = render(&count, &MySql);
        let total = self.adapter()?.query_count(&count_sql, &count_params).await?;

        let mut query = aggregate_query(not_null_activity(), OrderDir::Desc);
        query.limit = Some(value(Value::Uint(limit)));
        query.offset = Some(value(Value::Uint(offset)));
        let items = self.fetch_counts(query).await?;
        debug!(total, returned = items.len(), "Activity counts fetched");

        Ok(Page { items, total })
    }

    async fn find(&self, code: &str) -> Result<Option<ActivityCount>, DbError> {
        let query = aggregate_query(
            Expr::binary(
                ident(ACTIVITY),
                BinaryOperator::Eq,
                value(Value::String(code.to_string())),
            ),
            OrderDir::Desc,
        );
        Ok(self.fetch_counts(query).await?.into_iter().next())
    }

    async fn ranked(&self, order: RankOrder, limit: u64) -> Result<Vec<ActivityCount>, DbError> {
        let direction = match order {
            RankOrder::MostRepresented => OrderDir::Desc,
            RankOrder::LeastRepresented => OrderDir::Asc,
        };
        let mut query = aggregate_query(not_null_activity(), direction);
        query.limit = Some(value(Value::Uint(limit)));
        self.fetch_counts(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("dupont"), "%dupont%");
        assert_eq!(contains_pattern("100%_bio"), "%100\\%\\_bio%");
    }

    #[test]
    fn test_name_search_sql() {
        let (sql, params) = render(
            &page_query(&EntityFilter::Name("poste".into()), 40, 20),
            &MySql,
        );
        assert!(sql.starts_with("SELECT `siren`, `nom_unite_legale`"));
        assert!(sql.ends_with(
            "WHERE ((`nom_unite_legale` LIKE ?) OR (`denomination_unite_legale` LIKE ?)) \
             ORDER BY `siren` ASC LIMIT ? OFFSET ?"
        ));
        assert_eq!(
            params,
            vec![
                Value::String("%poste%".into()),
                Value::String("%poste%".into()),
                Value::Uint(20),
                Value::Uint(40),
            ]
        );
    }

    #[test]
    fn test_activity_count_sql() {
        let (sql, params) = render(&count_query(&EntityFilter::Activity("62.01Z".into())), &MySql);
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM `unite_legale` WHERE (`activite_principale_unite_legale` = ?)"
        );
        assert_eq!(params, vec![Value::String("62.01Z".into())]);
    }

    #[test]
    fn test_aggregate_sql() {
        let mut query = aggregate_query(not_null_activity(), OrderDir::Asc);
        query.limit = Some(value(Value::Uint(10)));
        let (sql, _) = render(&query, &MySql);
        assert_eq!(
            sql,
            "SELECT `activite_principale_unite_legale`, COUNT(*) AS `siren_count` \
             FROM `unite_legale` WHERE `activite_principale_unite_legale` IS NOT NULL \
             GROUP BY `activite_principale_unite_legale` \
             ORDER BY `siren_count` ASC, `activite_principale_unite_legale` ASC LIMIT ?"
        );
    }

    #[test]
    fn test_analytics_starts_closed() {
        let analytics = MySqlActivityAnalytics::new("mysql://sirenuser@localhost:3306/siren");
        assert!(!analytics.is_open());
    }
}
