use crate::query::{
    ast::{
        common::OrderDir,
        select::{FromClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        // 1. SELECT clause
        r.sql.push_str("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        // 2. FROM
        if let Some(from) = &self.from {
            r.sql.push(' ');
            from.render(r);
        }

        // 3. WHERE
        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        // 4. GROUP BY
        if !self.group_by.is_empty() {
            r.sql.push_str(" GROUP BY ");
            for (i, expr) in self.group_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                expr.render(r);
            }
        }

        // 5. ORDER BY
        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                order.render(r);
            }
        }

        // 6. LIMIT
        if let Some(limit) = &self.limit {
            r.sql.push_str(" LIMIT ");
            limit.render(r);
        }

        // 7. OFFSET
        if let Some(offset) = &self.offset {
            r.sql.push_str(" OFFSET ");
            offset.render(r);
        }
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("FROM ");
        r.render_table_ref(&self.table);
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            let dir_str = match dir {
                OrderDir::Asc => "ASC",
                OrderDir::Desc => "DESC",
            };
            r.sql.push(' ');
            r.sql.push_str(dir_str);
        }
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::query::{
        ast::{
            common::{OrderDir, TableRef},
            expr::{BinaryOperator, Expr},
            select::{FromClause, OrderByExpr, Select},
        },
        dialect::MySql,
        ident,
        renderer::render,
    };

    #[test]
    fn test_render_paged_filtered_select() {
        let ast = Select {
            columns: vec![ident("siren"), ident("nom_unite_legale")],
            from: Some(FromClause {
                table: TableRef::new("unite_legale"),
                alias: None,
            }),
            where_clause: Some(Expr::binary(
                Expr::binary(
                    ident("nom_unite_legale"),
                    BinaryOperator::Like,
                    Expr::Value(Value::String("%dupont%".into())),
                ),
                BinaryOperator::Or,
                Expr::binary(
                    ident("denomination_unite_legale"),
                    BinaryOperator::Like,
                    Expr::Value(Value::String("%dupont%".into())),
                ),
            )),
            order_by: vec![OrderByExpr {
                expr: ident("siren"),
                direction: Some(OrderDir::Asc),
            }],
            limit: Some(Expr::Value(Value::Uint(20))),
            offset: Some(Expr::Value(Value::Uint(40))),
            ..Default::default()
        };

        let (sql, params) = render(&ast, &MySql);

        assert_eq!(
            sql,
            concat!(
                "SELECT `siren`, `nom_unite_legale` FROM `unite_legale` ",
                "WHERE ((`nom_unite_legale` LIKE ?) OR (`denomination_unite_legale` LIKE ?)) ",
                "ORDER BY `siren` ASC LIMIT ? OFFSET ?"
            )
        );
        assert_eq!(params.len(), 4);
        assert_eq!(params[2], Value::Uint(20));
        assert_eq!(params[3], Value::Uint(40));
    }

    #[test]
    fn test_render_group_by_count() {
        let ast = Select {
            columns: vec![
                ident("activite_principale_unite_legale"),
                Expr::count_star().alias("siren_count"),
            ],
            from: Some(FromClause {
                table: TableRef::new("unite_legale"),
                alias: None,
            }),
            where_clause: Some(Expr::IsNotNull(Box::new(ident(
                "activite_principale_unite_legale",
            )))),
            group_by: vec![ident("activite_principale_unite_legale")],
            order_by: vec![OrderByExpr {
                expr: ident("siren_count"),
                direction: Some(OrderDir::Desc),
            }],
            ..Default::default()
        };

        let (sql, params) = render(&ast, &MySql);

        assert_eq!(
            sql,
            concat!(
                "SELECT `activite_principale_unite_legale`, COUNT(*) AS `siren_count` ",
                "FROM `unite_legale` WHERE `activite_principale_unite_legale` IS NOT NULL ",
                "GROUP BY `activite_principale_unite_legale` ORDER BY `siren_count` DESC"
            )
        );
        assert!(params.is_empty());
    }
}
