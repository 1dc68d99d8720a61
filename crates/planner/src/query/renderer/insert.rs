use crate::query::{
    ast::insert::Insert,
    renderer::{Render, Renderer},
};

impl Render for Insert {
    fn render(&self, r: &mut Renderer) {
        // 1. INSERT [IGNORE] INTO table (...)
        r.sql.push_str(r.dialect.insert_prefix(self.on_conflict));
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");
        let quoted_columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| r.dialect.quote_identifier(c))
            .collect();
        r.sql.push_str(&quoted_columns.join(", "));
        r.sql.push(')');

        // 2. VALUES (...), (...)
        if !self.values.is_empty() {
            render_values(self, r);
        }
    }
}

fn render_values(insert: &Insert, r: &mut Renderer) {
    r.sql.push_str(" VALUES ");
    for (i, row) in insert.values.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        r.sql.push('(');
        for (j, val) in row.iter().enumerate() {
            if j > 0 {
                r.sql.push_str(", ");
            }
            val.render(r);
        }
        r.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use model::core::value::Value;

    use crate::query::{
        ast::{
            common::TableRef,
            expr::Expr,
            insert::{ConflictAction, Insert},
        },
        dialect::MySql,
        renderer::render,
    };

    #[test]
    fn test_render_batch_insert_ignore_mysql() {
        let ast = Insert {
            table: TableRef::new("unite_legale"),
            columns: vec!["siren".to_string(), "sigle_unite_legale".to_string()],
            values: vec![
                vec![
                    Expr::Value(Value::String("000325175".to_string())),
                    Expr::Value(Value::Null),
                ],
                vec![
                    Expr::Value(Value::String("005880596".to_string())),
                    Expr::Value(Value::String("GEP".to_string())),
                ],
            ],
            on_conflict: Some(ConflictAction::Ignore),
        };

        let (sql, params) = render(&ast, &MySql);

        assert_eq!(
            sql,
            "INSERT IGNORE INTO `unite_legale` (`siren`, `sigle_unite_legale`) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(
            params,
            vec![
                Value::String("000325175".to_string()),
                Value::Null,
                Value::String("005880596".to_string()),
                Value::String("GEP".to_string()),
            ]
        );
    }

    #[test]
    fn test_render_plain_insert_with_schema() {
        let ast = Insert {
            table: TableRef {
                schema: Some("siren".to_string()),
                name: "unite_legale".to_string(),
            },
            columns: vec!["siren".to_string()],
            values: vec![vec![Expr::Value(Value::String("000325175".to_string()))]],
            on_conflict: None,
        };

        let (sql, params) = render(&ast, &MySql);

        assert_eq!(sql, "INSERT INTO `siren`.`unite_legale` (`siren`) VALUES (?)");
        assert_eq!(params.len(), 1);
        assert!(!ast.ignores_conflicts());
    }
}
