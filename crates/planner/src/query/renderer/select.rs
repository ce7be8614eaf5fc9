use crate::query::{
    ast::{
        common::{JoinKind, OrderDir, TableSource},
        select::{JoinClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("SELECT ");
        render_list(r, &self.columns);

        if let Some(from) = &self.from {
            r.sql.push_str(" FROM ");
            from.render(r);
        }

        for join in &self.joins {
            r.sql.push(' ');
            join.render(r);
        }

        if let Some(where_clause) = &self.where_clause {
            r.sql.push_str(" WHERE ");
            where_clause.render(r);
        }

        if !self.order_by.is_empty() {
            r.sql.push_str(" ORDER BY ");
            render_list(r, &self.order_by);
        }
    }
}

fn render_list<T: Render>(r: &mut Renderer, items: &[T]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            r.sql.push_str(", ");
        }
        item.render(r);
    }
}

impl Render for TableSource {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&r.dialect.quote_identifier(&self.table.name));
        if let Some(alias) = &self.alias {
            r.sql.push_str(" AS ");
            r.sql.push_str(&r.dialect.quote_identifier(alias));
        }
    }
}

impl Render for JoinClause {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(match self.kind {
            JoinKind::Inner => "INNER JOIN ",
            JoinKind::Left => "LEFT JOIN ",
        });
        self.source.render(r);
        r.sql.push_str(" ON ");
        self.on.render(r);
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        match self.direction {
            Some(OrderDir::Asc) => r.sql.push_str(" ASC"),
            Some(OrderDir::Desc) => r.sql.push_str(" DESC"),
            None => {}
        }
    }
}
