use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident},
    dialect::CaseSensitiveMatch,
    renderer::{Render, Renderer},
};
use model::core::value::Value;

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.add_param(val.clone()),
            Expr::BinaryOp(op) => op.render(r),
            Expr::FunctionCall(func) => func.render(r),
            Expr::Like {
                expr,
                pattern,
                negated,
                case_insensitive,
            } => render_like(r, expr, pattern, *negated, *case_insensitive),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                if list.is_empty() {
                    // `x IN ()` is not valid SQL; an empty list matches nothing.
                    r.sql.push_str(if *negated { "(1 = 1)" } else { "(1 = 0)" });
                    return;
                }
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        r.sql.push_str(", ");
                    }
                    item.render(r);
                }
                r.sql.push_str("))");
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                subquery.render(r);
                r.sql.push_str("))");
            }
            Expr::Between {
                expr,
                low,
                high,
                negated,
            } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " NOT BETWEEN " } else { " BETWEEN " });
                low.render(r);
                r.sql.push_str(" AND ");
                high.render(r);
                r.sql.push(')');
            }
            Expr::IsNull { expr, negated } => {
                r.sql.push('(');
                expr.render(r);
                r.sql
                    .push_str(if *negated { " IS NOT NULL)" } else { " IS NULL)" });
            }
            Expr::Not(inner) => {
                r.sql.push_str("(NOT ");
                inner.render(r);
                r.sql.push(')');
            }
            Expr::Subquery(select) => {
                r.sql.push('(');
                select.render(r);
                r.sql.push(')');
            }
            Expr::Case {
                condition,
                then,
                otherwise,
            } => {
                r.sql.push_str("(CASE WHEN ");
                condition.render(r);
                r.sql.push_str(" THEN ");
                then.render(r);
                if let Some(otherwise) = otherwise {
                    r.sql.push_str(" ELSE ");
                    otherwise.render(r);
                }
                r.sql.push_str(" END)");
            }
        }
    }
}

fn render_like(r: &mut Renderer, expr: &Expr, pattern: &Expr, negated: bool, ci: bool) {
    if !ci {
        render_case_sensitive_like(r, expr, pattern, negated);
        return;
    }

    let ilike = r.dialect.supports_ilike();
    let keyword = match (negated, ilike) {
        (false, false) => " LIKE ",
        (true, false) => " NOT LIKE ",
        (false, true) => " ILIKE ",
        (true, true) => " NOT ILIKE ",
    };

    r.sql.push('(');
    wrap_lower(r, expr, !ilike);
    r.sql.push_str(keyword);
    wrap_lower(r, pattern, !ilike);
    r.sql.push(')');
}

fn render_case_sensitive_like(r: &mut Renderer, expr: &Expr, pattern: &Expr, negated: bool) {
    let not = if negated { " NOT" } else { "" };
    r.sql.push('(');
    expr.render(r);
    match (r.dialect.case_sensitive_match(), pattern) {
        (CaseSensitiveMatch::Glob, Expr::Value(Value::String(like))) => {
            r.sql.push_str(not);
            r.sql.push_str(" GLOB ");
            r.add_param(Value::String(like_to_glob(like)));
        }
        (CaseSensitiveMatch::LikeBinary, _) => {
            r.sql.push_str(not);
            r.sql.push_str(" LIKE BINARY ");
            pattern.render(r);
        }
        // Only literal patterns can be translated to GLOB.
        _ => {
            r.sql.push_str(not);
            r.sql.push_str(" LIKE ");
            pattern.render(r);
        }
    }
    r.sql.push(')');
}

/// Translates `LIKE` wildcards to `GLOB` syntax, bracketing characters that
/// `GLOB` treats as wildcards.
fn like_to_glob(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        match c {
            '%' => out.push('*'),
            '_' => out.push('?'),
            '*' | '?' | '[' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            other => out.push(other),
        }
    }
    out
}

fn wrap_lower(r: &mut Renderer, expr: &Expr, lower: bool) {
    if lower {
        r.sql.push_str("LOWER(");
        expr.render(r);
        r.sql.push(')');
    } else {
        expr.render(r);
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.sql.push_str(&r.dialect.quote_identifier(qualifier));
            r.sql.push('.');
        }
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        if self.op == BinaryOperator::Concat && r.dialect.concat_operator().is_none() {
            r.sql.push_str("CONCAT(");
            self.left.render(r);
            r.sql.push_str(", ");
            self.right.render(r);
            r.sql.push(')');
            return;
        }

        r.sql.push('(');
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
            BinaryOperator::Xor => r.dialect.xor_operator(),
            BinaryOperator::Plus => " + ",
            BinaryOperator::Minus => " - ",
            BinaryOperator::Multiply => " * ",
            BinaryOperator::Divide => " / ",
            BinaryOperator::Concat => r.dialect.concat_operator().unwrap_or(" || "),
        };
        r.sql.push_str(op_str);

        self.right.render(r);
        r.sql.push(')');
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&self.name);
        r.sql.push('(');
        if self.wildcard {
            r.sql.push('*');
        } else {
            if self.distinct {
                r.sql.push_str("DISTINCT ");
            }
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    r.sql.push_str(", ");
                }
                arg.render(r);
            }
        }
        r.sql.push(')');
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ident,
        query::{
            ast::expr::{BinaryOperator, Expr, FunctionCall},
            dialect::{MySql, Postgres, Sqlite},
            renderer::render,
        },
        value,
    };
    use model::core::value::Value;

    fn like(negated: bool, case_insensitive: bool) -> Expr {
        Expr::Like {
            expr: Box::new(ident!("name")),
            pattern: Box::new(value!(Value::String("%ac%".into()))),
            negated,
            case_insensitive,
        }
    }

    #[test]
    fn test_like_per_dialect() {
        assert_eq!(render(&like(false, true), &Postgres).0, r#"("name" ILIKE $1)"#);
        assert_eq!(render(&like(true, true), &Postgres).0, r#"("name" NOT ILIKE $1)"#);
        assert_eq!(render(&like(false, false), &Postgres).0, r#"("name" LIKE $1)"#);
        assert_eq!(render(&like(false, false), &MySql).0, "(`name` LIKE BINARY ?)");
        assert_eq!(render(&like(true, false), &MySql).0, "(`name` NOT LIKE BINARY ?)");
        assert_eq!(
            render(&like(false, true), &Sqlite).0,
            r#"(LOWER("name") LIKE LOWER(?))"#
        );
    }

    #[test]
    fn test_sqlite_case_sensitive_like_uses_glob() {
        let (sql, params) = render(&like(true, false), &Sqlite);
        assert_eq!(sql, r#"("name" NOT GLOB ?)"#);
        assert_eq!(params, vec![Value::String("*ac*".into())]);

        let expr = Expr::Like {
            expr: Box::new(ident!("name")),
            pattern: Box::new(value!(Value::String("%a_b*[c]?%".into()))),
            negated: false,
            case_insensitive: false,
        };
        let (sql, params) = render(&expr, &Sqlite);
        assert_eq!(sql, r#"("name" GLOB ?)"#);
        assert_eq!(params, vec![Value::String("*a?b[*][[]c][?]*".into())]);
    }

    #[test]
    fn test_case_expression() {
        let expr = Expr::case(
            Expr::binary(ident!("amount"), BinaryOperator::Gt, value!(Value::Int(100))),
            value!(Value::String("big".into())),
            Some(value!(Value::String("small".into()))),
        );
        let (sql, params) = render(&expr, &Postgres);
        assert_eq!(sql, r#"(CASE WHEN ("amount" > $1) THEN $2 ELSE $3 END)"#);
        assert_eq!(params.len(), 3);

        let expr = Expr::case(ident!("active"), value!(Value::Int(1)), None);
        assert_eq!(render(&expr, &MySql).0, "(CASE WHEN `active` THEN ? END)");
    }

    #[test]
    fn test_in_list_and_empty_list() {
        let expr = Expr::InList {
            expr: Box::new(ident!("id")),
            list: vec![value!(Value::Int(1)), value!(Value::Int(2))],
            negated: false,
        };
        let (sql, params) = render(&expr, &Postgres);
        assert_eq!(sql, r#"("id" IN ($1, $2))"#);
        assert_eq!(params, vec![Value::Int(1), Value::Int(2)]);

        let empty = Expr::InList {
            expr: Box::new(ident!("id")),
            list: vec![],
            negated: false,
        };
        assert_eq!(render(&empty, &Postgres), ("(1 = 0)".to_string(), vec![]));
    }

    #[test]
    fn test_between_null_and_not() {
        let between = Expr::Between {
            expr: Box::new(ident!("t", "price")),
            low: Box::new(value!(Value::Int(1))),
            high: Box::new(value!(Value::Int(9))),
            negated: true,
        };
        assert_eq!(
            render(&between, &Postgres).0,
            r#"("t"."price" NOT BETWEEN $1 AND $2)"#
        );

        let not_null = Expr::not(Expr::is_null(ident!("x"), false));
        assert_eq!(render(&not_null, &MySql).0, "(NOT (`x` IS NULL))");
    }

    #[test]
    fn test_xor_and_concat_per_dialect() {
        let xor = Expr::binary(ident!("a"), BinaryOperator::Xor, ident!("b"));
        assert_eq!(render(&xor, &Postgres).0, r#"("a" <> "b")"#);
        assert_eq!(render(&xor, &MySql).0, "(`a` XOR `b`)");

        let concat = Expr::binary(ident!("a"), BinaryOperator::Concat, ident!("b"));
        assert_eq!(render(&concat, &Sqlite).0, r#"("a" || "b")"#);
        assert_eq!(render(&concat, &MySql).0, "CONCAT(`a`, `b`)");
    }

    #[test]
    fn test_distinct_aggregate() {
        let mut call = FunctionCall::new("COUNT", vec![ident!("c", "id")]);
        call.distinct = true;
        assert_eq!(
            render(&Expr::FunctionCall(call), &Postgres).0,
            r#"COUNT(DISTINCT "c"."id")"#
        );
        assert_eq!(
            render(&Expr::FunctionCall(FunctionCall::count_star()), &Postgres).0,
            "COUNT(*)"
        );
    }
}
