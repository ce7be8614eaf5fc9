#[cfg(test)]
mod tests {
    use crate::{
        seeded_pool,
        utils::{cond, filtered_query, matching_ids, test},
    };
    use filter_compiler::CompileError;
    use model::{
        core::value::Value,
        filter::{ComparisonOp, FilterNode, LogicalOp},
    };
    use serde_json::json;
    use tracing_test::traced_test;

    // Scenario: `(a eq 1) and ((b eq 2) or (c eq 3))` over every a/b/c combination.
    // Expected Outcome: exactly the rows where the boolean formula holds.
    #[traced_test]
    #[tokio::test]
    async fn tc01() {
        let pool = seeded_pool().await;

        let filter: FilterNode = serde_json::from_value(json!({
            "logical_op": "and",
            "children": [
                {"column": "A", "op": "eq", "value": 1},
                {"logical_op": "or", "children": [
                    {"column": "B", "op": "eq", "value": 2},
                    {"column": "C", "op": "eq", "value": 3}
                ]}
            ]
        }))
        .unwrap();

        let expected: Vec<i64> = (0..8)
            .filter(|id| {
                let (a, b, c) = (id & 4 != 0, id & 2 != 0, id & 1 != 0);
                a && (b || c)
            })
            .collect();

        assert_eq!(matching_ids(&pool, "flags", &filter).await, expected);
        assert_eq!(expected, vec![5, 6, 7]);
    }

    // Scenario: the same formula written as a tagged sibling list.
    // Expected Outcome: siblings fold left to right, giving the same rows.
    #[traced_test]
    #[tokio::test]
    async fn tc02() {
        let pool = seeded_pool().await;

        let filter: FilterNode = serde_json::from_value(json!([
            {"node": {"column": "A", "op": "eq", "value": 1}},
            {"logical_op": "and", "node": [
                {"node": {"column": "B", "op": "eq", "value": 2}},
                {"logical_op": "or", "node": {"column": "C", "op": "eq", "value": 3}}
            ]}
        ]))
        .unwrap();

        assert_eq!(matching_ids(&pool, "flags", &filter).await, vec![5, 6, 7]);
    }

    // Scenario: not / xor groups over the flags table.
    // Expected Outcome: SQL three-valued logic matches the two-valued table,
    // as no flag is NULL.
    #[traced_test]
    #[tokio::test]
    async fn tc03() {
        let pool = seeded_pool().await;

        let not = FilterNode::not(vec![
            cond("A", ComparisonOp::Eq, json!(1)),
            cond("B", ComparisonOp::Eq, json!(2)),
        ]);
        assert_eq!(matching_ids(&pool, "flags", &not).await, vec![0, 1, 2, 3, 4, 5]);

        let xor = FilterNode::xor(vec![
            cond("A", ComparisonOp::Eq, json!(1)),
            cond("C", ComparisonOp::Eq, json!(3)),
        ]);
        assert_eq!(matching_ids(&pool, "flags", &xor).await, vec![1, 3, 4, 6]);
    }

    // Scenario: stored column comparisons, including like on a dialect
    // without ILIKE.
    // Expected Outcome: like respects case, and a NULL name never satisfies
    // like or nlike.
    #[traced_test]
    #[tokio::test]
    async fn tc04() {
        let pool = seeded_pool().await;

        let eq = cond("Name", ComparisonOp::Eq, json!("Globex"));
        assert_eq!(matching_ids(&pool, "customers", &eq).await, vec![2]);

        let like = cond("Name", ComparisonOp::Like, json!("acme"));
        assert!(matching_ids(&pool, "customers", &like).await.is_empty());

        let like = cond("Name", ComparisonOp::Like, json!("Acme"));
        assert_eq!(matching_ids(&pool, "customers", &like).await, vec![1, 4]);

        let nlike = cond("Name", ComparisonOp::Nlike, json!("Acme"));
        assert_eq!(matching_ids(&pool, "customers", &nlike).await, vec![2, 3, 5]);

        let nlike = cond("Name", ComparisonOp::Nlike, json!("acme"));
        assert_eq!(matching_ids(&pool, "customers", &nlike).await, vec![1, 2, 3, 4, 5]);
    }

    // Scenario: is_empty versus is_null on a stored column.
    // Expected Outcome: the empty-string row and the NULL row are told apart.
    #[traced_test]
    #[tokio::test]
    async fn tc05() {
        let pool = seeded_pool().await;

        let empty = test("Name", ComparisonOp::IsEmpty);
        assert_eq!(matching_ids(&pool, "customers", &empty).await, vec![5]);

        let null = test("Name", ComparisonOp::IsNull);
        assert_eq!(matching_ids(&pool, "customers", &null).await, vec![6]);

        let not_empty = test("Name", ComparisonOp::IsNotEmpty);
        assert_eq!(matching_ids(&pool, "customers", &not_empty).await, vec![1, 2, 3, 4]);

        let not_null = test("Name", ComparisonOp::IsNotNull);
        assert_eq!(matching_ids(&pool, "customers", &not_null).await, vec![1, 2, 3, 4, 5]);
    }

    // Scenario: nlike across a has-many link.
    // Expected Outcome: customers with no pending order, including those
    // with no orders at all. Customer 1 has a paid order but is excluded.
    #[traced_test]
    #[tokio::test]
    async fn tc06() {
        let pool = seeded_pool().await;

        let filter = cond("Orders", ComparisonOp::Nlike, json!("pend"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![2, 3, 4, 5, 6]);

        let (sql, _) = filtered_query("customers", &filter).unwrap();
        assert!(sql.contains(r#""customers"."id" NOT IN (SELECT"#));
        assert!(sql.contains(r#"("__nc0"."status" GLOB ?)"#));
    }

    // Scenario: neq across a has-many link where an unlinked order matches.
    // Expected Outcome: the orphan order's NULL key does not poison the
    // exclusion; customers without any paid order match.
    #[traced_test]
    #[tokio::test]
    async fn tc07() {
        let pool = seeded_pool().await;

        let filter = cond("Orders", ComparisonOp::Neq, json!("paid"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![3, 5, 6]);

        let filter = cond("Orders", ComparisonOp::Eq, json!("paid"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 2, 4]);
    }

    // Scenario: nbtw through a has-many lookup.
    // Expected Outcome: customers with no order amount inside the range.
    #[traced_test]
    #[tokio::test]
    async fn tc08() {
        let pool = seeded_pool().await;

        let filter = cond("Order Amounts", ComparisonOp::Nbtw, json!([50, 300]));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![3, 4, 5, 6]);

        let filter = cond("Order Amounts", ComparisonOp::Btw, json!("50,300"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 2]);
    }

    // Scenario: `Customer Name nlike 'Acme'` on orders through a belongs-to lookup.
    // Expected Outcome: orders of non-Acme customers. The orphan order has a
    // NULL key and compares as unknown.
    #[traced_test]
    #[tokio::test]
    async fn tc09() {
        let pool = seeded_pool().await;

        let filter = cond("Customer Name", ComparisonOp::Nlike, json!("Acme"));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![3]);

        let (sql, params) = filtered_query("orders", &filter).unwrap();
        assert_eq!(
            sql,
            r#"SELECT "orders"."id" FROM "orders" WHERE ("orders"."customer_id" NOT IN (SELECT "__nc0"."id" FROM "customers" AS "__nc0" WHERE ("__nc0"."name" GLOB ?))) ORDER BY "orders"."id" ASC"#
        );
        assert_eq!(params, vec![Value::String("*Acme*".into())]);
    }

    // Scenario: a two-hop lookup, orders -> customer -> region.
    // Expected Outcome: eq and its negation split the linked orders.
    #[traced_test]
    #[tokio::test]
    async fn tc10() {
        let pool = seeded_pool().await;

        let filter = cond("Customer Region", ComparisonOp::Eq, json!("US"));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![3, 4, 5]);

        let filter = cond("Customer Region", ComparisonOp::Neq, json!("US"));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![1, 2]);
    }

    // Scenario: many-to-many link filtered directly and through a lookup.
    // Expected Outcome: membership goes through the junction table.
    #[traced_test]
    #[tokio::test]
    async fn tc11() {
        let pool = seeded_pool().await;

        let filter = cond("Tags", ComparisonOp::Like, json!("vip"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 4]);

        let filter = cond("Tags", ComparisonOp::Nlike, json!("vip"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![2, 3, 5, 6]);

        let filter = cond("Customer Tags", ComparisonOp::Eq, json!("partner"));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![1, 2]);
    }

    // Scenario: presence tests on links.
    // Expected Outcome: has-many and many-to-many count related rows,
    // belongs-to checks the foreign key.
    #[traced_test]
    #[tokio::test]
    async fn tc12() {
        let pool = seeded_pool().await;

        let filter = test("Tags", ComparisonOp::IsEmpty);
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![3, 5, 6]);

        let filter = test("Orders", ComparisonOp::IsNotEmpty);
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 2, 4]);

        let filter = test("Customer", ComparisonOp::IsNull);
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![6]);

        let filter = test("Region", ComparisonOp::IsNotNull);
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 2, 4, 5]);
    }

    // Scenario: rollups compared with ordering operators.
    // Expected Outcome: SUM over no rows is NULL and never matches; COUNT
    // over no rows is zero.
    #[traced_test]
    #[tokio::test]
    async fn tc13() {
        let pool = seeded_pool().await;

        let filter = cond("Order Total", ComparisonOp::Gt, json!(200));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 4]);

        let filter = cond("Order Total", ComparisonOp::Lt, json!(200));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![2]);

        let filter = cond("Tag Count", ComparisonOp::Lte, json!(1));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![2, 3, 4, 5, 6]);
    }

    // Scenario: formulas over stored columns and a belongs-to lookup.
    // Expected Outcome: the materialised expression is compared in SQL.
    #[traced_test]
    #[tokio::test]
    async fn tc14() {
        let pool = seeded_pool().await;

        let filter = cond("Doubled", ComparisonOp::Gte, json!(200));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![1, 2, 4]);

        let filter = cond("Label", ComparisonOp::Like, json!("US)"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![2, 4]);
    }

    // Scenario: relational conditions combined in groups and chains.
    // Expected Outcome: each branch keeps its own aliases and semantics.
    #[traced_test]
    #[tokio::test]
    async fn tc15() {
        let pool = seeded_pool().await;

        let filter = FilterNode::and(vec![
            cond("Name", ComparisonOp::Like, json!("Acme")),
            FilterNode::not(vec![cond("Orders", ComparisonOp::Eq, json!("refunded"))]),
        ]);
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1]);

        let filter = FilterNode::chain(vec![
            (None, cond("Name", ComparisonOp::Like, json!("Acme"))),
            (Some(LogicalOp::Or), cond("Name", ComparisonOp::Eq, json!("Globex"))),
            (Some(LogicalOp::Not), cond("Region Name", ComparisonOp::Eq, json!("US"))),
        ]);
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1]);

        let filter = FilterNode::xor(vec![
            cond("Name", ComparisonOp::Like, json!("Acme")),
            cond("Region Name", ComparisonOp::Eq, json!("US")),
        ]);
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 2]);
    }

    // Scenario: in and between on stored columns.
    // Expected Outcome: list and range membership; delimited lists are split
    // verbatim on commas.
    #[traced_test]
    #[tokio::test]
    async fn tc16() {
        let pool = seeded_pool().await;

        let filter = cond("Amount", ComparisonOp::In, json!([20, 40]));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![5, 6]);

        let filter = cond("Status", ComparisonOp::In, json!("pending,refunded"));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![2, 4]);

        // The leading empty item matches the empty name.
        let filter = cond("Name", ComparisonOp::In, json!(",Globex"));
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![2, 5]);

        let filter = cond("Amount", ComparisonOp::Btw, json!([80, 250]));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![1, 2, 3]);

        let filter = cond("Amount", ComparisonOp::Nbtw, json!([80, 250]));
        assert_eq!(matching_ids(&pool, "orders", &filter).await, vec![4, 5, 6]);
    }

    // Scenario: filters that cannot be compiled.
    // Expected Outcome: typed errors, never a silently widened query.
    #[traced_test]
    #[tokio::test]
    async fn tc17() {
        let err = filtered_query("customers", &cond("Orders", ComparisonOp::Gt, json!(1))).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedOperator { .. }));

        let err = filtered_query("customers", &cond("Nope", ComparisonOp::Eq, json!(1))).unwrap_err();
        assert!(matches!(err, CompileError::SchemaResolution(_)));

        let err = filtered_query("customers", &FilterNode::and(vec![])).unwrap_err();
        assert!(matches!(err, CompileError::MalformedFilter(_)));
    }

    // Scenario: conditions in the legacy `is` / `isnot` form, where the value
    // names the test.
    // Expected Outcome: they behave exactly like the dedicated operators.
    #[traced_test]
    #[tokio::test]
    async fn tc18() {
        let pool = seeded_pool().await;

        let filter: FilterNode =
            serde_json::from_value(json!({"column": "Name", "op": "isnot", "value": "empty"}))
                .unwrap();
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![1, 2, 3, 4]);

        let filter: FilterNode =
            serde_json::from_value(json!({"column": "Name", "op": "is", "value": "null"})).unwrap();
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![6]);

        let filter: FilterNode =
            serde_json::from_value(json!({"column": "Orders", "op": "is", "value": "empty"}))
                .unwrap();
        assert_eq!(matching_ids(&pool, "customers", &filter).await, vec![3, 5, 6]);
    }

    // Scenario: a sibling chain mixing or and and, `a or b and c`.
    // Expected Outcome: siblings fold left to right, `(a or b) and c`,
    // rather than following SQL operator precedence.
    #[traced_test]
    #[tokio::test]
    async fn tc19() {
        let pool = seeded_pool().await;

        let filter = FilterNode::chain(vec![
            (None, cond("A", ComparisonOp::Eq, json!(1))),
            (Some(LogicalOp::Or), cond("B", ComparisonOp::Eq, json!(2))),
            (Some(LogicalOp::And), cond("C", ComparisonOp::Eq, json!(3))),
        ]);
        assert_eq!(matching_ids(&pool, "flags", &filter).await, vec![3, 5, 7]);

        let (sql, _) = filtered_query("flags", &filter).unwrap();
        assert!(sql.contains(r#"WHERE ((("flags"."a" = ?) OR ("flags"."b" = ?)) AND ("flags"."c" = ?))"#));
    }
}
