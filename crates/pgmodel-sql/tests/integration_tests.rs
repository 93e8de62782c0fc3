//! Integration tests for compiling DDL into the catalog
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pgmodel-sql --test integration_tests
//! ```

mod fixtures;

use fixtures::{compiler, lenient_compiler, shop};
use pgmodel_catalog::{CatalogError, ColumnRef, ConstraintKind, DropBehaviour, TableRef};
use pgmodel_core::{Config, DiagnosticCode, Severity};
use pgmodel_sql::{CompileError, Compiler, SqlParser};
use pretty_assertions::assert_eq;
use std::path::Path;

fn constraint_names(compiler: &Compiler) -> Vec<String> {
    compiler.catalog().constraints().map(|c| c.name.clone()).collect()
}

fn public(table: &str) -> TableRef {
    TableRef::new("public", table)
}

// =============================================================================
// CREATE
// =============================================================================

#[test]
fn test_shop_model_compiles() {
    let compiler = shop();
    let catalog = compiler.catalog();

    assert_eq!(
        catalog.schema("public").unwrap().table_names(),
        vec!["users", "products", "orders", "order_items"]
    );
    assert_eq!(
        constraint_names(&compiler),
        vec![
            "users_pkey",
            "users_email_key",
            "products_pk",
            "orders_pkey",
            "orders_user_id_fkey",
            "order_items_pkey",
            "order_items_order_id_fkey",
            "order_items_sku_fkey",
        ]
    );

    let report = compiler.report();
    assert_eq!(report.summary.statements, 4);
    assert_eq!(report.summary.applied, 4);
    assert!(!report.has_errors());
}

#[test]
fn test_column_types_and_attributes() {
    let compiler = shop();
    let catalog = compiler.catalog();

    let id = catalog.column(&public("users").column("id")).unwrap();
    assert_eq!(id.data_type.name(), "BIGINT");
    assert!(id.attrs.not_null);
    assert!(id.attrs.primary_key());

    let name = catalog.column(&public("users").column("name")).unwrap();
    assert!(!name.attrs.not_null);
    assert!(!name.attrs.primary_key());

    let sku = catalog.column(&public("products").column("sku")).unwrap();
    assert_eq!(sku.data_type.name(), "VARCHAR(32)");
    assert!(sku.attrs.not_null);

    // Table-level primary key also implies NOT NULL
    assert!(catalog.column(&public("orders").column("id")).unwrap().attrs.not_null);
}

#[test]
fn test_foreign_keys_resolve_and_restrict() {
    let compiler = shop();
    let catalog = compiler.catalog();

    let fk = catalog.constraint("order_items_order_id_fkey").unwrap();
    assert_eq!(fk.kind, ConstraintKind::ForeignKey);
    assert_eq!(fk.drop_behaviour, DropBehaviour::Restrict);
    assert_eq!(fk.refers, vec![ColumnRef::new("public", "orders", "id")]);

    let pk = catalog.constraint("order_items_pkey").unwrap();
    assert_eq!(pk.drop_behaviour, DropBehaviour::Cascade);
    assert_eq!(pk.column_list(), "order_id, sku");
}

#[test]
fn test_self_reference_within_one_statement() {
    let mut compiler = compiler();
    compiler
        .compile_sql("CREATE TABLE nodes (id INT, parent_id INT REFERENCES nodes, PRIMARY KEY (id))")
        .unwrap();

    let fk = compiler.catalog().constraint("nodes_parent_id_fkey").unwrap();
    assert_eq!(fk.refers, vec![ColumnRef::new("public", "nodes", "id")]);
}

#[test]
fn test_identifier_folding() {
    let mut compiler = compiler();
    compiler
        .compile_sql(r#"CREATE TABLE "Mixed" ("Id" INT, Other INT)"#)
        .unwrap();

    let table = compiler.catalog().table(&public("Mixed")).unwrap();
    assert_eq!(table.column_names(), vec!["Id", "other"]);
}

#[test]
fn test_schemas_and_if_not_exists() {
    let mut compiler = compiler();
    let outcome = compiler
        .compile_sql(
            "CREATE SCHEMA sales;
             CREATE SCHEMA IF NOT EXISTS sales;
             CREATE TABLE sales.invoices (id INT PRIMARY KEY);
             CREATE TABLE IF NOT EXISTS sales.invoices (other INT);",
        )
        .unwrap();

    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.skipped, 2);
    assert!(outcome
        .diagnostics
        .iter()
        .all(|d| d.code == DiagnosticCode::SqlStatementSkipped && d.severity == Severity::Info));
    assert_eq!(compiler.catalog().schema_names(), vec!["public", "sales"]);
    assert_eq!(
        compiler.catalog().table(&TableRef::new("sales", "invoices")).unwrap().column_names(),
        vec!["id"]
    );
}

// =============================================================================
// ALTER
// =============================================================================

#[test]
fn test_restricted_drop_column_then_cascade() {
    let mut compiler = shop();
    let before = compiler.catalog().clone();

    let err = compiler
        .compile_sql("ALTER TABLE users DROP COLUMN id")
        .unwrap_err();
    match err {
        CompileError::Catalog(CatalogError::RestrictedByConstraint { target, constraints }) => {
            assert_eq!(target, "column public.users.id");
            assert_eq!(constraints, vec!["orders_user_id_fkey".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(compiler.catalog(), &before);

    compiler
        .compile_sql("ALTER TABLE users DROP COLUMN id CASCADE")
        .unwrap();

    assert_eq!(compiler.catalog().table(&public("users")).unwrap().column_names(), vec!["email", "name"]);
    assert!(compiler.catalog().constraint("users_pkey").is_none());
    assert!(compiler.catalog().constraint("orders_user_id_fkey").is_none());
}

#[test]
fn test_drop_constraint_then_drop_column() {
    let mut compiler = shop();
    compiler
        .compile_sql(
            "ALTER TABLE orders DROP CONSTRAINT orders_user_id_fkey;
             ALTER TABLE users DROP COLUMN id;",
        )
        .unwrap();

    let user_id = public("orders").column("user_id");
    assert!(compiler.catalog().constraints_on(&user_id).is_empty());
    assert!(compiler.catalog().column(&public("users").column("id")).is_none());
}

#[test]
fn test_drop_constraint_of_another_table() {
    let mut compiler = shop();

    let err = compiler
        .compile_sql("ALTER TABLE users DROP CONSTRAINT orders_pkey")
        .unwrap_err();

    assert!(matches!(err, CompileError::Catalog(CatalogError::UnknownConstraint(_))));
    assert!(compiler.catalog().constraint("orders_pkey").is_some());

    // IF EXISTS turns the same statement into a no-op
    let outcome = compiler
        .compile_sql("ALTER TABLE users DROP CONSTRAINT IF EXISTS orders_pkey")
        .unwrap();
    assert_eq!(outcome.skipped, 1);
}

#[test]
fn test_add_column_and_constraints() {
    let mut compiler = shop();
    compiler
        .compile_sql(
            "ALTER TABLE orders ADD COLUMN coupon VARCHAR(32) REFERENCES products (sku);
             ALTER TABLE users ADD CONSTRAINT users_name_uq UNIQUE (name);",
        )
        .unwrap();

    let catalog = compiler.catalog();
    assert_eq!(catalog.table(&public("orders")).unwrap().column_names(), vec!["id", "user_id", "coupon"]);

    let coupon_fk = catalog.constraint("orders_coupon_fkey").unwrap();
    assert_eq!(coupon_fk.refers, vec![ColumnRef::new("public", "products", "sku")]);
    assert_eq!(
        catalog
            .constraints_on(&public("products").column("sku"))
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>(),
        vec!["products_pk", "order_items_sku_fkey", "orders_coupon_fkey"]
    );
    assert_eq!(catalog.constraint("users_name_uq").unwrap().kind, ConstraintKind::Unique);
}

// =============================================================================
// DROP
// =============================================================================

#[test]
fn test_drop_table_restrict_and_cascade() {
    let mut compiler = shop();

    let err = compiler.compile_sql("DROP TABLE orders").unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::RestrictedByConstraint);
    assert!(compiler.catalog().table(&public("orders")).is_some());

    compiler.compile_sql("DROP TABLE orders CASCADE").unwrap();
    assert!(compiler.catalog().table(&public("orders")).is_none());
    assert!(compiler.catalog().constraint("order_items_order_id_fkey").is_none());
    assert!(compiler.catalog().constraint("order_items_sku_fkey").is_some());

    let outcome = compiler.compile_sql("DROP TABLE IF EXISTS orders").unwrap();
    assert_eq!(outcome.skipped, 1);
}

#[test]
fn test_drop_schema_referenced_from_outside() {
    let mut compiler = compiler();
    compiler
        .compile_sql(
            "CREATE SCHEMA sales;
             CREATE TABLE sales.invoices (id INT PRIMARY KEY);
             CREATE TABLE audit (invoice_id INT REFERENCES sales.invoices);",
        )
        .unwrap();

    let err = compiler.compile_sql("DROP SCHEMA sales").unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::RestrictedByConstraint);

    compiler.compile_sql("DROP SCHEMA sales CASCADE").unwrap();
    assert_eq!(compiler.catalog().schema_names(), vec!["public"]);
    assert!(compiler.catalog().constraints().next().is_none());
    assert!(compiler.catalog().column(&public("audit").column("invoice_id")).is_some());
}

#[test]
fn test_drop_tables_that_reference_each_other_in_one_statement() {
    let mut compiler = compiler();
    compiler
        .compile_sql(
            "CREATE TABLE a (id INT PRIMARY KEY);
             CREATE TABLE b (id INT PRIMARY KEY, a_id INT REFERENCES a);",
        )
        .unwrap();
    let before = compiler.catalog().clone();

    // a alone is still referenced by b
    let err = compiler.compile_sql("DROP TABLE a").unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::RestrictedByConstraint);
    assert_eq!(compiler.catalog(), &before);

    let outcome = compiler.compile_sql("DROP TABLE a, b").unwrap();
    assert_eq!(outcome.applied, 1);
    assert!(compiler.catalog().schema("public").unwrap().table_names().is_empty());
    assert!(compiler.catalog().constraints().next().is_none());
}

#[test]
fn test_drop_table_set_with_if_exists_skips_missing_names() {
    let mut compiler = shop();

    let err = compiler.compile_sql("DROP TABLE order_items, ghosts").unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::UnknownTable);
    assert!(compiler.catalog().table(&public("order_items")).is_some());

    compiler
        .compile_sql("DROP TABLE IF EXISTS order_items, ghosts, orders")
        .unwrap();
    assert_eq!(
        compiler.catalog().schema("public").unwrap().table_names(),
        vec!["users", "products"]
    );
}

#[test]
fn test_drop_schemas_that_reference_each_other_in_one_statement() {
    let mut compiler = compiler();
    compiler
        .compile_sql(
            "CREATE SCHEMA sales;
             CREATE SCHEMA billing;
             CREATE TABLE sales.invoices (id INT PRIMARY KEY);
             CREATE TABLE billing.payments (invoice_id INT REFERENCES sales.invoices);",
        )
        .unwrap();

    compiler.compile_sql("DROP SCHEMA sales, billing").unwrap();

    assert_eq!(compiler.catalog().schema_names(), vec!["public"]);
    assert!(compiler.catalog().constraints().next().is_none());
}

// =============================================================================
// Diagnostics and error handling
// =============================================================================

#[test]
fn test_unsupported_statements_are_skipped() {
    let mut compiler = compiler();
    let outcome = compiler
        .compile_sql("CREATE VIEW v AS SELECT 1; CREATE TABLE t (a INT);")
        .unwrap();

    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.diagnostics[0].code, DiagnosticCode::SqlUnsupportedStatement);
    assert_eq!(outcome.diagnostics[0].severity, Severity::Warn);
    assert_eq!(outcome.diagnostics[0].statement, Some(0));
}

#[test]
fn test_unsupported_statements_can_fail() {
    let mut compiler = Compiler::new(Config {
        skip_unsupported: false,
        ..Config::default()
    })
    .unwrap();

    let err = compiler.compile_sql("CREATE VIEW v AS SELECT 1").unwrap_err();
    assert!(matches!(err, CompileError::UnsupportedStatement(kind) if kind == "CREATE VIEW"));
}

#[test]
fn test_keep_going_collects_errors() {
    let mut compiler = lenient_compiler();
    let outcome = compiler
        .compile_sql(
            "CREATE TABLE a (x INT);
             CREATE TABLE a (y INT);
             CREATE TABLE b (x INT REFERENCES a);
             CREATE TABLE c (x INT);",
        )
        .unwrap();

    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.failed, 2);
    let codes: Vec<DiagnosticCode> = outcome.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::DuplicateName, DiagnosticCode::InvalidForeignKey]);
    assert!(compiler.catalog().table(&public("b")).is_none());

    let report = compiler.report();
    assert_eq!(report.summary.errors, 2);
    assert!(report.has_errors());
}

#[test]
fn test_diagnostics_carry_file_and_statement() {
    let mut compiler = lenient_compiler();
    let parsed = SqlParser::new()
        .parse(
            "CREATE TABLE t (a INT); ALTER TABLE missing ADD COLUMN b INT;",
            Some(Path::new("schema.sql")),
        )
        .unwrap();

    let outcome = compiler.compile_parsed(&parsed).unwrap();

    let diagnostic = &outcome.diagnostics[0];
    assert_eq!(diagnostic.code, DiagnosticCode::UnknownTable);
    assert_eq!(diagnostic.statement, Some(1));
    assert_eq!(diagnostic.location.as_ref().unwrap().file, "schema.sql");
    assert_eq!(diagnostic.to_string(), "error [UNKNOWN_TABLE] schema.sql (statement 2): Table not found: public.missing");
}

#[test]
fn test_parse_error_is_reported() {
    let mut compiler = compiler();

    let err = compiler.compile_sql("CREATE TABLE (").unwrap_err();

    assert!(matches!(err, CompileError::Parse(_)));
    let report = compiler.report();
    assert_eq!(report.diagnostics[0].code, DiagnosticCode::SqlParseError);
    assert!(report.has_errors());
}

#[test]
fn test_rendered_catalog() {
    let compiler = shop();
    let text = compiler.catalog().render_text();

    assert!(text.starts_with("schema public\n  table public.users\n    id BIGINT NOT NULL PRIMARY KEY\n"));
    assert!(text.contains(
        "  orders_user_id_fkey FOREIGN KEY public.orders (user_id) REFERENCES public.users (id) ON DROP RESTRICT\n"
    ));

    let json: serde_json::Value = serde_json::from_str(&compiler.catalog().to_json().unwrap()).unwrap();
    assert!(json["constraints"]["users_pkey"].is_object());
}

#[test]
fn test_fixture_project_compiles_in_order() {
    let dir = Path::new("../../fixtures/shop");

    if dir.exists() {
        let mut compiler = compiler();
        let parser = SqlParser::new();
        for file in ["01_tables.sql", "02_constraints.sql"] {
            let parsed = parser.parse_file(&dir.join(file)).unwrap();
            compiler.compile_parsed(&parsed).unwrap();
        }

        let report = compiler.report();
        assert_eq!(report.summary.statements, 6);
        assert_eq!(report.summary.applied, 4);
        // CREATE INDEX is skipped, as is the IF EXISTS drop of a missing column
        assert_eq!(report.summary.skipped, 2);
        assert_eq!(report.summary.warnings, 1);

        let fk = compiler.catalog().constraint("orders_user_fk").unwrap();
        assert_eq!(fk.refers, vec![ColumnRef::new("public", "users", "id")]);
    }
}
