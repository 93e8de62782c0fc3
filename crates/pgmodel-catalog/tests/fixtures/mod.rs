//! Test fixtures for catalog integration tests
//!
//! Reusable table shapes modelled on a small shop schema:
//! users <- orders <- order_items -> products

#![allow(dead_code)]

use pgmodel_catalog::{Catalog, Column, ColumnType, Constraint, DropBehaviour, Table, TableRef};

/// Build a detached table with the given `(name, type)` columns
pub fn table(schema: &str, name: &str, columns: &[(&str, &str)]) -> Table {
    let mut table = Table::new(schema, name);
    for (column, data_type) in columns {
        table
            .add_column(Column::new(*column, ColumnType::new(*data_type)))
            .expect("fixture columns are unique");
    }
    table
}

pub fn users() -> TableRef {
    TableRef::new("public", "users")
}

pub fn orders() -> TableRef {
    TableRef::new("public", "orders")
}

pub fn products() -> TableRef {
    TableRef::new("public", "products")
}

pub fn order_items() -> TableRef {
    TableRef::new("public", "order_items")
}

/// Catalog with a `public` schema and four tables, no constraints
pub fn shop_tables() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.add_schema("public").unwrap();
    catalog
        .add_table(table("public", "users", &[("id", "INTEGER"), ("email", "TEXT"), ("name", "TEXT")]))
        .unwrap();
    catalog
        .add_table(table("public", "orders", &[("id", "INTEGER"), ("user_id", "INTEGER"), ("total", "NUMERIC(10,2)")]))
        .unwrap();
    catalog
        .add_table(table("public", "products", &[("sku", "TEXT"), ("price", "NUMERIC(10,2)")]))
        .unwrap();
    catalog
        .add_table(table(
            "public",
            "order_items",
            &[("order_id", "INTEGER"), ("sku", "TEXT"), ("quantity", "INTEGER")],
        ))
        .unwrap();
    catalog
}

/// `shop_tables` plus primary keys, a unique email and RESTRICT foreign keys
pub fn shop() -> Catalog {
    let mut catalog = shop_tables();
    let constraints = vec![
        Constraint::primary_key("users_pkey", users(), ["id"]),
        Constraint::unique("users_email_key", users(), ["email"]),
        Constraint::primary_key("orders_pkey", orders(), ["id"]),
        Constraint::foreign_key("orders_user_id_fkey", orders(), ["user_id"], &users(), ["id"])
            .with_drop_behaviour(DropBehaviour::Restrict),
        Constraint::primary_key("products_pkey", products(), ["sku"]),
        Constraint::primary_key("order_items_pkey", order_items(), ["order_id", "sku"]),
        Constraint::foreign_key("order_items_order_id_fkey", order_items(), ["order_id"], &orders(), ["id"])
            .with_drop_behaviour(DropBehaviour::Restrict),
        Constraint::foreign_key("order_items_sku_fkey", order_items(), ["sku"], &products(), ["sku"]),
    ];
    for constraint in constraints {
        catalog.register_constraint(constraint).unwrap();
    }
    catalog
}
