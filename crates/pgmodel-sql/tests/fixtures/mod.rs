//! Shared DDL scripts and compiler builders for SQL integration tests

#![allow(dead_code)]

use pgmodel_core::Config;
use pgmodel_sql::Compiler;

/// Small shop model: users <- orders <- order_items -> products
pub const SHOP_DDL: &str = r#"
CREATE TABLE users (
    id BIGINT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    name TEXT
);

CREATE TABLE products (
    sku VARCHAR(32),
    price NUMERIC(10, 2) NOT NULL,
    CONSTRAINT products_pk PRIMARY KEY (sku)
);

CREATE TABLE orders (
    id BIGINT,
    user_id BIGINT NOT NULL REFERENCES users (id),
    PRIMARY KEY (id)
);

CREATE TABLE order_items (
    order_id BIGINT REFERENCES orders,
    sku VARCHAR(32),
    quantity INTEGER NOT NULL,
    PRIMARY KEY (order_id, sku),
    FOREIGN KEY (sku) REFERENCES products (sku)
);
"#;

/// Compiler with default settings
pub fn compiler() -> Compiler {
    Compiler::new(Config::default()).expect("default schema is valid")
}

/// Compiler that keeps going past failing statements
pub fn lenient_compiler() -> Compiler {
    Compiler::new(Config {
        fail_fast: false,
        ..Config::default()
    })
    .expect("default schema is valid")
}

/// Compiler with the shop model already applied
pub fn shop() -> Compiler {
    let mut compiler = compiler();
    compiler.compile_sql(SHOP_DDL).expect("shop DDL compiles");
    compiler
}
