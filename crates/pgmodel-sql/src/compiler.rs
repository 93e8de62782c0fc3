//! Statement compiler
//!
//! Maps parsed DDL statements onto catalog mutations. Each statement is
//! applied atomically: if any part of it fails the catalog is restored to
//! its state before the statement.

use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, CreateTable, ObjectName, ObjectType, SchemaName,
    Statement, TableConstraint,
};
use tracing::{debug, info, warn};
use pgmodel_catalog::{
    Catalog, CatalogError, Column, ColumnType, Constraint, ConstraintKind, DropBehaviour, Table,
    TableRef,
};
use pgmodel_core::{Config, Diagnostic, DiagnosticCode, Location, Report, Severity};
use crate::error::CompileError;
use crate::names;
use crate::parser::{ParsedSql, SqlParser};

/// Result of compiling one batch of statements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompileOutcome {
    /// Statements seen
    pub statements: usize,

    /// Statements that changed the catalog
    pub applied: usize,

    /// Statements skipped as unsupported or as no-ops
    pub skipped: usize,

    /// Statements that failed and were rolled back
    pub failed: usize,

    /// Diagnostics raised by this batch
    pub diagnostics: Vec<Diagnostic>,
}

/// How a statement that did not fail affected the catalog
enum Applied {
    Changed,
    NoOp(String),
}

/// A constraint as written in the DDL, before naming and key resolution
#[derive(Debug, Clone)]
struct ConstraintDraft {
    name: Option<String>,
    table: TableRef,
    kind: ConstraintKind,
    columns: Vec<String>,
    references: Option<(TableRef, Vec<String>)>,
}

/// Compiles DDL statements into a [`Catalog`]
pub struct Compiler {
    config: Config,
    catalog: Catalog,
    diagnostics: Vec<Diagnostic>,
    statements: usize,
    applied: usize,
    skipped: usize,
}

impl Compiler {
    /// Create a compiler with an empty catalog holding `config.default_schema`
    pub fn new(config: Config) -> Result<Self, CompileError> {
        let mut catalog = Catalog::new();
        catalog.add_schema(config.default_schema.as_str())?;

        Ok(Self {
            config,
            catalog,
            diagnostics: Vec::new(),
            statements: 0,
            applied: 0,
            skipped: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Diagnostics and counters accumulated over every batch so far
    pub fn report(&self) -> Report {
        Report::from_diagnostics(self.diagnostics.clone())
            .with_counts(self.statements, self.applied, self.skipped)
    }

    /// Record a diagnostic raised outside the compiler, e.g. a parse failure
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Parse `sql` with the configured dialect and compile it
    pub fn compile_sql(&mut self, sql: &str) -> Result<CompileOutcome, CompileError> {
        let parsed = SqlParser::from_dialect(&self.config.dialect)
            .parse(sql, None)
            .map_err(|e| {
                self.add_diagnostic(e.to_diagnostic());
                CompileError::Parse(e.error)
            })?;
        self.compile(&parsed.statements)
    }

    /// Compile the statements of one parsed file
    pub fn compile_parsed(&mut self, parsed: &ParsedSql) -> Result<CompileOutcome, CompileError> {
        self.compile_batch(&parsed.statements, parsed.location())
    }

    /// Compile statements in order
    ///
    /// With `fail_fast` set, returns the first error after rolling back the
    /// failing statement. Otherwise failures become error diagnostics and
    /// compilation continues with the next statement.
    pub fn compile(&mut self, statements: &[Statement]) -> Result<CompileOutcome, CompileError> {
        self.compile_batch(statements, None)
    }

    fn compile_batch(
        &mut self,
        statements: &[Statement],
        location: Option<Location>,
    ) -> Result<CompileOutcome, CompileError> {
        let mut outcome = CompileOutcome::default();

        for (index, statement) in statements.iter().enumerate() {
            outcome.statements += 1;
            let checkpoint = needs_checkpoint(statement).then(|| self.catalog.clone());

            let diagnostic = match self.apply(statement) {
                Ok(Applied::Changed) => {
                    outcome.applied += 1;
                    None
                }
                Ok(Applied::NoOp(message)) => {
                    outcome.skipped += 1;
                    debug!(statement = index, "{}", message);
                    Some(Diagnostic::new(DiagnosticCode::SqlStatementSkipped, Severity::Info, message))
                }
                Err(CompileError::UnsupportedStatement(kind)) if self.config.skip_unsupported => {
                    self.rollback(checkpoint);
                    outcome.skipped += 1;
                    warn!(statement = index, kind = %kind, "skipping unsupported statement");
                    Some(Diagnostic::new(
                        DiagnosticCode::SqlUnsupportedStatement,
                        Severity::Warn,
                        format!("Skipped unsupported statement: {}", kind),
                    ))
                }
                Err(err) => {
                    self.rollback(checkpoint);
                    outcome.failed += 1;

                    let diagnostic = locate(
                        Diagnostic::new(err.code(), Severity::Error, err.to_string()),
                        location.as_ref(),
                        index,
                    );
                    outcome.diagnostics.push(diagnostic);

                    if self.config.fail_fast {
                        self.record(&outcome);
                        return Err(err);
                    }
                    continue;
                }
            };

            if let Some(diagnostic) = diagnostic {
                outcome.diagnostics.push(locate(diagnostic, location.as_ref(), index));
            }
        }

        self.record(&outcome);
        info!(
            statements = outcome.statements,
            applied = outcome.applied,
            skipped = outcome.skipped,
            failed = outcome.failed,
            "compiled statements"
        );
        Ok(outcome)
    }

    fn rollback(&mut self, checkpoint: Option<Catalog>) {
        if let Some(catalog) = checkpoint {
            self.catalog = catalog;
        }
    }

    fn record(&mut self, outcome: &CompileOutcome) {
        self.statements += outcome.statements;
        self.applied += outcome.applied;
        self.skipped += outcome.skipped;
        self.diagnostics.extend(outcome.diagnostics.iter().cloned());
    }

    fn apply(&mut self, statement: &Statement) -> Result<Applied, CompileError> {
        match statement {
            Statement::CreateSchema { schema_name, if_not_exists, .. } => {
                self.create_schema(schema_name, *if_not_exists)
            }
            Statement::CreateTable(create) => self.create_table(create),
            Statement::AlterTable { name, if_exists, operations, .. } => {
                self.alter_table(name, *if_exists, operations)
            }
            Statement::Drop { object_type, if_exists, names: object_names, cascade, .. } => {
                self.drop_objects(object_type, *if_exists, object_names, *cascade)
            }
            other => Err(CompileError::UnsupportedStatement(statement_kind(other))),
        }
    }

    fn create_schema(&mut self, schema_name: &SchemaName, if_not_exists: bool) -> Result<Applied, CompileError> {
        let name = match schema_name {
            SchemaName::Simple(name) | SchemaName::NamedAuthorization(name, _) => names::schema_name(name)?,
            SchemaName::UnnamedAuthorization(role) => names::ident(role),
        };

        if if_not_exists && self.catalog.schema(&name).is_some() {
            return Ok(Applied::NoOp(format!("Schema {} already exists", name)));
        }

        self.catalog.add_schema(name)?;
        Ok(Applied::Changed)
    }

    fn create_table(&mut self, create: &CreateTable) -> Result<Applied, CompileError> {
        let table_ref = names::table_ref(&create.name, &self.config.default_schema)?;

        if create.if_not_exists && self.catalog.table(&table_ref).is_some() {
            return Ok(Applied::NoOp(format!("Table {} already exists", table_ref)));
        }

        let mut table = Table::new(table_ref.schema.as_str(), table_ref.table.as_str());
        let mut drafts = Vec::new();
        for column_def in &create.columns {
            let (column, inline) = self.column(&table_ref, column_def)?;
            table.add_column(column)?;
            drafts.extend(inline);
        }
        for constraint in &create.constraints {
            drafts.extend(self.table_constraint(&table_ref, constraint)?);
        }

        // Primary key columns are implicitly NOT NULL
        for draft in drafts.iter().filter(|d| d.kind == ConstraintKind::Primary) {
            for name in &draft.columns {
                if let Some(column) = table.column_mut(name) {
                    column.attrs.not_null = true;
                }
            }
        }

        self.catalog.add_table(table)?;
        self.register_all(drafts)?;
        Ok(Applied::Changed)
    }

    fn alter_table(
        &mut self,
        name: &ObjectName,
        if_exists: bool,
        operations: &[AlterTableOperation],
    ) -> Result<Applied, CompileError> {
        let table_ref = names::table_ref(name, &self.config.default_schema)?;

        if self.catalog.table(&table_ref).is_none() {
            if if_exists {
                return Ok(Applied::NoOp(format!("Table {} does not exist", table_ref)));
            }
            self.catalog.resolve_table(&table_ref)?;
        }

        let mut changed = false;
        for operation in operations {
            changed |= self.alter_operation(&table_ref, operation)?;
        }

        if changed {
            Ok(Applied::Changed)
        } else {
            Ok(Applied::NoOp(format!("ALTER TABLE {} changed nothing", table_ref)))
        }
    }

    /// Apply one ALTER TABLE operation, returning whether the catalog changed
    fn alter_operation(&mut self, table_ref: &TableRef, operation: &AlterTableOperation) -> Result<bool, CompileError> {
        match operation {
            AlterTableOperation::AddColumn { if_not_exists, column_def, .. } => {
                let name = names::ident(&column_def.name);
                if *if_not_exists && self.catalog.column(&table_ref.column(name.as_str())).is_some() {
                    return Ok(false);
                }

                let (column, inline) = self.column(table_ref, column_def)?;
                self.catalog.add_column(table_ref, column)?;
                self.register_all(inline)?;
                Ok(true)
            }
            AlterTableOperation::AddConstraint(constraint) => {
                let drafts: Vec<_> = self.table_constraint(table_ref, constraint)?.into_iter().collect();
                let changed = !drafts.is_empty();
                self.register_all(drafts)?;
                Ok(changed)
            }
            AlterTableOperation::DropConstraint { if_exists, name, .. } => {
                let name = names::ident(name);
                let declared_here = self
                    .catalog
                    .constraint(&name)
                    .is_some_and(|c| &c.table == table_ref);

                if !declared_here {
                    if *if_exists {
                        return Ok(false);
                    }
                    return Err(CatalogError::UnknownConstraint(name).into());
                }

                self.catalog.deregister_constraint(&name)?;
                Ok(true)
            }
            AlterTableOperation::DropColumn { column_name, if_exists, cascade } => {
                let column = table_ref.column(names::ident(column_name));
                if *if_exists && self.catalog.column(&column).is_none() {
                    return Ok(false);
                }

                self.catalog.drop_column(&column, *cascade)?;
                Ok(true)
            }
            other => Err(CompileError::UnsupportedStatement(format!(
                "ALTER TABLE {}",
                statement_kind(other)
            ))),
        }
    }

    /// Drop every named object in one catalog call
    ///
    /// The objects are dropped as a set, so constraints between them never
    /// block the statement. With IF EXISTS, missing names are skipped.
    fn drop_objects(
        &mut self,
        object_type: &ObjectType,
        if_exists: bool,
        object_names: &[ObjectName],
        cascade: bool,
    ) -> Result<Applied, CompileError> {
        let dropped = match object_type {
            ObjectType::Table => {
                let mut tables = Vec::with_capacity(object_names.len());
                for name in object_names {
                    let table_ref = names::table_ref(name, &self.config.default_schema)?;
                    if if_exists && self.catalog.table(&table_ref).is_none() {
                        continue;
                    }
                    tables.push(table_ref);
                }
                if tables.is_empty() {
                    0
                } else {
                    self.catalog.drop_tables(&tables, cascade)?.object.len()
                }
            }
            ObjectType::Schema => {
                let mut schemas = Vec::with_capacity(object_names.len());
                for name in object_names {
                    let schema = names::schema_name(name)?;
                    if if_exists && self.catalog.schema(&schema).is_none() {
                        continue;
                    }
                    schemas.push(schema);
                }
                if schemas.is_empty() {
                    0
                } else {
                    self.catalog.drop_schemas(&schemas, cascade)?.object.len()
                }
            }
            other => return Err(CompileError::UnsupportedStatement(format!("DROP {}", other))),
        };

        if dropped > 0 {
            Ok(Applied::Changed)
        } else {
            Ok(Applied::NoOp("Nothing to drop".to_string()))
        }
    }

    /// Build a catalog column and collect its inline constraints
    fn column(&self, table: &TableRef, def: &ColumnDef) -> Result<(Column, Vec<ConstraintDraft>), CompileError> {
        let name = names::ident(&def.name);
        let mut column = Column::new(name.as_str(), ColumnType::new(def.data_type.to_string()));
        let mut drafts = Vec::new();

        for option_def in &def.options {
            let constraint_name = option_def.name.as_ref().map(names::ident);
            match &option_def.option {
                ColumnOption::NotNull => column.attrs.not_null = true,
                ColumnOption::Null => column.attrs.not_null = false,
                ColumnOption::Unique { is_primary, .. } => drafts.push(ConstraintDraft {
                    name: constraint_name,
                    table: table.clone(),
                    kind: if *is_primary { ConstraintKind::Primary } else { ConstraintKind::Unique },
                    columns: vec![name.clone()],
                    references: None,
                }),
                ColumnOption::ForeignKey { foreign_table, referred_columns, .. } => {
                    drafts.push(ConstraintDraft {
                        name: constraint_name,
                        table: table.clone(),
                        kind: ConstraintKind::ForeignKey,
                        columns: vec![name.clone()],
                        references: Some((
                            names::table_ref(foreign_table, &self.config.default_schema)?,
                            names::idents(referred_columns),
                        )),
                    })
                }
                other => debug!(column = %name, option = %other, "ignoring column option"),
            }
        }

        Ok((column, drafts))
    }

    fn table_constraint(
        &self,
        table: &TableRef,
        constraint: &TableConstraint,
    ) -> Result<Option<ConstraintDraft>, CompileError> {
        let draft = match constraint {
            TableConstraint::PrimaryKey { name, columns, .. } => ConstraintDraft {
                name: name.as_ref().map(names::ident),
                table: table.clone(),
                kind: ConstraintKind::Primary,
                columns: names::idents(columns),
                references: None,
            },
            TableConstraint::Unique { name, columns, .. } => ConstraintDraft {
                name: name.as_ref().map(names::ident),
                table: table.clone(),
                kind: ConstraintKind::Unique,
                columns: names::idents(columns),
                references: None,
            },
            TableConstraint::ForeignKey { name, columns, foreign_table, referred_columns, .. } => {
                ConstraintDraft {
                    name: name.as_ref().map(names::ident),
                    table: table.clone(),
                    kind: ConstraintKind::ForeignKey,
                    columns: names::idents(columns),
                    references: Some((
                        names::table_ref(foreign_table, &self.config.default_schema)?,
                        names::idents(referred_columns),
                    )),
                }
            }
            other => {
                debug!(table = %table, constraint = %other, "ignoring table constraint");
                return Ok(None);
            }
        };
        Ok(Some(draft))
    }

    /// Register drafts with keys first, so foreign keys can point at a
    /// primary key declared later in the same statement
    fn register_all(&mut self, drafts: Vec<ConstraintDraft>) -> Result<(), CompileError> {
        let (foreign, keys): (Vec<_>, Vec<_>) = drafts
            .into_iter()
            .partition(|d| d.kind == ConstraintKind::ForeignKey);

        for draft in keys.into_iter().chain(foreign) {
            let constraint = self.build(draft)?;
            self.catalog.register_constraint(constraint)?;
        }
        Ok(())
    }

    fn build(&self, draft: ConstraintDraft) -> Result<Constraint, CompileError> {
        let name = match draft.name {
            Some(name) => name,
            None => self.default_name(&draft.table, draft.kind, &draft.columns),
        };

        match (draft.kind, draft.references) {
            (ConstraintKind::Primary, _) => Ok(Constraint::primary_key(name, draft.table, draft.columns)),
            (ConstraintKind::Unique, _) => Ok(Constraint::unique(name, draft.table, draft.columns)),
            (ConstraintKind::ForeignKey, Some((ref_table, ref_columns))) => {
                let ref_columns = if ref_columns.is_empty() {
                    self.primary_key_columns(&ref_table).ok_or_else(|| CompileError::InvalidForeignKey {
                        name: name.clone(),
                        reason: format!("{} has no primary key", ref_table),
                    })?
                } else {
                    ref_columns
                };

                if ref_columns.len() != draft.columns.len() {
                    return Err(CompileError::InvalidForeignKey {
                        name,
                        reason: format!(
                            "{} referencing columns but {} referenced columns",
                            draft.columns.len(),
                            ref_columns.len()
                        ),
                    });
                }

                Ok(Constraint::foreign_key(name, draft.table, draft.columns, &ref_table, ref_columns)
                    .with_drop_behaviour(DropBehaviour::Restrict))
            }
            (ConstraintKind::ForeignKey, None) => Err(CompileError::InvalidForeignKey {
                name,
                reason: "no referenced table".to_string(),
            }),
        }
    }

    /// Columns of the PRIMARY KEY declared on `table`, in key order
    fn primary_key_columns(&self, table: &TableRef) -> Option<Vec<String>> {
        self.catalog
            .constraints_of(table)
            .into_iter()
            .find(|c| c.kind == ConstraintKind::Primary)
            .map(|c| c.constrains.iter().map(|col| col.column.clone()).collect())
    }

    /// PostgreSQL's default constraint name, numbered on collision
    fn default_name(&self, table: &TableRef, kind: ConstraintKind, columns: &[String]) -> String {
        let base = match kind {
            ConstraintKind::Primary => format!("{}_pkey", table.table),
            ConstraintKind::Unique => format!("{}_{}_key", table.table, columns.join("_")),
            ConstraintKind::ForeignKey => format!("{}_{}_fkey", table.table, columns.join("_")),
        };

        if self.catalog.constraint(&base).is_none() {
            return base;
        }

        let mut n = 1;
        loop {
            let candidate = format!("{}{}", base, n);
            if self.catalog.constraint(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }
}

fn locate(diagnostic: Diagnostic, location: Option<&Location>, index: usize) -> Diagnostic {
    let diagnostic = diagnostic.with_statement(index);
    match location {
        Some(location) => diagnostic.with_location(location.clone()),
        None => diagnostic,
    }
}

/// Leading keywords of a statement, e.g. `CREATE VIEW`
fn statement_kind(statement: &impl std::fmt::Display) -> String {
    statement
        .to_string()
        .split_whitespace()
        .take_while(|word| word.chars().all(|c| c.is_ascii_uppercase() || c == '_'))
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if applying `statement` takes more than one catalog mutation
///
/// Single mutations are atomic on their own; only these need a checkpoint.
fn needs_checkpoint(statement: &Statement) -> bool {
    match statement {
        Statement::CreateTable(create) => {
            !create.constraints.is_empty() || create.columns.iter().any(has_inline_constraint)
        }
        Statement::AlterTable { operations, .. } => match operations.as_slice() {
            [AlterTableOperation::AddColumn { column_def, .. }] => has_inline_constraint(column_def),
            [_] => false,
            _ => true,
        },
        _ => false,
    }
}

fn has_inline_constraint(def: &ColumnDef) -> bool {
    def.options
        .iter()
        .any(|o| matches!(o.option, ColumnOption::Unique { .. } | ColumnOption::ForeignKey { .. }))
}
