//! Query executor
//!
//! Runs one query over one batch of objects:
//!
//! 1. **Parse**: turn the query text into a [`Predicate`](crate::Predicate)
//! 2. **Flatten**: serialize every object into a [`Record`]
//! 3. **Register**: classify every field into the [`AttributeRegistry`]
//! 4. **Index**: store distinct records and correlate them back to objects
//! 5. **Evaluate**: walk the predicate against the index
//! 6. **Correlate**: map matching records back to the caller's objects
//!
//! Nothing survives the call. Any failure along the way is reported as
//! [`QueryError::BadQuery`].

use crate::attribute::AttributeRegistry;
use crate::backmap::BackMap;
use crate::config::EngineConfig;
use crate::error::{EvalError, ParseError, QueryError, QueryResult};
use crate::index::RecordIndex;
use crate::record::Record;
use crate::syntax::{select_statement, CqnSyntax, QuerySyntax, QuerySyntaxRegistry, SqlSyntax};
use serde::Serialize;
use tracing::{debug, instrument};

/// Stateless query executor; cheap to share across threads.
pub struct QueryEngine {
    config: EngineConfig,
    syntaxes: QuerySyntaxRegistry,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    /// Create an engine with default config
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            syntaxes: QuerySyntaxRegistry::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Filter `objects` with a SQL-style predicate such as
    /// `((language='Kotlin' OR language='Java') AND framework='SpringBoot')`.
    ///
    /// The predicate runs as `SELECT * FROM <collection> WHERE <predicate>`,
    /// so reported error columns are relative to that statement.
    #[instrument(skip_all, fields(dialect = "sql", objects = objects.len()))]
    pub fn find_by_predicate_query<'a, T: Serialize>(
        &self,
        objects: &'a [T],
        predicate: &str,
    ) -> QueryResult<Vec<&'a T>> {
        let statement = select_statement(&self.config.collection, predicate);
        self.run(objects, &SqlSyntax, &statement)
    }

    /// Filter `objects` with a CQN expression such as
    /// `and(equal("language", "Kotlin"), equal("framework", "SpringBoot"))`.
    #[instrument(skip_all, fields(dialect = "cqn", objects = objects.len()))]
    pub fn find_by_cqn_query<'a, T: Serialize>(
        &self,
        objects: &'a [T],
        cqn: &str,
    ) -> QueryResult<Vec<&'a T>> {
        self.run(objects, &CqnSyntax, cqn)
    }

    /// Filter `objects` with a query in any supported dialect.
    ///
    /// `SELECT` statements, CQN function calls and bare predicates are told
    /// apart by their prefix.
    #[instrument(skip_all, fields(objects = objects.len()))]
    pub fn find_by_query<'a, T: Serialize>(
        &self,
        objects: &'a [T],
        query: &str,
    ) -> QueryResult<Vec<&'a T>> {
        let Some(syntax) = self.syntaxes.detect(query) else {
            let err = ParseError::NoMatchingSyntax {
                input: query.to_string(),
                tried: self.syntaxes.syntax_names(),
            };
            return Err(QueryError::from_failure(&err));
        };
        debug!(dialect = syntax.name(), "Detected query syntax");
        self.run(objects, syntax, query)
    }

    fn run<'a, T: Serialize>(
        &self,
        objects: &'a [T],
        syntax: &dyn QuerySyntax,
        query: &str,
    ) -> QueryResult<Vec<&'a T>> {
        self.execute(objects, syntax, query).map_err(|err| {
            debug!(error = %err, "Query failed");
            QueryError::from(err)
        })
    }

    fn execute<'a, T: Serialize>(
        &self,
        objects: &'a [T],
        syntax: &dyn QuerySyntax,
        query: &str,
    ) -> Result<Vec<&'a T>, EvalError> {
        // Phase 1: Parse
        let predicate = syntax.parse(query).map_err(|source| EvalError::Syntax {
            dialect: syntax.name(),
            source,
        })?;

        // Phase 2: Flatten
        let records = objects
            .iter()
            .enumerate()
            .map(|(position, object)| {
                Record::from_serialize(object)
                    .map_err(|source| EvalError::Flatten { position, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Phase 3: Register attributes
        let registry = AttributeRegistry::from_records(&records);
        debug!(
            records = records.len(),
            attributes = registry.len(),
            "Registered attributes"
        );

        // Phase 4: Index and correlate
        let mut index = RecordIndex::new();
        let mut back_map = BackMap::new(self.config.duplicates);
        for (position, (record, object)) in records.into_iter().zip(objects).enumerate() {
            let id = index.insert(record);
            back_map.insert(id, position, object)?;
        }
        index.index_attributes(&registry, self.config.mixed_types)?;
        if back_map.collisions() > 0 {
            debug!(
                distinct = index.len(),
                collisions = back_map.collisions(),
                "Identical records collapsed"
            );
        }

        // Phase 5: Evaluate
        let ids = index.evaluate(&predicate, &registry)?;

        // Phase 6: Correlate back to input objects
        let back_map = &back_map;
        let matched: Vec<&'a T> = ids
            .into_iter()
            .flat_map(move |id| back_map.resolve(id))
            .collect();
        debug!(matched = matched.len(), "Query complete");

        Ok(matched)
    }
}
