//! An embedded repository storing statements in memory.

use crate::format::{FormatError, StatementFormat};
use crate::statement::{Statement, StatementConversionError};
use espalier_values::{DecodeError, Value};
use oxigraph::sparql::{
    QueryEvaluationError, QueryResults, SparqlEvaluator, SparqlSyntaxError,
};
use oxigraph::store::{LoaderError, QuadIter, StorageError, Store};
use oxrdf::{GraphName, NamedNode, NamedOrBlankNode, Term};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// An embedded in-memory statement store.
///
/// The repository adapts [`Statement`]s to engine quads on the way in and
/// back to statements on the way out, so callers stay in the native value
/// space. SPARQL evaluation is delegated to the engine.
///
/// The engine stores the derived numeric datatypes (`xsd:byte`, `xsd:short`,
/// `xsd:int`, `xsd:long`) in its `xsd:integer` value space, so a statement
/// written with a sized integer object reads back with an
/// [`Integer`](Value::Integer) object of the same numeric value.
/// [`contains`](Self::contains) and [`remove`](Self::remove) still match the
/// statement as written because both sides go through the same encoding.
///
/// ```
/// use espalier::{Repository, Statement};
/// use espalier_values::Value;
///
/// let repository = Repository::new()?;
/// repository.insert(&Statement::triple(
///     Value::iri("http://example.com/alice")?,
///     Value::iri("http://example.com/age")?,
///     Value::Int(30),
/// ))?;
///
/// let rows = repository.select("SELECT ?age WHERE { ?s <http://example.com/age> ?age }")?;
/// // The engine widens sized integers to xsd:integer.
/// assert_eq!(rows[0].get("age"), Some(&Value::Integer(Box::new(30.into()))));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct Repository {
    store: Store,
}

impl Repository {
    /// Creates an empty repository.
    pub fn new() -> Result<Self, RepositoryError> {
        Ok(Self {
            store: Store::new()?,
        })
    }

    /// Adds a statement to the repository.
    pub fn insert(&self, statement: &Statement) -> Result<(), RepositoryError> {
        self.store.insert(&statement.to_quad()?)?;
        Ok(())
    }

    /// Checks if the repository contains the given statement.
    pub fn contains(&self, statement: &Statement) -> Result<bool, RepositoryError> {
        Ok(self.store.contains(&statement.to_quad()?)?)
    }

    /// Removes a statement from the repository.
    pub fn remove(&self, statement: &Statement) -> Result<(), RepositoryError> {
        self.store.remove(&statement.to_quad()?)?;
        Ok(())
    }

    /// Returns the number of statements in the repository.
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.store.len()?)
    }

    /// Returns if the repository is empty.
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.store.is_empty()?)
    }

    /// Loads every statement from the file at `path`, resolving the format
    /// from the file extension.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<(), RepositoryError> {
        let path = path.as_ref();
        let format = StatementFormat::resolve(&path.to_string_lossy(), None)?;
        self.load_reader(format, BufReader::new(File::open(path)?))
    }

    /// Loads every statement read from `reader` in the given format.
    ///
    /// The load is atomic: on failure the repository is left untouched.
    pub fn load_reader(
        &self,
        format: StatementFormat,
        reader: impl Read,
    ) -> Result<(), RepositoryError> {
        let Some(engine_format) = format.engine_format() else {
            return Err(FormatError::Unsupported { format }.into());
        };
        self.store.load_from_reader(engine_format, reader)?;
        Ok(())
    }

    /// Returns all the statements in the repository.
    pub fn statements(&self) -> StatementIter {
        StatementIter {
            inner: Some(self.store.iter()),
        }
    }

    /// Returns the statements matching the given pattern.
    ///
    /// `None` positions match anything; a `context` of `Some(None)` matches
    /// only default graph statements. A pattern value that cannot occupy its
    /// position matches nothing.
    pub fn statements_for_pattern(
        &self,
        subject: Option<&Value>,
        predicate: Option<&Value>,
        object: Option<&Value>,
        context: Option<Option<&Value>>,
    ) -> StatementIter {
        let Some((subject, predicate, object, graph_name)) =
            convert_pattern(subject, predicate, object, context)
        else {
            return StatementIter { inner: None };
        };
        StatementIter {
            inner: Some(self.store.quads_for_pattern(
                subject.as_ref().map(NamedOrBlankNode::as_ref),
                predicate.as_ref().map(NamedNode::as_ref),
                object.as_ref().map(Term::as_ref),
                graph_name.as_ref().map(GraphName::as_ref),
            )),
        }
    }

    /// Evaluates a SPARQL `SELECT` query and returns one map per solution,
    /// binding variable names to decoded values.
    ///
    /// Unbound variables are absent from their solution map.
    pub fn select(&self, query: &str) -> Result<Vec<HashMap<String, Value>>, RepositoryError> {
        match self.evaluate(query)? {
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution?;
                    let mut row = HashMap::new();
                    for (variable, term) in solution.iter() {
                        row.insert(variable.as_str().to_owned(), value_from_term(term)?);
                    }
                    rows.push(row);
                }
                Ok(rows)
            }
            QueryResults::Boolean(_) | QueryResults::Graph(_) => {
                Err(RepositoryError::UnexpectedResults {
                    expected: "solutions",
                })
            }
        }
    }

    /// Evaluates a SPARQL `ASK` query.
    pub fn ask(&self, query: &str) -> Result<bool, RepositoryError> {
        match self.evaluate(query)? {
            QueryResults::Boolean(value) => Ok(value),
            QueryResults::Solutions(_) | QueryResults::Graph(_) => {
                Err(RepositoryError::UnexpectedResults {
                    expected: "a boolean",
                })
            }
        }
    }

    /// Evaluates a SPARQL `CONSTRUCT` query and adapts the produced triples
    /// to default graph statements.
    pub fn construct(&self, query: &str) -> Result<Vec<Statement>, RepositoryError> {
        match self.evaluate(query)? {
            QueryResults::Graph(triples) => {
                let mut statements = Vec::new();
                for triple in triples {
                    statements.push(Statement::from_quad(
                        triple?.in_graph(GraphName::DefaultGraph),
                    )?);
                }
                Ok(statements)
            }
            QueryResults::Solutions(_) | QueryResults::Boolean(_) => {
                Err(RepositoryError::UnexpectedResults {
                    expected: "statements",
                })
            }
        }
    }

    /// Evaluates a SPARQL `DESCRIBE` query, which produces the same kind of
    /// results as [`construct`](Self::construct).
    pub fn describe(&self, query: &str) -> Result<Vec<Statement>, RepositoryError> {
        self.construct(query)
    }

    fn evaluate(&self, query: &str) -> Result<QueryResults<'static>, RepositoryError> {
        Ok(SparqlEvaluator::new()
            .parse_query(query)?
            .on_store(&self.store)
            .execute()?)
    }
}

/// An iterator over the statements of a [`Repository`].
#[must_use]
pub struct StatementIter {
    inner: Option<QuadIter<'static>>,
}

impl Iterator for StatementIter {
    type Item = Result<Statement, RepositoryError>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(match self.inner.as_mut()?.next()? {
            Ok(quad) => Statement::from_quad(quad).map_err(RepositoryError::from),
            Err(error) => Err(RepositoryError::from(error)),
        })
    }
}

fn convert_pattern(
    subject: Option<&Value>,
    predicate: Option<&Value>,
    object: Option<&Value>,
    context: Option<Option<&Value>>,
) -> Option<(
    Option<NamedOrBlankNode>,
    Option<NamedNode>,
    Option<Term>,
    Option<GraphName>,
)> {
    Some((
        match subject {
            Some(value) => Some(node_pattern(value)?),
            None => None,
        },
        match predicate {
            Some(Value::Iri(iri)) => Some(iri.clone()),
            Some(_) => return None,
            None => None,
        },
        match object {
            Some(value) => Some(term_pattern(value)?),
            None => None,
        },
        match context {
            Some(context) => Some(graph_pattern(context)?),
            None => None,
        },
    ))
}

fn node_pattern(value: &Value) -> Option<NamedOrBlankNode> {
    match value {
        Value::Iri(iri) => Some(iri.clone().into()),
        Value::BlankNode(node) => Some(node.clone().into()),
        _ => None,
    }
}

fn term_pattern(value: &Value) -> Option<Term> {
    match value {
        Value::Iri(iri) => Some(iri.clone().into()),
        Value::BlankNode(node) => Some(node.clone().into()),
        value => value.to_literal().ok().map(Term::from),
    }
}

fn graph_pattern(context: Option<&Value>) -> Option<GraphName> {
    match context {
        None => Some(GraphName::DefaultGraph),
        Some(Value::Iri(iri)) => Some(iri.clone().into()),
        Some(Value::BlankNode(node)) => Some(node.clone().into()),
        Some(_) => None,
    }
}

fn value_from_term(term: &Term) -> Result<Value, DecodeError> {
    Ok(match term {
        Term::NamedNode(iri) => Value::Iri(iri.clone()),
        Term::BlankNode(node) => Value::BlankNode(node.clone()),
        Term::Literal(literal) => Value::from_literal(literal.as_ref())?,
    })
}

/// An error raised by a [`Repository`] operation.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// An error from the underlying storage.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A file to load could not be resolved to a readable format.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// An error while loading statements into the store.
    #[error(transparent)]
    Loader(#[from] LoaderError),
    /// A statement could not be adapted to an engine quad.
    #[error(transparent)]
    Conversion(#[from] StatementConversionError),
    /// A stored literal could not be decoded back to a native value.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The query is not valid SPARQL.
    #[error(transparent)]
    QuerySyntax(#[from] SparqlSyntaxError),
    /// The query evaluation failed.
    #[error(transparent)]
    QueryEvaluation(#[from] QueryEvaluationError),
    /// The query produced a different kind of results than the helper
    /// returns.
    #[error("the query does not produce {expected}")]
    UnexpectedResults {
        /// What the helper would have returned.
        expected: &'static str,
    },
    /// An I/O failure while opening a file to load.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;

    fn iri(iri: &str) -> Value {
        Value::iri(iri).unwrap()
    }

    #[test]
    fn insert_contains_remove() -> Result<(), RepositoryError> {
        let repository = Repository::new()?;
        let statement = Statement::triple(
            iri("http://example.com/alice"),
            iri("http://example.com/age"),
            Value::Int(30),
        );
        assert!(!repository.contains(&statement)?);
        repository.insert(&statement)?;
        assert!(repository.contains(&statement)?);
        assert_eq!(repository.len()?, 1);
        repository.remove(&statement)?;
        assert!(repository.is_empty()?);
        Ok(())
    }

    #[test]
    fn loaded_statements_match_by_pattern() -> Result<(), Box<dyn std::error::Error>> {
        let file = r#"<http://example.com/alice> <http://example.com/age> "30"^^<http://www.w3.org/2001/XMLSchema#int> .
<http://example.com/bob> <http://example.com/age> "42"^^<http://www.w3.org/2001/XMLSchema#int> .
"#;
        let repository = Repository::new()?;
        repository.load_reader(StatementFormat::NTriples, file.as_bytes())?;
        assert_eq!(repository.len()?, 2);

        let matched = repository
            .statements_for_pattern(Some(&iri("http://example.com/alice")), None, None, None)
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(matched.len(), 1);
        // The engine widens xsd:int to its integer value space.
        assert_eq!(matched[0].object, Value::Integer(Box::new(30.into())));
        Ok(())
    }

    #[test]
    fn impossible_patterns_match_nothing() -> Result<(), RepositoryError> {
        let repository = Repository::new()?;
        repository.insert(&Statement::triple(
            iri("http://example.com/s"),
            iri("http://example.com/p"),
            Value::Boolean(true),
        ))?;
        // No statement can hold a boolean in the subject position.
        assert_eq!(
            repository
                .statements_for_pattern(Some(&Value::Boolean(true)), None, None, None)
                .count(),
            0
        );
        Ok(())
    }

    #[test]
    fn named_contexts_round_trip_through_the_store() -> Result<(), RepositoryError> {
        let repository = Repository::new()?;
        let statement = Statement::quad(
            iri("http://example.com/s"),
            iri("http://example.com/p"),
            Value::Boolean(true),
            iri("http://example.com/g"),
        );
        repository.insert(&statement)?;
        let all = repository
            .statements()
            .collect::<Result<Vec<_>, RepositoryError>>()?;
        assert_eq!(all, vec![statement]);
        // Restricting to the default graph excludes it.
        assert_eq!(
            repository
                .statements_for_pattern(None, None, None, Some(None))
                .count(),
            0
        );
        Ok(())
    }

    #[test]
    fn select_binds_native_values() -> Result<(), RepositoryError> {
        let repository = Repository::new()?;
        repository.insert(&Statement::triple(
            iri("http://example.com/alice"),
            iri("http://example.com/age"),
            Value::Int(30),
        ))?;
        let rows =
            repository.select("SELECT ?s ?age WHERE { ?s <http://example.com/age> ?age }")?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("s"), Some(&iri("http://example.com/alice")));
        assert_eq!(
            rows[0].get("age"),
            Some(&Value::Integer(Box::new(30.into())))
        );
        Ok(())
    }

    #[test]
    fn ask_reports_presence() -> Result<(), RepositoryError> {
        let repository = Repository::new()?;
        assert!(!repository.ask("ASK { ?s ?p ?o }")?);
        repository.insert(&Statement::triple(
            iri("http://example.com/s"),
            iri("http://example.com/p"),
            Value::Boolean(true),
        ))?;
        assert!(repository.ask("ASK { ?s ?p ?o }")?);
        Ok(())
    }

    #[test]
    fn construct_adapts_the_produced_triples() -> Result<(), RepositoryError> {
        let repository = Repository::new()?;
        repository.insert(&Statement::triple(
            iri("http://example.com/alice"),
            iri("http://example.com/age"),
            Value::Int(30),
        ))?;
        let statements = repository.construct(
            "CONSTRUCT { ?s <http://example.com/years> ?age } WHERE { ?s <http://example.com/age> ?age }",
        )?;
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].predicate, iri("http://example.com/years"));
        assert_eq!(statements[0].object, Value::Integer(Box::new(30.into())));
        assert_eq!(statements[0].context, None);
        Ok(())
    }

    #[test]
    fn helpers_reject_mismatched_result_kinds() {
        let repository = Repository::new().unwrap();
        assert!(matches!(
            repository.select("ASK { ?s ?p ?o }"),
            Err(RepositoryError::UnexpectedResults { .. })
        ));
        assert!(matches!(
            repository.ask("SELECT ?s WHERE { ?s ?p ?o }"),
            Err(RepositoryError::UnexpectedResults { .. })
        ));
        assert!(matches!(
            repository.select("THIS IS NOT SPARQL"),
            Err(RepositoryError::QuerySyntax(_))
        ));
    }
}
