//! Statement serialization sessions.

use crate::format::{FormatError, StatementFormat};
use crate::prefixes::default_prefixes;
use crate::statement::{Statement, StatementConversionError};
use oxrdf::IriParseError;
use oxrdfio::RdfSerializer;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serializes `statements` into the file at `path`, resolving the format
/// from the file extension.
///
/// Equivalent to a [`WriterSession`] with default options.
pub fn write_statements<'a>(
    path: impl AsRef<Path>,
    statements: impl IntoIterator<Item = &'a Statement>,
) -> Result<(), WriteError> {
    let path = path.as_ref();
    let format = StatementFormat::resolve(&path.to_string_lossy(), None)?;
    WriterSession::new(format).write_path(path, statements)
}

/// Serializes `statements` to a string in the given format.
///
/// ```
/// use espalier::{Statement, StatementFormat, statements_to_string};
/// use espalier_values::Value;
///
/// let statement = Statement::triple(
///     Value::iri("http://example.com/s")?,
///     Value::iri("http://example.com/p")?,
///     Value::Long(7),
/// );
/// assert_eq!(
///     statements_to_string(StatementFormat::NTriples, [&statement])?,
///     "<http://example.com/s> <http://example.com/p> \"7\"^^<http://www.w3.org/2001/XMLSchema#long> .\n"
/// );
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub fn statements_to_string<'a>(
    format: StatementFormat,
    statements: impl IntoIterator<Item = &'a Statement>,
) -> Result<String, WriteError> {
    let bytes = WriterSession::new(format).write(Vec::new(), statements)?;
    String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e).into())
}

/// A configurable writing session.
///
/// The session adapts each statement to an engine quad and drives the engine
/// serializer with it. Sessions start from the [`default_prefixes`] table;
/// formats without a prefix mechanism ignore it.
#[must_use]
#[derive(Debug, Clone)]
pub struct WriterSession {
    format: StatementFormat,
    prefixes: Vec<(String, String)>,
    base_iri: Option<String>,
}

impl WriterSession {
    /// Builds a session for the given format with default options.
    pub fn new(format: StatementFormat) -> Self {
        Self {
            format,
            prefixes: default_prefixes()
                .iter()
                .map(|&(prefix, iri)| (prefix.to_owned(), iri.to_owned()))
                .collect(),
            base_iri: None,
        }
    }

    /// Replaces the default prefix table with the caller's pairs.
    ///
    /// The IRIs are validated when the session starts writing.
    pub fn with_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.prefixes = prefixes
            .into_iter()
            .map(|(prefix, iri)| (prefix.into(), iri.into()))
            .collect();
        self
    }

    /// Provides the base IRI the output is relativized against, where the
    /// format supports one.
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Serializes `statements` into the file at `path`.
    pub fn write_path<'a>(
        &self,
        path: impl AsRef<Path>,
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> Result<(), WriteError> {
        self.write(BufWriter::new(File::create(path)?), statements)?
            .flush()?;
        Ok(())
    }

    /// Serializes `statements` into `writer` and returns it once finished.
    ///
    /// ```
    /// use espalier::{Statement, StatementFormat, WriterSession};
    /// use espalier_values::Value;
    ///
    /// let statement = Statement::triple(
    ///     Value::iri("http://example.com/s")?,
    ///     Value::iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type")?,
    ///     Value::iri("http://schema.org/Person")?,
    /// );
    /// let out = WriterSession::new(StatementFormat::Turtle)
    ///     .with_prefixes([("schema", "http://schema.org/")])
    ///     .write(Vec::new(), [&statement])?;
    /// assert_eq!(
    ///     String::from_utf8_lossy(&out),
    ///     "@prefix schema: <http://schema.org/> .\n<http://example.com/s> a schema:Person .\n"
    /// );
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn write<'a, W: Write>(
        &self,
        writer: W,
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> Result<W, WriteError> {
        let Some(format) = self.format.engine_format() else {
            return Err(FormatError::Unsupported {
                format: self.format,
            }
            .into());
        };
        let mut serializer = RdfSerializer::from_format(format);
        for (prefix, iri) in &self.prefixes {
            serializer = serializer.with_prefix(prefix.as_str(), iri.as_str())?;
        }
        if let Some(base_iri) = &self.base_iri {
            serializer = serializer.with_base_iri(base_iri.as_str())?;
        }
        let supports_datasets = self.format.supports_datasets();
        let mut serializer = serializer.for_writer(writer);
        for statement in statements {
            if statement.context.is_some() && !supports_datasets {
                return Err(WriteError::GraphsUnsupported {
                    format: self.format,
                });
            }
            serializer.serialize_quad(&statement.to_quad()?)?;
        }
        Ok(serializer.finish()?)
    }
}

/// An error raised while serializing statements.
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// The session format could not be resolved, or resolved to a format no
    /// session can write.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A statement carries a named context but the format cannot encode one.
    #[error("the {} format cannot hold named graph contexts", .format.name())]
    GraphsUnsupported {
        /// The format the session writes.
        format: StatementFormat,
    },
    /// A statement could not be adapted to an engine quad.
    #[error(transparent)]
    Statement(#[from] StatementConversionError),
    /// A prefix or base IRI option does not hold a valid IRI.
    #[error("invalid prefix or base IRI: {0}")]
    InvalidIri(#[from] IriParseError),
    /// An I/O failure while writing.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use espalier_values::Value;

    fn iri(iri: &str) -> Value {
        Value::iri(iri).unwrap()
    }

    #[test]
    fn quads_serialize_with_their_context() -> Result<(), WriteError> {
        let statement = Statement::quad(
            iri("http://example.com/s"),
            iri("http://example.com/p"),
            Value::Long(7),
            iri("http://example.com/g"),
        );
        assert_eq!(
            statements_to_string(StatementFormat::NQuads, [&statement])?,
            "<http://example.com/s> <http://example.com/p> \"7\"^^<http://www.w3.org/2001/XMLSchema#long> <http://example.com/g> .\n"
        );
        Ok(())
    }

    #[test]
    fn triple_formats_reject_named_contexts() {
        let statement = Statement::quad(
            iri("http://example.com/s"),
            iri("http://example.com/p"),
            Value::Long(7),
            iri("http://example.com/g"),
        );
        let error = statements_to_string(StatementFormat::Turtle, [&statement]).unwrap_err();
        assert!(matches!(
            error,
            WriteError::GraphsUnsupported {
                format: StatementFormat::Turtle
            }
        ));
        assert!(error.to_string().contains("Turtle"));
    }

    #[test]
    fn turtle_output_compresses_with_the_default_prefix_table() -> Result<(), WriteError> {
        let statement = Statement::triple(
            iri("http://example.com/s"),
            iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            iri("http://www.w3.org/2004/02/skos/core#Concept"),
        );
        let out = statements_to_string(StatementFormat::Turtle, [&statement])?;
        assert!(
            out.contains("@prefix skos: <http://www.w3.org/2004/02/skos/core#> ."),
            "{out}"
        );
        assert!(out.contains("skos:Concept"), "{out}");
        Ok(())
    }

    #[test]
    fn caller_prefixes_replace_the_default_table() -> Result<(), WriteError> {
        let statement = Statement::triple(
            iri("http://example.com/s"),
            iri("http://www.w3.org/1999/02/22-rdf-syntax-ns#type"),
            iri("http://schema.org/Person"),
        );
        let out = WriterSession::new(StatementFormat::Turtle)
            .with_prefixes([("schema", "http://schema.org/")])
            .write(Vec::new(), [&statement])?;
        assert_eq!(
            String::from_utf8_lossy(&out),
            "@prefix schema: <http://schema.org/> .\n<http://example.com/s> a schema:Person .\n"
        );
        Ok(())
    }

    #[test]
    fn prefix_iris_are_validated_for_prefix_capable_formats() {
        let error = WriterSession::new(StatementFormat::Turtle)
            .with_prefixes([("p", "not an iri")])
            .write(Vec::new(), std::iter::empty())
            .unwrap_err();
        assert!(matches!(error, WriteError::InvalidIri(_)));
    }

    #[test]
    fn the_binary_format_cannot_be_written() {
        let statement = Statement::triple(
            iri("http://example.com/s"),
            iri("http://example.com/p"),
            Value::Boolean(true),
        );
        let error = statements_to_string(StatementFormat::Binary, [&statement]).unwrap_err();
        assert!(matches!(
            error,
            WriteError::Format(FormatError::Unsupported { .. })
        ));
    }

    #[test]
    fn unadaptable_statements_are_reported_with_the_statement() {
        let statement = Statement::triple(
            "http://example.com/s",
            iri("http://example.com/p"),
            Value::Boolean(true),
        );
        let error = statements_to_string(StatementFormat::NTriples, [&statement]).unwrap_err();
        assert!(matches!(
            &error,
            WriteError::Statement(cause) if cause.statement() == &statement
        ));
    }
}
