//! Lazy statement reading fed by a background parser thread.

use crate::format::{FormatError, StatementFormat};
use crate::statement::Statement;
use espalier_values::DecodeError;
use oxrdf::IriParseError;
use oxrdfio::{RdfParseError, RdfParser};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::sync::mpsc::{Receiver, RecvError, sync_channel};
use std::thread::{Builder, JoinHandle};

/// Number of statements the hand-off queue holds before the parser thread
/// blocks waiting for the consumer.
const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Opens the file at `path` and streams its statements, resolving the format
/// from the file extension.
///
/// Equivalent to a [`ReaderSession`] with default options.
pub fn read_statements(path: impl AsRef<Path>) -> Result<StatementReader, ReadError> {
    let path = path.as_ref();
    let format = StatementFormat::resolve(&path.to_string_lossy(), None)?;
    ReaderSession::new(format).open_path(path)
}

/// A configurable reading session.
///
/// Parsing runs on a named background thread that feeds a bounded queue; the
/// returned [`StatementReader`] pulls from it lazily, so the source is never
/// read further ahead than the queue capacity. Dropping the reader detaches
/// the thread, which then stops at its next hand-off.
///
/// ```
/// use espalier::{ReaderSession, StatementFormat};
/// use espalier_values::Value;
///
/// let file = "<s> <p> <o> .";
/// let statements = ReaderSession::new(StatementFormat::Turtle)
///     .with_base_iri("http://example.com/")
///     .open_reader(file.as_bytes())?
///     .collect::<Result<Vec<_>, _>>()?;
/// assert_eq!(statements[0].subject, Value::iri("http://example.com/s")?);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct ReaderSession {
    format: StatementFormat,
    base_iri: Option<String>,
    queue_capacity: usize,
}

impl ReaderSession {
    /// Builds a session for the given format with default options.
    #[inline]
    pub fn new(format: StatementFormat) -> Self {
        Self {
            format,
            base_iri: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    /// Provides the base IRI against which relative IRIs in the source are
    /// resolved.
    ///
    /// The IRI itself is validated when the session opens.
    #[inline]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Sets how many statements the hand-off queue holds before the parser
    /// thread blocks.
    #[inline]
    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    /// Opens the file at `path` and starts parsing it.
    pub fn open_path(self, path: impl AsRef<Path>) -> Result<StatementReader, ReadError> {
        self.open_reader(BufReader::new(File::open(path)?))
    }

    /// Starts parsing statements from any source readable on another thread.
    pub fn open_reader(
        self,
        reader: impl Read + Send + 'static,
    ) -> Result<StatementReader, ReadError> {
        let Some(format) = self.format.engine_format() else {
            return Err(FormatError::Unsupported {
                format: self.format,
            }
            .into());
        };
        let mut parser = RdfParser::from_format(format).rename_blank_nodes();
        if let Some(base_iri) = self.base_iri {
            parser = parser.with_base_iri(base_iri)?;
        }
        let (tx, rx) = sync_channel(self.queue_capacity);
        let handle = Builder::new()
            .name("espalier-read".into())
            .spawn(move || {
                for quad in parser.for_reader(reader) {
                    let (item, terminal) = match quad {
                        Ok(quad) => (Statement::from_quad(quad).map_err(ReadError::from), false),
                        Err(error) => (Err(ReadError::Aborted(error)), true),
                    };
                    if tx.send(item).is_err() || terminal {
                        // Either the consumer detached or the parser cannot
                        // continue past the failure.
                        return;
                    }
                }
            })?;
        Ok(StatementReader {
            rx,
            handle: Some(handle),
        })
    }
}

/// A lazy sequence of statements pulled from a background parser.
///
/// Iteration yields decoded statements in source order. A statement that
/// fails to decode yields a non-terminal `Err` item and the stream goes on;
/// a parser failure yields a single terminal [`ReadError::Aborted`] item.
#[must_use]
#[derive(Debug)]
pub struct StatementReader {
    rx: Receiver<Result<Statement, ReadError>>,
    handle: Option<JoinHandle<()>>,
}

impl Iterator for StatementReader {
    type Item = Result<Statement, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rx.recv() {
            Ok(item) => Some(item),
            Err(RecvError) => {
                // The producer is done. Reap the thread so a panic in it is
                // not silently swallowed.
                if let Some(handle) = self.handle.take() {
                    if handle.join().is_err() {
                        return Some(Err(ReadError::Io(io::Error::other(
                            "the parser thread panicked",
                        ))));
                    }
                }
                None
            }
        }
    }
}

/// An error raised while opening a reading session or pulling statements
/// from it.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    /// The session format could not be resolved, or resolved to a format no
    /// session can read.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// The base IRI option does not hold a valid IRI.
    #[error("invalid base IRI: {0}")]
    InvalidBaseIri(#[from] IriParseError),
    /// The background parser failed; no further statements follow.
    #[error("reading aborted: {0}")]
    Aborted(#[from] RdfParseError),
    /// One statement failed to decode; later statements still follow.
    #[error(transparent)]
    Statement(#[from] DecodeError),
    /// An I/O failure outside the parser itself.
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use espalier_values::Value;

    #[test]
    fn statements_stream_in_source_order() -> Result<(), ReadError> {
        let file = r#"<http://example.com/s> <http://example.com/p> "1"^^<http://www.w3.org/2001/XMLSchema#int> .
<http://example.com/s> <http://example.com/p> "2"^^<http://www.w3.org/2001/XMLSchema#int> .
"#;
        let statements = ReaderSession::new(StatementFormat::NTriples)
            .open_reader(file.as_bytes())?
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].object, Value::Int(1));
        assert_eq!(statements[1].object, Value::Int(2));
        Ok(())
    }

    #[test]
    fn undecodable_statements_do_not_stop_the_stream() -> Result<(), ReadError> {
        let file = r#"<http://example.com/s> <http://example.com/p> "1"^^<http://www.w3.org/2001/XMLSchema#int> .
<http://example.com/s> <http://example.com/p> "oops"^^<http://www.w3.org/2001/XMLSchema#int> .
<http://example.com/s> <http://example.com/p> "3"^^<http://www.w3.org/2001/XMLSchema#int> .
"#;
        let outcomes = ReaderSession::new(StatementFormat::NTriples)
            .open_reader(file.as_bytes())?
            .collect::<Vec<_>>();
        assert_eq!(outcomes.len(), 3);
        assert!(matches!(&outcomes[0], Ok(s) if s.object == Value::Int(1)));
        assert!(matches!(outcomes[1], Err(ReadError::Statement(_))));
        assert!(matches!(&outcomes[2], Ok(s) if s.object == Value::Int(3)));
        Ok(())
    }

    #[test]
    fn syntax_failures_abort_the_stream() -> Result<(), ReadError> {
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .\nthis is not a statement\n";
        let mut reader =
            ReaderSession::new(StatementFormat::NTriples).open_reader(file.as_bytes())?;
        assert!(matches!(reader.next(), Some(Ok(_))));
        assert!(matches!(reader.next(), Some(Err(ReadError::Aborted(_)))));
        assert!(reader.next().is_none());
        Ok(())
    }

    #[test]
    fn the_binary_format_cannot_be_read() {
        let error = ReaderSession::new(StatementFormat::Binary)
            .open_reader(io::empty())
            .unwrap_err();
        assert!(matches!(
            error,
            ReadError::Format(FormatError::Unsupported { .. })
        ));
    }

    #[test]
    fn base_iris_are_validated_at_open() {
        let error = ReaderSession::new(StatementFormat::Turtle)
            .with_base_iri("not an iri")
            .open_reader(io::empty())
            .unwrap_err();
        assert!(matches!(error, ReadError::InvalidBaseIri(_)));
    }

    #[test]
    fn named_contexts_come_through_as_statement_contexts() -> Result<(), Box<dyn std::error::Error>>
    {
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> <http://example.com/g> .";
        let statements = ReaderSession::new(StatementFormat::NQuads)
            .open_reader(file.as_bytes())?
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0].context,
            Some(Value::iri("http://example.com/g")?)
        );
        Ok(())
    }

    #[test]
    fn dropping_the_reader_detaches_the_producer() {
        // More statements than the queue holds, so the producer has to block
        // on the hand-off and then notice the detach.
        let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .\n".repeat(64);
        let mut reader = ReaderSession::new(StatementFormat::NTriples)
            .with_queue_capacity(4)
            .open_reader(io::Cursor::new(file.into_bytes()))
            .unwrap();
        assert!(matches!(reader.next(), Some(Ok(_))));
        drop(reader);
    }
}
