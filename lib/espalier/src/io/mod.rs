//! Reading and writing sessions for statement files and streams.
//!
//! Reading happens on a background thread feeding a bounded queue, so
//! statements stream lazily:
//!
//! ```
//! use espalier::{ReaderSession, StatementFormat};
//!
//! let file = "<http://example.com/s> <http://example.com/p> <http://example.com/o> .";
//! let statements = ReaderSession::new(StatementFormat::NTriples)
//!     .open_reader(file.as_bytes())?
//!     .collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(statements.len(), 1);
//! # Result::<_, espalier::ReadError>::Ok(())
//! ```

mod read;
mod write;

pub use self::read::{ReadError, ReaderSession, StatementReader, read_statements};
pub use self::write::{WriteError, WriterSession, statements_to_string, write_statements};
