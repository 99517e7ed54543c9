#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod format;
mod io;
mod prefixes;
mod repository;
mod statement;

pub use self::format::{FormatError, StatementFormat};
pub use self::io::{
    ReadError, ReaderSession, StatementReader, WriteError, WriterSession, read_statements,
    statements_to_string, write_statements,
};
pub use self::prefixes::default_prefixes;
pub use self::repository::{Repository, RepositoryError, StatementIter};
pub use self::statement::{Statement, StatementConversionError};
pub use espalier_values;
