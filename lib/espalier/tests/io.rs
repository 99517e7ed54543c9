#![cfg(test)]
#![allow(clippy::panic_in_result_fn)]

use espalier::{
    ReadError, Repository, Statement, StatementFormat, WriterSession, read_statements,
    write_statements,
};
use espalier_values::Value;
use std::error::Error;
use std::fs;
use tempfile::TempDir;

fn iri(iri: &str) -> Value {
    Value::iri(iri).unwrap()
}

fn sample_statements() -> Vec<Statement> {
    vec![
        Statement::triple(
            iri("http://example.com/alice"),
            iri("http://example.com/name"),
            "Alice",
        ),
        Statement::triple(
            iri("http://example.com/alice"),
            iri("http://example.com/age"),
            Value::Long(30),
        ),
    ]
}

#[test]
fn files_round_trip_with_inferred_formats() -> Result<(), Box<dyn Error>> {
    let statements = sample_statements();
    let dir = TempDir::new()?;
    for extension in ["ttl", "nt", "nq", "trig", "rdf"] {
        let path = dir.path().join(format!("out.{extension}"));
        write_statements(&path, &statements)?;
        let read_back = read_statements(&path)?.collect::<Result<Vec<_>, _>>()?;
        assert_eq!(read_back, statements, "{extension}");
    }
    Ok(())
}

#[test]
fn unresolvable_paths_are_rejected_before_any_file_is_touched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xyz");
    let error = write_statements(&path, &sample_statements()).unwrap_err();
    assert!(error.to_string().contains("out.xyz"), "{error}");
    assert!(!path.exists());
    assert!(matches!(
        read_statements(dir.path().join("missing.xyz")).unwrap_err(),
        ReadError::Format(_)
    ));
}

#[test]
fn session_written_files_open_by_path() -> Result<(), Box<dyn Error>> {
    let statement = Statement::quad(
        iri("http://example.com/s"),
        iri("http://example.com/p"),
        Value::Boolean(true),
        iri("http://example.com/g"),
    );
    let dir = TempDir::new()?;
    let path = dir.path().join("dump.trig");
    WriterSession::new(StatementFormat::TriG).write_path(&path, [&statement])?;
    let read_back = read_statements(&path)?.collect::<Result<Vec<_>, _>>()?;
    assert_eq!(read_back, vec![statement]);
    Ok(())
}

#[test]
fn repositories_load_files_by_extension() -> Result<(), Box<dyn Error>> {
    let dir = TempDir::new()?;
    let path = dir.path().join("data.nt");
    fs::write(
        &path,
        "<http://example.com/alice> <http://example.com/name> \"Alice\" .\n\
         <http://example.com/bob> <http://example.com/name> \"Bob\" .\n",
    )?;
    let repository = Repository::new()?;
    repository.load_path(&path)?;
    assert_eq!(repository.len()?, 2);
    let matched = repository
        .statements_for_pattern(Some(&iri("http://example.com/alice")), None, None, None)
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].object, Value::from("Alice"));

    let error = repository.load_path(dir.path().join("data.xyz")).unwrap_err();
    assert!(error.to_string().contains("data.xyz"), "{error}");
    Ok(())
}
