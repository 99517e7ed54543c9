//! The [`Statement`] building block and its adaptation to engine quads.

use espalier_values::{DecodeError, EncodeError, Value, ValueKind};
use oxrdf::{GraphName, NamedOrBlankNode, Quad, Term};
use std::fmt;

/// A single statement: a subject, a predicate, an object and an optional
/// named context.
///
/// All four positions hold [`Value`]s, so objects carry native values rather
/// than lexical forms. A `context` of `None` marks a statement that
/// explicitly belongs to the default graph.
///
/// ```
/// use espalier::Statement;
/// use espalier_values::Value;
///
/// let statement = Statement::triple(
///     Value::iri("http://example.com/s")?,
///     Value::iri("http://example.com/p")?,
///     42_i64,
/// );
/// assert_eq!(statement.object, Value::Long(42));
/// assert_eq!(statement.context, None);
/// # Result::<_, oxrdf::IriParseError>::Ok(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub subject: Value,
    pub predicate: Value,
    pub object: Value,
    pub context: Option<Value>,
}

impl Statement {
    /// Builds a statement in the default graph.
    #[inline]
    pub fn triple(
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            context: None,
        }
    }

    /// Builds a statement inside the given named context.
    #[inline]
    pub fn quad(
        subject: impl Into<Value>,
        predicate: impl Into<Value>,
        object: impl Into<Value>,
        context: impl Into<Value>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object: object.into(),
            context: Some(context.into()),
        }
    }

    /// Adapts the statement to an engine quad.
    ///
    /// The subject must hold an IRI or a blank node, the predicate an IRI,
    /// and the context, when present, an IRI or a blank node. The object may
    /// hold a node or any value with a literal encoding.
    pub fn to_quad(&self) -> Result<Quad, StatementConversionError> {
        self.quad_parts().map_err(|kind| StatementConversionError {
            statement: Box::new(self.clone()),
            kind,
        })
    }

    fn quad_parts(&self) -> Result<Quad, ConversionErrorKind> {
        let subject = node_from(&self.subject, Position::Subject, "an IRI or a blank node")?;
        let predicate = match &self.predicate {
            Value::Iri(iri) => iri.clone(),
            value => return Err(node_kind_error(value, Position::Predicate, "an IRI")),
        };
        let object = match &self.object {
            Value::Iri(iri) => Term::from(iri.clone()),
            Value::BlankNode(node) => node.clone().into(),
            value => value
                .to_literal()
                .map_err(|cause| ConversionErrorKind::Object { cause })?
                .into(),
        };
        let graph_name = match &self.context {
            Some(value) => {
                node_from(value, Position::Context, "an IRI or a blank node")?.into()
            }
            None => GraphName::DefaultGraph,
        };
        Ok(Quad::new(subject, predicate, object, graph_name))
    }

    /// Adapts an engine quad back to a statement.
    ///
    /// Literal objects are decoded to native values through the default
    /// decoder; a quad in the default graph yields a statement without
    /// context.
    pub fn from_quad(quad: Quad) -> Result<Self, DecodeError> {
        let object = match quad.object {
            Term::NamedNode(iri) => Value::Iri(iri),
            Term::BlankNode(node) => Value::BlankNode(node),
            Term::Literal(literal) => Value::from_literal(&literal)?,
        };
        Ok(Self {
            subject: match quad.subject {
                NamedOrBlankNode::NamedNode(iri) => Value::Iri(iri),
                NamedOrBlankNode::BlankNode(node) => Value::BlankNode(node),
            },
            predicate: Value::Iri(quad.predicate),
            object,
            context: match quad.graph_name {
                GraphName::NamedNode(iri) => Some(Value::Iri(iri)),
                GraphName::BlankNode(node) => Some(Value::BlankNode(node)),
                GraphName::DefaultGraph => None,
            },
        })
    }
}

impl fmt::Display for Statement {
    /// Formats the statement like a N-Quads line, without the final dot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(context) = &self.context {
            write!(f, " {context}")?;
        }
        Ok(())
    }
}

fn node_from(
    value: &Value,
    position: Position,
    requirement: &'static str,
) -> Result<NamedOrBlankNode, ConversionErrorKind> {
    match value {
        Value::Iri(iri) => Ok(iri.clone().into()),
        Value::BlankNode(node) => Ok(node.clone().into()),
        value => Err(node_kind_error(value, position, requirement)),
    }
}

fn node_kind_error(
    value: &Value,
    position: Position,
    requirement: &'static str,
) -> ConversionErrorKind {
    if let Value::String(lexical) = value {
        ConversionErrorKind::StringNode {
            position,
            requirement,
            lexical: lexical.clone(),
        }
    } else {
        ConversionErrorKind::Node {
            position,
            requirement,
            kind: value.kind(),
        }
    }
}

/// An error raised when a [`Statement`] cannot be adapted to an engine quad.
///
/// The offending statement is carried along so that callers adapting a batch
/// can report which element failed.
#[derive(Debug, thiserror::Error)]
#[error("cannot adapt the statement [{statement}]: {kind}")]
pub struct StatementConversionError {
    statement: Box<Statement>,
    kind: ConversionErrorKind,
}

impl StatementConversionError {
    /// The statement that could not be adapted.
    #[inline]
    pub fn statement(&self) -> &Statement {
        &self.statement
    }
}

#[derive(Debug, thiserror::Error)]
enum ConversionErrorKind {
    #[error(
        "the {position} must be {requirement} but holds the plain string \"{lexical}\", possibly an IRI that was never typed as one"
    )]
    StringNode {
        position: Position,
        requirement: &'static str,
        lexical: String,
    },
    #[error("the {position} must be {requirement} (found: {kind})")]
    Node {
        position: Position,
        requirement: &'static str,
        kind: ValueKind,
    },
    #[error("the object has no literal encoding: {cause}")]
    Object {
        #[source]
        cause: EncodeError,
    },
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Subject,
    Predicate,
    Context,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Subject => "subject",
            Self::Predicate => "predicate",
            Self::Context => "context",
        })
    }
}
