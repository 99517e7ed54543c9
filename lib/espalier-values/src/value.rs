use crate::calendar::{OffsetDate, OffsetTime};
use crate::literal::{DecodeError, EncodeError};
use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use num_bigint::BigInt;
use oxrdf::{BlankNode, BlankNodeIdParseError, IriParseError, Literal, LiteralRef, NamedNode};
use std::fmt;

/// A native value that can cross the RDF literal boundary.
///
/// Exactly one tag is active per value. Most tags map to a single XSD
/// datatype; [`Iri`](Value::Iri) and [`BlankNode`](Value::BlankNode) are node
/// values that may only appear in node positions, and
/// [`Opaque`](Value::Opaque) carries a literal whose datatype this crate does
/// not interpret.
///
/// ```
/// use espalier_values::Value;
///
/// assert_eq!(Value::from(42_i64).to_literal()?.to_string(), "\"42\"^^<http://www.w3.org/2001/XMLSchema#long>");
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    /// 8-bit signed integer (`xsd:byte`).
    Byte(i8),
    /// 16-bit signed integer (`xsd:short`).
    Short(i16),
    /// 32-bit signed integer (`xsd:int`).
    Int(i32),
    /// 64-bit signed integer (`xsd:long`).
    Long(i64),
    /// Arbitrary-precision integer (`xsd:integer`).
    Integer(Box<BigInt>),
    /// Arbitrary-precision decimal (`xsd:decimal`), digits preserved exactly.
    Decimal(Box<BigDecimal>),
    Float(f32),
    Double(f64),
    String(String),
    /// String with a BCP47 language tag (`rdf:langString`).
    LangString { value: String, language: String },
    /// Date without time-of-day or timezone.
    Date(NaiveDate),
    /// Time-of-day without date or timezone.
    Time(NaiveTime),
    /// Date and time-of-day without timezone.
    DateTime(NaiveDateTime),
    /// Date with a timezone offset but no time-of-day.
    OffsetDate(OffsetDate),
    /// Time-of-day with a timezone offset but no date.
    OffsetTime(OffsetTime),
    /// Date and time-of-day with a timezone offset.
    OffsetDateTime(DateTime<FixedOffset>),
    Iri(NamedNode),
    BlankNode(BlankNode),
    /// Literal with a datatype this crate has no decoding for, kept verbatim.
    Opaque(Literal),
}

impl Value {
    /// Builds an IRI value, validating the IRI.
    pub fn iri(iri: impl Into<String>) -> Result<Self, IriParseError> {
        Ok(Self::Iri(NamedNode::new(iri)?))
    }

    /// Builds a blank node value, validating the identifier.
    pub fn blank_node(id: impl Into<String>) -> Result<Self, BlankNodeIdParseError> {
        Ok(Self::BlankNode(BlankNode::new(id)?))
    }

    /// Builds a language-tagged string. The tag is validated on encoding.
    pub fn lang_string(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self::LangString {
            value: value.into(),
            language: language.into(),
        }
    }

    /// The active tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Byte(_) => ValueKind::Byte,
            Self::Short(_) => ValueKind::Short,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Integer(_) => ValueKind::Integer,
            Self::Decimal(_) => ValueKind::Decimal,
            Self::Float(_) => ValueKind::Float,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::LangString { .. } => ValueKind::LangString,
            Self::Date(_) => ValueKind::Date,
            Self::Time(_) => ValueKind::Time,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::OffsetDate(_) => ValueKind::OffsetDate,
            Self::OffsetTime(_) => ValueKind::OffsetTime,
            Self::OffsetDateTime(_) => ValueKind::OffsetDateTime,
            Self::Iri(_) => ValueKind::Iri,
            Self::BlankNode(_) => ValueKind::BlankNode,
            Self::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Encodes this value as an RDF literal.
    ///
    /// Node values ([`Iri`](Value::Iri), [`BlankNode`](Value::BlankNode)) have
    /// no literal encoding and raise [`EncodeError::UnsupportedKind`].
    pub fn to_literal(&self) -> Result<Literal, EncodeError> {
        crate::literal::encode(self)
    }

    /// Decodes an RDF literal using the default datatype table.
    ///
    /// Literals with an unrecognized datatype decode to
    /// [`Opaque`](Value::Opaque) rather than failing; malformed lexical forms
    /// of recognized datatypes are a [`DecodeError`].
    ///
    /// ```
    /// use espalier_values::Value;
    /// use oxrdf::{Literal, vocab::xsd};
    ///
    /// let literal = Literal::new_typed_literal("-32768", xsd::SHORT);
    /// assert_eq!(Value::from_literal(&literal)?, Value::Short(i16::MIN));
    /// # Result::<_, Box<dyn std::error::Error>>::Ok(())
    /// ```
    pub fn from_literal<'a>(literal: impl Into<LiteralRef<'a>>) -> Result<Self, DecodeError> {
        crate::literal::decode_default(literal.into())
    }
}

/// The tag of a [`Value`], used when reporting conversion failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Integer,
    Decimal,
    Float,
    Double,
    String,
    LangString,
    Date,
    Time,
    DateTime,
    OffsetDate,
    OffsetTime,
    OffsetDateTime,
    Iri,
    BlankNode,
    Opaque,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::LangString => "language-tagged string",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::OffsetDate => "offset date",
            Self::OffsetTime => "offset time",
            Self::OffsetDateTime => "offset date-time",
            Self::Iri => "IRI",
            Self::BlankNode => "blank node",
            Self::Opaque => "opaque literal",
        })
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i8> for Value {
    #[inline]
    fn from(value: i8) -> Self {
        Self::Byte(value)
    }
}

impl From<i16> for Value {
    #[inline]
    fn from(value: i16) -> Self {
        Self::Short(value)
    }
}

impl From<i32> for Value {
    #[inline]
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<BigInt> for Value {
    #[inline]
    fn from(value: BigInt) -> Self {
        Self::Integer(Box::new(value))
    }
}

impl From<BigDecimal> for Value {
    #[inline]
    fn from(value: BigDecimal) -> Self {
        Self::Decimal(Box::new(value))
    }
}

impl From<f32> for Value {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<f64> for Value {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<NaiveDate> for Value {
    #[inline]
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveTime> for Value {
    #[inline]
    fn from(value: NaiveTime) -> Self {
        Self::Time(value)
    }
}

impl From<NaiveDateTime> for Value {
    #[inline]
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<OffsetDate> for Value {
    #[inline]
    fn from(value: OffsetDate) -> Self {
        Self::OffsetDate(value)
    }
}

impl From<OffsetTime> for Value {
    #[inline]
    fn from(value: OffsetTime) -> Self {
        Self::OffsetTime(value)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    #[inline]
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::OffsetDateTime(value)
    }
}

impl From<NamedNode> for Value {
    #[inline]
    fn from(value: NamedNode) -> Self {
        Self::Iri(value)
    }
}

impl From<BlankNode> for Value {
    #[inline]
    fn from(value: BlankNode) -> Self {
        Self::BlankNode(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{}", LiteralRef::new_simple_literal(v)),
            Self::LangString { value, language } => {
                write!(f, "{}@{language}", LiteralRef::new_simple_literal(value))
            }
            Self::Date(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}T{}", v.date(), v.time()),
            Self::OffsetDate(v) => write!(f, "{v}"),
            Self::OffsetTime(v) => write!(f, "{v}"),
            Self::OffsetDateTime(v) => {
                write!(f, "{}T{}{}", v.date_naive(), v.time(), v.offset())
            }
            Self::Iri(v) => write!(f, "{v}"),
            Self::BlankNode(v) => write!(f, "{v}"),
            Self::Opaque(v) => write!(f, "{v}"),
        }
    }
}

#[cfg(test)]
#[expect(clippy::panic_in_result_fn)]
mod tests {
    use super::*;

    #[test]
    fn primitive_tags() {
        assert_eq!(Value::from(1_i8).kind(), ValueKind::Byte);
        assert_eq!(Value::from(1_i16).kind(), ValueKind::Short);
        assert_eq!(Value::from(1_i32).kind(), ValueKind::Int);
        assert_eq!(Value::from(1_i64).kind(), ValueKind::Long);
        assert_eq!(Value::from(BigInt::from(1)).kind(), ValueKind::Integer);
        assert_ne!(Value::from(1_i64), Value::from(BigInt::from(1)));
    }

    #[test]
    fn display_quotes_strings() {
        assert_eq!(Value::from("a\nb").to_string(), "\"a\\nb\"");
        assert_eq!(Value::lang_string("chat", "fr").to_string(), "\"chat\"@fr");
    }

    #[test]
    fn display_nodes() -> Result<(), IriParseError> {
        assert_eq!(
            Value::iri("http://example.com/s")?.to_string(),
            "<http://example.com/s>"
        );
        Ok(())
    }
}
