//! Conversion between [`Value`] and RDF literals.
//!
//! Encoding writes the canonical lexical form for the value's XSD datatype.
//! Decoding is datatype-driven through a [`LiteralDecoder`] table and falls
//! back to [`Value::Opaque`] for datatypes without a handler, so a
//! well-formed literal never fails to decode on its datatype alone.

use crate::calendar::{self, CalendarParseError, CalendarValue, InvalidOffsetError};
use crate::value::{Value, ValueKind};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use oxrdf::vocab::xsd;
use oxrdf::{LanguageTagParseError, Literal, LiteralRef, NamedNode, NamedNodeRef};
use std::collections::HashMap;
use std::num::{IntErrorKind, ParseIntError};
use std::str::FromStr;
use std::sync::LazyLock;

/// An error raised while encoding a [`Value`] as a literal.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The value kind has no literal encoding (IRIs and blank nodes are
    /// terms of their own, not literals).
    #[error("no literal encoding exists for {kind} values")]
    UnsupportedKind { kind: ValueKind },
    #[error("invalid language tag: {0}")]
    InvalidLanguageTag(#[from] LanguageTagParseError),
    #[error(transparent)]
    InvalidOffset(#[from] InvalidOffsetError),
}

/// An error raised while decoding a literal whose lexical form does not
/// belong to its datatype.
#[derive(Debug, Clone, thiserror::Error)]
#[error("cannot decode {datatype} literal \"{lexical}\": {message}")]
pub struct DecodeError {
    lexical: String,
    datatype: NamedNode,
    message: String,
}

impl DecodeError {
    /// Builds a decode error carrying the lexical form and datatype of
    /// `literal`.
    pub fn new(literal: LiteralRef<'_>, message: impl Into<String>) -> Self {
        Self {
            lexical: literal.value().to_owned(),
            datatype: literal.datatype().into_owned(),
            message: message.into(),
        }
    }
}

pub(crate) fn encode(value: &Value) -> Result<Literal, EncodeError> {
    Ok(match value {
        Value::Boolean(v) => Literal::from(*v),
        Value::Byte(v) => Literal::new_typed_literal(v.to_string(), xsd::BYTE),
        Value::Short(v) => Literal::new_typed_literal(v.to_string(), xsd::SHORT),
        Value::Int(v) => Literal::new_typed_literal(v.to_string(), xsd::INT),
        Value::Long(v) => Literal::new_typed_literal(v.to_string(), xsd::LONG),
        Value::Integer(v) => Literal::new_typed_literal(v.to_string(), xsd::INTEGER),
        Value::Decimal(v) => Literal::new_typed_literal(v.to_plain_string(), xsd::DECIMAL),
        Value::Float(v) => Literal::from(*v),
        Value::Double(v) => Literal::from(*v),
        Value::String(v) => Literal::new_simple_literal(v.as_str()),
        Value::LangString { value, language } => {
            Literal::new_language_tagged_literal(value.as_str(), language.as_str())?
        }
        Value::Date(v) => temporal_literal(CalendarValue::from(*v), xsd::DATE),
        Value::Time(v) => temporal_literal(CalendarValue::from(*v), xsd::TIME),
        Value::DateTime(v) => temporal_literal(CalendarValue::from(*v), xsd::DATE_TIME),
        Value::OffsetDate(v) => temporal_literal(CalendarValue::try_from(*v)?, xsd::DATE),
        Value::OffsetTime(v) => temporal_literal(CalendarValue::try_from(*v)?, xsd::TIME),
        Value::OffsetDateTime(v) => temporal_literal(CalendarValue::try_from(*v)?, xsd::DATE_TIME),
        Value::Iri(_) | Value::BlankNode(_) => {
            return Err(EncodeError::UnsupportedKind { kind: value.kind() });
        }
        Value::Opaque(v) => v.clone(),
    })
}

fn temporal_literal(fields: CalendarValue, datatype: NamedNodeRef<'_>) -> Literal {
    Literal::new_typed_literal(fields.to_string(), datatype)
}

/// A decoding function for one datatype.
pub type DecodeFn = fn(LiteralRef<'_>) -> Result<Value, DecodeError>;

/// Datatype-driven decoder from RDF literals to native values.
///
/// The default table covers the XSD datatypes this crate has native types
/// for; further datatypes can be layered on with
/// [`with_handler`](LiteralDecoder::with_handler):
///
/// ```
/// use espalier_values::{LiteralDecoder, Value};
/// use oxrdf::{Literal, NamedNode};
///
/// let duration = NamedNode::new("http://www.w3.org/2001/XMLSchema#duration")?;
/// let decoder = LiteralDecoder::new().with_handler(duration.clone(), |literal| {
///     Ok(Value::String(literal.value().to_owned()))
/// });
/// let literal = Literal::new_typed_literal("PT1H", duration);
/// assert_eq!(decoder.decode(&literal)?, Value::String("PT1H".to_owned()));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug, Clone)]
pub struct LiteralDecoder {
    handlers: HashMap<String, DecodeFn>,
}

impl LiteralDecoder {
    /// Builds a decoder with the default datatype table.
    pub fn new() -> Self {
        let mut handlers: HashMap<String, DecodeFn> = HashMap::new();
        let mut register = |datatype: NamedNodeRef<'_>, handler: DecodeFn| {
            handlers.insert(datatype.as_str().to_owned(), handler);
        };
        register(xsd::BOOLEAN, decode_boolean);
        register(xsd::BYTE, decode_byte);
        register(xsd::SHORT, decode_short);
        register(xsd::INT, decode_int);
        register(xsd::LONG, decode_long);
        register(xsd::INTEGER, decode_integer);
        register(xsd::DECIMAL, decode_decimal);
        register(xsd::FLOAT, decode_float);
        register(xsd::DOUBLE, decode_double);
        register(xsd::STRING, decode_string);
        register(xsd::DATE, decode_date);
        register(xsd::TIME, decode_time);
        register(xsd::DATE_TIME, decode_date_time);
        Self { handlers }
    }

    /// Registers `handler` for `datatype`, replacing any previous handler.
    #[must_use]
    pub fn with_handler(mut self, datatype: impl Into<NamedNode>, handler: DecodeFn) -> Self {
        self.handlers.insert(datatype.into().into_string(), handler);
        self
    }

    /// Decodes `literal` into the native value its datatype maps to.
    ///
    /// Language-tagged literals always decode to [`Value::LangString`] and
    /// literals with an unregistered datatype to [`Value::Opaque`]. An error
    /// means the lexical form does not belong to a registered datatype.
    pub fn decode<'a>(&self, literal: impl Into<LiteralRef<'a>>) -> Result<Value, DecodeError> {
        let literal = literal.into();
        if let Some(language) = literal.language() {
            return Ok(Value::LangString {
                value: literal.value().to_owned(),
                language: language.to_owned(),
            });
        }
        match self.handlers.get(literal.datatype().as_str()) {
            Some(handler) => handler(literal),
            None => Ok(Value::Opaque(literal.into_owned())),
        }
    }
}

impl Default for LiteralDecoder {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_DECODER: LazyLock<LiteralDecoder> = LazyLock::new(LiteralDecoder::new);

/// Decodes `literal` with the default datatype table.
pub fn decode_default(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    DEFAULT_DECODER.decode(literal)
}

fn decode_boolean(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    match literal.value() {
        "true" => Ok(Value::Boolean(true)),
        "false" => Ok(Value::Boolean(false)),
        _ => Err(DecodeError::new(
            literal,
            "a boolean must be \"true\" or \"false\"",
        )),
    }
}

fn decode_byte(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    parse_sized::<i8>(literal).map(Value::Byte)
}

fn decode_short(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    parse_sized::<i16>(literal).map(Value::Short)
}

fn decode_int(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    parse_sized::<i32>(literal).map(Value::Int)
}

fn decode_long(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    parse_sized::<i64>(literal).map(Value::Long)
}

fn parse_sized<T: FromStr<Err = ParseIntError>>(
    literal: LiteralRef<'_>,
) -> Result<T, DecodeError> {
    literal.value().parse().map_err(|e: ParseIntError| {
        let message = match e.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                "the value does not fit the width of the datatype"
            }
            _ => "the digits are not a valid integer",
        };
        DecodeError::new(literal, message)
    })
}

fn decode_integer(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    let value = BigInt::from_str(literal.value())
        .map_err(|_| DecodeError::new(literal, "the digits are not a valid integer"))?;
    Ok(Value::Integer(Box::new(value)))
}

fn decode_decimal(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    let lexical = literal.value();
    if !is_decimal_lexical(lexical) {
        return Err(DecodeError::new(
            literal,
            "a decimal is an optional sign and digits with at most one '.'",
        ));
    }
    let value = BigDecimal::from_str(lexical)
        .map_err(|_| DecodeError::new(literal, "the digits are not a valid decimal"))?;
    Ok(Value::Decimal(Box::new(value)))
}

/// The `xsd:decimal` lexical space: an optional sign, then digits with at
/// most one dot and at least one digit overall. No exponent notation.
fn is_decimal_lexical(input: &str) -> bool {
    let unsigned = input.strip_prefix(['+', '-']).unwrap_or(input);
    let mut digits = 0_usize;
    let mut dots = 0_usize;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}

fn decode_float(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    parse_floating::<f32>(literal).map(Value::Float)
}

fn decode_double(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    parse_floating::<f64>(literal).map(Value::Double)
}

fn parse_floating<T: FromStr>(literal: LiteralRef<'_>) -> Result<T, DecodeError> {
    literal
        .value()
        .parse()
        .map_err(|_| DecodeError::new(literal, "the digits are not a valid floating-point number"))
}

fn decode_string(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    Ok(Value::String(literal.value().to_owned()))
}

fn decode_date(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    recompose(literal, calendar::parse_date(literal.value()))
}

fn decode_time(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    recompose(literal, calendar::parse_time(literal.value()))
}

fn decode_date_time(literal: LiteralRef<'_>) -> Result<Value, DecodeError> {
    recompose(literal, calendar::parse_date_time(literal.value()))
}

fn recompose(
    literal: LiteralRef<'_>,
    fields: Result<CalendarValue, CalendarParseError>,
) -> Result<Value, DecodeError> {
    fields
        .map_err(|e| DecodeError::new(literal, e.to_string()))?
        .to_value()
        .map_err(|e| DecodeError::new(literal, e.to_string()))
}
