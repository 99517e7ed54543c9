//! Descriptors for the statement serialization formats and their resolution.

use oxrdfio::RdfFormat;
use std::fmt;

/// A concrete serialization format for statements.
///
/// Each format carries a short tag, a file extension and a media type, and
/// declares whether it can hold named graph contexts and whether the reading
/// and writing sessions can process it.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum StatementFormat {
    /// [N-Quads](https://www.w3.org/TR/n-quads/)
    NQuads,
    /// [N-Triples](https://www.w3.org/TR/n-triples/)
    NTriples,
    /// [RDF/XML](https://www.w3.org/TR/rdf-syntax-grammar/)
    RdfXml,
    /// [TriG](https://www.w3.org/TR/trig/)
    TriG,
    /// [Turtle](https://www.w3.org/TR/turtle/)
    Turtle,
    /// [RDF4J binary RDF](https://rdf4j.org/documentation/reference/rdf4j-binary/)
    ///
    /// The format is registered so its tag resolves, but no session can read
    /// or write it.
    Binary,
}

impl StatementFormat {
    /// The format canonical name.
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(StatementFormat::NTriples.name(), "N-Triples")
    /// ```
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::NQuads => "N-Quads",
            Self::NTriples => "N-Triples",
            Self::RdfXml => "RDF/XML",
            Self::TriG => "TriG",
            Self::Turtle => "Turtle",
            Self::Binary => "binary RDF",
        }
    }

    /// The format short tag, the highest priority key of [`resolve`](Self::resolve).
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(StatementFormat::Turtle.tag(), "ttl")
    /// ```
    #[inline]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::NQuads => "nq",
            Self::NTriples => "nt",
            Self::RdfXml => "rdf",
            Self::TriG => "trig",
            Self::Turtle => "ttl",
            Self::Binary => "brf",
        }
    }

    /// The format recommended file extension.
    #[inline]
    pub const fn file_extension(self) -> &'static str {
        match self {
            Self::NQuads => "nq",
            Self::NTriples => "nt",
            Self::RdfXml => "rdf",
            Self::TriG => "trig",
            Self::Turtle => "ttl",
            Self::Binary => "brf",
        }
    }

    /// The format [IANA media type](https://tools.ietf.org/html/rfc2046).
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(StatementFormat::Turtle.media_type(), "text/turtle")
    /// ```
    #[inline]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::NQuads => "application/n-quads",
            Self::NTriples => "application/n-triples",
            Self::RdfXml => "application/rdf+xml",
            Self::TriG => "application/trig",
            Self::Turtle => "text/turtle",
            Self::Binary => "application/x-binary-rdf",
        }
    }

    /// Checks if the format can encode quads and not only triples.
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert!(StatementFormat::NQuads.supports_datasets());
    /// assert!(!StatementFormat::Turtle.supports_datasets());
    /// ```
    #[inline]
    pub const fn supports_datasets(self) -> bool {
        matches!(self, Self::NQuads | Self::TriG)
    }

    /// Checks if reading sessions can parse the format.
    #[inline]
    pub const fn supports_reading(self) -> bool {
        !matches!(self, Self::Binary)
    }

    /// Checks if writing sessions can serialize the format.
    #[inline]
    pub const fn supports_writing(self) -> bool {
        !matches!(self, Self::Binary)
    }

    /// Looks for a known format from its short tag.
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(StatementFormat::from_tag("nt"), Some(StatementFormat::NTriples))
    /// ```
    #[inline]
    pub fn from_tag(tag: &str) -> Option<Self> {
        const TAGS: [(&str, StatementFormat); 6] = [
            ("brf", StatementFormat::Binary),
            ("nq", StatementFormat::NQuads),
            ("nt", StatementFormat::NTriples),
            ("rdf", StatementFormat::RdfXml),
            ("trig", StatementFormat::TriG),
            ("ttl", StatementFormat::Turtle),
        ];
        for (candidate_tag, candidate_id) in TAGS {
            if candidate_tag.eq_ignore_ascii_case(tag) {
                return Some(candidate_id);
            }
        }
        None
    }

    /// Looks for a known format from a file extension.
    ///
    /// It supports some aliases.
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(StatementFormat::from_extension("xml"), Some(StatementFormat::RdfXml))
    /// ```
    #[inline]
    pub fn from_extension(extension: &str) -> Option<Self> {
        const EXTENSIONS: [(&str, StatementFormat); 7] = [
            ("brf", StatementFormat::Binary),
            ("nq", StatementFormat::NQuads),
            ("nt", StatementFormat::NTriples),
            ("rdf", StatementFormat::RdfXml),
            ("trig", StatementFormat::TriG),
            ("ttl", StatementFormat::Turtle),
            ("xml", StatementFormat::RdfXml),
        ];
        for (candidate_extension, candidate_id) in EXTENSIONS {
            if candidate_extension.eq_ignore_ascii_case(extension) {
                return Some(candidate_id);
            }
        }
        None
    }

    /// Looks for a known format from a media type.
    ///
    /// It supports some media type aliases.
    /// For example, `application/xml` is going to be considered as RDF/XML.
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(
    ///     StatementFormat::from_media_type("text/turtle; charset=utf-8"),
    ///     Some(StatementFormat::Turtle)
    /// )
    /// ```
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        const MEDIA_SUBTYPES: [(&str, StatementFormat); 10] = [
            ("binary-rdf", StatementFormat::Binary),
            ("n-quads", StatementFormat::NQuads),
            ("n-triples", StatementFormat::NTriples),
            ("nquads", StatementFormat::NQuads),
            ("ntriples", StatementFormat::NTriples),
            ("plain", StatementFormat::NTriples),
            ("rdf+xml", StatementFormat::RdfXml),
            ("trig", StatementFormat::TriG),
            ("turtle", StatementFormat::Turtle),
            ("xml", StatementFormat::RdfXml),
        ];
        const UTF8_CHARSETS: [&str; 3] = ["ascii", "utf8", "utf-8"];

        let (type_subtype, parameters) = media_type.split_once(';').unwrap_or((media_type, ""));
        let (r#type, subtype) = type_subtype.split_once('/')?;
        let r#type = r#type.trim();
        if !r#type.eq_ignore_ascii_case("application") && !r#type.eq_ignore_ascii_case("text") {
            return None;
        }
        let subtype = subtype.trim();
        let subtype = subtype.strip_prefix("x-").unwrap_or(subtype);
        for (candidate_subtype, candidate_id) in MEDIA_SUBTYPES {
            if candidate_subtype.eq_ignore_ascii_case(subtype) {
                for parameter in parameters.split(';') {
                    if let Some((key, value)) = parameter.split_once('=') {
                        if key.trim().eq_ignore_ascii_case("charset")
                            && !UTF8_CHARSETS
                                .iter()
                                .any(|c| c.eq_ignore_ascii_case(value.trim()))
                        {
                            return None; // No other charset than UTF-8 is supported
                        }
                    }
                }
                return Some(candidate_id);
            }
        }
        None
    }

    /// Resolves the format for a destination, from an explicit identifier or
    /// from the destination trailing extension.
    ///
    /// An explicit identifier is tried as a short tag first, then as a file
    /// extension, then as a media type. Without one, the destination must
    /// carry a known trailing extension.
    ///
    /// ```
    /// use espalier::StatementFormat;
    ///
    /// assert_eq!(StatementFormat::resolve("out.ttl", None)?, StatementFormat::Turtle);
    /// assert_eq!(
    ///     StatementFormat::resolve("dump.bin", Some("application/trig"))?,
    ///     StatementFormat::TriG
    /// );
    /// assert!(StatementFormat::resolve("out.xyz", None).is_err());
    /// # Result::<_, espalier::FormatError>::Ok(())
    /// ```
    pub fn resolve(destination: &str, explicit: Option<&str>) -> Result<Self, FormatError> {
        if let Some(identifier) = explicit {
            return Self::from_tag(identifier)
                .or_else(|| Self::from_extension(identifier))
                .or_else(|| Self::from_media_type(identifier))
                .ok_or_else(|| FormatError::UnknownIdentifier {
                    identifier: identifier.into(),
                });
        }
        destination
            .rsplit_once('.')
            .and_then(|(_, extension)| Self::from_extension(extension))
            .ok_or_else(|| FormatError::Unresolvable {
                destination: destination.into(),
            })
    }

    /// The engine counterpart of the format, when the engine has one.
    #[inline]
    pub(crate) const fn engine_format(self) -> Option<RdfFormat> {
        match self {
            Self::NQuads => Some(RdfFormat::NQuads),
            Self::NTriples => Some(RdfFormat::NTriples),
            Self::RdfXml => Some(RdfFormat::RdfXml),
            Self::TriG => Some(RdfFormat::TriG),
            Self::Turtle => Some(RdfFormat::Turtle),
            Self::Binary => None,
        }
    }
}

impl fmt::Display for StatementFormat {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error raised when a statement format cannot be resolved or used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The explicit identifier matches no known tag, extension or media type.
    #[error("unknown format identifier: {identifier}")]
    UnknownIdentifier {
        /// The identifier as supplied by the caller.
        identifier: String,
    },
    /// The destination does not determine a format on its own.
    #[error("no format is resolvable for \"{destination}\": supply an explicit format")]
    Unresolvable {
        /// The destination the resolution ran against.
        destination: String,
    },
    /// The format is resolvable but sessions cannot process it.
    #[error("the {} format is not supported", .format.name())]
    Unsupported {
        /// The resolved but unusable format.
        format: StatementFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_identifiers_outrank_the_destination() {
        assert_eq!(
            StatementFormat::resolve("out.ttl", Some("nq")),
            Ok(StatementFormat::NQuads)
        );
        assert_eq!(
            StatementFormat::resolve("out.ttl", Some("application/trig")),
            Ok(StatementFormat::TriG)
        );
    }

    #[test]
    fn destinations_resolve_by_trailing_extension() {
        assert_eq!(
            StatementFormat::resolve("out.ttl", None),
            Ok(StatementFormat::Turtle)
        );
        assert_eq!(
            StatementFormat::resolve("dir.d/dump.backup.nq", None),
            Ok(StatementFormat::NQuads)
        );
        assert_eq!(
            StatementFormat::resolve("graph.RDF", None),
            Ok(StatementFormat::RdfXml)
        );
    }

    #[test]
    fn unresolvable_destinations_name_the_destination() {
        assert_eq!(
            StatementFormat::resolve("out.xyz", None),
            Err(FormatError::Unresolvable {
                destination: "out.xyz".into()
            })
        );
        assert_eq!(
            StatementFormat::resolve("no-extension", None),
            Err(FormatError::Unresolvable {
                destination: "no-extension".into()
            })
        );
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        assert_eq!(
            StatementFormat::resolve("out.ttl", Some("parquet")),
            Err(FormatError::UnknownIdentifier {
                identifier: "parquet".into()
            })
        );
    }

    #[test]
    fn media_types_ignore_parameters_but_not_foreign_charsets() {
        assert_eq!(
            StatementFormat::from_media_type("text/turtle; charset=UTF-8"),
            Some(StatementFormat::Turtle)
        );
        assert_eq!(
            StatementFormat::from_media_type("text/turtle; charset=latin1"),
            None
        );
        assert_eq!(
            StatementFormat::from_media_type("application/x-binary-rdf"),
            Some(StatementFormat::Binary)
        );
        assert_eq!(StatementFormat::from_media_type("video/turtle"), None);
    }

    #[test]
    fn the_binary_format_resolves_but_has_no_capabilities() {
        let format = StatementFormat::resolve("dump.brf", None);
        assert_eq!(format, Ok(StatementFormat::Binary));
        assert!(!StatementFormat::Binary.supports_reading());
        assert!(!StatementFormat::Binary.supports_writing());
        assert!(StatementFormat::Binary.engine_format().is_none());
    }
}
