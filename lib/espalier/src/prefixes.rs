//! The well-known prefix table applied by writing sessions.

/// Returns the default prefix table, pairing the usual short prefixes of the
/// W3C, Dublin Core and SDMX vocabularies with their namespace IRIs.
///
/// Writing sessions start from this table when the caller does not supply
/// their own.
///
/// ```
/// use espalier::default_prefixes;
///
/// assert!(
///     default_prefixes()
///         .iter()
///         .any(|&(prefix, iri)| prefix == "xsd" && iri == "http://www.w3.org/2001/XMLSchema#")
/// )
/// ```
pub const fn default_prefixes() -> &'static [(&'static str, &'static str)] {
    &[
        ("dcat", "http://www.w3.org/ns/dcat#"),
        ("dcterms", "http://purl.org/dc/terms/"),
        ("owl", "http://www.w3.org/2002/07/owl#"),
        ("qb", "http://purl.org/linked-data/cube#"),
        ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
        ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
        ("sdmx-attribute", "http://purl.org/linked-data/sdmx/2009/attribute#"),
        ("sdmx-concept", "http://purl.org/linked-data/sdmx/2009/concept#"),
        ("sdmx-dimension", "http://purl.org/linked-data/sdmx/2009/dimension#"),
        ("sdmx-measure", "http://purl.org/linked-data/sdmx/2009/measure#"),
        ("skos", "http://www.w3.org/2004/02/skos/core#"),
        ("void", "http://rdfs.org/ns/void#"),
        ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ]
}
