//! Helpers for the IRI-shaped identifiers found in policy documents.

/// Returns the fragment after the last `/` or `#`.
///
/// `http://www.w3.org/ns/odrl/2/read` becomes `read`,
/// `https://w3id.org/dpv#Citizen` becomes `Citizen`. Strings without a
/// separator come back unchanged.
pub fn local_name(iri: &str) -> &str {
    let tail = iri.rsplit('/').next().unwrap_or(iri);
    tail.rsplit('#').next().unwrap_or(tail)
}

/// Like [`local_name`], but also strips a compact-IRI prefix (`odrl:eq` → `eq`).
pub fn term_name(iri: &str) -> &str {
    let name = local_name(iri);
    name.rsplit(':').next().unwrap_or(name)
}
