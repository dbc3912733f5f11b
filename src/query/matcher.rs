use crate::query::CarQuery;

/// Decides whether a page path belongs to a query
///
/// True when the lowercased path contains the query's `make-model` slug or
/// its model-only slug. Many vendors name pages after the model alone, so
/// both are tried. An empty slug never matches.
pub fn matches(url_path: &str, query: &CarQuery) -> bool {
    let path = url_path.to_lowercase();

    [query.full_slug(), query.model_slug()]
        .iter()
        .any(|slug| !slug.is_empty() && path.contains(slug.as_str()))
}
