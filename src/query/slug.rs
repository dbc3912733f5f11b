/// Builds the URL slug for a make/model pair
///
/// Lowercases, turns every run of non-alphanumeric characters into a single
/// hyphen and strips hyphens from both ends. An empty `make` yields the
/// model-only slug.
///
/// # Examples
///
/// ```
/// use rent_scout::query::slug;
///
/// assert_eq!(slug("Mercedes", "G Class"), "mercedes-g-class");
/// assert_eq!(slug("", "Range Rover Sport"), "range-rover-sport");
/// ```
pub fn slug(make: &str, model: &str) -> String {
    let combined = if make.is_empty() {
        model.to_lowercase()
    } else {
        format!("{}-{}", make, model).to_lowercase()
    };

    let mut out = String::with_capacity(combined.len());
    let mut pending_hyphen = false;

    for c in combined.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    out
}
