//! Builds the store-native boolean expression for a keyword filter.

/// Each keyword is one candidate match; candidates are ORed together. A
/// keyword containing spaces requires all of its words, so it becomes a
/// parenthesized AND group: `["chicken rice", "promo"]` turns into
/// `(chicken AND rice) OR promo`.
pub fn build_query_string(keywords: &[String]) -> String {
    let candidates: Vec<String> = keywords
        .iter()
        .map(|keyword| {
            if keyword.contains(' ') {
                format!("({})", keyword.replace(' ', " AND "))
            } else {
                keyword.clone()
            }
        })
        .collect();

    candidates.join(" OR ")
}
