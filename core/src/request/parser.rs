use std::collections::HashMap;

/// Decodes `key=value` pairs of a query string. A leading `?` is ignored and
/// pairs without `=` are skipped.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            match (parts.next(), parts.next()) {
                (Some(key), Some(value)) if !key.is_empty() => Some((
                    urlencoding::decode(&key.replace('+', " ")).ok()?.into_owned(),
                    urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned(),
                )),
                _ => None,
            }
        })
        .collect()
}

/// Encodes pairs as a query string, preserving their order.
pub fn build_query_string(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Joins two path fragments with exactly the separator `a` is missing.
pub fn add_to_path(a: &str, b: &str) -> String {
    if a.ends_with('/') {
        format!("{}{}", a, b)
    } else {
        format!("{}/{}", a, b)
    }
}
