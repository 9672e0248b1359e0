//! Text rendering utilities for human-friendly error messages.
//!
//! Resolution errors name types by their short key (`Foo`, not
//! `my_app::services::Foo`), show chains with arrows and offer
//! close matches when a type name is unknown.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use sanad_support::rendering::render_chain;
///
/// let chain = vec!["UserService", "UserRepo", "Database", "UserService"];
/// assert_eq!(render_chain(&chain), "UserService → UserRepo → Database → UserService");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Strips module paths from a fully qualified type name.
///
/// This is how Sanad derives the default key of a Rust type.
///
/// ```
/// use sanad_support::rendering::shorten_type_name;
///
/// assert_eq!(shorten_type_name("my_app::services::user::UserService"), "UserService");
/// assert_eq!(
///     shorten_type_name("core::option::Option<alloc::string::String>"),
///     "Option<String>"
/// );
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | ';' | '&' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Suggests known names that look like `requested`.
///
/// Substring matches rank above shared prefixes; at most
/// `max_suggestions` names are returned, best first.
pub fn suggest_similar<'a>(
    requested: &str,
    available: impl IntoIterator<Item = &'a str>,
    max_suggestions: usize,
) -> Vec<String> {
    let requested = requested.to_lowercase();
    if requested.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&str, usize)> = available
        .into_iter()
        .filter_map(|name| {
            let lower = name.to_lowercase();
            if lower == requested {
                return None;
            }
            if lower.contains(&requested) || requested.contains(&lower) {
                return Some((name, 100));
            }

            let common = lower
                .chars()
                .zip(requested.chars())
                .take_while(|(a, b)| a == b)
                .count();
            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
