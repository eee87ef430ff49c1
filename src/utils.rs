macro_rules! regex {
    ($pattern: expr) => {{
        use once_cell::sync::OnceCell;
        use regex::Regex;
        static CELL: OnceCell<Regex> = OnceCell::new();
        CELL.get_or_init(|| Regex::new($pattern).unwrap())
    }};
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn merge_blank(s: &str) -> String {
    regex!(r"\s+").replace_all(s.trim(), " ").to_string()
}

pub fn inner_map<T, E, U, F: FnOnce(T) -> U>(x: Result<Option<T>, E>, mapper: F) -> Result<Option<U>, E> {
    x.map(|inner| inner.map(mapper))
}

/// Tells an absent field apart from an explicit `null` in a partial
/// update. Pair with `#[serde(default, deserialize_with = ...)]`:
/// absent stays `None`, `null` becomes `Some(None)`.
pub fn explicit_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

#[test]
fn test_merge_blank() {
    assert_eq!(merge_blank("  the   lost   mine \t of\nphandelver "), "the lost mine of phandelver");
    assert_eq!(merge_blank("already clean"), "already clean");
    assert_eq!(merge_blank("   "), "");
}

#[test]
fn test_inner_map() {
    let ok: Result<Option<i32>, ()> = Ok(Some(3));
    assert_eq!(inner_map(ok, |n| n * 2), Ok(Some(6)));
    let none: Result<Option<i32>, ()> = Ok(None);
    assert_eq!(inner_map(none, |n| n * 2), Ok(None));
}
