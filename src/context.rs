use std::env;

use once_cell::sync::OnceCell;

static DEBUG: OnceCell<bool> = OnceCell::new();
static SECRET: OnceCell<String> = OnceCell::new();

fn env_bool<T: AsRef<str>>(s: T) -> bool {
    let s = s.as_ref().trim();
    !(s.is_empty() || s == "0" || s.to_ascii_lowercase() == "false")
}

pub fn debug() -> bool {
    *DEBUG.get_or_init(|| env::var("DEBUG").map(env_bool).unwrap_or(false))
}

/// The key that signs session tokens. The server refuses to start without it.
pub fn secret() -> &'static str {
    &*SECRET.get_or_init(|| env::var("SECRET").expect("environment variable SECRET is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bool_values() {
        assert!(env_bool("1"));
        assert!(env_bool("true"));
        assert!(env_bool(" yes "));
        assert!(!env_bool("0"));
        assert!(!env_bool("FALSE"));
        assert!(!env_bool(""));
    }
}
