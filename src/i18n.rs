//! Translation layer.
//!
//! Keys map to strings in embedded `locales/*.txt` files (one `key=value`
//! per line). Look-ups go through the `t!("some.key")` macro, which falls
//! back to English and finally to the key itself. The original product
//! shipped in Portuguese, so "pt" is a first-class locale here.

use std::collections::HashMap;
use std::sync::Mutex;

static STATE: Mutex<Option<Catalog>> = Mutex::new(None);

struct Catalog {
    active: String,
    /// lang code -> (key -> string)
    tables: HashMap<String, HashMap<String, String>>,
}

/// Supported languages: (code, native name).
pub const LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("pt", "Português")];

/// Load the embedded locale tables. Call once at startup, before any `t!()`.
pub fn init() {
    let mut tables = HashMap::new();
    tables.insert(
        "en".to_string(),
        parse_table(include_str!("../locales/en.txt")),
    );
    tables.insert(
        "pt".to_string(),
        parse_table(include_str!("../locales/pt.txt")),
    );

    if let Ok(mut guard) = STATE.lock() {
        *guard = Some(Catalog {
            active: "en".to_string(),
            tables,
        });
    }
}

/// Switch the active language; unknown codes fall back to English.
pub fn set_language(code: &str) {
    if let Ok(mut guard) = STATE.lock()
        && let Some(ref mut cat) = *guard
    {
        cat.active = if cat.tables.contains_key(code) {
            code.to_string()
        } else {
            "en".to_string()
        };
    }
}

pub fn current_language() -> String {
    if let Ok(guard) = STATE.lock()
        && let Some(ref cat) = *guard
    {
        return cat.active.clone();
    }
    "en".to_string()
}

/// Resolve a key: active language, then English, then the key itself.
pub fn translate(key: &str) -> String {
    if let Ok(guard) = STATE.lock()
        && let Some(ref cat) = *guard
    {
        if let Some(table) = cat.tables.get(&cat.active)
            && let Some(s) = table.get(key)
        {
            return s.clone();
        }
        if cat.active != "en"
            && let Some(table) = cat.tables.get("en")
            && let Some(s) = table.get(key)
        {
            return s.clone();
        }
    }
    key.to_string()
}

/// Best-effort system language from the usual locale environment variables.
pub fn detect_system_language() -> String {
    for var in &["LANG", "LC_ALL", "LC_MESSAGES", "LANGUAGE"] {
        if let Ok(val) = std::env::var(var)
            && let Some(code) = match_locale(&val)
        {
            return code;
        }
    }
    "en".to_string()
}

/// Match a locale string like "pt_BR.UTF-8" or "en-US" against LANGUAGES.
fn match_locale(locale: &str) -> Option<String> {
    let normalized = locale.to_lowercase().replace('_', "-");
    let tag = normalized
        .split(['.', '@'])
        .next()
        .unwrap_or(normalized.as_str());
    let primary = tag.split('-').next().unwrap_or(tag);

    for &(code, _) in LANGUAGES {
        if code == tag || code == primary {
            return Some(code.to_string());
        }
    }
    None
}

/// Parse a `key=value` locale file. `#` lines are comments.
fn parse_table(data: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in data.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

/// Usage: `t!("form.generate")` or `t!("api.blocked_reason", reason = r)`.
#[macro_export]
macro_rules! t {
    ($key:expr) => {
        $crate::i18n::translate($key)
    };
    ($key:expr, $($name:ident = $val:expr),+ $(,)?) => {{
        let mut s = $crate::i18n::translate($key);
        $(
            s = s.replace(concat!("{", stringify!($name), "}"), &format!("{}", $val));
        )+
        s
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    // No set_language here: tests run in parallel threads and the active
    // language is process-global. Missing-key fallback holds in any language.
    #[test]
    fn missing_keys_fall_back_to_the_key_itself() {
        init();
        assert_eq!(translate("does.not.exist"), "does.not.exist");
    }

    #[test]
    fn locale_matching_handles_suffixes() {
        assert_eq!(match_locale("pt_BR.UTF-8"), Some("pt".to_string()));
        assert_eq!(match_locale("en-US"), Some("en".to_string()));
        assert_eq!(match_locale("ja_JP"), None);
    }

    #[test]
    fn template_substitution() {
        init();
        set_language("en");
        let msg = t!("api.blocked_reason", reason = "OTHER");
        assert!(msg.contains("OTHER"));
        assert!(!msg.contains("{reason}"));
    }
}
