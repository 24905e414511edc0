//! crates/clearcom_core/src/i18n.rs
//!
//! Per-locale string tables and the lookup used by every page.
//!
//! Tables are JSON documents compiled into the binary. Keys are dotted paths
//! (`auth.login.title`). A key missing from the requested locale falls back to
//! English, and a key missing from English renders as the key itself.

use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Locale {
    #[default]
    En,
    Fr,
    De,
    Zh,
    Hi,
    Ar,
    Fa,
}

impl Locale {
    pub const ALL: [Locale; 7] = [
        Locale::En,
        Locale::Fr,
        Locale::De,
        Locale::Zh,
        Locale::Hi,
        Locale::Ar,
        Locale::Fa,
    ];

    pub const FALLBACK: Locale = Locale::En;

    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::De => "de",
            Locale::Zh => "zh",
            Locale::Hi => "hi",
            Locale::Ar => "ar",
            Locale::Fa => "fa",
        }
    }

    /// The language's own name, as shown in the selector.
    pub fn native_name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Fr => "Français",
            Locale::De => "Deutsch",
            Locale::Zh => "中文",
            Locale::Hi => "हिंदी",
            Locale::Ar => "العربية",
            Locale::Fa => "فارسی",
        }
    }

    pub fn is_rtl(&self) -> bool {
        matches!(self, Locale::Ar | Locale::Fa)
    }

    /// Value for the `dir` attribute of the document.
    pub fn direction(&self) -> &'static str {
        if self.is_rtl() {
            "rtl"
        } else {
            "ltr"
        }
    }

    /// Accepts a bare code or a region-tagged one (`fr-CA`, `zh_Hans`).
    pub fn from_code(code: &str) -> Option<Locale> {
        let primary = code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        Locale::ALL.into_iter().find(|l| l.code() == primary)
    }

    /// Picks the best supported locale from an `Accept-Language` header,
    /// honouring `q` weights. Ties keep header order.
    pub fn negotiate(accept_language: &str) -> Option<Locale> {
        let mut candidates: Vec<(f32, Locale)> = accept_language
            .split(',')
            .filter_map(|entry| {
                let mut parts = entry.split(';');
                let tag = parts.next()?.trim();
                let weight = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                    .unwrap_or(1.0);
                if weight <= 0.0 {
                    return None;
                }
                Locale::from_code(tag).map(|locale| (weight, locale))
            })
            .collect();
        candidates.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        candidates.first().map(|(_, locale)| *locale)
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s).ok_or_else(|| format!("unsupported language '{}'", s))
    }
}

fn embedded_table(locale: Locale) -> &'static str {
    match locale {
        Locale::En => include_str!("../locales/en.json"),
        Locale::Fr => include_str!("../locales/fr.json"),
        Locale::De => include_str!("../locales/de.json"),
        Locale::Zh => include_str!("../locales/zh.json"),
        Locale::Hi => include_str!("../locales/hi.json"),
        Locale::Ar => include_str!("../locales/ar.json"),
        Locale::Fa => include_str!("../locales/fa.json"),
    }
}

/// Holds the parsed string tables for every supported locale.
#[derive(Debug, Clone)]
pub struct Translator {
    tables: HashMap<Locale, Value>,
}

impl Translator {
    /// Parses the tables compiled into the binary.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        let mut tables = HashMap::with_capacity(Locale::ALL.len());
        for locale in Locale::ALL {
            tables.insert(locale, serde_json::from_str(embedded_table(locale))?);
        }
        Ok(Self { tables })
    }

    /// Builds a translator from already-parsed tables.
    pub fn from_tables(tables: HashMap<Locale, Value>) -> Self {
        Self { tables }
    }

    fn lookup(&self, locale: Locale, key: &str) -> Option<&str> {
        let mut node = self.tables.get(&locale)?;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        node.as_str()
    }

    /// Returns the string at `key`, falling back to English, then to the key.
    pub fn t(&self, locale: Locale, key: &str) -> String {
        self.lookup(locale, key)
            .or_else(|| self.lookup(Locale::FALLBACK, key))
            .unwrap_or(key)
            .to_string()
    }

    /// Like [`Translator::t`], substituting `{{name}}` placeholders.
    pub fn t_with(&self, locale: Locale, key: &str, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.t(locale, key), |text, (name, value)| {
            text.replace(&format!("{{{{{}}}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn leaf_keys(prefix: &str, value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    let path = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", prefix, k)
                    };
                    leaf_keys(&path, v, out);
                }
            }
            _ => out.push(prefix.to_string()),
        }
    }

    #[test]
    fn embedded_tables_parse() {
        let translator = Translator::embedded().expect("embedded tables are valid JSON");
        assert_eq!(translator.t(Locale::En, "common.signIn"), "Sign In");
        assert_eq!(translator.t(Locale::Fr, "common.signIn"), "Se connecter");
    }

    #[test]
    fn every_locale_only_uses_english_keys() {
        let translator = Translator::embedded().unwrap();
        let mut english = Vec::new();
        leaf_keys("", &translator.tables[&Locale::En], &mut english);
        for locale in Locale::ALL {
            let mut keys = Vec::new();
            leaf_keys("", &translator.tables[&locale], &mut keys);
            for key in keys {
                assert!(english.contains(&key), "{} has stray key {}", locale, key);
            }
        }
    }

    #[test]
    fn missing_key_falls_back_to_english_then_key() {
        let mut tables = HashMap::new();
        tables.insert(Locale::En, json!({"a": {"b": "english"}, "only": "en-only"}));
        tables.insert(Locale::De, json!({"a": {"b": "deutsch"}}));
        let translator = Translator::from_tables(tables);

        assert_eq!(translator.t(Locale::De, "a.b"), "deutsch");
        assert_eq!(translator.t(Locale::De, "only"), "en-only");
        assert_eq!(translator.t(Locale::Zh, "a.b"), "english");
        assert_eq!(translator.t(Locale::De, "no.such.key"), "no.such.key");
        // A non-leaf path is not a string.
        assert_eq!(translator.t(Locale::En, "a"), "a");
    }

    #[test]
    fn placeholders_are_substituted() {
        let mut tables = HashMap::new();
        tables.insert(Locale::En, json!({"greet": "Signed in as {{email}}"}));
        let translator = Translator::from_tables(tables);
        assert_eq!(
            translator.t_with(Locale::En, "greet", &[("email", "ada@example.com")]),
            "Signed in as ada@example.com"
        );
    }

    #[test]
    fn codes_and_negotiation() {
        assert_eq!(Locale::from_code("fr-CA"), Some(Locale::Fr));
        assert_eq!(Locale::from_code("ZH_hans"), Some(Locale::Zh));
        assert_eq!(Locale::from_code("es"), None);
        assert_eq!(
            Locale::negotiate("es-ES, de;q=0.7, fr;q=0.9, en;q=0.8"),
            Some(Locale::Fr)
        );
        assert_eq!(Locale::negotiate("ar"), Some(Locale::Ar));
        assert_eq!(Locale::negotiate("fr;q=0, es"), None);
        assert_eq!(Locale::negotiate(""), None);
    }

    #[test]
    fn right_to_left_locales() {
        assert!(Locale::Ar.is_rtl());
        assert!(Locale::Fa.is_rtl());
        assert_eq!(Locale::Hi.direction(), "ltr");
    }
}
