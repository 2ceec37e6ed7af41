//! Artifact key derivation

use uuid::Uuid;

/// How store keys are derived when an artifact is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Key is the sanitized basename of the source file. The same name
    /// always maps to the same entry, so repeated requests reuse the
    /// existing artifact. Distinct URLs sharing a basename alias to one
    /// entry and overwrite each other.
    DerivedName,
    /// Key is a fresh UUID per insertion. Collision-free, but every
    /// request materializes a new artifact.
    Random,
}

impl KeyPolicy {
    /// Parse from a config string. Anything other than "random" falls
    /// back to `DerivedName`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => KeyPolicy::Random,
            _ => KeyPolicy::DerivedName,
        }
    }

    /// Derive the store key for an artifact named `name`.
    pub fn derive_key(&self, name: &str) -> String {
        match self {
            KeyPolicy::DerivedName => sanitize_file_name(name),
            KeyPolicy::Random => Uuid::new_v4().to_string(),
        }
    }
}

/// Normalize a filename into a form usable both as a store key and as a
/// path component: ASCII alphanumerics, `.`, `-` and `_` pass through,
/// everything else becomes `_`. Leading and trailing dots are stripped so
/// a key can never be `.` or `..`. Empty input falls back to "download".
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_passthrough() {
        assert_eq!(sanitize_file_name("report-2024_v2.zip"), "report-2024_v2.zip");
    }

    #[test]
    fn test_sanitize_replaces_special_chars() {
        assert_eq!(sanitize_file_name("my file (1).pdf"), "my_file__1_.pdf");
        assert_eq!(sanitize_file_name("caf\u{e9}.txt"), "caf_.txt");
    }

    #[test]
    fn test_sanitize_strips_dot_components() {
        assert_eq!(sanitize_file_name(".."), "download");
        assert_eq!(sanitize_file_name("..hidden"), "hidden");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_file_name(""), "download");
        assert_eq!(sanitize_file_name("   "), "download");
    }

    #[test]
    fn test_derived_name_is_stable() {
        let policy = KeyPolicy::DerivedName;
        assert_eq!(policy.derive_key("a b.zip"), policy.derive_key("a b.zip"));
        // The documented collision: different inputs can normalize alike.
        assert_eq!(policy.derive_key("a b.zip"), policy.derive_key("a?b.zip"));
    }

    #[test]
    fn test_random_keys_are_unique() {
        let policy = KeyPolicy::Random;
        assert_ne!(policy.derive_key("same.zip"), policy.derive_key("same.zip"));
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(KeyPolicy::parse("random"), KeyPolicy::Random);
        assert_eq!(KeyPolicy::parse("RANDOM"), KeyPolicy::Random);
        assert_eq!(KeyPolicy::parse("name"), KeyPolicy::DerivedName);
        assert_eq!(KeyPolicy::parse(""), KeyPolicy::DerivedName);
    }
}
