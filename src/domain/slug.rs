use serde::Serialize;

/// A URL-safe post identifier: lowercase ASCII letters, digits and single
/// interior hyphens, at most 200 characters.
#[derive(Debug, Clone, Serialize)]
pub struct Slug(String);

impl Slug {
    pub fn parse(s: String) -> Result<Slug, String> {
        let is_empty = s.is_empty();
        let is_too_long = s.len() > 200;
        let has_invalid_characters = !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        let has_dangling_hyphen = s.starts_with('-') || s.ends_with('-');
        let has_consecutive_hyphens = s.contains("--");

        if is_empty
            || is_too_long
            || has_invalid_characters
            || has_dangling_hyphen
            || has_consecutive_hyphens
        {
            Err(format!("{} is not a valid slug.", s))
        } else {
            Ok(Self(s))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
