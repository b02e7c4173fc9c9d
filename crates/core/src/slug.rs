//! URL slug generation for forms.
//!
//! Slugs are derived from the form title at creation time: lowercase,
//! non-alphanumeric runs collapsed to single hyphens, truncated to 50
//! characters. Collision resolution (`my-form`, `my-form-1`, `my-form-2`)
//! happens in the repository layer, which can see existing slugs.

/// Maximum length of the base slug before any collision suffix.
pub const MAX_SLUG_LEN: usize = 50;

/// Derive a URL-safe base slug from a form title.
///
/// # Examples
///
/// ```
/// use formhub_core::slug::slugify;
///
/// assert_eq!(slugify("My Form"), "my-form");
/// assert_eq!(slugify("  Hello,  World!  "), "hello-world");
/// assert_eq!(slugify("Événement 2026"), "v-nement-2026");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true; // suppress leading hyphens

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.is_empty() {
        // Titles with no ASCII alphanumerics still need a usable slug;
        // the collision suffix keeps these unique.
        "form".to_string()
    } else {
        slug
    }
}

/// Append the Nth collision suffix to a base slug.
pub fn with_suffix(base: &str, n: u32) -> String {
    format!("{base}-{n}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_title() {
        assert_eq!(slugify("My Form"), "my-form");
    }

    #[test]
    fn punctuation_collapses() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn leading_trailing_noise() {
        assert_eq!(slugify("  --Community Survey--  "), "community-survey");
    }

    #[test]
    fn already_slug_like() {
        assert_eq!(slugify("volunteer-signup-2026"), "volunteer-signup-2026");
    }

    #[test]
    fn truncates_to_fifty() {
        let title = "a".repeat(80);
        assert_eq!(slugify(&title).len(), MAX_SLUG_LEN);
    }

    #[test]
    fn truncation_never_ends_with_hyphen() {
        // 50th character lands on a separator
        let title = format!("{} {}", "a".repeat(49), "b".repeat(20));
        let slug = slugify(&title);
        assert!(!slug.ends_with('-'));
        assert_eq!(slug, "a".repeat(49));
    }

    #[test]
    fn empty_and_symbol_only_titles() {
        assert_eq!(slugify(""), "form");
        assert_eq!(slugify("!!!"), "form");
    }

    #[test]
    fn suffix_format() {
        assert_eq!(with_suffix("my-form", 1), "my-form-1");
        assert_eq!(with_suffix("my-form", 12), "my-form-12");
    }
}
