//! URL slug generation and validation.
//!
//! Categories, collections and products carry a unique URL-friendly slug.
//! When a create request omits it, the slug is prepopulated from the name.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum stored slug length (matches the column width).
pub const MAX_SLUG_LENGTH: usize = 255;

static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:[-_][a-z0-9]+)*$").expect("valid slug regex"));

/// Fold common Latin accented characters to their ASCII base letter.
fn fold_char(c: char) -> Option<char> {
    let folded = match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' | 'å' | 'Á' | 'À' | 'Ä' | 'Â' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ë' | 'ê' | 'É' | 'È' | 'Ë' | 'Ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' | 'Í' | 'Ì' | 'Ï' | 'Î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' | 'Ó' | 'Ò' | 'Ö' | 'Ô' | 'Õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' | 'Ú' | 'Ù' | 'Ü' | 'Û' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        c if c.is_ascii_alphanumeric() => c.to_ascii_lowercase(),
        _ => return None,
    };
    Some(folded)
}

/// Build a slug from a display name.
///
/// Lowercases, folds accents, collapses every run of other characters into a
/// single `-`, and trims separators from both ends.
///
/// ```
/// use catalog_core::slugify;
///
/// assert_eq!(slugify("Camisetas de Algodón"), "camisetas-de-algodon");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars() {
        match fold_char(c) {
            Some(folded) => {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(folded);
            }
            None => pending_dash = true,
        }
        if slug.len() >= MAX_SLUG_LENGTH {
            break;
        }
    }

    slug.truncate(MAX_SLUG_LENGTH);
    slug.trim_end_matches('-').to_string()
}

/// Check that a slug is non-empty, lowercase, and uses only `a-z0-9-_`.
pub fn is_valid_slug(slug: &str) -> bool {
    slug.len() <= MAX_SLUG_LENGTH && SLUG_PATTERN.is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Summer Collection"), "summer-collection");
    }

    #[test]
    fn test_slugify_folds_accents() {
        assert_eq!(slugify("Categorías Niño"), "categorias-nino");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  T-Shirts  &  Tops!! "), "t-shirts-tops");
    }

    #[test]
    fn test_slugify_empty_when_no_alphanumerics() {
        assert_eq!(slugify("!!! ???"), "");
    }

    #[test]
    fn test_slugify_truncates() {
        let long = "a".repeat(400);
        assert_eq!(slugify(&long).len(), MAX_SLUG_LENGTH);
    }

    #[test]
    fn test_slugify_output_is_valid() {
        for name in ["Shoes", "Zapatos de Piel", "100% Cotton", "USB-C Cables"] {
            let slug = slugify(name);
            assert!(is_valid_slug(&slug), "{} -> {} should be valid", name, slug);
        }
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("red-shoes"));
        assert!(is_valid_slug("red_shoes_2"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Red-Shoes"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("two--dashes"));
        assert!(!is_valid_slug("has space"));
    }
}
