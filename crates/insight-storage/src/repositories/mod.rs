pub mod address;
pub mod client;
pub mod owner;
pub mod property;
pub mod rental;
pub mod review;

pub use address::{AddressFilter, AddressRepository, SqliteAddressRepository};
pub use client::{ClientRepository, SqliteClientRepository};
pub use owner::{OwnerRepository, SqliteOwnerRepository};
pub use property::{PropertyFilter, PropertyRepository, SqlitePropertyRepository};
pub use rental::{RentalRepository, SqliteRentalRepository};
pub use review::{ReviewRepository, SqliteReviewRepository};

/// Build a `LIKE` pattern matching `term` as a literal substring.
///
/// `%`, `_` and `\` in the term are escaped; queries pair the pattern with
/// `ESCAPE '\'`. SQLite's `LIKE` folds case for ASCII letters only.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("Centro"), "%Centro%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
