//! Generated form data for signup scenarios.

use fake::faker::name::en::FirstName;
use fake::Fake;
use uuid::Uuid;

/// Unique throwaway email, new on every call. Signup dedupes on the server,
/// so reruns must never reuse an address.
pub fn random_email() -> String {
    let tag = Uuid::new_v4().simple().to_string();
    format!("testuser_{}@example.com", &tag[..8])
}

/// Realistic first name for form fills.
pub fn random_first_name() -> String {
    FirstName().fake()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_have_the_expected_shape() {
        let email = random_email();
        assert!(email.starts_with("testuser_"));
        assert!(email.ends_with("@example.com"));
        assert_eq!(email.len(), "testuser_".len() + 8 + "@example.com".len());
    }

    #[test]
    fn emails_are_unique_across_calls() {
        assert_ne!(random_email(), random_email());
    }

    #[test]
    fn names_are_non_empty() {
        assert!(!random_first_name().is_empty());
    }
}
