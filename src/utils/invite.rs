//! Invite code generation and format checks.
use crate::constants::{DEFAULT_INVITE_CODE_LENGTH, MIN_INVITE_CODE_LENGTH};
use rand::Rng;

/// Characters allowed in invite codes. I, O, 0 and 1 are left out so codes
/// can be read aloud and typed without confusion.
pub const INVITE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate an invite code of the default length.
pub fn generate_invite_code() -> String {
    generate_invite_code_with_length(DEFAULT_INVITE_CODE_LENGTH)
}

/// Generate an invite code of `length` characters drawn uniformly from [`INVITE_CHARSET`].
pub fn generate_invite_code_with_length(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..INVITE_CHARSET.len());
            INVITE_CHARSET[idx] as char
        })
        .collect()
}

/// Checks length and alphabet only. Whether the code exists is up to the backend.
pub fn is_valid_format(code: &str) -> bool {
    code.chars().count() >= MIN_INVITE_CODE_LENGTH
        && code
            .chars()
            .all(|c| c.is_ascii() && INVITE_CHARSET.contains(&(c as u8)))
}

/// Trim whitespace and upper-case user input before validating it.
pub fn normalize_invite_code(input: &str) -> String {
    input.trim().to_ascii_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charset_excludes_ambiguous_glyphs() {
        for c in [b'I', b'O', b'0', b'1'] {
            assert!(!INVITE_CHARSET.contains(&c));
        }
        assert_eq!(INVITE_CHARSET.len(), 32);
    }

    #[test]
    fn test_generated_codes_match_length_and_charset() {
        for length in [6, 8, 12, 20] {
            for _ in 0..50 {
                let code = generate_invite_code_with_length(length);
                assert_eq!(code.len(), length);
                assert!(code.bytes().all(|b| INVITE_CHARSET.contains(&b)));
                assert!(is_valid_format(&code));
            }
        }
        assert_eq!(generate_invite_code().len(), DEFAULT_INVITE_CODE_LENGTH);
    }

    #[test]
    fn test_codes_are_not_constant() {
        let first = generate_invite_code_with_length(16);
        let second = generate_invite_code_with_length(16);
        assert_ne!(first, second);
    }

    #[test]
    fn test_is_valid_format() {
        assert!(is_valid_format("ABC234"));
        assert!(is_valid_format("XYZ789PQ"));
        assert!(!is_valid_format("ABC23"));
        assert!(!is_valid_format(""));
        assert!(!is_valid_format("ABCOEF"));
        assert!(!is_valid_format("ABCIEF"));
        assert!(!is_valid_format("ABC0EF"));
        assert!(!is_valid_format("ABC1EF"));
        assert!(!is_valid_format("abcdef"));
        assert!(!is_valid_format("ABC-DEF"));
        assert!(!is_valid_format("ÄBCDEFG"));
    }

    #[test]
    fn test_normalize_invite_code() {
        assert_eq!(normalize_invite_code("  abc234 \n"), "ABC234");
        assert!(is_valid_format(&normalize_invite_code(" xyz789 ")));
    }
}
