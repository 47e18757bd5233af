use std::str::FromStr;

use garde::Validate;
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_LENGTH: usize = 150;
const USERNAME_EXTRA_CHARS: &str = "@.+-_";

fn username_chars(value: &str, _ctx: &()) -> garde::Result {
    if value
        .chars()
        .all(|c| c.is_alphanumeric() || USERNAME_EXTRA_CHARS.contains(c))
    {
        Ok(())
    } else {
        Err(garde::Error::new(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ))
    }
}

/// Login name of a user - letters, digits and `@.+-_`
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Validate, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[garde(transparent)]
#[serde(transparent)]
pub struct ValidUsername(
    #[garde(length(chars, min = 1, max = 150), custom(username_chars))] String,
);

impl FromStr for ValidUsername {
    type Err = garde::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let username = ValidUsername(s.to_string());
        username.validate()?;
        Ok(username)
    }
}

impl AsRef<str> for ValidUsername {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use quickcheck::Arbitrary;
    use quickcheck_macros::quickcheck;

    use super::*;

    const ALLOWED: &[char] = &[
        'a', 'b', 'z', 'A', 'Q', '0', '7', '@', '.', '+', '-', '_', 'é', 'ž',
    ];

    impl Arbitrary for ValidUsername {
        fn arbitrary(g: &mut quickcheck::Gen) -> Self {
            let len = usize::arbitrary(g) % USERNAME_MAX_LENGTH + 1;
            let name: String = (0..len)
                .map(|_| *g.choose(ALLOWED).unwrap())
                .collect();
            ValidUsername(name)
        }
    }

    #[quickcheck]
    fn test_valid_username_arbitrary(username: ValidUsername) {
        assert!(username.validate().is_ok());
    }

    #[test]
    fn test_valid_username() {
        let username = ValidUsername::from_str("ivan.novak@home").unwrap();
        assert_eq!(username.as_ref(), "ivan.novak@home");
    }

    #[test]
    fn test_invalid_username() {
        assert!(ValidUsername::from_str("").is_err());
        assert!(ValidUsername::from_str("with space").is_err());
        assert!(ValidUsername::from_str("semi;colon").is_err());
        assert!(ValidUsername::from_str(&"x".repeat(USERNAME_MAX_LENGTH + 1)).is_err());
    }
}
