use std::fmt::{Display, Formatter};

const MIN_LENGTH: usize = 8;
const LONG_LENGTH: usize = 12;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    /// Classifies a password; `None` for an empty one.
    ///
    /// Weak below 8 characters or with fewer than two character classes. Strong with all
    /// four classes, or with three classes at 12 characters or more. Medium otherwise.
    pub fn classify(password: &str) -> Option<Self> {
        if password.is_empty() {
            return None;
        }
        let length = password.chars().count();
        let classes = character_classes(password);
        let strength = if length < MIN_LENGTH || classes < 2 {
            Self::Weak
        } else if classes == 4 || (length >= LONG_LENGTH && classes >= 3) {
            Self::Strong
        } else {
            Self::Medium
        };
        Some(strength)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weak => "Weak",
            Self::Medium => "Medium",
            Self::Strong => "Strong",
        }
    }

    pub fn label(self) -> String {
        format!("Strength: {}", self.as_str())
    }
}

impl Display for PasswordStrength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn character_classes(password: &str) -> usize {
    let lower = password.chars().any(|c| c.is_lowercase());
    let upper = password.chars().any(|c| c.is_uppercase());
    let digit = password.chars().any(|c| c.is_ascii_digit());
    let symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    [lower, upper, digit, symbol]
        .into_iter()
        .filter(|present| *present)
        .count()
}
