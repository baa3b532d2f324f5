use schoolgate_core::{AppError, AppResult, NonEmptyString};

/// Number of digits in a school passcode.
pub const PASSCODE_LENGTH: usize = 8;

/// Validated eight-digit school passcode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Passcode(String);

impl Passcode {
    /// Parses a candidate passcode. No trimming or other normalization is applied.
    pub fn parse(value: &str) -> AppResult<Self> {
        if value.len() != PASSCODE_LENGTH || !value.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(AppError::Validation(format!(
                "passcode must be exactly {PASSCODE_LENGTH} digits"
            )));
        }

        Ok(Self(value.to_owned()))
    }

    /// Returns the passcode digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Registry entry mapping a passcode to the school it unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolPasscode {
    passcode: Passcode,
    school_code: NonEmptyString,
}

impl SchoolPasscode {
    /// Creates a validated registry entry.
    pub fn new(passcode: &str, school_code: &str) -> AppResult<Self> {
        Ok(Self {
            passcode: Passcode::parse(passcode)?,
            school_code: NonEmptyString::new(school_code.trim())?,
        })
    }

    /// Returns the passcode.
    #[must_use]
    pub fn passcode(&self) -> &Passcode {
        &self.passcode
    }

    /// Returns the school code the passcode unlocks.
    #[must_use]
    pub fn school_code(&self) -> &str {
        self.school_code.as_str()
    }
}
