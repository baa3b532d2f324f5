use std::collections::HashMap;

use schoolgate_application::PasscodeRegistry;
use schoolgate_core::{AppError, AppResult};
use schoolgate_domain::{Passcode, SchoolPasscode};

const BUILTIN_PASSCODES: &[(&str, &str)] = &[("70705123", "70705")];

/// Passcode registry held in process memory.
///
/// Built from static configuration only; passcodes are not administered through
/// the permission store.
#[derive(Debug, Clone)]
pub struct StaticPasscodeRegistry {
    entries: HashMap<Passcode, String>,
}

impl StaticPasscodeRegistry {
    /// Creates a registry, rejecting duplicate passcodes.
    pub fn new(entries: impl IntoIterator<Item = SchoolPasscode>) -> AppResult<Self> {
        let mut map = HashMap::new();
        for entry in entries {
            let school_code = entry.school_code().to_owned();
            let passcode = entry.passcode().clone();
            if map.contains_key(&passcode) {
                return Err(AppError::Conflict(format!(
                    "passcode for school '{school_code}' is already registered"
                )));
            }
            map.insert(passcode, school_code);
        }

        Ok(Self { entries: map })
    }

    /// Creates the registry shipped with the service.
    pub fn builtin() -> AppResult<Self> {
        Self::new(
            BUILTIN_PASSCODES
                .iter()
                .map(|(passcode, school_code)| SchoolPasscode::new(passcode, school_code))
                .collect::<AppResult<Vec<_>>>()?,
        )
    }

    /// Parses a `passcode=school_code` list separated by commas.
    pub fn from_config(value: &str) -> AppResult<Self> {
        let entries = value
            .split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (passcode, school_code) = pair.split_once('=').ok_or_else(|| {
                    AppError::Validation(
                        "SCHOOL_PASSCODES entries must look like 'passcode=school_code'"
                            .to_owned(),
                    )
                })?;
                SchoolPasscode::new(passcode.trim(), school_code)
            })
            .collect::<AppResult<Vec<_>>>()?;

        Self::new(entries)
    }

    /// Returns the number of registered passcodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no passcodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PasscodeRegistry for StaticPasscodeRegistry {
    fn school_code_for(&self, passcode: &Passcode) -> Option<String> {
        self.entries.get(passcode).cloned()
    }
}
