//! CEP (Código de Endereçamento Postal) normalization
//!
//! Input sheets carry CEPs in every imaginable shape: `01001-000`,
//! `01.001-000`, plain digits, or numeric cells whose leading zero was
//! stripped by the spreadsheet tool. Every lookup path goes through
//! [`Cep::normalize`] so providers only ever see a canonical 8-digit code.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a normalized CEP.
pub const CEP_LEN: usize = 8;

/// A postal code that could not be normalized to 8 digits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid CEP '{raw}': expected {CEP_LEN} digits after normalization")]
pub struct InvalidCep {
    /// The input as it appeared in the source sheet.
    pub raw: String,
}

/// A normalized 8-digit CEP.
///
/// Construction only succeeds through [`Cep::normalize`], so holding a `Cep`
/// is proof the code is well-formed. It says nothing about the code existing;
/// only the providers can answer that.
///
/// # Example
///
/// ```
/// use ceplote_common::cep::Cep;
///
/// let cep = Cep::normalize(" 01.001-000 ")?;
/// assert_eq!(cep.as_str(), "01001000");
/// # Ok::<(), ceplote_common::cep::InvalidCep>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cep(String);

impl Cep {
    /// Normalize a raw postal code into its canonical 8-digit form.
    ///
    /// Strips every non-digit character. Exactly 8 remaining digits are
    /// accepted as-is. 7 digits are accepted with one leading zero restored:
    /// spreadsheet numeric cells drop leading zeros, and since no CEP starts
    /// with `00` at most one zero can be missing. Anything else is rejected,
    /// so junk like `"123"` never reaches a provider.
    pub fn normalize(raw: &str) -> Result<Self, InvalidCep> {
        let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
        match digits.len() {
            8 => Ok(Self(digits)),
            7 => Ok(Self(format!("0{digits}"))),
            _ => Err(InvalidCep {
                raw: raw.to_string(),
            }),
        }
    }

    /// The canonical 8-digit form, e.g. `"01001000"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Cep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Cep {
    type Err = InvalidCep;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}
