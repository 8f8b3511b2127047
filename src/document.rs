use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

////////////////////////////////////////////// CpfCnpj /////////////////////////////////////////////

const CPF_LEN: usize = 11;
const CNPJ_LEN: usize = 14;

const CPF_FIRST_WEIGHTS: [u32; 9] = [10, 9, 8, 7, 6, 5, 4, 3, 2];
const CPF_SECOND_WEIGHTS: [u32; 10] = [11, 10, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_FIRST_WEIGHTS: [u32; 12] = [5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];
const CNPJ_SECOND_WEIGHTS: [u32; 13] = [6, 5, 4, 3, 2, 9, 8, 7, 6, 5, 4, 3, 2];

/// A Brazilian taxpayer identifier: an 11-digit CPF or a 14-digit CNPJ.
///
/// Construction validates both check digits, so holding a `CpfCnpj` means the
/// identifier is well formed. Sequences of one repeated digit are rejected even
/// when their check digits happen to match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CpfCnpj(String);

/// The kind of a taxpayer identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Individual taxpayer (11 digits).
    Cpf,
    /// Business taxpayer (14 digits).
    Cnpj,
}

impl CpfCnpj {
    /// Parses and validates an identifier made only of ASCII digits.
    pub fn parse(s: &str) -> Result<Self, CpfCnpjError> {
        let digits = to_digits(s)?;
        let (first, second): (&[u32], &[u32]) = match digits.len() {
            CPF_LEN => (&CPF_FIRST_WEIGHTS, &CPF_SECOND_WEIGHTS),
            CNPJ_LEN => (&CNPJ_FIRST_WEIGHTS, &CNPJ_SECOND_WEIGHTS),
            n => return Err(CpfCnpjError::InvalidLength(n)),
        };
        if digits.iter().all(|d| *d == digits[0]) {
            return Err(CpfCnpjError::RepeatedDigits);
        }
        let n = digits.len();
        if check_digit(&digits[..n - 2], first) != digits[n - 2]
            || check_digit(&digits[..n - 1], second) != digits[n - 1]
        {
            return Err(CpfCnpjError::InvalidCheckDigits);
        }
        Ok(CpfCnpj(s.to_string()))
    }

    /// Appends the two check digits to a 9-digit CPF base or a 12-digit CNPJ base.
    pub fn complete(base: &str) -> Result<Self, CpfCnpjError> {
        let mut digits = to_digits(base)?;
        let (first, second): (&[u32], &[u32]) = match digits.len() {
            9 => (&CPF_FIRST_WEIGHTS, &CPF_SECOND_WEIGHTS),
            12 => (&CNPJ_FIRST_WEIGHTS, &CNPJ_SECOND_WEIGHTS),
            n => return Err(CpfCnpjError::InvalidLength(n)),
        };
        digits.push(check_digit(&digits, first));
        digits.push(check_digit(&digits, second));
        let s: String = digits
            .iter()
            .filter_map(|d| char::from_digit(*d, 10))
            .collect();
        Self::parse(&s)
    }

    /// Whether this is a CPF or a CNPJ.
    pub fn kind(&self) -> DocumentKind {
        if self.0.len() == CPF_LEN {
            DocumentKind::Cpf
        } else {
            DocumentKind::Cnpj
        }
    }

    /// The digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the identifier and returns its digits.
    pub fn into_string(self) -> String {
        self.0
    }
}

fn to_digits(s: &str) -> Result<Vec<u32>, CpfCnpjError> {
    s.chars()
        .map(|c| c.to_digit(10).ok_or(CpfCnpjError::NonDigit(c)))
        .collect()
}

fn check_digit(digits: &[u32], weights: &[u32]) -> u32 {
    let sum: u32 = digits.iter().zip(weights).map(|(d, w)| d * w).sum();
    match sum % 11 {
        0 | 1 => 0,
        r => 11 - r,
    }
}

/////////////////////////////////////////// Display and FromStr ///////////////////////////////////////

impl Display for CpfCnpj {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for CpfCnpj {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CpfCnpj {
    type Err = CpfCnpjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CpfCnpj {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CpfCnpj {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        CpfCnpj::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Reasons a string is not a valid CPF or CNPJ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpfCnpjError {
    /// The string contains something other than ASCII digits.
    NonDigit(char),
    /// The string has neither 11 nor 14 digits.
    InvalidLength(usize),
    /// Every digit is the same.
    RepeatedDigits,
    /// The trailing check digits do not match.
    InvalidCheckDigits,
}

impl Display for CpfCnpjError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CpfCnpjError::NonDigit(c) => write!(f, "Wrong value for CPF or CNPJ: '{}' is not a digit", c),
            CpfCnpjError::InvalidLength(n) => {
                write!(f, "Wrong value for CPF or CNPJ: expected 11 or 14 digits, got {}", n)
            }
            CpfCnpjError::RepeatedDigits | CpfCnpjError::InvalidCheckDigits => {
                write!(f, "Wrong value for CPF or CNPJ")
            }
        }
    }
}

impl std::error::Error for CpfCnpjError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_cpfs() {
        for cpf in ["42063478082", "28375661015"] {
            let doc = CpfCnpj::parse(cpf).unwrap();
            assert_eq!(doc.kind(), DocumentKind::Cpf);
            assert_eq!(doc.as_str(), cpf);
        }
    }

    #[test]
    fn valid_cnpj() {
        let doc = CpfCnpj::parse("98877409000195").unwrap();
        assert_eq!(doc.kind(), DocumentKind::Cnpj);
    }

    #[test]
    fn wrong_check_digits() {
        assert_eq!(
            CpfCnpj::parse("42063478083"),
            Err(CpfCnpjError::InvalidCheckDigits)
        );
        assert_eq!(
            CpfCnpj::parse("98877409000196"),
            Err(CpfCnpjError::InvalidCheckDigits)
        );
    }

    #[test]
    fn repeated_digits_rejected() {
        assert_eq!(
            CpfCnpj::parse("00000000000"),
            Err(CpfCnpjError::RepeatedDigits)
        );
        assert_eq!(
            CpfCnpj::parse("11111111111111"),
            Err(CpfCnpjError::RepeatedDigits)
        );
    }

    #[test]
    fn wrong_length() {
        assert_eq!(CpfCnpj::parse("1234"), Err(CpfCnpjError::InvalidLength(4)));
        assert_eq!(CpfCnpj::parse(""), Err(CpfCnpjError::InvalidLength(0)));
    }

    #[test]
    fn punctuation_is_not_accepted() {
        assert_eq!(
            CpfCnpj::parse("420.634.780-82"),
            Err(CpfCnpjError::NonDigit('.'))
        );
    }

    #[test]
    fn complete_appends_check_digits() {
        assert_eq!(CpfCnpj::complete("420634780").unwrap().as_str(), "42063478082");
        assert_eq!(
            CpfCnpj::complete("988774090001").unwrap().as_str(),
            "98877409000195"
        );
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<CpfCnpj, _> = serde_json::from_str("\"42063478082\"");
        assert!(ok.is_ok());
        let bad: Result<CpfCnpj, _> = serde_json::from_str("\"42063478080\"");
        assert!(bad.is_err());
    }
}
