//! CPF generation and validation.
//!
//! Both directions share one check-digit routine, so every generated CPF validates.

use rand::Rng;
use std::fmt;

/// Number of digits in a CPF, check digits included.
pub const CPF_LEN: usize = 11;

const BASE_LEN: usize = 9;

/// Why a CPF failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpfError {
    /// Not exactly 11 characters after stripping punctuation.
    WrongLength,
    /// Contains something other than ASCII digits.
    NonDigit,
    /// All 11 digits are the same (e.g. `111.111.111-11`).
    AllDigitsEqual,
    /// The two trailing digits do not match the computed ones.
    CheckDigitMismatch,
}

impl fmt::Display for CpfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpfError::WrongLength | CpfError::NonDigit => {
                write!(f, "CPF deve conter 11 dígitos numéricos")
            }
            CpfError::AllDigitsEqual => write!(f, "CPF inválido (todos os dígitos iguais)"),
            CpfError::CheckDigitMismatch => write!(f, "CPF inválido"),
        }
    }
}

impl std::error::Error for CpfError {}

/// Computes one mod-11 check digit.
///
/// Weights run from `first_weight` down to 2; digits past the last weight are
/// ignored. A remainder below 2 maps to 0, anything else to `11 - remainder`.
fn check_digit(digits: &[u8], first_weight: u32) -> u8 {
    let sum: u32 = (2..=first_weight)
        .rev()
        .zip(digits)
        .map(|(weight, &d)| u32::from(d) * weight)
        .sum();

    match sum % 11 {
        r if r < 2 => 0,
        r => (11 - r) as u8,
    }
}

/// Generates a random, checksum-valid CPF as 11 unformatted digits.
///
/// The nine base digits are re-rolled when they come out all equal, so the
/// result never matches the all-identical pattern rejected by [`validate`].
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut digits: Vec<u8> = loop {
        let base: Vec<u8> = (0..BASE_LEN).map(|_| rng.random_range(0..=9)).collect();
        if base.iter().any(|&d| d != base[0]) {
            break base;
        }
    };

    let dv1 = check_digit(&digits, 10);
    digits.push(dv1);
    let dv2 = check_digit(&digits, 11);
    digits.push(dv2);

    digits.iter().map(|d| char::from(b'0' + d)).collect()
}

/// Validates an arbitrary CPF string.
///
/// Dots and dashes are stripped first, so both `529.982.247-25` and
/// `52998224725` are accepted. Returns the cleaned 11-digit string on success.
pub fn validate(input: &str) -> Result<String, CpfError> {
    let cleaned: String = input.chars().filter(|c| *c != '.' && *c != '-').collect();

    if cleaned.chars().count() != CPF_LEN {
        return Err(CpfError::WrongLength);
    }
    if !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(CpfError::NonDigit);
    }

    let digits: Vec<u8> = cleaned.bytes().map(|b| b - b'0').collect();

    if digits.iter().all(|&d| d == digits[0]) {
        return Err(CpfError::AllDigitsEqual);
    }

    let dv1 = check_digit(&digits[..BASE_LEN], 10);
    let dv2 = check_digit(&digits[..BASE_LEN + 1], 11);

    if digits[BASE_LEN] == dv1 && digits[BASE_LEN + 1] == dv2 {
        Ok(cleaned)
    } else {
        Err(CpfError::CheckDigitMismatch)
    }
}

/// Convenience wrapper over [`validate`].
pub fn is_valid(input: &str) -> bool {
    validate(input).is_ok()
}

/// Renders 11 digits as `XXX.XXX.XXX-XX`. Other input is returned untouched.
pub fn format(cpf: &str) -> String {
    if cpf.len() != CPF_LEN || !cpf.bytes().all(|b| b.is_ascii_digit()) {
        return cpf.to_string();
    }
    format!(
        "{}.{}.{}-{}",
        &cpf[0..3],
        &cpf[3..6],
        &cpf[6..9],
        &cpf[9..11]
    )
}
