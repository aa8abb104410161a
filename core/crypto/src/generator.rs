//! Random password generation with per-class minimums.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

use lockbox_common::{Error, Result};

/// Uppercase pool.
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Lowercase pool.
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
/// Digit pool.
pub const DIGITS: &[u8] = b"0123456789";
/// Symbol pool.
pub const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+";

/// Character-class requirements for a generated password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_upper: usize,
    pub min_lower: usize,
    pub min_digits: usize,
    pub min_symbols: usize,
    pub length: usize,
}

impl PasswordPolicy {
    pub fn new(
        min_upper: usize,
        min_lower: usize,
        min_digits: usize,
        min_symbols: usize,
        length: usize,
    ) -> Self {
        Self {
            min_upper,
            min_lower,
            min_digits,
            min_symbols,
            length,
        }
    }

    /// Build a policy from signed input, rejecting negative counts.
    ///
    /// Front ends that parse user input as signed integers go through here so
    /// that "-1" surfaces as `InvalidParameters` rather than a parse error.
    pub fn from_signed(
        min_upper: i64,
        min_lower: i64,
        min_digits: i64,
        min_symbols: i64,
        length: i64,
    ) -> Result<Self> {
        let convert = |value: i64, what: &str| {
            usize::try_from(value).map_err(|_| {
                Error::InvalidParameters(format!("{} must not be negative, got {}", what, value))
            })
        };

        Ok(Self {
            min_upper: convert(min_upper, "uppercase minimum")?,
            min_lower: convert(min_lower, "lowercase minimum")?,
            min_digits: convert(min_digits, "digit minimum")?,
            min_symbols: convert(min_symbols, "symbol minimum")?,
            length: convert(length, "length")?,
        })
    }

    /// Check that the minimums fit in the requested length.
    pub fn validate(&self) -> Result<()> {
        let required = [self.min_upper, self.min_lower, self.min_digits, self.min_symbols]
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
            .ok_or_else(|| Error::InvalidParameters("Minimums overflow".to_string()))?;

        if required > self.length {
            return Err(Error::InvalidParameters(format!(
                "Minimums add up to {} but length is {}",
                required, self.length
            )));
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new(4, 4, 2, 2, 16)
    }
}

/// Generate a password satisfying `policy`.
///
/// Draws exactly the required count from each class, fills the rest from the
/// union of all pools, then shuffles so class grouping does not show.
///
/// # Errors
/// - `InvalidParameters` if the policy is unsatisfiable
pub fn generate(policy: &PasswordPolicy) -> Result<String> {
    policy.validate()?;

    let mut rng = OsRng;
    let mut chars = Vec::with_capacity(policy.length);

    for (pool, count) in [
        (UPPERCASE, policy.min_upper),
        (LOWERCASE, policy.min_lower),
        (DIGITS, policy.min_digits),
        (SYMBOLS, policy.min_symbols),
    ] {
        for _ in 0..count {
            chars.push(pick(pool, &mut rng));
        }
    }

    let all: Vec<u8> = [UPPERCASE, LOWERCASE, DIGITS, SYMBOLS].concat();
    while chars.len() < policy.length {
        chars.push(pick(&all, &mut rng));
    }

    chars.shuffle(&mut rng);

    Ok(chars.into_iter().map(char::from).collect())
}

/// Positional form of [`generate`].
pub fn generate_password(
    min_upper: usize,
    min_lower: usize,
    min_digits: usize,
    min_symbols: usize,
    length: usize,
) -> Result<String> {
    generate(&PasswordPolicy::new(
        min_upper,
        min_lower,
        min_digits,
        min_symbols,
        length,
    ))
}

fn pick<R: Rng + ?Sized>(pool: &[u8], rng: &mut R) -> u8 {
    pool[rng.gen_range(0..pool.len())]
}
