//! Random field generators for synthetic Brazilian identities.
//!
//! Every generator takes the RNG explicitly so callers can pick a `Send`
//! source for async handlers or a seeded one for tests.

use chrono::{Days, Months, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Maximum length of a generated full name, in characters.
pub const MAX_NAME_LENGTH: usize = 60;

/// Maximum number of attempts before a generated name is truncated.
const MAX_NAME_ATTEMPTS: usize = 100;

/// Minimum number of surnames in a generated name.
const MIN_SURNAMES: usize = 1;

/// Maximum number of surnames in a generated name.
const MAX_SURNAMES: usize = 3;

/// Youngest age a generated person can have, in years.
pub const MIN_AGE_YEARS: u32 = 18;

/// Age a generated person never reaches, in years.
pub const MAX_AGE_YEARS: u32 = 80;

/// Length of a CEP (postal code), in digits.
pub const CEP_LEN: usize = 8;

/// Highest street number.
const MAX_STREET_NUMBER: u16 = 2000;

pub const GIVEN_NAMES: &[&str] = &[
    "Maria", "Joao", "Ana", "Pedro", "Sofia", "Lucas", "Isabela", "Gabriel", "Laura", "Matheus",
    "Julia", "Guilherme", "Manuela", "Rafael", "Beatriz", "Daniel", "Luiza", "Felipe", "Helena",
    "Bruno",
];

pub const SURNAMES: &[&str] = &[
    "Silva",
    "Santos",
    "Oliveira",
    "Souza",
    "Lima",
    "Pereira",
    "Costa",
    "Rodrigues",
    "Almeida",
    "Nascimento",
    "Martins",
    "Ferreira",
    "Gomes",
    "Ribeiro",
    "Carvalho",
    "Teixeira",
    "Fernandes",
    "Dias",
    "Moreira",
    "Borges",
];

pub const EMAIL_PROVIDERS: &[&str] = &[
    "gmail.com",
    "hotmail.com",
    "outlook.com",
    "yahoo.com",
    "protonmail.com",
];

/// A generated name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedName {
    given: &'static str,
    surnames: Vec<&'static str>,
    /// Space-joined name, at most [`MAX_NAME_LENGTH`] characters.
    pub full: String,
}

/// Generates a full name: one given name followed by 1 to 3 distinct surnames.
///
/// Candidates longer than [`MAX_NAME_LENGTH`] are redrawn. After
/// `MAX_NAME_ATTEMPTS` redraws the last candidate is truncated instead.
pub fn name<R: Rng + ?Sized>(rng: &mut R) -> GeneratedName {
    name_from(rng, GIVEN_NAMES, SURNAMES)
}

fn name_from<R: Rng + ?Sized>(
    rng: &mut R,
    given_names: &[&'static str],
    surnames: &[&'static str],
) -> GeneratedName {
    let mut candidate = draw_name(rng, given_names, surnames);

    for _ in 1..MAX_NAME_ATTEMPTS {
        if candidate.full.chars().count() <= MAX_NAME_LENGTH {
            return candidate;
        }
        candidate = draw_name(rng, given_names, surnames);
    }

    if candidate.full.chars().count() > MAX_NAME_LENGTH {
        tracing::debug!(
            "Name exceeded {} chars after {} attempts, truncating",
            MAX_NAME_LENGTH,
            MAX_NAME_ATTEMPTS
        );
        let truncated: String = candidate.full.chars().take(MAX_NAME_LENGTH).collect();
        candidate.full = truncated.trim_end().to_string();
    }
    candidate
}

fn draw_name<R: Rng + ?Sized>(
    rng: &mut R,
    given_names: &[&'static str],
    surnames: &[&'static str],
) -> GeneratedName {
    let given = given_names.choose(rng).copied().unwrap_or("Maria");
    let count = rng.random_range(MIN_SURNAMES..=MAX_SURNAMES.min(surnames.len().max(1)));
    let chosen: Vec<&'static str> = surnames.choose_multiple(rng, count).copied().collect();

    let mut full = String::from(given);
    for surname in &chosen {
        full.push(' ');
        full.push_str(surname);
    }

    GeneratedName {
        given,
        surnames: chosen,
        full,
    }
}

/// Generates a birth date for someone aged at least 18 and under 80 on `today`.
///
/// The range is `[today - 80y + 1d, today - 18y)`. Month arithmetic clamps
/// 29 February to the 28th in non-leap target years.
pub fn birth_date<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> NaiveDate {
    let earliest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .and_then(|d| d.checked_add_days(Days::new(1)))
        .unwrap_or(NaiveDate::MIN);
    let latest = today
        .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
        .unwrap_or(today);

    let span = (latest - earliest).num_days().max(1) as u64;
    let offset = rng.random_range(0..span);

    earliest.checked_add_days(Days::new(offset)).unwrap_or(earliest)
}

/// Formats a date the way records carry it: `DD/MM/YYYY`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Whole years between `birth` and `today`.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    today.years_since(birth).unwrap_or(0)
}

/// Generates an email address from its own draw of the name lists.
///
/// The names are independent of any generated [`GeneratedName`].
pub fn email<R: Rng + ?Sized>(rng: &mut R) -> String {
    let given = GIVEN_NAMES.choose(rng).copied().unwrap_or("maria");
    let surname = SURNAMES.choose(rng).copied().unwrap_or("silva");
    email_for(rng, given, surname)
}

/// One of four local-part templates is chosen uniformly; the domain is one of
/// [`EMAIL_PROVIDERS`].
fn email_for<R: Rng + ?Sized>(rng: &mut R, given: &str, surname: &str) -> String {
    let given = given.to_lowercase();
    let surname = surname.to_lowercase();
    let given_initial = given.chars().next().map(String::from).unwrap_or_default();
    let surname_initial = surname.chars().next().map(String::from).unwrap_or_default();

    let local = match rng.random_range(0..4) {
        0 => format!("{}{}", given, rng.random_range(1..=99)),
        1 => format!("{}.{}", given, surname),
        2 => format!(
            "{}{}{}",
            given,
            surname_initial,
            rng.random_range(10..=99)
        ),
        _ => format!(
            "{}{}{}",
            surname,
            given_initial,
            rng.random_range(1..=99)
        ),
    };
    let local: String = local.chars().filter(|c| !c.is_whitespace()).collect();

    let provider = EMAIL_PROVIDERS.choose(rng).copied().unwrap_or("gmail.com");
    format!("{}@{}", local, provider)
}

/// Generates an 11-digit mobile number: `9`, then 6-9, then nine free digits.
pub fn phone<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut number = String::with_capacity(11);
    number.push('9');
    number.push(digit(rng, 6..=9));
    for _ in 0..9 {
        number.push(digit(rng, 0..=9));
    }
    number
}

/// Generates a random 8-digit CEP. Most of these do not exist.
pub fn cep<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CEP_LEN).map(|_| digit(rng, 0..=9)).collect()
}

fn digit<R: Rng + ?Sized>(rng: &mut R, range: std::ops::RangeInclusive<u8>) -> char {
    char::from(b'0' + rng.random_range(range))
}

/// Generates a street number in `1..=2000`.
pub fn street_number<R: Rng + ?Sized>(rng: &mut R) -> u16 {
    rng.random_range(1..=MAX_STREET_NUMBER)
}

/// Generates an address complement half of the time.
///
/// `APTO` 1-300, `CASA` 1-5, `BLOCO` A-D or `SALA` 101-500, each kind equally likely.
pub fn complement<R: Rng + ?Sized>(rng: &mut R) -> Option<String> {
    if !rng.random_bool(0.5) {
        return None;
    }

    let value = match rng.random_range(0..4) {
        0 => format!("APTO {}", rng.random_range(1..=300)),
        1 => format!("CASA {}", rng.random_range(1..=5)),
        2 => {
            let block = ["A", "B", "C", "D"].choose(rng).copied().unwrap_or("A");
            format!("BLOCO {}", block)
        }
        _ => format!("SALA {}", rng.random_range(101..=500)),
    };
    Some(value)
}
