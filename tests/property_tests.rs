/// Property-based tests using proptest
/// Tests invariants that should hold for all generated data and all inputs
use chrono::NaiveDate;
use gerador_dados_br::cpf::{self, CpfError};
use gerador_dados_br::generator;
use gerador_dados_br::identity::flatten;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use regex::Regex;
use serde_json::{Map, Value};

// Property: Generated CPFs always validate
proptest! {
    #[test]
    fn generated_cpf_round_trips(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let generated = cpf::generate(&mut rng);
        prop_assert_eq!(generated.len(), 11);
        prop_assert!(generated.chars().all(|c| c.is_ascii_digit()));
        prop_assert_eq!(cpf::validate(&generated), Ok(generated.clone()));
    }

    #[test]
    fn formatted_cpf_still_validates(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let generated = cpf::generate(&mut rng);
        prop_assert!(cpf::is_valid(&cpf::format(&generated)));
    }
}

// Property: CPF validation should never panic and rejects malformed input
proptest! {
    #[test]
    fn cpf_validation_never_panics(input in "\\PC*") {
        let _ = cpf::validate(&input);
    }

    #[test]
    fn identical_digits_always_invalid(d in 0u8..=9) {
        let input: String = std::iter::repeat(char::from(b'0' + d)).take(11).collect();
        prop_assert_eq!(cpf::validate(&input), Err(CpfError::AllDigitsEqual));
    }

    #[test]
    fn wrong_length_always_invalid(input in "[0-9]{0,10}|[0-9]{12,20}") {
        prop_assert_eq!(cpf::validate(&input), Err(CpfError::WrongLength));
    }

    #[test]
    fn check_digit_tampering_detected(seed in any::<u64>(), pos in 9usize..11, delta in 1u8..=9) {
        let mut rng = StdRng::seed_from_u64(seed);
        let generated = cpf::generate(&mut rng);
        let mut digits = generated.into_bytes();
        digits[pos] = b'0' + (digits[pos] - b'0' + delta) % 10;
        let altered = String::from_utf8(digits).unwrap();
        prop_assert!(!cpf::is_valid(&altered));
    }
}

// Property: Field generators respect their shapes
proptest! {
    #[test]
    fn name_within_bounds(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let name = generator::name(&mut rng);
        let len = name.full.chars().count();
        prop_assert!((1..=generator::MAX_NAME_LENGTH).contains(&len));
        prop_assert!(name.full.split(' ').count() >= 2);
    }

    #[test]
    fn phone_shape(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let phone = generator::phone(&mut rng);
        let bytes = phone.as_bytes();
        prop_assert_eq!(bytes.len(), 11);
        prop_assert_eq!(bytes[0], b'9');
        prop_assert!((b'6'..=b'9').contains(&bytes[1]));
        prop_assert!(bytes.iter().all(u8::is_ascii_digit));
    }

    #[test]
    fn birth_date_age_in_range(seed in any::<u64>(), day_offset in 0i64..36_500) {
        let mut rng = StdRng::seed_from_u64(seed);
        let base = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let today = base + chrono::Duration::days(day_offset);
        let birth = generator::birth_date(&mut rng, today);
        let age = generator::age_on(birth, today);
        prop_assert!((generator::MIN_AGE_YEARS..generator::MAX_AGE_YEARS).contains(&age));
    }

    #[test]
    fn email_has_known_domain(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let email = generator::email(&mut rng);
        let (local, domain) = email.split_once('@').unwrap();
        prop_assert!(!local.is_empty());
        prop_assert!(generator::EMAIL_PROVIDERS.contains(&domain));
    }

    #[test]
    fn email_local_part_is_lowercase(seed in any::<u64>()) {
        let pattern = Regex::new(r"^[\p{Ll}0-9.]+@[a-z.]+$").unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let email = generator::email(&mut rng);
        prop_assert!(pattern.is_match(&email), "unexpected email {}", email);
    }
}

// Property: Flattening is idempotent and touches only the address
proptest! {
    #[test]
    fn flatten_flat_input_unchanged(keys in prop::collection::vec("[a-z]{1,8}", 0..8)) {
        let mut flat = Map::new();
        for (i, key) in keys.iter().enumerate() {
            flat.insert(key.clone(), Value::from(i as u64));
        }
        prop_assert_eq!(flatten(&flat), flat);
    }

    #[test]
    fn flatten_expands_address(sub_keys in prop::collection::btree_set("[A-Z][a-z]{1,8}", 1..7)) {
        let mut address = Map::new();
        for key in &sub_keys {
            address.insert(key.clone(), Value::Null);
        }
        let mut record = Map::new();
        record.insert("CPF".to_string(), Value::from("52998224725"));
        record.insert("Endereço".to_string(), Value::Object(address));
        record.insert("Email".to_string(), Value::from("a@b.com"));

        let flat = flatten(&record);
        prop_assert_eq!(flat.len(), 2 + sub_keys.len());
        prop_assert!(!flat.contains_key("Endereço"));
        prop_assert_eq!(&flat["CPF"], &record["CPF"]);
        prop_assert_eq!(&flat["Email"], &record["Email"]);
        for key in &sub_keys {
            let prefixed = format!("Endereço - {}", key);
            prop_assert!(flat.contains_key(&prefixed));
        }
    }
}
