//! Assembles complete synthetic identities and flattens them for export.

use crate::address::AddressResolver;
use crate::cpf;
use crate::generator;
use crate::models::{Address, PersonRecord};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

/// Key of the nested address object in a serialized [`PersonRecord`].
pub const ADDRESS_KEY: &str = "Endereço";

/// Column order of tabular exports.
pub const EXPORT_COLUMNS: [&str; 12] = [
    "Nome Completo",
    "CPF",
    "Data de Nascimento",
    "Email",
    "Celular",
    "Endereço - CEP",
    "Endereço - Logradouro",
    "Endereço - Número",
    "Endereço - Complemento",
    "Endereço - Bairro",
    "Endereço - Cidade",
    "Endereço - Estado",
];

/// Builds [`PersonRecord`]s. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct PersonGenerator {
    resolver: AddressResolver,
}

impl PersonGenerator {
    pub fn new(resolver: AddressResolver) -> Self {
        Self { resolver }
    }

    /// Generates one person with an OS-seeded RNG and today's local date.
    pub async fn generate(&self) -> PersonRecord {
        let mut rng = StdRng::from_os_rng();
        self.generate_with(&mut rng, Local::now().date_naive()).await
    }

    /// Generates one person from the given RNG, as of `today`.
    pub async fn generate_with<R>(&self, rng: &mut R, today: NaiveDate) -> PersonRecord
    where
        R: Rng + Send + ?Sized,
    {
        let name = generator::name(rng);
        let cpf = cpf::generate(rng);
        let birth_date = generator::birth_date(rng, today);
        let email = generator::email(rng);
        let phone = generator::phone(rng);

        let resolved = self.resolver.resolve_random(rng).await;
        let number = generator::street_number(rng);
        let complement = generator::complement(rng);

        PersonRecord {
            full_name: name.full,
            cpf,
            birth_date,
            email,
            phone,
            address: Address::new(resolved, number, complement),
        }
    }

    /// Generates `quantity` people one after another.
    pub async fn generate_many(&self, quantity: usize) -> Vec<PersonRecord> {
        let mut rng = StdRng::from_os_rng();
        let today = Local::now().date_naive();
        let mut people = Vec::with_capacity(quantity);

        for i in 0..quantity {
            tracing::debug!("Generating person {}/{}", i + 1, quantity);
            people.push(self.generate_with(&mut rng, today).await);
        }

        tracing::info!("Generated {} person(s)", quantity);
        people
    }
}

/// Flattens a serialized record for tabular export.
///
/// The `Endereço` object is replaced, in place, by `Endereço - {key}` entries in
/// its own key order. All other entries are copied unchanged, so flat input
/// comes back as is. Null address fields stay as nulls.
pub fn flatten(record: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::with_capacity(record.len() + 6);

    for (key, value) in record {
        match value {
            Value::Object(nested) if key == ADDRESS_KEY => {
                for (sub_key, sub_value) in nested {
                    flat.insert(format!("{} - {}", ADDRESS_KEY, sub_key), sub_value.clone());
                }
            }
            _ => {
                flat.insert(key.clone(), value.clone());
            }
        }
    }

    flat
}

impl PersonRecord {
    /// The record as a nested JSON object.
    pub fn to_json(&self) -> Result<Map<String, Value>, serde_json::Error> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(serde::de::Error::custom(format!(
                "record serialized to a non-object: {}",
                other
            ))),
        }
    }

    /// The record as one export row, keyed by [`EXPORT_COLUMNS`].
    pub fn to_flat_row(&self) -> Result<Map<String, Value>, serde_json::Error> {
        Ok(flatten(&self.to_json()?))
    }
}
