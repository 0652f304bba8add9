use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============ Generated Records ============

/// A synthetic person.
///
/// Serialized with the Portuguese labels used by the exports, in column order.
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Given name followed by 1-3 surnames.
    #[serde(rename = "Nome Completo")]
    pub full_name: String,
    /// 11 unformatted digits.
    #[serde(rename = "CPF")]
    pub cpf: String,
    /// Serialized as `DD/MM/YYYY`.
    #[serde(rename = "Data de Nascimento", with = "br_date")]
    pub birth_date: NaiveDate,
    #[serde(rename = "Email")]
    pub email: String,
    /// 11-digit mobile number without punctuation.
    #[serde(rename = "Celular")]
    pub phone: String,
    #[serde(rename = "Endereço")]
    pub address: Address,
}

/// Address of a synthetic person.
///
/// `cep`, `street`, `neighborhood`, `city` and `state` are filled together from
/// one successful lookup or are all `None`. `number` and `complement` are
/// always generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "CEP")]
    pub cep: Option<String>,
    #[serde(rename = "Logradouro")]
    pub street: Option<String>,
    #[serde(rename = "Número")]
    pub number: u16,
    #[serde(rename = "Complemento")]
    pub complement: Option<String>,
    #[serde(rename = "Bairro")]
    pub neighborhood: Option<String>,
    #[serde(rename = "Cidade")]
    pub city: Option<String>,
    #[serde(rename = "Estado")]
    pub state: Option<String>,
}

impl Address {
    /// Combines an optional lookup result with the locally generated parts.
    pub fn new(resolved: Option<ResolvedAddress>, number: u16, complement: Option<String>) -> Self {
        match resolved {
            Some(found) => Self {
                cep: Some(found.cep),
                street: found.street,
                number,
                complement,
                neighborhood: found.neighborhood,
                city: found.city,
                state: found.state,
            },
            None => Self {
                cep: None,
                street: None,
                number,
                complement,
                neighborhood: None,
                city: None,
                state: None,
            },
        }
    }
}

/// Structured address returned by a CEP provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    /// The 8-digit code that was looked up.
    pub cep: String,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

// ============ Provider Responses ============

/// ViaCEP `/ws/{cep}/json/` body. Unknown codes answer `{"erro": true}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ViaCepResponse {
    pub cep: Option<String>,
    pub logradouro: Option<String>,
    pub bairro: Option<String>,
    pub localidade: Option<String>,
    pub uf: Option<String>,
    /// `true` or `"true"` depending on the endpoint version.
    pub erro: Option<serde_json::Value>,
}

/// ApiCEP `/cep/{cep}.json` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiCepResponse {
    pub status: Option<u16>,
    pub ok: Option<bool>,
    pub code: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

// ============ API Request/Response Models ============

/// Body of the batch and export endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct QuantityRequest {
    #[serde(default = "default_quantity")]
    pub quantidade: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Body of `POST /api/validar-cpf`.
#[derive(Debug, Clone, Deserialize)]
pub struct CpfValidationRequest {
    #[serde(default)]
    pub cpf: String,
}

/// Response of `POST /api/validar-cpf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CpfValidationResponse {
    pub success: bool,
    pub valido: bool,
    pub mensagem: String,
}

/// Serde adapter for `DD/MM/YYYY` dates.
pub mod br_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y";

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::generator::format_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
