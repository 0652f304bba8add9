//! External service integrations.

pub mod cep_client {
    pub use crate::cep_client::*;
}

pub mod address {
    pub use crate::address::*;
}
