// Domain-layer modules and shared errors/models
pub mod cpf {
    pub use crate::cpf::*;
}

pub mod generator {
    pub use crate::generator::*;
}

pub mod identity {
    pub use crate::identity::*;
}

pub mod models {
    pub use crate::models::*;
}

pub mod errors {
    pub use crate::errors::*;
}
