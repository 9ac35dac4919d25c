use insight_core::new_id;
use serde::{Deserialize, Serialize};

/// Rentable property (hospedagem)
///
/// Maps to the `hospedagens` table. `ativo` only ever moves from `true` to
/// `false`: deleting a property that has rentals flags it inactive instead
/// of removing it, and nothing in this crate reactivates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    /// Opaque UUID primary key
    #[sqlx(rename = "hospedagem_id")]
    pub id: String,

    /// Kind of lodging ("Apartamento", "Casa", "Chalé", ...)
    pub tipo: String,

    pub endereco_id: String,

    pub proprietario_id: String,

    /// Whether the property is listed
    pub ativo: bool,
}

impl Property {
    /// Create an active property with a freshly generated id
    pub fn new(
        tipo: impl Into<String>,
        endereco_id: impl Into<String>,
        proprietario_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            tipo: tipo.into(),
            endereco_id: endereco_id.into(),
            proprietario_id: proprietario_id.into(),
            ativo: true,
        }
    }
}

/// Partial update for [`Property`]
///
/// Has no `ativo` field: the flag is only changed by delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyUpdate {
    pub tipo: Option<String>,
    pub endereco_id: Option<String>,
    pub proprietario_id: Option<String>,
}

impl PropertyUpdate {
    pub fn is_empty(&self) -> bool {
        self.tipo.is_none() && self.endereco_id.is_none() && self.proprietario_id.is_none()
    }

    pub fn apply(&self, property: &mut Property) {
        if let Some(tipo) = &self.tipo {
            property.tipo = tipo.clone();
        }
        if let Some(endereco_id) = &self.endereco_id {
            property.endereco_id = endereco_id.clone();
        }
        if let Some(proprietario_id) = &self.proprietario_id {
            property.proprietario_id = proprietario_id.clone();
        }
    }
}
