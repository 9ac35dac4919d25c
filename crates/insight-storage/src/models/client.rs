use insight_core::new_id;
use serde::{Deserialize, Serialize};

/// Renter (cliente)
///
/// Maps to the `clientes` table. Removing a client removes its rentals and
/// reviews (`ON DELETE CASCADE`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Client {
    /// Opaque UUID primary key
    #[sqlx(rename = "cliente_id")]
    pub id: String,

    /// Full name
    pub nome: String,

    /// CPF (Cadastro de Pessoas Físicas), optional
    pub cpf: Option<String>,

    /// Free-form contact (phone, e-mail)
    pub contato: Option<String>,
}

impl Client {
    /// Create a client with a freshly generated id
    pub fn new(nome: impl Into<String>, cpf: Option<String>, contato: Option<String>) -> Self {
        Self {
            id: new_id(),
            nome: nome.into(),
            cpf,
            contato,
        }
    }
}

/// Partial update for [`Client`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientUpdate {
    pub nome: Option<String>,
    pub cpf: Option<Option<String>>,
    pub contato: Option<Option<String>>,
}

impl ClientUpdate {
    pub fn is_empty(&self) -> bool {
        self.nome.is_none() && self.cpf.is_none() && self.contato.is_none()
    }

    pub fn apply(&self, client: &mut Client) {
        if let Some(nome) = &self.nome {
            client.nome = nome.clone();
        }
        if let Some(cpf) = &self.cpf {
            client.cpf = cpf.clone();
        }
        if let Some(contato) = &self.contato {
            client.contato = contato.clone();
        }
    }
}
