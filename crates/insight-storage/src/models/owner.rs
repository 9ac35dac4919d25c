use insight_core::new_id;
use serde::{Deserialize, Serialize};

/// Property owner (proprietário)
///
/// Maps to the `proprietarios` table. `cpf_cnpj` holds either an individual
/// (CPF) or company (CNPJ) tax id; it is expected to be unique in practice
/// but the schema does not enforce it.
///
/// # Examples
///
/// ```
/// use insight_storage::models::Owner;
///
/// let owner = Owner::new("João Silva", Some("123.456.789-00".into()), None);
/// assert_eq!(owner.nome, "João Silva");
/// assert!(!owner.id.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Owner {
    /// Opaque UUID primary key
    #[sqlx(rename = "proprietario_id")]
    pub id: String,

    /// Full name
    pub nome: String,

    /// CPF or CNPJ, optional
    pub cpf_cnpj: Option<String>,

    /// Free-form contact (phone, e-mail)
    pub contato: Option<String>,
}

impl Owner {
    /// Create an owner with a freshly generated id
    pub fn new(nome: impl Into<String>, cpf_cnpj: Option<String>, contato: Option<String>) -> Self {
        Self {
            id: new_id(),
            nome: nome.into(),
            cpf_cnpj,
            contato,
        }
    }
}

/// Partial update for [`Owner`]
///
/// `None` leaves a field untouched. Nullable columns take
/// `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerUpdate {
    pub nome: Option<String>,
    pub cpf_cnpj: Option<Option<String>>,
    pub contato: Option<Option<String>>,
}

impl OwnerUpdate {
    /// `true` when no field is set
    pub fn is_empty(&self) -> bool {
        self.nome.is_none() && self.cpf_cnpj.is_none() && self.contato.is_none()
    }

    /// Apply the present fields to `owner`
    pub fn apply(&self, owner: &mut Owner) {
        if let Some(nome) = &self.nome {
            owner.nome = nome.clone();
        }
        if let Some(cpf_cnpj) = &self.cpf_cnpj {
            owner.cpf_cnpj = cpf_cnpj.clone();
        }
        if let Some(contato) = &self.contato {
            owner.contato = contato.clone();
        }
    }
}
