use insight_core::{StateCode, new_id};
use serde::{Deserialize, Serialize};

/// Street address (endereço) a property is located at
///
/// Maps to the `enderecos` table. An address cannot be deleted while any
/// property (active or not) still points at it.
///
/// # Examples
///
/// ```
/// use insight_core::StateCode;
/// use insight_storage::models::Address;
///
/// let address = Address::new(
///     "Rua das Flores",
///     123,
///     "Centro",
///     "São Paulo",
///     StateCode::new("sp").unwrap(),
///     Some("01234-567".into()),
/// );
/// assert_eq!(address.estado.as_str(), "SP");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    /// Opaque UUID primary key
    #[sqlx(rename = "endereco_id")]
    pub id: String,

    pub rua: String,

    pub numero: i32,

    pub bairro: String,

    pub cidade: String,

    /// Two-letter state code (UF), upper-case
    #[sqlx(try_from = "String")]
    pub estado: StateCode,

    /// Postal code (CEP), optional
    pub cep: Option<String>,
}

impl Address {
    /// Create an address with a freshly generated id
    pub fn new(
        rua: impl Into<String>,
        numero: i32,
        bairro: impl Into<String>,
        cidade: impl Into<String>,
        estado: StateCode,
        cep: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            rua: rua.into(),
            numero,
            bairro: bairro.into(),
            cidade: cidade.into(),
            estado,
            cep,
        }
    }
}

/// Partial update for [`Address`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressUpdate {
    pub rua: Option<String>,
    pub numero: Option<i32>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub estado: Option<StateCode>,
    pub cep: Option<Option<String>>,
}

impl AddressUpdate {
    pub fn is_empty(&self) -> bool {
        self.rua.is_none()
            && self.numero.is_none()
            && self.bairro.is_none()
            && self.cidade.is_none()
            && self.estado.is_none()
            && self.cep.is_none()
    }

    pub fn apply(&self, address: &mut Address) {
        if let Some(rua) = &self.rua {
            address.rua = rua.clone();
        }
        if let Some(numero) = self.numero {
            address.numero = numero;
        }
        if let Some(bairro) = &self.bairro {
            address.bairro = bairro.clone();
        }
        if let Some(cidade) = &self.cidade {
            address.cidade = cidade.clone();
        }
        if let Some(estado) = &self.estado {
            address.estado = estado.clone();
        }
        if let Some(cep) = &self.cep {
            address.cep = cep.clone();
        }
    }
}
