use chrono::{DateTime, Utc};
use insight_core::{Rating, new_id};
use serde::{Deserialize, Serialize};

/// Review (avaliação) left by a client for a property
///
/// Maps to the `avaliacoes` table. `created_at` orders the recent-reviews
/// lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    /// Opaque UUID primary key
    #[sqlx(rename = "avaliacao_id")]
    pub id: String,

    pub cliente_id: String,

    pub hospedagem_id: String,

    /// Score from 1 to 5
    #[sqlx(try_from = "i64")]
    pub nota: Rating,

    /// Optional free-text comment
    pub comentario: Option<String>,

    /// When the review was written
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Create a review with a freshly generated id, timestamped now
    pub fn new(
        cliente_id: impl Into<String>,
        hospedagem_id: impl Into<String>,
        nota: Rating,
        comentario: Option<String>,
    ) -> Self {
        Self {
            id: new_id(),
            cliente_id: cliente_id.into(),
            hospedagem_id: hospedagem_id.into(),
            nota,
            comentario,
            created_at: Utc::now(),
        }
    }
}

/// Partial update for [`Review`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewUpdate {
    pub cliente_id: Option<String>,
    pub hospedagem_id: Option<String>,
    pub nota: Option<Rating>,
    pub comentario: Option<Option<String>>,
}

impl ReviewUpdate {
    pub fn is_empty(&self) -> bool {
        self.cliente_id.is_none()
            && self.hospedagem_id.is_none()
            && self.nota.is_none()
            && self.comentario.is_none()
    }

    pub fn apply(&self, review: &mut Review) {
        if let Some(cliente_id) = &self.cliente_id {
            review.cliente_id = cliente_id.clone();
        }
        if let Some(hospedagem_id) = &self.hospedagem_id {
            review.hospedagem_id = hospedagem_id.clone();
        }
        if let Some(nota) = self.nota {
            review.nota = nota;
        }
        if let Some(comentario) = &self.comentario {
            review.comentario = comentario.clone();
        }
    }
}
