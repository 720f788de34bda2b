// src/models/invitation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserInvitation {
    pub id: i32,
    pub email: String,

    #[serde(skip_serializing)] // O token só trafega no link do convite
    #[schema(ignore)]
    pub token: String,

    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInvitationPayload {
    #[validate(email(message = "Informe um e-mail válido."))]
    #[schema(example = "novo@agencia.com")]
    pub email: String,
}
