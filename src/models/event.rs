use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::datetime;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub location: String,
    /// `None` means unlimited seating.
    pub available_seats: Option<i32>,
    pub ticket_price: Option<Decimal>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/replace payload for an event. All mutable fields are carried;
/// updates are a full replace, not a patch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "datetime::deserialize_opt")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub location: String,
    pub available_seats: Option<i32>,
    pub ticket_price: Option<Decimal>,
    pub image_url: Option<String>,
}

impl EventInput {
    /// Checks the required fields and yields the parsed date.
    pub fn validate(&self) -> Result<NaiveDateTime, AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Event name is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Event description is required".into()));
        }
        if self.location.trim().is_empty() {
            return Err(AppError::Validation("Location is required".into()));
        }
        self.date
            .ok_or_else(|| AppError::Validation("Event date is required".into()))
    }
}
