//! Core data types shared between the store layer and the order workflow.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Script the user wants messages rendered in.
///
/// The storefront serves Uzbek in two scripts; every outward message is
/// selected by a `(Language, key)` pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Latin,
    Cyrillic,
}

impl Language {
    /// Directory name under `./locales/` holding this language's catalog.
    pub fn locale_dir(&self) -> &'static str {
        match self {
            Language::Latin => "latin",
            Language::Cyrillic => "cyrillic",
        }
    }

    /// Code stored in the `users.language_code` column.
    pub fn as_code(&self) -> &'static str {
        match self {
            Language::Latin => "LATIN",
            Language::Cyrillic => "CYRILLIC",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code {
            "LATIN" => Some(Language::Latin),
            "CYRILLIC" => Some(Language::Cyrillic),
            _ => None,
        }
    }
}

/// A catalog product. Read-only from the workflow's point of view.
///
/// `price` is in the smallest currency unit and stays an integer on every
/// code path that touches money.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub min_quantity: i64,
}

/// One pending purchase line awaiting checkout.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CartLine {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub total_price: i64,
    pub total_count: i64,
}

/// A finalized order. Immutable once written.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_price: i64,
    /// "latitude,longitude" as received from the location share.
    pub location: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserProfile {
    pub user_id: i64,
    pub language_code: String,
    pub phone_number: Option<String>,
    pub full_name: Option<String>,
}

impl UserProfile {
    pub fn language(&self) -> Option<Language> {
        Language::from_code(&self.language_code)
    }
}
