//! Conversation state for the storefront dialogue.
//!
//! Draft fields travel inside the stage variants that need them, so they
//! exist exactly while that stage is active and vanish on any transition
//! away.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Product details captured when the user picks a product, carried until a
/// cart line is committed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub product_id: i64,
    pub unit_price: i64,
    pub min_quantity: i64,
}

/// The workflow's current position in the conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    Idle,
    SelectingProduct,
    ConfirmingProduct {
        draft: ProductDraft,
    },
    EnteringQuantity {
        draft: ProductDraft,
    },
    SelectingRegion,
    SelectingDistrict {
        region: String,
    },
    AwaitingLocation {
        region: String,
        district: String,
    },
    ChoosingSetting,
    ChoosingLanguage,
    EnteringPhone,
    EnteringFullName,
}

/// Type alias for the storefront dialogue.
pub type StoreDialogue = Dialogue<Stage, InMemStorage<Stage>>;
