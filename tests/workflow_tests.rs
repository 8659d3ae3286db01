//! Integration tests for the order workflow state machine, run against an
//! in-memory SQLite database.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;

use dukkon::cache::{InMemoryPreferenceCache, PreferenceCache};
use dukkon::db::{self, Database};
use dukkon::dialogue::{ProductDraft, Stage};
use dukkon::localization::LocalizationManager;
use dukkon::models::Language;
use dukkon::workflow::{MenuSpec, Workflow};

const USER: i64 = 4242;

struct TestEnv {
    db: Database,
    locales: LocalizationManager,
    prefs: InMemoryPreferenceCache,
}

impl TestEnv {
    async fn new() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        db::init_schema(&pool).await?;

        Ok(Self {
            db: Database::new(pool),
            locales: LocalizationManager::new()?,
            prefs: InMemoryPreferenceCache::new(),
        })
    }

    fn workflow(&self) -> Workflow<'_> {
        Workflow::new(&self.db, &self.locales, &self.prefs, Language::Latin)
    }
}

#[tokio::test]
async fn test_place_order_lists_products() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.add_product("Suv 10L", 15000, 2).await?;
    env.db.add_product("Suv 19L", 25000, 1).await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::Idle, "✅ Buyurtma berish")
        .await?;

    assert_eq!(step.next, Stage::SelectingProduct);
    assert_eq!(step.replies.len(), 1);
    match &step.replies[0].menu {
        Some(MenuSpec::Products(items)) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].0, "Suv 10L");
        }
        other => panic!("Expected product menu, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_product_selection_builds_draft() -> Result<()> {
    let env = TestEnv::new().await?;
    let id = env.db.add_product("Suv 10L", 15000, 2).await?;

    let step = env
        .workflow()
        .handle_selection(USER, Stage::SelectingProduct, &id.to_string())
        .await?;

    match &step.next {
        Stage::ConfirmingProduct { draft } => {
            assert_eq!(draft.product_id, id);
            assert_eq!(draft.unit_price, 15000);
            assert_eq!(draft.min_quantity, 2);
        }
        other => panic!("Expected ConfirmingProduct, got {other:?}"),
    }
    assert_eq!(step.replies[0].menu, Some(MenuSpec::OrderOrBack));
    // Displayed price is grouped; the raw integer never reaches the text.
    assert!(step.replies[0].text.contains("15,000"));

    Ok(())
}

#[tokio::test]
async fn test_missing_product_aborts_transition() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env
        .workflow()
        .handle_selection(USER, Stage::SelectingProduct, "999")
        .await?;

    assert_eq!(step.next, Stage::SelectingProduct);
    assert_eq!(step.replies.len(), 1);
    assert!(step.replies[0].menu.is_none());

    Ok(())
}

#[tokio::test]
async fn test_back_reyields_same_product_list() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.add_product("Suv 10L", 15000, 2).await?;
    env.db.add_product("Suv 19L", 25000, 1).await?;

    let workflow = env.workflow();
    let entry = workflow.handle_text(USER, Stage::Idle, "✅ Buyurtma berish").await?;
    let draft = ProductDraft { product_id: 1, unit_price: 15000, min_quantity: 2 };
    let back = workflow
        .handle_selection(USER, Stage::ConfirmingProduct { draft }, "back")
        .await?;

    assert_eq!(back.next, Stage::SelectingProduct);
    assert_eq!(entry.replies[0].menu, back.replies[0].menu);

    Ok(())
}

#[tokio::test]
async fn test_quantity_with_trailing_text_creates_cart_line() -> Result<()> {
    let env = TestEnv::new().await?;
    let id = env.db.add_product("Suv 10L", 15000, 2).await?;
    let draft = ProductDraft { product_id: id, unit_price: 15000, min_quantity: 2 };

    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringQuantity { draft }, "3 ta")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    let lines = env.db.cart_lines_by_user(USER).await?;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].total_count, 3);
    assert_eq!(lines[0].total_price, 45000);
    assert_eq!(lines[0].product_id, id);

    Ok(())
}

#[tokio::test]
async fn test_quantity_below_minimum_stays_with_draft() -> Result<()> {
    let env = TestEnv::new().await?;
    let id = env.db.add_product("Suv 10L", 15000, 2).await?;
    let draft = ProductDraft { product_id: id, unit_price: 15000, min_quantity: 2 };

    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringQuantity { draft: draft.clone() }, "1")
        .await?;

    assert_eq!(step.next, Stage::EnteringQuantity { draft });
    // The minimum is part of the notice.
    assert!(step.replies[0].text.contains('2'));
    assert!(env.db.cart_lines_by_user(USER).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_quantity_without_numeral_stays_with_draft() -> Result<()> {
    let env = TestEnv::new().await?;
    let id = env.db.add_product("Suv 10L", 15000, 2).await?;
    let draft = ProductDraft { product_id: id, unit_price: 15000, min_quantity: 2 };

    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringQuantity { draft: draft.clone() }, "ikkita")
        .await?;

    assert_eq!(step.next, Stage::EnteringQuantity { draft });
    assert!(env.db.cart_lines_by_user(USER).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_empty_cart_is_terminal() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::Idle, "🛒 Savatcha")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    assert!(step.replies[0].menu.is_none());

    Ok(())
}

#[tokio::test]
async fn test_cart_summary_offers_region_menu() -> Result<()> {
    let env = TestEnv::new().await?;
    let id = env.db.add_product("Suv 10L", 15000, 2).await?;
    env.db.add_cart_line(USER, id, 45000, 3).await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::Idle, "🛒 Savatcha")
        .await?;

    assert_eq!(step.next, Stage::SelectingRegion);
    assert_eq!(step.replies[0].menu, Some(MenuSpec::Regions));
    assert!(step.replies[0].text.contains("Suv 10L"));
    assert!(step.replies[0].text.contains("45,000"));

    Ok(())
}

#[tokio::test]
async fn test_unsupported_region_never_leaves_stage() -> Result<()> {
    let env = TestEnv::new().await?;
    let workflow = env.workflow();

    for region in ["Toshkent", "Samarqand", "Atlantis"] {
        let step = workflow
            .handle_selection(USER, Stage::SelectingRegion, region)
            .await?;
        assert_eq!(step.next, Stage::SelectingRegion, "region {region} changed stage");
        assert!(!step.replies.is_empty());
    }

    Ok(())
}

#[tokio::test]
async fn test_serviced_region_advances_to_districts() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env
        .workflow()
        .handle_selection(USER, Stage::SelectingRegion, "Farg‘ona")
        .await?;

    assert_eq!(step.next, Stage::SelectingDistrict { region: "Farg‘ona".to_string() });
    match &step.replies[0].menu {
        Some(MenuSpec::Districts(districts)) => assert!(districts.contains(&"Qo‘qon")),
        other => panic!("Expected district menu, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_district_choice_prompts_for_location() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env
        .workflow()
        .handle_selection(
            USER,
            Stage::SelectingDistrict { region: "Farg‘ona".to_string() },
            "Qo‘qon",
        )
        .await?;

    assert_eq!(
        step.next,
        Stage::AwaitingLocation {
            region: "Farg‘ona".to_string(),
            district: "Qo‘qon".to_string(),
        }
    );
    assert_eq!(step.replies[0].menu, Some(MenuSpec::LocationRequest));

    Ok(())
}

#[tokio::test]
async fn test_finalization_consumes_all_cart_lines() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;
    env.db.update_full_name(USER, "Test Customer").await?;
    env.db.update_phone(USER, "+998901234567").await?;
    let a = env.db.add_product("Suv 10L", 15000, 2).await?;
    let b = env.db.add_product("Suv 19L", 20000, 1).await?;
    env.db.add_cart_line(USER, a, 30000, 2).await?;
    env.db.add_cart_line(USER, b, 20000, 1).await?;

    let stage = Stage::AwaitingLocation {
        region: "Farg‘ona".to_string(),
        district: "Qo‘qon".to_string(),
    };
    let step = env
        .workflow()
        .handle_location(USER, stage, 40.3894, 71.7843)
        .await?;

    assert_eq!(step.next, Stage::Idle);

    let orders = env.db.orders_by_user(USER).await?;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].total_price, 50000);
    assert_eq!(orders[0].location, "40.3894,71.7843");

    assert!(env.db.cart_lines_by_user(USER).await?.is_empty());

    let note = step.operator_note.expect("operator summary missing");
    assert!(note.contains("Yangi buyurtma!"));
    assert!(note.contains("Test Customer"));
    assert!(note.contains("+998901234567"));
    assert!(note.contains("Farg‘ona"));
    assert!(note.contains("Jami narx: 50,000"));

    Ok(())
}

#[tokio::test]
async fn test_location_with_empty_cart_places_no_order() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;

    let stage = Stage::AwaitingLocation {
        region: "Farg‘ona".to_string(),
        district: "Qo‘qon".to_string(),
    };
    let step = env.workflow().handle_location(USER, stage, 40.0, 71.0).await?;

    assert_eq!(step.next, Stage::Idle);
    assert!(step.operator_note.is_none());
    assert!(env.db.orders_by_user(USER).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_location_outside_checkout_is_ignored() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env.workflow().handle_location(USER, Stage::Idle, 40.0, 71.0).await?;

    assert_eq!(step.next, Stage::Idle);
    assert!(step.replies.is_empty());
    assert!(env.db.orders_by_user(USER).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_menu_command_overrides_stage_input() -> Result<()> {
    let env = TestEnv::new().await?;
    let id = env.db.add_product("Suv 10L", 15000, 2).await?;
    let draft = ProductDraft { product_id: id, unit_price: 15000, min_quantity: 2 };

    // Picking a main-menu button mid-quantity abandons the draft.
    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringQuantity { draft }, "✅ Buyurtma berish")
        .await?;

    assert_eq!(step.next, Stage::SelectingProduct);
    assert!(env.db.cart_lines_by_user(USER).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_language_fallback_on_cache_miss() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env.workflow().handle_text(USER, Stage::Idle, "🛒 Savatcha").await?;
    assert_eq!(step.lang, Language::Latin);
    assert_eq!(step.replies[0].text, "Savatingiz boʻsh.");

    Ok(())
}

#[tokio::test]
async fn test_cached_language_selects_catalog() -> Result<()> {
    let env = TestEnv::new().await?;
    env.prefs.set(USER, Language::Cyrillic);

    let step = env.workflow().handle_text(USER, Stage::Idle, "🛒 Cаватча").await?;
    assert_eq!(step.lang, Language::Cyrillic);
    assert_eq!(step.replies[0].text, "Саватингиз бўш.");

    Ok(())
}

#[tokio::test]
async fn test_start_creates_profile_and_asks_language() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env.workflow().handle_text(USER, Stage::Idle, "/start").await?;

    assert_eq!(step.next, Stage::ChoosingLanguage);
    assert_eq!(step.replies[0].menu, Some(MenuSpec::Languages));
    assert!(env.db.get_profile(USER).await?.is_some());

    Ok(())
}

#[tokio::test]
async fn test_language_change_updates_profile_and_cache() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;

    let step = env
        .workflow()
        .handle_selection(USER, Stage::ChoosingLanguage, "lang_ru")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    assert_eq!(step.lang, Language::Cyrillic);
    assert_eq!(step.replies[0].menu, Some(MenuSpec::MainMenu));

    let profile = env.db.get_profile(USER).await?.unwrap();
    assert_eq!(profile.language(), Some(Language::Cyrillic));
    assert_eq!(env.prefs.get(USER), Some(Language::Cyrillic));

    Ok(())
}

#[tokio::test]
async fn test_settings_menu_branches() -> Result<()> {
    let env = TestEnv::new().await?;
    let workflow = env.workflow();

    let lang = workflow
        .handle_selection(USER, Stage::ChoosingSetting, "change_lang")
        .await?;
    assert_eq!(lang.next, Stage::ChoosingLanguage);

    let phone = workflow
        .handle_selection(USER, Stage::ChoosingSetting, "change_phone_number")
        .await?;
    assert_eq!(phone.next, Stage::EnteringPhone);
    assert_eq!(phone.replies[0].menu, Some(MenuSpec::PhoneRequest));

    let name = workflow
        .handle_selection(USER, Stage::ChoosingSetting, "change_name")
        .await?;
    assert_eq!(name.next, Stage::EnteringFullName);

    Ok(())
}

#[tokio::test]
async fn test_invalid_phone_reprompts_in_place() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringPhone, "901234567")
        .await?;

    assert_eq!(step.next, Stage::EnteringPhone);
    let profile = env.db.get_profile(USER).await?.unwrap();
    assert_eq!(profile.phone_number, None);

    Ok(())
}

#[tokio::test]
async fn test_valid_phone_is_stored() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringPhone, "+998901234567")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    let profile = env.db.get_profile(USER).await?.unwrap();
    assert_eq!(profile.phone_number.as_deref(), Some("+998901234567"));

    Ok(())
}

#[tokio::test]
async fn test_shared_contact_is_normalized_and_stored() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;

    let step = env
        .workflow()
        .handle_contact(USER, Stage::EnteringPhone, "998901234567")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    let profile = env.db.get_profile(USER).await?.unwrap();
    assert_eq!(profile.phone_number.as_deref(), Some("+998901234567"));

    Ok(())
}

#[tokio::test]
async fn test_full_name_update() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.upsert_profile(USER).await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::EnteringFullName, "  Ali Valiyev ")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    let profile = env.db.get_profile(USER).await?.unwrap();
    assert_eq!(profile.full_name.as_deref(), Some("Ali Valiyev"));

    Ok(())
}

#[tokio::test]
async fn test_my_orders_listing() -> Result<()> {
    let env = TestEnv::new().await?;
    env.db.place_order(USER, 50000, "40.0,71.0", &[]).await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::Idle, "📦 Mening buyurtmalarim")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    assert!(step.replies[0].text.contains("50,000"));
    assert!(step.replies[0].text.contains("https://www.google.com/maps?q=40.0,71.0"));

    Ok(())
}

#[tokio::test]
async fn test_my_orders_empty() -> Result<()> {
    let env = TestEnv::new().await?;

    let step = env
        .workflow()
        .handle_text(USER, Stage::Idle, "📦 Mening buyurtmalarim")
        .await?;

    assert_eq!(step.next, Stage::Idle);
    assert_eq!(step.replies[0].text, "Buyurtma topilmadi!");

    Ok(())
}
