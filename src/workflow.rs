//! The order workflow: a per-user conversation state machine that walks a
//! customer from catalog browse to a confirmed order, plus the settings
//! sub-flow (language, phone, full name).
//!
//! The workflow is transport-agnostic: each entry point takes the user id,
//! the current [`Stage`] and the event payload, and returns a [`Step`] with
//! the next stage and the outbound messages. The bot layer owns delivery
//! and dialogue storage; this module owns every transition decision.

use anyhow::Result;
use tracing::{info, warn};

use crate::cache::PreferenceCache;
use crate::db::Database;
use crate::dialogue::{ProductDraft, Stage};
use crate::localization::LocalizationManager;
use crate::models::Language;
use crate::regions;
use crate::text_processing::{check_phone, fix_phone, format_price, maps_link, parse_quantity};

/// Main-menu button labels per script. These double as the match targets
/// for incoming text, so the keyboard and the parser can never drift apart.
const PLACE_ORDER_LABELS: [&str; 2] = ["✅ Buyurtma berish", "✅ Буюртма бериш"];
const CART_LABELS: [&str; 2] = ["🛒 Savatcha", "🛒 Cаватча"];
const MY_ORDERS_LABELS: [&str; 2] = ["📦 Mening buyurtmalarim", "📦 Менинг буюртмаларим"];
const CONTACT_LABELS: [&str; 2] = ["📲 Biz bilan bog‘lanish", "📲 Биз билан боғланиш"];
const SETTINGS_LABELS: [&str; 2] = ["⚙️ Sozlamalar", "⚙️ Созламалар"];

fn label_for(labels: &[&'static str; 2], lang: Language) -> &'static str {
    match lang {
        Language::Latin => labels[0],
        Language::Cyrillic => labels[1],
    }
}

/// Main-menu rows for a language: [place order], [cart, my orders],
/// [contact, settings].
pub fn main_menu_rows(lang: Language) -> Vec<Vec<&'static str>> {
    vec![
        vec![label_for(&PLACE_ORDER_LABELS, lang)],
        vec![label_for(&CART_LABELS, lang), label_for(&MY_ORDERS_LABELS, lang)],
        vec![label_for(&CONTACT_LABELS, lang), label_for(&SETTINGS_LABELS, lang)],
    ]
}

/// A main-menu choice, recognized from any stage in either script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    PlaceOrder,
    ViewCart,
    MyOrders,
    ContactUs,
    Settings,
}

impl MenuCommand {
    pub fn parse(text: &str) -> Option<MenuCommand> {
        if PLACE_ORDER_LABELS.contains(&text) {
            Some(MenuCommand::PlaceOrder)
        } else if CART_LABELS.contains(&text) {
            Some(MenuCommand::ViewCart)
        } else if MY_ORDERS_LABELS.contains(&text) {
            Some(MenuCommand::MyOrders)
        } else if CONTACT_LABELS.contains(&text) {
            Some(MenuCommand::ContactUs)
        } else if SETTINGS_LABELS.contains(&text) {
            Some(MenuCommand::Settings)
        } else {
            None
        }
    }
}

/// Which choice menu accompanies an outbound message. The bot layer renders
/// these into actual keyboards; the workflow only selects the kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuSpec {
    /// Product picker: (name, id) per button.
    Products(Vec<(String, i64)>),
    OrderOrBack,
    Regions,
    Districts(&'static [&'static str]),
    LocationRequest,
    PhoneRequest,
    MainMenu,
    Settings,
    Languages,
}

/// One outbound message: already-localized text plus an optional menu.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub text: String,
    pub menu: Option<MenuSpec>,
}

impl Outbound {
    pub fn text(text: String) -> Self {
        Self { text, menu: None }
    }

    pub fn with_menu(text: String, menu: MenuSpec) -> Self {
        Self { text, menu: Some(menu) }
    }
}

/// Result of one workflow step.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next: Stage,
    /// Language the step was rendered in; the bot layer needs it to label
    /// menu buttons.
    pub lang: Language,
    pub replies: Vec<Outbound>,
    /// Order summary for the operator channel, delivered best-effort after
    /// the customer-facing replies.
    pub operator_note: Option<String>,
}

impl Step {
    fn stay(lang: Language, stage: Stage) -> Self {
        Self { next: stage, lang, replies: Vec::new(), operator_note: None }
    }

    fn reply(lang: Language, next: Stage, replies: Vec<Outbound>) -> Self {
        Self { next, lang, replies, operator_note: None }
    }
}

/// The order workflow over its external collaborators.
pub struct Workflow<'a> {
    db: &'a Database,
    locales: &'a LocalizationManager,
    prefs: &'a dyn PreferenceCache,
    fallback: Language,
}

impl<'a> Workflow<'a> {
    pub fn new(
        db: &'a Database,
        locales: &'a LocalizationManager,
        prefs: &'a dyn PreferenceCache,
        fallback: Language,
    ) -> Self {
        Self { db, locales, prefs, fallback }
    }

    /// Resolve the user's language, falling back on a cache miss.
    fn language(&self, user_id: i64) -> Language {
        self.prefs.get(user_id).unwrap_or(self.fallback)
    }

    fn t(&self, lang: Language, key: &str) -> String {
        self.locales.t(lang, key)
    }

    // ---- entry points ----

    /// Handle a free-text message.
    pub async fn handle_text(&self, user_id: i64, stage: Stage, text: &str) -> Result<Step> {
        let lang = self.language(user_id);

        if text == "/start" {
            self.db.upsert_profile(user_id).await?;
            return Ok(Step::reply(
                lang,
                Stage::ChoosingLanguage,
                vec![Outbound::with_menu(
                    self.t(lang, "welcome"),
                    MenuSpec::Languages,
                )],
            ));
        }

        // Menu choices win over stage input, matching the router precedence
        // of the conversational UI.
        if let Some(cmd) = MenuCommand::parse(text) {
            return self.handle_menu_command(user_id, lang, cmd).await;
        }

        match stage {
            Stage::EnteringQuantity { draft } => self.handle_quantity(user_id, lang, draft, text).await,
            Stage::EnteringPhone => self.handle_phone_text(user_id, lang, text).await,
            Stage::EnteringFullName => self.handle_full_name(user_id, lang, text).await,
            other => Ok(Step::stay(lang, other)),
        }
    }

    /// Handle a shared contact card while the phone prompt is active. The
    /// contact number is trusted as-is, normalized to a leading `+`.
    pub async fn handle_contact(&self, user_id: i64, stage: Stage, phone: &str) -> Result<Step> {
        let lang = self.language(user_id);

        match stage {
            Stage::EnteringPhone => {
                let phone = fix_phone(phone);
                self.db.update_phone(user_id, &phone).await?;
                Ok(Step::reply(
                    lang,
                    Stage::Idle,
                    vec![Outbound::with_menu(
                        self.t(lang, "phone-updated"),
                        MenuSpec::MainMenu,
                    )],
                ))
            }
            other => Ok(Step::stay(lang, other)),
        }
    }

    /// Handle a button/callback selection.
    pub async fn handle_selection(&self, user_id: i64, stage: Stage, data: &str) -> Result<Step> {
        let lang = self.language(user_id);

        match stage {
            Stage::SelectingProduct => self.handle_product_choice(user_id, lang, data).await,
            Stage::ConfirmingProduct { draft } => {
                self.handle_confirm_choice(lang, draft, data).await
            }
            Stage::SelectingRegion => self.handle_region_choice(lang, data),
            Stage::SelectingDistrict { region } => Ok(Step::reply(
                lang,
                Stage::AwaitingLocation { region, district: data.to_string() },
                vec![Outbound::with_menu(
                    self.t(lang, "send-location-order"),
                    MenuSpec::LocationRequest,
                )],
            )),
            Stage::ChoosingSetting => Ok(self.handle_setting_choice(lang, data)),
            Stage::ChoosingLanguage => self.handle_language_choice(user_id, lang, data).await,
            other => Ok(Step::stay(lang, other)),
        }
    }

    /// Handle a live-location share: finalize the order if one is pending.
    pub async fn handle_location(
        &self,
        user_id: i64,
        stage: Stage,
        latitude: f64,
        longitude: f64,
    ) -> Result<Step> {
        let lang = self.language(user_id);

        match stage {
            Stage::AwaitingLocation { region, district } => {
                self.finalize_order(user_id, lang, &region, &district, latitude, longitude)
                    .await
            }
            other => Ok(Step::stay(lang, other)),
        }
    }

    // ---- menu commands ----

    async fn handle_menu_command(
        &self,
        user_id: i64,
        lang: Language,
        cmd: MenuCommand,
    ) -> Result<Step> {
        match cmd {
            MenuCommand::PlaceOrder => {
                let menu = self.product_menu().await?;
                Ok(Step::reply(
                    lang,
                    Stage::SelectingProduct,
                    vec![Outbound::with_menu(self.t(lang, "category-select"), menu)],
                ))
            }
            MenuCommand::ViewCart => self.show_cart(user_id, lang).await,
            MenuCommand::MyOrders => self.show_orders(user_id, lang).await,
            MenuCommand::ContactUs => Ok(Step::reply(
                lang,
                Stage::Idle,
                vec![Outbound::text(self.t(lang, "contact-info"))],
            )),
            MenuCommand::Settings => Ok(Step::reply(
                lang,
                Stage::ChoosingSetting,
                vec![Outbound::with_menu(
                    self.t(lang, "settings-prompt"),
                    MenuSpec::Settings,
                )],
            )),
        }
    }

    async fn product_menu(&self) -> Result<MenuSpec> {
        let products = self.db.list_products().await?;
        Ok(MenuSpec::Products(
            products.into_iter().map(|p| (p.name, p.id)).collect(),
        ))
    }

    async fn show_cart(&self, user_id: i64, lang: Language) -> Result<Step> {
        let lines = self.db.cart_lines_by_user(user_id).await?;

        if lines.is_empty() {
            return Ok(Step::reply(
                lang,
                Stage::Idle,
                vec![Outbound::text(self.t(lang, "product-not-cart"))],
            ));
        }

        let mut text = self.t(lang, "cart-summary-title");
        text.push('\n');
        for line in &lines {
            let name = self.product_name(line.product_id).await?;
            text.push('\n');
            text.push_str(&self.locales.t_args(
                lang,
                "cart-line",
                &[
                    ("name", name),
                    ("count", line.total_count.to_string()),
                    ("total", format_price(line.total_price)),
                ],
            ));
            text.push('\n');
        }

        Ok(Step::reply(
            lang,
            Stage::SelectingRegion,
            vec![Outbound::with_menu(text, MenuSpec::Regions)],
        ))
    }

    async fn show_orders(&self, user_id: i64, lang: Language) -> Result<Step> {
        let orders = self.db.orders_by_user(user_id).await?;

        if orders.is_empty() {
            return Ok(Step::reply(
                lang,
                Stage::Idle,
                vec![Outbound::text(self.t(lang, "order-not-found"))],
            ));
        }

        let mut text = self.t(lang, "orders-title");
        text.push('\n');
        for order in &orders {
            text.push('\n');
            text.push_str(&self.locales.t_args(
                lang,
                "order-line",
                &[
                    ("id", order.id.to_string()),
                    ("link", maps_link(&order.location)),
                    ("total", format_price(order.total_price)),
                    ("date", order.created_at.format("%Y-%m-%d %H:%M").to_string()),
                ],
            ));
            text.push('\n');
        }

        Ok(Step::reply(lang, Stage::Idle, vec![Outbound::text(text)]))
    }

    async fn product_name(&self, product_id: i64) -> Result<String> {
        Ok(self
            .db
            .get_product(product_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_else(|| format!("#{product_id}")))
    }

    // ---- ordering flow ----

    async fn handle_product_choice(
        &self,
        user_id: i64,
        lang: Language,
        data: &str,
    ) -> Result<Step> {
        let product_id = match data.parse::<i64>() {
            Ok(id) => id,
            Err(_) => return Ok(Step::stay(lang, Stage::SelectingProduct)),
        };

        let product = match self.db.get_product(product_id).await? {
            Some(product) => product,
            None => {
                // Abort the transition: surface the failure, keep the stage.
                warn!(user_id, product_id, "Selected product not found");
                return Ok(Step::reply(
                    lang,
                    Stage::SelectingProduct,
                    vec![Outbound::text(self.t(lang, "product-not-found"))],
                ));
            }
        };

        let draft = ProductDraft {
            product_id: product.id,
            unit_price: product.price,
            min_quantity: product.min_quantity,
        };

        let detail = self.locales.t_args(
            lang,
            "product-info",
            &[("name", product.name), ("price", format_price(product.price))],
        );

        Ok(Step::reply(
            lang,
            Stage::ConfirmingProduct { draft },
            vec![Outbound::with_menu(detail, MenuSpec::OrderOrBack)],
        ))
    }

    async fn handle_confirm_choice(
        &self,
        lang: Language,
        draft: ProductDraft,
        data: &str,
    ) -> Result<Step> {
        match data {
            "place_order" => Ok(Step::reply(
                lang,
                Stage::EnteringQuantity { draft },
                vec![Outbound::text(self.t(lang, "products-quantity-enter"))],
            )),
            "back" => {
                let menu = self.product_menu().await?;
                Ok(Step::reply(
                    lang,
                    Stage::SelectingProduct,
                    vec![Outbound::with_menu(self.t(lang, "category-select"), menu)],
                ))
            }
            _ => Ok(Step::stay(lang, Stage::ConfirmingProduct { draft })),
        }
    }

    async fn handle_quantity(
        &self,
        user_id: i64,
        lang: Language,
        draft: ProductDraft,
        text: &str,
    ) -> Result<Step> {
        let count = match parse_quantity(text) {
            Some(count) => count,
            None => {
                return Ok(Step::reply(
                    lang,
                    Stage::EnteringQuantity { draft },
                    vec![Outbound::text(self.t(lang, "invalid-quantity"))],
                ))
            }
        };

        if count < draft.min_quantity {
            let notice = self.locales.t_args(
                lang,
                "min-count-product",
                &[("min", draft.min_quantity.to_string())],
            );
            return Ok(Step::reply(
                lang,
                Stage::EnteringQuantity { draft },
                vec![Outbound::text(notice)],
            ));
        }

        let total_price = match draft.unit_price.checked_mul(count) {
            Some(total) => total,
            None => {
                return Ok(Step::reply(
                    lang,
                    Stage::EnteringQuantity { draft },
                    vec![Outbound::text(self.t(lang, "invalid-quantity"))],
                ))
            }
        };

        self.db
            .add_cart_line(user_id, draft.product_id, total_price, count)
            .await?;

        Ok(Step::reply(
            lang,
            Stage::Idle,
            vec![Outbound::text(self.t(lang, "product-add-cart"))],
        ))
    }

    fn handle_region_choice(&self, lang: Language, data: &str) -> Result<Step> {
        if !regions::is_serviced(data) {
            return Ok(Step::reply(
                lang,
                Stage::SelectingRegion,
                vec![Outbound::text(self.t(lang, "region-unavailable"))],
            ));
        }

        // A serviced region always has a district table.
        let districts = regions::districts_of(data)
            .ok_or_else(|| anyhow::anyhow!("No district table for region {data}"))?;

        Ok(Step::reply(
            lang,
            Stage::SelectingDistrict { region: data.to_string() },
            vec![Outbound::with_menu(
                self.t(lang, "district-select"),
                MenuSpec::Districts(districts),
            )],
        ))
    }

    async fn finalize_order(
        &self,
        user_id: i64,
        lang: Language,
        region: &str,
        district: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Step> {
        let lines = self.db.cart_lines_by_user(user_id).await?;

        if lines.is_empty() {
            return Ok(Step::reply(
                lang,
                Stage::Idle,
                vec![Outbound::text(self.t(lang, "product-not-cart"))],
            ));
        }

        let profile = self.db.get_profile(user_id).await?;
        let location = format!("{latitude},{longitude}");

        let mut summary = String::from("Yangi buyurtma!\n\n");
        summary.push_str(&format!(
            "Foydalanuvchi: {}\n",
            profile
                .as_ref()
                .and_then(|p| p.full_name.as_deref())
                .unwrap_or("—")
        ));
        summary.push_str(&format!(
            "Telefon raqam: {}\n",
            profile
                .as_ref()
                .and_then(|p| p.phone_number.as_deref())
                .unwrap_or("—")
        ));
        summary.push_str(&format!("Manzil: {}\n", maps_link(&location)));
        summary.push_str(&format!("Viloyat: {region}\n"));
        summary.push_str(&format!("Shahar: {district}\n\n"));

        let mut total_price: i64 = 0;
        let mut consumed_ids = Vec::with_capacity(lines.len());
        for line in &lines {
            let name = self.product_name(line.product_id).await?;
            summary.push_str("Buyurtma:\n");
            summary.push_str(&format!("Nomi: {name}\n"));
            summary.push_str(&format!("Miqdori: {}\n", line.total_count));
            summary.push_str(&format!(
                "Umumiy summa: {}\n\n",
                format_price(line.total_price)
            ));
            total_price += line.total_price;
            consumed_ids.push(line.id);
        }
        summary.push_str(&format!("Jami narx: {}", format_price(total_price)));

        let order_id = self
            .db
            .place_order(user_id, total_price, &location, &consumed_ids)
            .await?;
        info!(user_id, order_id, total_price, "Checkout finalized");

        Ok(Step {
            next: Stage::Idle,
            lang,
            replies: vec![Outbound::with_menu(
                self.t(lang, "order-accepted"),
                MenuSpec::MainMenu,
            )],
            operator_note: Some(summary),
        })
    }

    // ---- settings flow ----

    fn handle_setting_choice(&self, lang: Language, data: &str) -> Step {
        match data {
            "change_lang" => Step::reply(
                lang,
                Stage::ChoosingLanguage,
                vec![Outbound::with_menu(
                    self.t(lang, "select-language"),
                    MenuSpec::Languages,
                )],
            ),
            "change_phone_number" => Step::reply(
                lang,
                Stage::EnteringPhone,
                vec![Outbound::with_menu(
                    self.t(lang, "phone-prompt"),
                    MenuSpec::PhoneRequest,
                )],
            ),
            "change_name" => Step::reply(
                lang,
                Stage::EnteringFullName,
                vec![Outbound::text(self.t(lang, "full-name-prompt"))],
            ),
            _ => Step::stay(lang, Stage::ChoosingSetting),
        }
    }

    async fn handle_language_choice(
        &self,
        user_id: i64,
        lang: Language,
        data: &str,
    ) -> Result<Step> {
        let chosen = match data {
            "lang_uz" => Language::Latin,
            "lang_ru" => Language::Cyrillic,
            _ => return Ok(Step::stay(lang, Stage::ChoosingLanguage)),
        };

        self.db.update_language(user_id, chosen).await?;
        self.prefs.set(user_id, chosen);

        // Confirm in the language just chosen.
        Ok(Step::reply(
            chosen,
            Stage::Idle,
            vec![Outbound::with_menu(
                self.t(chosen, "successful-changed"),
                MenuSpec::MainMenu,
            )],
        ))
    }

    async fn handle_phone_text(&self, user_id: i64, lang: Language, text: &str) -> Result<Step> {
        if !check_phone(text) {
            return Ok(Step::reply(
                lang,
                Stage::EnteringPhone,
                vec![Outbound::text(self.t(lang, "phone-invalid"))],
            ));
        }

        self.db.update_phone(user_id, text).await?;
        Ok(Step::reply(
            lang,
            Stage::Idle,
            vec![Outbound::with_menu(
                self.t(lang, "phone-updated"),
                MenuSpec::MainMenu,
            )],
        ))
    }

    async fn handle_full_name(&self, user_id: i64, lang: Language, text: &str) -> Result<Step> {
        self.db.update_full_name(user_id, text.trim()).await?;
        Ok(Step::reply(
            lang,
            Stage::Idle,
            vec![Outbound::with_menu(
                self.t(lang, "full-name-updated"),
                MenuSpec::MainMenu,
            )],
        ))
    }
}
