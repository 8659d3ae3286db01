//! Keyboard rendering: turns the workflow's [`MenuSpec`] selections into
//! concrete Telegram reply markup.

use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
    ReplyMarkup,
};

use crate::localization::LocalizationManager;
use crate::models::Language;
use crate::regions;
use crate::workflow::{main_menu_rows, MenuSpec};

/// Render a menu selection into reply markup for the given language.
pub fn reply_markup(
    menu: &MenuSpec,
    lang: Language,
    locales: &LocalizationManager,
) -> ReplyMarkup {
    match menu {
        MenuSpec::Products(items) => ReplyMarkup::InlineKeyboard(products_menu(items)),
        MenuSpec::OrderOrBack => ReplyMarkup::InlineKeyboard(order_or_back_menu(lang, locales)),
        MenuSpec::Regions => ReplyMarkup::InlineKeyboard(regions_menu()),
        MenuSpec::Districts(districts) => ReplyMarkup::InlineKeyboard(districts_menu(districts)),
        MenuSpec::LocationRequest => {
            ReplyMarkup::Keyboard(location_request_keyboard(lang, locales))
        }
        MenuSpec::PhoneRequest => ReplyMarkup::Keyboard(phone_request_keyboard(lang, locales)),
        MenuSpec::MainMenu => ReplyMarkup::Keyboard(main_menu_keyboard(lang)),
        MenuSpec::Settings => ReplyMarkup::InlineKeyboard(settings_menu(lang, locales)),
        MenuSpec::Languages => ReplyMarkup::InlineKeyboard(languages_menu()),
    }
}

/// Persistent main-menu keyboard, labels per script.
pub fn main_menu_keyboard(lang: Language) -> KeyboardMarkup {
    let rows = main_menu_rows(lang)
        .into_iter()
        .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    KeyboardMarkup::new(rows)
}

/// Product picker: one product per row, callback payload is the product id.
pub fn products_menu(items: &[(String, i64)]) -> InlineKeyboardMarkup {
    let buttons = items
        .iter()
        .map(|(name, id)| vec![InlineKeyboardButton::callback(name.clone(), id.to_string())])
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(buttons)
}

pub fn order_or_back_menu(lang: Language, locales: &LocalizationManager) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback(locales.t(lang, "btn-place-order"), "place_order"),
        InlineKeyboardButton::callback(locales.t(lang, "btn-back"), "back"),
    ]])
}

/// Region picker, two regions per row. Callback payload is the region name.
pub fn regions_menu() -> InlineKeyboardMarkup {
    let buttons = regions::region_names()
        .collect::<Vec<_>>()
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|name| InlineKeyboardButton::callback(*name, *name))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(buttons)
}

pub fn districts_menu(districts: &[&str]) -> InlineKeyboardMarkup {
    let buttons = districts
        .chunks(2)
        .map(|chunk| {
            chunk
                .iter()
                .map(|name| InlineKeyboardButton::callback(*name, *name))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(buttons)
}

pub fn settings_menu(lang: Language, locales: &LocalizationManager) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback(
            locales.t(lang, "lang-update"),
            "change_lang",
        )],
        vec![InlineKeyboardButton::callback(
            locales.t(lang, "phone-update"),
            "change_phone_number",
        )],
        vec![InlineKeyboardButton::callback(
            locales.t(lang, "name-update"),
            "change_name",
        )],
    ])
}

pub fn languages_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![
        InlineKeyboardButton::callback("O'zbekcha (lotin)", "lang_uz"),
        InlineKeyboardButton::callback("Ўзбекча (кирилл)", "lang_ru"),
    ]])
}

pub fn location_request_keyboard(
    lang: Language,
    locales: &LocalizationManager,
) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(locales.t(lang, "btn-send-location")).request(ButtonRequest::Location),
    ]])
}

pub fn phone_request_keyboard(lang: Language, locales: &LocalizationManager) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(locales.t(lang, "btn-send-number")).request(ButtonRequest::Contact),
    ]])
}
