//! Localized message catalog for the storefront bot.
//!
//! One fluent bundle per supported script, loaded from
//! `./locales/<lang>/main.ftl`. The workflow only ever supplies a
//! `(Language, key)` pair plus optional arguments; translation lives
//! entirely in the `.ftl` files.

use anyhow::{Context, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::fs;
use unic_langid::LanguageIdentifier;

use crate::models::Language;

/// Localization manager holding one bundle per supported language.
pub struct LocalizationManager {
    bundles: HashMap<Language, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Load the catalogs for both scripts from `./locales/`.
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for lang in [Language::Latin, Language::Cyrillic] {
            bundles.insert(lang, Self::create_bundle(lang)?);
        }

        Ok(Self { bundles })
    }

    fn create_bundle(lang: Language) -> Result<FluentBundle<FluentResource>> {
        // Both catalogs are Uzbek, differing only in script.
        let locale: LanguageIdentifier = "uz".parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the bidi isolation marks fluent inserts around
        // placeables as visible garbage, so turn them off.
        bundle.set_use_isolating(false);

        let resource_path = format!("./locales/{}/main.ftl", lang.locale_dir());
        let content = fs::read_to_string(&resource_path)
            .with_context(|| format!("Failed to read locale file {resource_path}"))?;
        let resource = FluentResource::try_new(content)
            .map_err(|_| anyhow::anyhow!("Failed to parse locale file {resource_path}"))?;
        bundle
            .add_resource(resource)
            .map_err(|_| anyhow::anyhow!("Duplicate messages in {resource_path}"))?;

        Ok(bundle)
    }

    /// Get a localized message.
    pub fn get_message(
        &self,
        lang: Language,
        key: &str,
        args: Option<&HashMap<&str, String>>,
    ) -> String {
        let bundle = match self.bundles.get(&lang) {
            Some(bundle) => bundle,
            None => return format!("Missing catalog: {}", lang.locale_dir()),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let mut value = String::new();

        if let Some(args) = args {
            let fluent_args = FluentArgs::from_iter(
                args.iter().map(|(k, v)| (*k, FluentValue::from(v.as_str()))),
            );
            let _ = bundle.write_pattern(&mut value, pattern, Some(&fluent_args), &mut vec![]);
        } else {
            let _ = bundle.write_pattern(&mut value, pattern, None, &mut vec![]);
        }

        value
    }

    /// Get a localized message without arguments.
    pub fn t(&self, lang: Language, key: &str) -> String {
        self.get_message(lang, key, None)
    }

    /// Get a localized message with arguments.
    pub fn t_args(&self, lang: Language, key: &str, args: &[(&str, String)]) -> String {
        let args_map: HashMap<&str, String> = args.iter().cloned().collect();
        self.get_message(lang, key, Some(&args_map))
    }
}
