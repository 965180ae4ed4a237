// src/common/i18n.rs

use std::collections::HashMap;

use anyhow::Context;

pub const FALLBACK_LOCALE: &str = "es";

// Arquivos embutidos no binário: não dependem do diretório de execução
const BUNDLES: [(&str, &str); 3] = [
    ("es", include_str!("../../locales/es.json")),
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Mensagens traduzidas, indexadas por idioma e chave ("error.invalid_token").
#[derive(Debug, Clone)]
pub struct I18nStore {
    bundles: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn new() -> anyhow::Result<Self> {
        let mut bundles = HashMap::new();
        for (lang, raw) in BUNDLES {
            let messages: HashMap<String, String> = serde_json::from_str(raw)
                .with_context(|| format!("Arquivo de tradução inválido: locales/{lang}.json"))?;
            bundles.insert(lang.to_string(), messages);
        }
        Ok(Self { bundles })
    }

    pub fn supports(&self, lang: &str) -> bool {
        self.bundles.contains_key(lang)
    }

    /// Idioma pedido -> espanhol -> a própria chave.
    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(FALLBACK_LOCALE, key))
            .unwrap_or(key)
            .to_string()
    }

    /// Igual a `translate`, trocando `{0}`, `{1}`... pelos argumentos.
    pub fn translate_with(&self, lang: &str, key: &str, args: &[&str]) -> String {
        args.iter()
            .enumerate()
            .fold(self.translate(lang, key), |text, (i, arg)| {
                text.replace(&format!("{{{i}}}"), arg)
            })
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.bundles
            .get(lang)
            .and_then(|messages| messages.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_bundle_has_the_same_keys() {
        let store = I18nStore::new().unwrap();
        let reference = &store.bundles[FALLBACK_LOCALE];
        for (lang, messages) in &store.bundles {
            for key in reference.keys() {
                assert!(messages.contains_key(key), "{lang} sem a chave {key}");
            }
        }
    }

    #[test]
    fn unknown_language_falls_back_to_spanish() {
        let store = I18nStore::new().unwrap();
        assert_eq!(
            store.translate("de", "error.invalid_token"),
            store.translate("es", "error.invalid_token")
        );
    }

    #[test]
    fn unknown_key_is_returned_as_is() {
        let store = I18nStore::new().unwrap();
        assert_eq!(store.translate("pt", "nao.existe"), "nao.existe");
    }

    #[test]
    fn placeholders_are_replaced() {
        let store = I18nStore::new().unwrap();
        let text = store.translate_with("es", "error.no_period_for_date", &["1900-01-01"]);
        assert!(text.contains("1900-01-01"));
        assert!(!text.contains("{0}"));
    }
}
