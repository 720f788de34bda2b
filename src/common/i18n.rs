// src/common/i18n.rs

use std::collections::HashMap;

const FALLBACK_LANG: &str = "en";

// Os arquivos de tradução vão embutidos no binário
const BUNDLED_LOCALES: &[(&str, &str)] = &[
    ("pt", include_str!("../../locales/pt.json")),
    ("en", include_str!("../../locales/en.json")),
];

/// Mensagens de erro por idioma: `lang -> (chave -> texto)`.
#[derive(Debug, Clone, Default)]
pub struct I18nStore {
    messages: HashMap<String, HashMap<String, String>>,
}

impl I18nStore {
    pub fn load() -> anyhow::Result<Self> {
        let mut messages = HashMap::new();
        for (lang, raw) in BUNDLED_LOCALES {
            let table: HashMap<String, String> = serde_json::from_str(raw)
                .map_err(|e| anyhow::anyhow!("Arquivo de idioma '{}' inválido: {}", lang, e))?;
            messages.insert(lang.to_string(), table);
        }
        Ok(Self { messages })
    }

    pub fn translate(&self, lang: &str, key: &str) -> String {
        self.lookup(lang, key)
            .or_else(|| self.lookup(FALLBACK_LANG, key))
            .unwrap_or(key)
            .to_string()
    }

    fn lookup(&self, lang: &str, key: &str) -> Option<&str> {
        self.messages
            .get(lang)
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}
