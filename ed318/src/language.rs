//! Listes de textes localisés (anglais / suédois)

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Langues publiées
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Language {
    #[serde(rename = "en-GB")]
    EnGb,
    #[serde(rename = "se-SE")]
    SeSe,
}

/// Clé portant le texte dans une entrée localisée
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextKey {
    #[default]
    Text,
    Name,
}

impl TextKey {
    pub fn as_str(self) -> &'static str {
        match self {
            TextKey::Text => "text",
            TextKey::Name => "name",
        }
    }
}

/// Une entrée `{text|name, lang}`
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedText {
    pub key: TextKey,
    pub value: String,
    pub lang: Language,
}

impl LocalizedText {
    pub fn new(value: impl Into<String>, lang: Language) -> Self {
        Self {
            key: TextKey::Text,
            value: value.into(),
            lang,
        }
    }

    /// Liste à une seule entrée, en suédois
    pub fn swedish(value: impl Into<String>) -> Vec<Self> {
        vec![Self::new(value, Language::SeSe)]
    }

    /// Liste à une seule entrée, en anglais
    pub fn english(value: impl Into<String>) -> Vec<Self> {
        vec![Self::new(value, Language::EnGb)]
    }
}

impl Serialize for LocalizedText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry(self.key.as_str(), &self.value)?;
        map.serialize_entry("lang", &self.lang)?;
        map.end()
    }
}

/// Construit la liste localisée depuis les colonnes anglaise et suédoise.
///
/// Anglais d'abord, suédois ensuite; une langue sans texte est omise.
/// Retourne `None` (et non une liste vide) si aucune langue n'a de texte.
pub fn language_list(
    english: Option<&str>,
    swedish: Option<&str>,
    key: TextKey,
) -> Option<Vec<LocalizedText>> {
    let entries: Vec<LocalizedText> = [(english, Language::EnGb), (swedish, Language::SeSe)]
        .into_iter()
        .filter_map(|(value, lang)| {
            let value = value.map(str::trim).filter(|v| !v.is_empty())?;
            Some(LocalizedText {
                key,
                value: value.to_string(),
                lang,
            })
        })
        .collect();

    if entries.is_empty() {
        None
    } else {
        Some(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_both_languages() {
        let list = language_list(Some("Restricted area"), Some("Restriktionsområde"), TextKey::Text)
            .unwrap();
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([
                {"text": "Restricted area", "lang": "en-GB"},
                {"text": "Restriktionsområde", "lang": "se-SE"}
            ])
        );
    }

    #[test]
    fn test_single_language() {
        let list = language_list(None, Some("Luftfartsverket"), TextKey::Name).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(
            serde_json::to_value(&list[0]).unwrap(),
            json!({"name": "Luftfartsverket", "lang": "se-SE"})
        );
    }

    #[test]
    fn test_no_language() {
        assert_eq!(language_list(None, None, TextKey::Text), None);
        assert_eq!(language_list(Some(""), Some("  "), TextKey::Text), None);
    }
}
