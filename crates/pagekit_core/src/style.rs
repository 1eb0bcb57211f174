use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Key the style profile occupies in the merged page configuration.
pub const STYLE_KEY: &str = "colors";

/// Fallback presentation classes applied to every processed page.
///
/// Flat on the TOML side so a `[style]` section can override single roles;
/// [`StyleDefaults::to_config`] nests them the way pages consume them.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct StyleDefaults {
    pub background: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub text_accent: String,
    pub border_default: String,
    pub border_accent: String,
    pub button_primary: String,
    pub button_secondary: String,
}

impl Default for StyleDefaults {
    fn default() -> Self {
        Self {
            background: "bg-white".to_string(),
            text_primary: "text-gray-900".to_string(),
            text_secondary: "text-gray-600".to_string(),
            text_accent: "text-indigo-600".to_string(),
            border_default: "border-gray-200".to_string(),
            border_accent: "border-indigo-600".to_string(),
            button_primary: "bg-indigo-600 text-white hover:bg-indigo-700".to_string(),
            button_secondary: "bg-white text-gray-900 border border-gray-300 hover:bg-gray-50"
                .to_string(),
        }
    }
}

impl StyleDefaults {
    pub fn to_config(&self) -> Map<String, Value> {
        let mut out = Map::new();
        out.insert(
            STYLE_KEY.to_string(),
            json!({
                "background": self.background,
                "text": {
                    "primary": self.text_primary,
                    "secondary": self.text_secondary,
                    "accent": self.text_accent,
                },
                "border": {
                    "default": self.border_default,
                    "accent": self.border_accent,
                },
                "button": {
                    "primary": self.button_primary,
                    "secondary": self.button_secondary,
                },
            }),
        );
        out
    }
}
