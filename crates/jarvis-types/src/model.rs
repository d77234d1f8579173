//! Model descriptors shown in the model selector.

use serde::{Deserialize, Serialize};

/// A selectable model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl ModelInfo {
    fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            version: None,
            size: None,
            is_premium: false,
        }
    }

    fn premium(mut self) -> Self {
        self.is_premium = true;
        self
    }
}

/// Id of the model selected when nothing else is configured.
pub const DEFAULT_MODEL_ID: &str = "gpt-4o-mini";

/// The built-in model list, in display order.
pub fn builtin_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new("gpt-4o", "GPT-4o", "Our most capable model for complex tasks").premium(),
        ModelInfo::new(
            "gpt-4o-mini",
            "GPT-4o Mini",
            "Fast and efficient for everyday tasks",
        ),
        ModelInfo::new(
            "gpt-3.5-turbo",
            "GPT-3.5 Turbo",
            "Great balance of speed and capabilities",
        ),
        ModelInfo {
            version: Some("8B".to_string()),
            size: Some("8.0B".to_string()),
            ..ModelInfo::new("llama3-8b", "Llama 3", "Open source model for various tasks")
        },
        ModelInfo::new(
            "claude-3-opus",
            "Claude 3 Opus",
            "Advanced reasoning and understanding",
        )
        .premium(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_models_contain_default() {
        let models = builtin_models();
        assert_eq!(models.len(), 5);
        assert!(models.iter().any(|m| m.id == DEFAULT_MODEL_ID));
    }

    #[test]
    fn test_premium_flags() {
        let premium: Vec<_> = builtin_models()
            .into_iter()
            .filter(|m| m.is_premium)
            .map(|m| m.id)
            .collect();
        assert_eq!(premium, vec!["gpt-4o", "claude-3-opus"]);
    }

    #[test]
    fn test_llama_has_size() {
        let llama = builtin_models()
            .into_iter()
            .find(|m| m.id == "llama3-8b")
            .unwrap();
        assert_eq!(llama.version.as_deref(), Some("8B"));
        assert_eq!(llama.size.as_deref(), Some("8.0B"));
    }
}
