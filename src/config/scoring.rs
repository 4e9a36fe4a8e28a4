//! Persona catalog configuration

use serde::Deserialize;

use crate::domain::scoring::{PersonaCatalog, PersonaError};

/// Where persona weights come from.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoringConfig {
    /// YAML file of `persona -> factor -> weight`; built-in catalog when unset
    pub personas_path: Option<String>,
}

impl ScoringConfig {
    /// Loads and validates the persona catalog.
    pub fn load_catalog(&self) -> Result<PersonaCatalog, PersonaError> {
        match self.personas_path.as_deref().filter(|p| !p.trim().is_empty()) {
            Some(path) => PersonaCatalog::load(path),
            None => PersonaCatalog::builtin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PersonaId;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_when_unset() {
        let catalog = ScoringConfig::default().load_catalog().unwrap();
        assert!(catalog.get(&PersonaId::new("student").unwrap()).is_some());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retiree:\n  safety: 0.6\n  amenities: 0.4").unwrap();

        let config = ScoringConfig {
            personas_path: Some(file.path().display().to_string()),
        };
        let catalog = config.load_catalog().unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get(&PersonaId::new("retiree").unwrap()).is_some());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let config = ScoringConfig {
            personas_path: Some("/nonexistent/personas.yaml".to_string()),
        };
        assert!(config.load_catalog().is_err());
    }
}
