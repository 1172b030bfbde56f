use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identifier of an extraction model selectable by clients
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelId {
    #[default]
    Docling,
    Surya,
    Mineru,
}

/// Error returned when a model name is not in the catalog
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown model: {0}")]
pub struct UnknownModel(pub String);

/// Static description of an extraction model
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ModelInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub capabilities: &'static [&'static str],
    pub best_for: &'static str,
    pub status: &'static str,
}

impl ModelId {
    /// Every model, in catalog order
    pub const ALL: [ModelId; 3] = [ModelId::Docling, ModelId::Surya, ModelId::Mineru];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Docling => "docling",
            ModelId::Surya => "surya",
            ModelId::Mineru => "mineru",
        }
    }

    /// Returns the catalog entry for this model
    pub fn info(&self) -> ModelInfo {
        match self {
            ModelId::Docling => ModelInfo {
                name: "Docling",
                description: "Document understanding and conversion framework",
                capabilities: &["text", "tables", "layout", "structure"],
                best_for: "General documents and structured content",
                status: "available",
            },
            ModelId::Surya => ModelInfo {
                name: "Surya",
                description: "Multilingual document OCR and layout analysis",
                capabilities: &["text", "layout", "multilingual"],
                best_for: "Multilingual documents and complex layouts",
                status: "available",
            },
            ModelId::Mineru => ModelInfo {
                name: "MinerU",
                description: "PDF extraction for scientific documents",
                capabilities: &["text", "tables", "formulas", "figures"],
                best_for: "Scientific papers and academic documents",
                status: "available",
            },
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Model identifiers joined for display in error messages
pub fn model_names() -> String {
    ModelId::ALL
        .iter()
        .map(ModelId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// The full model catalog, serialized as an id-keyed map in catalog order
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(ModelId::ALL.len()))?;
        for model in ModelId::ALL {
            map.serialize_entry(model.as_str(), &model.info())?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_models() {
        assert_eq!("docling".parse::<ModelId>(), Ok(ModelId::Docling));
        assert_eq!("surya".parse::<ModelId>(), Ok(ModelId::Surya));
        assert_eq!("mineru".parse::<ModelId>(), Ok(ModelId::Mineru));
    }

    #[test]
    fn rejects_unknown_and_miscased_models() {
        assert_eq!(
            "tesseract".parse::<ModelId>(),
            Err(UnknownModel("tesseract".into()))
        );
        assert!("Docling".parse::<ModelId>().is_err());
        assert!("".parse::<ModelId>().is_err());
    }

    #[test]
    fn default_model_is_docling() {
        assert_eq!(ModelId::default(), ModelId::Docling);
    }

    #[test]
    fn model_names_lists_catalog_order() {
        assert_eq!(model_names(), "docling, surya, mineru");
    }

    #[test]
    fn catalog_serializes_in_order_with_details() {
        let json = serde_json::to_string(&Catalog).unwrap();
        let docling = json.find("\"docling\"").unwrap();
        let surya = json.find("\"surya\"").unwrap();
        let mineru = json.find("\"mineru\"").unwrap();
        assert!(docling < surya && surya < mineru);

        let value = serde_json::to_value(Catalog).unwrap();
        assert_eq!(value["mineru"]["name"], "MinerU");
        assert_eq!(value["surya"]["capabilities"][2], "multilingual");
        assert_eq!(value["docling"]["status"], "available");
    }
}
