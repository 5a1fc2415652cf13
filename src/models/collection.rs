use serde::{Deserialize, Serialize};

/// Payment-acceptance channels the provider knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectionType {
    #[serde(rename = "DIRECTORIO")]
    Directory,
    #[serde(rename = "BOTON_DE_PAGO")]
    PaymentButton,
    #[serde(rename = "INTEGRACION_YAPPY")]
    Integration,
    #[serde(rename = "PUNTO_DE_VENTA")]
    PointOfSale,
}

/// A single `{ id, value }` setting of a collection method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionDetail {
    pub id: String,
    pub value: String,
}

impl CollectionDetail {
    pub fn new(id: &str, value: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            value: value.into(),
        }
    }
}

/// A collection method configured for the merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMethod {
    pub alias: String,
    #[serde(rename = "type")]
    pub kind: CollectionType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub details: Option<Vec<CollectionDetail>>,
}

impl CollectionMethod {
    /// Looks up a detail value by id.
    pub fn detail(&self, id: &str) -> Option<&str> {
        self.details
            .as_ref()?
            .iter()
            .find(|d| d.id == id)
            .map(|d| d.value.as_str())
    }
}

/// Body of the collection-method response.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionsBody {
    pub collections: Vec<CollectionMethod>,
}
