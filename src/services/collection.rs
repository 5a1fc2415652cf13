use crate::{
    config::Config,
    models::collection::{CollectionDetail, CollectionMethod, CollectionType},
};

/// The collection methods configured for this merchant.
pub fn collection_methods(config: &Config) -> Vec<CollectionMethod> {
    vec![
        CollectionMethod {
            alias: "test01".to_string(),
            kind: CollectionType::Directory,
            details: None,
        },
        CollectionMethod {
            alias: "boton01".to_string(),
            kind: CollectionType::PaymentButton,
            details: Some(vec![CollectionDetail::new(
                "url",
                format!("{}/checkout", config.public_base_url),
            )]),
        },
        CollectionMethod {
            alias: "integration01".to_string(),
            kind: CollectionType::Integration,
            details: Some(vec![
                CollectionDetail::new("groupId", config.group_id.clone()),
                CollectionDetail::new("deviceId", config.device_id.clone()),
            ]),
        },
        CollectionMethod {
            alias: "pos01".to_string(),
            kind: CollectionType::PointOfSale,
            details: Some(vec![CollectionDetail::new("terminalId", "123456")]),
        },
    ]
}

/// The first method of the given kind.
pub fn find_method(config: &Config, kind: CollectionType) -> Option<CollectionMethod> {
    collection_methods(config).into_iter().find(|m| m.kind == kind)
}
