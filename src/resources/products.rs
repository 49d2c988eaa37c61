use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{macros::datetime, OffsetDateTime};

use super::users::non_empty;
use crate::store::{
    explicit, is_present, lenient_float, merge_text, null_as_nan, Record, StoreError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Unparseable input is kept as NaN and goes out as `null`.
    #[serde(deserialize_with = "null_as_nan")]
    pub price: f64,
    pub category: String,
    pub in_stock: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub price: Option<Value>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "explicit")]
    pub price: Option<Value>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    /// `"true"` selects stocked products; any other value selects the rest.
    pub in_stock: Option<String>,
    pub search: Option<String>,
}

impl Record for Product {
    const KIND: &'static str = "Product";
    type Draft = ProductDraft;
    type Patch = ProductPatch;
    type Filter = ProductFilter;

    fn id(&self) -> u64 {
        self.id
    }

    fn from_draft(
        id: u64,
        draft: ProductDraft,
        created_at: OffsetDateTime,
    ) -> Result<Self, StoreError> {
        let price = draft.price.filter(|p| is_present(Some(p)));
        let (Some(name), Some(description), Some(price), Some(category)) = (
            non_empty(draft.name),
            non_empty(draft.description),
            price,
            non_empty(draft.category),
        ) else {
            return Err(StoreError::Validation(
                "Name, description, price, and category are required",
            ));
        };
        Ok(Self {
            id,
            name,
            description,
            price: lenient_float(&price),
            category,
            in_stock: draft.in_stock.unwrap_or(true),
            created_at,
        })
    }

    fn apply(&mut self, patch: ProductPatch) {
        merge_text(&mut self.name, patch.name);
        merge_text(&mut self.description, patch.description);
        merge_text(&mut self.category, patch.category);
        if let Some(price) = patch.price {
            self.price = lenient_float(&price);
        }
        if let Some(in_stock) = patch.in_stock {
            self.in_stock = in_stock;
        }
    }

    fn matches(&self, filter: &ProductFilter) -> bool {
        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            if self.category.to_lowercase() != category.to_lowercase() {
                return false;
            }
        }
        if let Some(in_stock) = filter.in_stock.as_deref() {
            if self.in_stock != (in_stock == "true") {
                return false;
            }
        }
        if let Some(term) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let term = term.to_lowercase();
            return self.name.to_lowercase().contains(&term)
                || self.description.to_lowercase().contains(&term);
        }
        true
    }
}

pub fn seed() -> Vec<Product> {
    [
        (
            "Laptop Gamer",
            "Laptop de alto rendimiento para gaming con RTX 4060",
            4_500_000.0,
            "Electrónicos",
            true,
            datetime!(2023-01-15 0:00 UTC),
        ),
        (
            "Smartphone Pro",
            "Teléfono inteligente con sistema de cámara avanzado",
            3_200_000.0,
            "Electrónicos",
            true,
            datetime!(2023-02-20 0:00 UTC),
        ),
        (
            "Audífonos Inalámbricos",
            "Audífonos inalámbricos con cancelación de ruido",
            750_000.0,
            "Audio",
            false,
            datetime!(2023-03-10 0:00 UTC),
        ),
        (
            "Teclado Mecánico",
            "Teclado mecánico RGB para gaming",
            550_000.0,
            "Accesorios",
            true,
            datetime!(2023-04-05 0:00 UTC),
        ),
        (
            "Mouse Gaming",
            "Mouse de alta precisión para gaming con iluminación RGB",
            300_000.0,
            "Accesorios",
            true,
            datetime!(2023-05-12 0:00 UTC),
        ),
        (
            "Monitor 4K",
            "Monitor de 27 pulgadas con resolución 4K para gaming",
            1_800_000.0,
            "Electrónicos",
            true,
            datetime!(2023-06-01 0:00 UTC),
        ),
        (
            "Tablet Pro",
            "Tablet profesional para diseño y productividad",
            2_500_000.0,
            "Electrónicos",
            true,
            datetime!(2023-06-15 0:00 UTC),
        ),
        (
            "Cámara Web HD",
            "Cámara web de alta definición para streaming",
            450_000.0,
            "Accesorios",
            false,
            datetime!(2023-07-01 0:00 UTC),
        ),
        (
            "Altavoces Bluetooth",
            "Altavoces portátiles con conectividad Bluetooth",
            280_000.0,
            "Audio",
            true,
            datetime!(2023-07-10 0:00 UTC),
        ),
        (
            "Disco Duro SSD",
            "Disco duro sólido de 1TB para almacenamiento rápido",
            380_000.0,
            "Accesorios",
            true,
            datetime!(2023-07-20 0:00 UTC),
        ),
    ]
    .into_iter()
    .zip(1..)
    .map(
        |((name, description, price, category, in_stock, created_at), id)| Product {
            id,
            name: name.into(),
            description: description.into(),
            price,
            category: category.into(),
            in_stock,
            created_at,
        },
    )
    .collect()
}
