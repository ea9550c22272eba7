use std::collections::HashMap;

use ingredients::clean_catalog_ingredient;
use serde::{Deserialize, Serialize};

use crate::LookupError;

/// What the catalog knows about a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub barcode: String,
    /// Empty when the catalog has no name.
    pub name: String,
    /// Cleaned ingredient texts, never empty.
    pub ingredients: Vec<String>,
    /// English front thumbnail, empty when absent.
    pub icon_url: String,
}

/// `GET /api/v2/product/{barcode}` response body.
#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    #[serde(default)]
    pub status: Option<i64>,
    #[serde(default)]
    pub product: Option<ProductBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProductBody {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientEntry>>,
    #[serde(default)]
    pub selected_images: Option<SelectedImages>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IngredientEntry {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SelectedImages {
    #[serde(default)]
    pub front: Option<ImageVariants>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageVariants {
    #[serde(default)]
    pub thumb: Option<HashMap<String, String>>,
}

impl ProductResponse {
    pub(crate) fn into_product_info(self, barcode: &str) -> Result<ProductInfo, LookupError> {
        // Legacy responses report a missing product as status 0 with HTTP 200.
        if self.status == Some(0) {
            return Err(LookupError::NotFound);
        }
        let product = self.product.ok_or(LookupError::NotFound)?;

        let ingredients: Vec<String> = product
            .ingredients
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| entry.text)
            .map(|text| clean_catalog_ingredient(&text))
            .filter(|text| !text.is_empty())
            .collect();
        if ingredients.is_empty() {
            return Err(LookupError::MissingIngredients);
        }

        let icon_url = product
            .selected_images
            .and_then(|images| images.front)
            .and_then(|front| front.thumb)
            .and_then(|mut thumbs| thumbs.remove("en"))
            .unwrap_or_default();

        Ok(ProductInfo {
            barcode: barcode.to_string(),
            name: product.product_name.unwrap_or_default(),
            ingredients,
            icon_url,
        })
    }
}
