use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Assigned by the repository, never reused
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub in_stock: bool,
}

fn default_in_stock() -> bool {
    true
}

/// Payload for creating a product and for full replacement (`PUT`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    #[schema(min_length = 1, max_length = 50, example = "Phone")]
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    #[schema(example = 50000.0)]
    pub price: f64,

    #[serde(default = "default_in_stock")]
    #[schema(default = true)]
    pub in_stock: bool,
}

/// Partial update payload (`PATCH`). Absent fields are left untouched.
///
/// `description` distinguishes an absent key (`None`) from an explicit
/// `null` (`Some(None)`), which clears the stored value. The other fields
/// are not nullable, so `null` there reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 50, message = "name must be 1 to 50 characters"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,

    #[validate(range(exclusive_min = 0.0, message = "price must be greater than 0"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_stock: Option<bool>,
}

/// Runs only when the key is present, so a missing key stays `None` via
/// `#[serde(default)]` while `null` becomes `Some(None)`.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Query filters for listing products. Every supplied criterion must hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Case-insensitive substring of the name
    pub q: Option<String>,

    pub in_stock: Option<bool>,

    /// Inclusive lower bound
    #[validate(
        range(min = 0.0, message = "min_price must not be negative"),
        custom(function = "finite_bound")
    )]
    pub min_price: Option<f64>,

    /// Inclusive upper bound
    #[validate(
        range(min = 0.0, message = "max_price must not be negative"),
        custom(function = "finite_bound")
    )]
    pub max_price: Option<f64>,
}

// `range` lets NaN through since every comparison with it is false.
fn finite_bound(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("finite")
            .with_message("price bound must be a finite number".into()))
    }
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = &self.q {
            if !product.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        if let Some(in_stock) = self.in_stock {
            if product.in_stock != in_stock {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            if product.price < min_price {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if product.price > max_price {
                return false;
            }
        }
        true
    }
}

impl Product {
    pub fn new(id: i32, input: CreateProduct) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            price: input.price,
            in_stock: input.in_stock,
        }
    }

    /// Overwrite every mutable field; `id` is kept.
    pub fn replace(&mut self, input: CreateProduct) {
        self.name = input.name;
        self.description = input.description;
        self.price = input.price;
        self.in_stock = input.in_stock;
    }

    /// Merge the fields present in `update`.
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(in_stock) = update.in_stock {
            self.in_stock = in_stock;
        }
    }
}
