use serde::{Deserialize, Deserializer};

pub mod addresses;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod categories;
pub mod checkout;
pub mod contacts;
pub mod content;
pub mod products;
pub mod settings;

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`)
/// in partial updates.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "super::double_option")]
        sale_price: Option<Option<i64>>,
    }

    #[test]
    fn double_option_separates_missing_from_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"sale_price":null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"sale_price":90000}"#).unwrap();
        assert_eq!(missing.sale_price, None);
        assert_eq!(null.sale_price, Some(None));
        assert_eq!(value.sale_price, Some(Some(90_000)));
    }
}
