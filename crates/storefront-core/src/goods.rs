use serde::{Deserialize, Serialize};

/// A catalog product as returned by the vendor's goods endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Good {
    pub id: u64,
    pub name: String,
    /// Top-level category, e.g. `"home & kitchen"`. Empty when the vendor
    /// omits it.
    #[serde(default)]
    pub main_category: String,
    #[serde(default)]
    pub sub_category: String,
    /// List price in whole currency units.
    pub actual_price: u32,
    /// Sale price; `null` when the good is not on sale.
    #[serde(default)]
    pub discount_price: Option<u32>,
    /// Average rating on a 0–5 scale.
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub image_url: String,
}

impl Good {
    /// Returns the price a customer actually pays.
    ///
    /// A discount price only counts when it is strictly lower than the list
    /// price; vendor rows with `discount_price >= actual_price` are treated
    /// as not on sale.
    #[must_use]
    pub fn effective_price(&self) -> u32 {
        match self.discount_price {
            Some(discount) if discount < self.actual_price => discount,
            _ => self.actual_price,
        }
    }

    /// Returns `true` if the good carries an applicable discount.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount_price
            .is_some_and(|discount| discount < self.actual_price)
    }

    /// Rounded percentage saved against the list price, or `None` when the
    /// good is not discounted.
    #[must_use]
    pub fn discount_percent(&self) -> Option<u32> {
        if !self.has_discount() || self.actual_price == 0 {
            return None;
        }
        let saved = u64::from(self.actual_price - self.effective_price());
        let actual = u64::from(self.actual_price);
        let percent = (saved * 100 + actual / 2) / actual;
        u32::try_from(percent).ok()
    }

    /// Lower-cased main category used for facet matching.
    #[must_use]
    pub fn category_key(&self) -> String {
        self.main_category.trim().to_lowercase()
    }
}

#[cfg(test)]
pub(crate) fn sample_good(id: u64, actual: u32, discount: Option<u32>, rating: f64) -> Good {
    Good {
        id,
        name: format!("Good {id}"),
        main_category: "Electronics".to_string(),
        sub_category: "Audio".to_string(),
        actual_price: actual,
        discount_price: discount,
        rating,
        image_url: format!("https://img.example.com/{id}.jpg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_price_uses_lower_discount() {
        let good = sample_good(1, 1000, Some(750), 4.0);
        assert_eq!(good.effective_price(), 750);
        assert!(good.has_discount());
    }

    #[test]
    fn effective_price_ignores_missing_discount() {
        let good = sample_good(1, 1000, None, 4.0);
        assert_eq!(good.effective_price(), 1000);
        assert!(!good.has_discount());
    }

    #[test]
    fn effective_price_ignores_discount_not_below_actual() {
        let equal = sample_good(1, 1000, Some(1000), 4.0);
        let higher = sample_good(2, 1000, Some(1200), 4.0);
        assert_eq!(equal.effective_price(), 1000);
        assert_eq!(higher.effective_price(), 1000);
        assert!(!equal.has_discount());
        assert!(!higher.has_discount());
    }

    #[test]
    fn discount_percent_rounds_to_nearest() {
        assert_eq!(sample_good(1, 300, Some(200), 0.0).discount_percent(), Some(33));
        assert_eq!(sample_good(2, 1000, Some(750), 0.0).discount_percent(), Some(25));
        assert_eq!(sample_good(3, 1000, None, 0.0).discount_percent(), None);
        assert_eq!(sample_good(4, 3, Some(1), 0.0).discount_percent(), Some(67));
        assert_eq!(sample_good(5, u32::MAX, Some(0), 0.0).discount_percent(), Some(100));
    }

    #[test]
    fn deserializes_vendor_row_with_null_discount() {
        let json = r#"{
            "id": 17,
            "name": "Kettle",
            "main_category": "Home & Kitchen",
            "sub_category": "Appliances",
            "actual_price": 2490,
            "discount_price": null,
            "rating": 4.3,
            "image_url": "https://img.example.com/17.jpg"
        }"#;
        let good: Good = serde_json::from_str(json).expect("valid good");
        assert_eq!(good.id, 17);
        assert_eq!(good.discount_price, None);
        assert_eq!(good.category_key(), "home & kitchen");
    }

    #[test]
    fn deserializes_sparse_row_with_defaults() {
        let json = r#"{ "id": 5, "name": "Bare", "actual_price": 10 }"#;
        let good: Good = serde_json::from_str(json).expect("valid good");
        assert!(good.main_category.is_empty());
        assert!(good.rating.abs() < f64::EPSILON);
    }
}
