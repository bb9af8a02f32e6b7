//! Feature composition: one hydrated item record becomes one synthetic
//! content document, the unit of text analysis.
//!
//! The document is a deterministic, space-joined concatenation of normalized
//! free-text fields and categorical tags (price bucket, group, city, star
//! rating, category tags). Any contribution that normalizes to empty is
//! skipped so no stray tags appear.

use crate::models::ItemRecord;
use crate::text::normalize;

/// Ascending price bucket thresholds (exclusive upper bounds). A price at or
/// above the last threshold falls into the open-ended `very_high` bucket.
const PRICE_BUCKETS: &[(&str, f64)] = &[
    ("very_low", 50_000.0),
    ("low", 100_000.0),
    ("medium", 200_000.0),
    ("high", 500_000.0),
];

/// Bucket a price into its categorical range label.
pub fn price_bucket(price: f64) -> &'static str {
    for (name, upper) in PRICE_BUCKETS {
        if price < *upper {
            return name;
        }
    }
    "very_high"
}

/// Build the content document for one item.
///
/// Pure function of the record's fields: same input always yields the same
/// document. Field order is fixed: name, description, price tag, group tag,
/// city tag, star tag, keywords, category tags.
pub fn compose(item: &ItemRecord) -> String {
    let mut parts: Vec<String> = Vec::new();

    let name = normalize(&item.name);
    if !name.is_empty() {
        parts.push(name);
    }

    let description = normalize(&item.description);
    if !description.is_empty() {
        parts.push(description);
    }

    if let Some(price) = item.price {
        parts.push(format!("price_{}", price_bucket(price)));
    }

    let group = normalize(&item.group_name);
    if !group.is_empty() {
        parts.push(format!("group_{group}"));
    }

    let city = normalize(&item.origin);
    if !city.is_empty() {
        parts.push(format!("city_{city}"));
    }

    if let Some(rating) = item.rating {
        // The rating is a discrete label, used verbatim.
        parts.push(format!("star_{rating}"));
    }

    let keywords = normalize(&item.keywords);
    if !keywords.is_empty() {
        parts.push(keywords);
    }

    for category in &item.categories {
        let category = normalize(category);
        if !category.is_empty() {
            parts.push(format!("category_{category}"));
        }
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_item;

    #[test]
    fn test_price_buckets() {
        assert_eq!(price_bucket(0.0), "very_low");
        assert_eq!(price_bucket(49_999.0), "very_low");
        assert_eq!(price_bucket(50_000.0), "low");
        assert_eq!(price_bucket(150_000.0), "medium");
        assert_eq!(price_bucket(200_000.0), "high");
        assert_eq!(price_bucket(500_000.0), "very_high");
        assert_eq!(price_bucket(9_000_000.0), "very_high");
    }

    #[test]
    fn test_compose_full_record() {
        let mut item = test_item(1, "Nhẫn Vàng");
        item.description = "Nhẫn cưới vàng 18K".to_string();
        item.price = Some(45_000.0);
        item.rating = Some(4);
        item.origin = "Đà Nẵng".to_string();
        item.group_name = "Trang Sức".to_string();
        item.keywords = "nhẫn vàng".to_string();
        item.categories = vec!["Cưới".to_string(), "Vàng".to_string()];

        assert_eq!(
            compose(&item),
            "nhẫn vàng nhẫn cưới vàng 18k price_very_low group_trang sức \
             city_đà nẵng star_4 nhẫn vàng category_cưới category_vàng"
        );
    }

    #[test]
    fn test_compose_is_deterministic() {
        let mut item = test_item(7, "gold ring");
        item.price = Some(40_000.0);
        item.categories = vec!["jewelry".to_string()];
        assert_eq!(compose(&item), compose(&item));
    }

    #[test]
    fn test_compose_skips_empty_contributions() {
        let mut item = test_item(2, "watch");
        item.categories = vec![String::new(), "silver".to_string()];
        assert_eq!(compose(&item), "watch category_silver");
    }

    #[test]
    fn test_compose_all_empty_yields_empty() {
        let item = test_item(3, "");
        assert_eq!(compose(&item), "");
    }
}
