//! Page-number pagination for `GET /goods`.
//!
//! The store paginates with `page` / `per_page` query parameters and reports
//! progress in a `_pagination` summary:
//!
//! ```text
//! { "goods": [...], "_pagination": { "current_page": 2, "per_page": 20, "total_count": 45 } }
//! ```
//!
//! When the store answers with a bare array there is no summary, and a short
//! page is the only end-of-data signal.

use serde::Deserialize;
use storefront_core::Good;

use crate::types::{GoodsPage, PageInfo};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawGoodsResponse {
    Bare(Vec<serde_json::Value>),
    Envelope {
        #[serde(default)]
        goods: Vec<serde_json::Value>,
        #[serde(default, rename = "_pagination")]
        pagination: Option<PageInfo>,
    },
}

/// Parses a goods listing body in either shape.
///
/// Rows that do not deserialize as a [`Good`] are skipped with a warning.
///
/// # Errors
///
/// Returns the `serde_json` error when the body is neither a JSON array nor
/// an object.
pub fn parse_goods_page(body: &str) -> Result<GoodsPage, serde_json::Error> {
    let (rows, pagination) = match serde_json::from_str::<RawGoodsResponse>(body)? {
        RawGoodsResponse::Bare(rows) => (rows, None),
        RawGoodsResponse::Envelope { goods, pagination } => (goods, pagination),
    };

    let goods = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<Good>(row) {
            Ok(good) => Some(good),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed goods row");
                None
            }
        })
        .collect();

    Ok(GoodsPage { goods, pagination })
}

/// Returns `true` if another page should be requested after `page`.
///
/// `requested_per_page` is the page size that was asked for; it is only used
/// when the response carried no pagination summary.
#[must_use]
pub fn has_more(page: &GoodsPage, requested_per_page: u32) -> bool {
    match page.pagination {
        Some(info) => {
            let seen = u64::from(info.current_page) * u64::from(info.per_page.max(1));
            seen < info.total_count
        }
        None => {
            !page.goods.is_empty()
                && u32::try_from(page.goods.len()).is_ok_and(|n| n >= requested_per_page)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "name": format!("Good {id}"),
            "main_category": "Books",
            "sub_category": "Fiction",
            "actual_price": 500,
            "discount_price": null,
            "rating": 4.5,
            "image_url": "https://img.example.com/x.jpg"
        })
    }

    #[test]
    fn parses_envelope_with_pagination() {
        let body = serde_json::json!({
            "goods": [row(1), row(2)],
            "_pagination": { "current_page": 1, "per_page": 2, "total_count": 5 }
        })
        .to_string();
        let page = parse_goods_page(&body).expect("envelope");
        assert_eq!(page.goods.len(), 2);
        assert_eq!(
            page.pagination,
            Some(PageInfo {
                current_page: 1,
                per_page: 2,
                total_count: 5
            })
        );
        assert!(has_more(&page, 2));
    }

    #[test]
    fn parses_bare_array() {
        let body = serde_json::json!([row(1), row(2), row(3)]).to_string();
        let page = parse_goods_page(&body).expect("bare array");
        assert_eq!(page.goods.len(), 3);
        assert!(page.pagination.is_none());
    }

    #[test]
    fn envelope_without_goods_is_empty() {
        let page = parse_goods_page(r#"{"_pagination": null}"#).expect("object");
        assert!(page.goods.is_empty());
        assert!(!has_more(&page, 20));
    }

    #[test]
    fn skips_malformed_rows() {
        let body = serde_json::json!({
            "goods": [row(1), { "id": 2, "name": "no price" }, row(3)]
        })
        .to_string();
        let page = parse_goods_page(&body).expect("envelope");
        let ids: Vec<u64> = page.goods.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn rejects_scalar_body() {
        assert!(parse_goods_page("42").is_err());
        assert!(parse_goods_page("<html>").is_err());
    }

    #[test]
    fn has_more_stops_on_last_envelope_page() {
        let page = GoodsPage {
            goods: Vec::new(),
            pagination: Some(PageInfo {
                current_page: 3,
                per_page: 20,
                total_count: 60,
            }),
        };
        assert!(!has_more(&page, 20));
    }

    #[test]
    fn has_more_without_summary_uses_page_length() {
        let full = parse_goods_page(&serde_json::json!([row(1), row(2)]).to_string()).unwrap();
        let short = parse_goods_page(&serde_json::json!([row(1)]).to_string()).unwrap();
        assert!(has_more(&full, 2));
        assert!(!has_more(&short, 2));
    }
}
