//! Codec between [`ListQuery`] and the URL query string.
//!
//! Parameters are `page`, `limit`, `status`, `q`, `sort` and `order`; a value
//! equal to its default is left out of the URL. Decoding only coerces types:
//! absent or unparsable values fall back to the defaults and ranges are not
//! checked here.

use serde::{Deserialize, Serialize};

use crate::domain::query::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, ListQuery};
use crate::domain::types::SortOrder;

#[derive(Debug, Default, Serialize, Deserialize)]
struct UrlParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    q: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<String>,
}

/// Renders the query as a URL query string without the leading `?`.
pub fn encode(query: &ListQuery) -> String {
    let defaults = ListQuery::default();
    let params = UrlParams {
        page: (query.page != defaults.page).then(|| query.page.to_string()),
        limit: (query.page_size != defaults.page_size).then(|| query.page_size.to_string()),
        status: query.status.map(|s| s.as_str().to_string()),
        q: (!query.search_text.is_empty()).then(|| query.search_text.clone()),
        sort: (query.sort_field != defaults.sort_field).then(|| query.sort_field.clone()),
        order: (query.sort_order != defaults.sort_order).then(|| query.sort_order.to_string()),
    };

    serde_html_form::to_string(&params).unwrap_or_else(|e| {
        log::warn!("Failed to encode list query: {e}");
        String::new()
    })
}

/// Parses a URL query string, with or without the leading `?`.
pub fn decode(raw: &str) -> ListQuery {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    let params: UrlParams = serde_html_form::from_str(raw).unwrap_or_else(|e| {
        log::debug!("Ignoring malformed query string {raw:?}: {e}");
        UrlParams::default()
    });

    let mut query = ListQuery {
        page: params
            .page
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PAGE),
        page_size: params
            .limit
            .and_then(|l| l.parse().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE),
        status: params.status.and_then(|s| s.parse().ok()),
        search_text: params.q.unwrap_or_default(),
        ..ListQuery::default()
    };
    if let Some(sort) = params.sort {
        query.sort_field = sort;
    }
    if let Some(order) = params.order.and_then(|o| o.parse::<SortOrder>().ok()) {
        query.sort_order = order;
    }
    query
}

/// Parameters sent to the list or search endpoint for `query`.
///
/// Unlike [`encode`] every paging and sort value is explicit; the search text
/// travels as `query`, the name the search endpoint reads.
pub fn api_params(query: &ListQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("limit", query.page_size.to_string()),
    ];
    if let Some(status) = query.status {
        params.push(("status", status.as_str().to_string()));
    }
    if let Some(term) = query.search_term() {
        params.push(("query", term.to_string()));
    }
    params.push(("sort", query.sort_field.clone()));
    params.push(("order", query.sort_order.as_str().to_string()));
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::CustomerStatus;

    #[test]
    fn default_query_encodes_to_nothing() {
        assert_eq!(encode(&ListQuery::default()), "");
        assert_eq!(decode(""), ListQuery::default());
    }

    #[test]
    fn only_non_default_values_are_encoded() {
        let query = ListQuery::new()
            .page(3)
            .status(Some(CustomerStatus::Active))
            .sort("name", SortOrder::Desc);
        assert_eq!(encode(&query), "page=3&status=active&sort=name");
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let queries = [
            ListQuery::default(),
            ListQuery::new().page(2).page_size(25),
            ListQuery::new().search("Ann & Bob's").status(Some(CustomerStatus::Pending)),
            ListQuery::new().search(" padded ").sort("updated_at", SortOrder::Asc),
            ListQuery::new().page(7).page_size(100).sort("email", SortOrder::Asc),
            ListQuery::new().search("+1 (555)").page_size(1),
        ];
        for query in queries {
            assert_eq!(decode(&encode(&query)), query, "query {query:?}");
        }
    }

    #[test]
    fn decode_falls_back_on_uncoercible_values() {
        let query = decode("?page=abc&limit=-3&status=archived&order=sideways&sort=rank");
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.status, None);
        assert_eq!(query.sort_order, SortOrder::Desc);
        // Unknown sort columns are kept for the endpoint to reject.
        assert_eq!(query.sort_field, "rank");
    }

    #[test]
    fn decode_does_not_validate_ranges() {
        let query = decode("page=0&limit=500");
        assert_eq!(query.page, 0);
        assert_eq!(query.page_size, 500);
    }

    #[test]
    fn api_params_are_explicit() {
        let query = ListQuery::new().search("  acme ").status(Some(CustomerStatus::Inactive));
        assert_eq!(
            api_params(&query),
            vec![
                ("page", "1".to_string()),
                ("limit", "10".to_string()),
                ("status", "inactive".to_string()),
                ("query", "acme".to_string()),
                ("sort", "created_at".to_string()),
                ("order", "desc".to_string()),
            ]
        );
    }
}
