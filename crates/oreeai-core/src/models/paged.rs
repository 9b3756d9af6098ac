use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::raw::RawRecord;

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl<T> PagedResult<T> {
    /// Everything on a single page.
    pub fn single(items: Vec<T>) -> Self {
        let n = items.len() as u64;
        Self {
            items,
            page: 1,
            per_page: n,
            total: n,
            total_pages: 1,
        }
    }

    /// Slice `items` into the requested page. `page` is 1-based.
    pub fn paginate(items: Vec<T>, page: u64, per_page: u64) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = items.len() as u64;
        let start = ((page - 1) * per_page) as usize;
        let items = items
            .into_iter()
            .skip(start)
            .take(per_page as usize)
            .collect();
        Self {
            items,
            page,
            per_page,
            total,
            total_pages: total_pages(total, per_page),
        }
    }

    /// Parse a list response that is either a bare array or an envelope.
    pub fn from_raw(raw: &Value, map: impl Fn(&Value) -> T) -> Self {
        if let Value::Array(list) = raw {
            return Self::single(list.iter().map(map).collect());
        }
        let rec = RawRecord::new(raw);
        let items: Vec<T> = raw_items(raw).iter().map(map).collect();
        let n = items.len() as u64;
        Self {
            page: rec.first_present(&["page"]).map(|_| rec.count(&["page"])).unwrap_or(1),
            per_page: rec
                .first_present(&["per_page", "perPage"])
                .map(|_| rec.count(&["per_page", "perPage"]))
                .unwrap_or(n),
            total: rec.first_present(&["total"]).map(|_| rec.count(&["total"])).unwrap_or(n),
            total_pages: rec
                .first_present(&["total_pages", "totalPages"])
                .map(|_| rec.count(&["total_pages", "totalPages"]))
                .unwrap_or(1),
            items,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self::single(Vec::new())
    }
}

/// `max(1, ceil(total / per_page))`
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total.div_ceil(per_page).max(1)
}

/// The record list inside a list response: the array itself, or its `items`.
pub fn raw_items(raw: &Value) -> &[Value] {
    match raw {
        Value::Array(list) => list,
        Value::Object(map) => map
            .get("items")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

/// Total count of a list response: `total`, else `count`, else the item count.
pub fn raw_total(raw: &Value) -> u64 {
    let rec = RawRecord::new(raw);
    match rec.first_present(&["total", "count"]) {
        Some(_) => rec.count(&["total", "count"]),
        None => raw_items(raw).len() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id_of(v: &Value) -> u64 {
        v["id"].as_u64().unwrap_or(0)
    }

    #[test]
    fn test_bare_array() {
        let page = PagedResult::from_raw(&json!([{ "id": 1 }, { "id": 2 }]), id_of);
        assert_eq!(page.items, vec![1, 2]);
        assert_eq!((page.page, page.per_page, page.total, page.total_pages), (1, 2, 2, 1));
    }

    #[test]
    fn test_envelope() {
        let raw = json!({ "items": [{ "id": 5 }], "page": 3, "perPage": 1, "total": 9, "totalPages": 9 });
        let page = PagedResult::from_raw(&raw, id_of);
        assert_eq!(page.items, vec![5]);
        assert_eq!((page.page, page.per_page, page.total, page.total_pages), (3, 1, 9, 9));
        assert!(page.has_next());
        assert!(page.has_prev());
    }

    #[test]
    fn test_envelope_defaults() {
        let page = PagedResult::from_raw(&json!({ "items": [{ "id": 1 }] }), id_of);
        assert_eq!((page.page, page.per_page, page.total, page.total_pages), (1, 1, 1, 1));

        let empty = PagedResult::from_raw(&json!({}), id_of);
        assert!(empty.items.is_empty());
        assert_eq!(empty.total, 0);
    }

    #[test]
    fn test_paginate() {
        let page = PagedResult::paginate((1..=8).collect::<Vec<u32>>(), 2, 3);
        assert_eq!(page.items, vec![4, 5, 6]);
        assert_eq!(page.total, 8);
        assert_eq!(page.total_pages, 3);

        let past_end = PagedResult::paginate(vec![1, 2], 5, 10);
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_pages, 1);
    }

    #[test]
    fn test_raw_total() {
        assert_eq!(raw_total(&json!({ "total": 40, "items": [] })), 40);
        assert_eq!(raw_total(&json!({ "count": "12" })), 12);
        assert_eq!(raw_total(&json!({ "items": [1, 2, 3] })), 3);
        assert_eq!(raw_total(&json!([1, 2])), 2);
    }
}
