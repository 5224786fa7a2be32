//! Cursor pagination over Graph page envelopes
//! (`{data: [...], paging: {cursors, next, previous}}`).

use crate::errors::ToolError;
use crate::services::graph::GraphClient;
use serde_json::Value;
use std::collections::HashSet;

/// Rows of a page; missing or non-list `data` reads as empty.
pub fn page_rows(envelope: &Value) -> &[Value] {
    envelope
        .get("data")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The continuation URL, when the page has one.
pub fn next_page_url(envelope: &Value) -> Option<&str> {
    envelope
        .get("paging")
        .and_then(|paging| paging.get("next"))
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
}

/// Removes `paging.next` and `paging.previous`, keeping cursors.
pub fn strip_cursor_links(envelope: &mut Value) {
    if let Some(paging) = envelope.get_mut("paging").and_then(Value::as_object_mut) {
        paging.remove("next");
        paging.remove("previous");
    }
}

/// Keeps the first record for each `id`, in order. Records without a string
/// or numeric id are kept as-is.
pub fn dedupe_by_id(rows: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| match row.get("id") {
            Some(Value::String(id)) => seen.insert(id.clone()),
            Some(Value::Number(id)) => seen.insert(id.to_string()),
            _ => true,
        })
        .collect()
}

/// Page source for [`drain_with`].
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<Value, ToolError>;
}

#[async_trait::async_trait]
impl PageFetcher for GraphClient {
    async fn fetch_page(&self, url: &str) -> Result<Value, ToolError> {
        self.fetch_url(url).await
    }
}

/// Follows `paging.next` until exhausted and folds every page's rows into
/// `envelope.data`. Any continuation failure aborts the whole drain.
pub async fn drain_with<F>(mut envelope: Value, fetcher: &F) -> Result<Value, ToolError>
where
    F: PageFetcher + ?Sized,
{
    let mut rows: Vec<Value> = page_rows(&envelope).to_vec();
    let mut next = next_page_url(&envelope).map(str::to_string);

    while let Some(url) = next.take() {
        let page = fetcher.fetch_page(&url).await?;
        rows.extend(page_rows(&page).iter().cloned());
        next = next_page_url(&page).map(str::to_string);
    }

    if let Some(map) = envelope.as_object_mut() {
        map.insert("data".to_string(), Value::Array(rows));
    }
    strip_cursor_links(&mut envelope);
    Ok(envelope)
}

pub async fn drain_all(envelope: Value, graph: &GraphClient) -> Result<Value, ToolError> {
    drain_with(envelope, graph).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct CannedPages {
        pages: HashMap<String, Value>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl PageFetcher for CannedPages {
        async fn fetch_page(&self, url: &str) -> Result<Value, ToolError> {
            self.fetched.lock().expect("lock").push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ToolError::remote(format!("no page at {}", url)))
        }
    }

    fn canned(pages: &[(&str, Value)]) -> CannedPages {
        CannedPages {
            pages: pages
                .iter()
                .map(|(url, page)| (url.to_string(), page.clone()))
                .collect(),
            fetched: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn drains_three_pages_in_order() {
        let first = json!({
            "data": [{"id": "1"}],
            "paging": {"cursors": {"after": "a"}, "next": "https://g/p2", "previous": "https://g/p0"}
        });
        let fetcher = canned(&[
            ("https://g/p2", json!({"data": [{"id": "2"}, {"id": "3"}], "paging": {"next": "https://g/p3"}})),
            ("https://g/p3", json!({"data": [{"id": "4"}], "paging": {"cursors": {"after": "z"}}})),
        ]);

        let drained = drain_with(first, &fetcher).await.expect("drain");
        let ids: Vec<&str> = page_rows(&drained)
            .iter()
            .filter_map(|row| row["id"].as_str())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        let paging = drained["paging"].as_object().expect("paging");
        assert!(!paging.contains_key("next"));
        assert!(!paging.contains_key("previous"));
        assert_eq!(paging["cursors"]["after"], "a");
        assert_eq!(
            *fetcher.fetched.lock().expect("lock"),
            vec!["https://g/p2".to_string(), "https://g/p3".to_string()]
        );
    }

    #[tokio::test]
    async fn non_list_data_reads_as_empty() {
        let first = json!({"data": {"oops": true}, "paging": {"next": "https://g/p2"}});
        let fetcher = canned(&[("https://g/p2", json!({"data": "nope"}))]);
        let drained = drain_with(first, &fetcher).await.expect("drain");
        assert_eq!(drained["data"], json!([]));
    }

    #[tokio::test]
    async fn continuation_failure_aborts() {
        let first = json!({"data": [{"id": "1"}], "paging": {"next": "https://g/missing"}});
        let fetcher = canned(&[]);
        let err = drain_with(first, &fetcher).await.expect_err("fails");
        assert_eq!(err.code, "REMOTE_CALL_FAILED");
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let rows = vec![
            json!({"id": "act_1", "name": "first"}),
            json!({"id": "act_2"}),
            json!({"id": "act_1", "name": "dup"}),
            json!({"name": "no id"}),
        ];
        let out = dedupe_by_id(rows);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["name"], "first");
        assert_eq!(out[1]["id"], "act_2");
        assert_eq!(out[2]["name"], "no id");
    }
}
