//! Resource Fetcher
//!
//! Fetches resource collections from the OpenStack APIs, following
//! pagination links until each collection is exhausted.

use anyhow::{Context, Result};
use serde_json::Value;

use super::model::{InstanceRecord, ResourceKind, ResourceRecord};
use crate::openstack::session::Session;

/// Fetch every resource of one kind (auto-paginate)
pub async fn list_resources(session: &Session, kind: ResourceKind) -> Result<Vec<ResourceRecord>> {
    let client = session.service_client(kind.service()).await?;

    let mut records = Vec::new();
    let mut url = client.url(kind.list_path());

    loop {
        let page = client.get_url(&url).await?;
        let items = page_items(&page, kind)?;
        records.extend(items.iter().map(|item| ResourceRecord::from_item(kind, item)));

        match next_link(&page, kind.collection_key()) {
            Some(next) => url = next,
            None => break,
        }
    }

    Ok(records)
}

/// Fetch a single resource by kind and id
pub async fn get_resource(
    session: &Session,
    kind: ResourceKind,
    id: &str,
) -> Result<ResourceRecord> {
    let client = session.service_client(kind.service()).await?;
    let response = client.get(&kind.detail_path(id)).await?;

    let item = response
        .get(kind.item_key())
        .with_context(|| format!("response missing '{}' object", kind.item_key()))?;

    let record = match kind {
        ResourceKind::Instances => {
            ResourceRecord::Instance(InstanceRecord::from(item).with_addresses(item))
        }
        _ => ResourceRecord::from_item(kind, item),
    };

    Ok(record)
}

/// Extract the collection array from one page of results
fn page_items<'a>(page: &'a Value, kind: ResourceKind) -> Result<&'a Vec<Value>> {
    page.get(kind.collection_key())
        .and_then(Value::as_array)
        .with_context(|| format!("response missing '{}' array", kind.collection_key()))
}

/// Find the next page link, if the response carries one.
///
/// Paginated collections come with a sibling `{key}_links` array whose
/// entries have `href` and `rel`; the entry with `rel == "next"` points
/// at the following page. Heat never paginates, so stacks take the
/// single-page path.
fn next_link(page: &Value, collection_key: &str) -> Option<String> {
    page.get(format!("{}_links", collection_key))
        .and_then(Value::as_array)?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("next"))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
