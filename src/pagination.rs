//! Assembles a full paginated list from sequential page requests.
//!
//! List endpoints return at most 100 items per page together with a
//! `total_pages` count. [`fetch_all`] forces the maximum page size, walks the
//! pages in ascending order, and concatenates the list found under the
//! caller's key. Every page request goes through the scheduler like any
//! other call, so a long listing simply drains the rate budget at the
//! allowed pace.

use crate::error::Error;
use crate::request::RequestDescriptor;
use crate::scheduler::Scheduler;
use serde_json::Value;

pub const PER_PAGE: u32 = 100;

/// Fetch every page of `location` and return the concatenated list stored
/// under `list_key`, in page order.
///
/// Pages are requested strictly sequentially: page N+1 is only submitted
/// after page N has completed, preserving overall item order. The first
/// error aborts the assembly; partial results are discarded.
///
/// A response with `total_pages` of zero or absent yields an empty list. A
/// page that lacks `list_key` (or holds a non-array there) is
/// [`Error::MissingListKey`].
pub async fn fetch_all(
    scheduler: &Scheduler,
    location: &str,
    list_key: &str,
    extra_params: &[(String, String)],
) -> Result<Vec<Value>, Error> {
    let first = scheduler.submit(page_request(location, extra_params, 1)).await?;
    let total_pages = first.get("total_pages").and_then(Value::as_u64).unwrap_or(0);
    if total_pages == 0 {
        return Ok(Vec::new());
    }

    let mut items = take_list(&first, list_key)?;
    for page in 2..=total_pages {
        let body = scheduler
            .submit(page_request(location, extra_params, page))
            .await?;
        items.extend(take_list(&body, list_key)?);
    }
    Ok(items)
}

fn page_request(location: &str, extra_params: &[(String, String)], page: u64) -> RequestDescriptor {
    let mut query = extra_params.to_vec();
    query.push(("per_page".to_string(), PER_PAGE.to_string()));
    query.push(("page".to_string(), page.to_string()));
    RequestDescriptor::get(location, query)
}

fn take_list(body: &Value, list_key: &str) -> Result<Vec<Value>, Error> {
    body.get(list_key)
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| Error::MissingListKey(list_key.to_string()))
}
