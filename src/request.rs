use serde::Serialize;
use serde_json::Value;

/// HTTP method of an API call. The Kentaa API uses GET/POST/PATCH/DELETE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Immutable description of one API call: method, resource path relative to
/// the API base URL, ordered query parameters, and an optional JSON body.
///
/// Descriptors are built by resource clients and handed to
/// [`Scheduler::submit`](crate::scheduler::Scheduler::submit); nothing
/// mutates them afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestDescriptor {
    pub fn new(
        method: Method,
        path: impl Into<String>,
        query: Vec<(String, String)>,
        body: Option<Value>,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            query,
            body,
        }
    }

    pub fn get(path: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self::new(Method::Get, path, query, None)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path, Vec::new(), Some(body))
    }

    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Patch, path, Vec::new(), Some(body))
    }
}

/// Convert a loose list of query parameters into owned pairs.
pub fn query_pairs(params: &[(&str, &str)]) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_descriptor_has_no_body() {
        let d = RequestDescriptor::get("actions", query_pairs(&[("page", "1")]));
        assert_eq!(d.method, Method::Get);
        assert_eq!(d.path, "actions");
        assert_eq!(d.query, vec![("page".to_string(), "1".to_string())]);
        assert!(d.body.is_none());
    }

    #[test]
    fn method_maps_to_reqwest() {
        assert_eq!(Method::Patch.as_reqwest(), reqwest::Method::PATCH);
        assert_eq!(Method::Get.as_reqwest(), reqwest::Method::GET);
    }
}
