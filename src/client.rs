use crate::api::Actions;
use crate::config::Config;
use crate::error::Error;
use crate::http::{HttpTransport, Transport};
use crate::pagination;
use crate::request::RequestDescriptor;
use crate::scheduler::{RequestHandle, Scheduler};
use serde_json::Value;
use std::sync::Arc;

/// Entry point for the Kentaa API. Owns the admission-control scheduler and
/// the HTTP transport; resource clients such as [`Actions`] borrow it.
///
/// Must be created inside a Tokio runtime (the scheduler spawns its reset
/// tasks at construction).
///
/// ```no_run
/// # async fn demo() -> Result<(), kentaa_api::Error> {
/// let client = kentaa_api::KentaaClient::new("my-api-key")?;
/// let actions = client.actions().list(&[]).await?;
/// println!("{} actions", actions.len());
/// # Ok(())
/// # }
/// ```
pub struct KentaaClient {
    scheduler: Scheduler,
}

impl KentaaClient {
    /// Client with default configuration and the given API key.
    pub fn new(api_key: &str) -> Result<Self, Error> {
        Self::from_config(Config::new(api_key))
    }

    pub fn from_config(config: Config) -> Result<Self, Error> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::with_transport(transport))
    }

    /// Client over a custom transport. Used by tests; also the seam for
    /// callers that need their own HTTP stack.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            scheduler: Scheduler::new(transport),
        }
    }

    /// Submit a single request through admission control and await its
    /// decoded JSON body.
    pub fn request(&self, descriptor: RequestDescriptor) -> RequestHandle {
        self.scheduler.submit(descriptor)
    }

    /// Fetch every page of a paginated resource, concatenated in page order.
    pub async fn fetch_all(
        &self,
        location: &str,
        list_key: &str,
        extra_params: &[(String, String)],
    ) -> Result<Vec<Value>, Error> {
        pagination::fetch_all(&self.scheduler, location, list_key, extra_params).await
    }

    /// The actions resource.
    pub fn actions(&self) -> Actions<'_> {
        Actions::new(self)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }
}
