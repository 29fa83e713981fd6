use crate::components::remembered::{RememberedAttendee, RememberedStore};
use crate::components::rsvp::{RsvpStore, RsvpSubmission};
use crate::config::Config;
use crate::error::{config_error, Error, InviteResult};
use crate::invite::display::{resolve_locale, DisplayLocale};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a request needs, built once at startup and shared by handlers
#[derive(Clone)]
pub struct InviteContext {
    pub config: Arc<Config>,
    rsvp: Option<Arc<dyn RsvpStore>>,
    remembered: Option<Arc<dyn RememberedStore>>,
    #[cfg(feature = "rsvp")]
    redis: Option<crate::components::redis_service::RedisActorHandle>,
}

impl fmt::Debug for InviteContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InviteContext")
            .field("config", &self.config)
            .field("rsvp", &self.rsvp.is_some())
            .field("remembered", &self.remembered.is_some())
            .finish()
    }
}

impl InviteContext {
    /// Context with no optional collaborators
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            rsvp: None,
            remembered: None,
            #[cfg(feature = "rsvp")]
            redis: None,
        }
    }

    /// Attach an RSVP store
    pub fn with_rsvp_store(mut self, store: Arc<dyn RsvpStore>) -> Self {
        self.rsvp = Some(store);
        self
    }

    /// Attach a remembered-attendee store
    pub fn with_remembered_store(mut self, store: Arc<dyn RememberedStore>) -> Self {
        self.remembered = Some(store);
        self
    }

    /// Use a running Redis actor as the RSVP store
    #[cfg(feature = "rsvp")]
    pub fn with_redis(
        mut self,
        handle: crate::components::redis_service::RedisActorHandle,
    ) -> Self {
        self.rsvp = Some(Arc::new(handle.clone()));
        self.redis = Some(handle);
        self
    }

    pub fn rsvp_store(&self) -> Option<&Arc<dyn RsvpStore>> {
        self.rsvp.as_ref()
    }

    pub fn remembered_store(&self) -> Option<&Arc<dyn RememberedStore>> {
        self.remembered.as_ref()
    }

    /// Display locale for a request's `lang` parameter
    pub fn locale(&self, lang: Option<&str>) -> &'static DisplayLocale {
        resolve_locale(lang, &self.config.default_locale)
    }

    /// This client's remembered attendee for an event.
    ///
    /// Without a client id nothing is remembered; read failures count as
    /// nothing remembered.
    pub async fn remembered_attendee(
        &self,
        client_id: Option<&str>,
        event_id: &str,
    ) -> Option<RememberedAttendee> {
        let client_id = client_id.filter(|id| !id.is_empty())?.to_string();
        let event = event_id.to_string();
        let result = self
            .with_remembered(move |store| store.get(&client_id, &event))
            .await?;
        match result {
            Ok(attendee) => attendee,
            Err(e) => {
                warn!("Failed to read remembered attendee for {}: {}", event_id, e);
                None
            }
        }
    }

    /// Submit a response and, on success, remember the attendee for this
    /// client if asked to.
    ///
    /// A failed submit leaves the remembered state untouched.
    pub async fn submit_rsvp(
        &self,
        submission: &RsvpSubmission,
        client_id: Option<&str>,
    ) -> InviteResult<()> {
        let store = self
            .rsvp
            .as_ref()
            .ok_or_else(|| config_error("RSVP is not configured"))?;

        store.submit(submission).await?;
        info!("Stored RSVP for event {}", submission.event_id);

        if !submission.remember {
            return Ok(());
        }
        let Some(client_id) = client_id.filter(|id| !id.is_empty()).map(str::to_string) else {
            debug!("No client id, not remembering attendee");
            return Ok(());
        };

        let event_id = submission.event_id.clone();
        let attendee = RememberedAttendee {
            name: submission.attendee_name.trim().to_string(),
            show_name: submission.show_name,
        };
        let result = self
            .with_remembered(move |store| store.set(&client_id, &event_id, &attendee))
            .await;
        if let Some(Err(e)) = result {
            warn!("Failed to remember attendee: {}", e);
        }

        Ok(())
    }

    /// Run a remembered-store call on the blocking pool
    async fn with_remembered<T, F>(&self, op: F) -> Option<InviteResult<T>>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RememberedStore) -> InviteResult<T> + Send + 'static,
    {
        let store = Arc::clone(self.remembered.as_ref()?);
        let result = tokio::task::spawn_blocking(move || op(store.as_ref()))
            .await
            .unwrap_or_else(|e| Err(Error::Other(format!("Remembered store task failed: {}", e))));
        Some(result)
    }

    /// Stop background collaborators
    pub async fn shutdown(&self) {
        #[cfg(feature = "rsvp")]
        {
            if let Some(redis) = &self.redis {
                if let Err(e) = redis.shutdown().await {
                    tracing::error!("Error shutting down Redis actor: {:?}", e);
                } else {
                    info!("Redis actor shut down successfully");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::remembered::InMemoryRememberedStore;
    use crate::components::rsvp::{InMemoryRsvpStore, RsvpStatus};

    fn submission(name: &str, remember: bool) -> RsvpSubmission {
        RsvpSubmission {
            event_id: "e1".to_string(),
            attendee_name: name.to_string(),
            status: RsvpStatus::Later,
            show_name: false,
            remember,
        }
    }

    fn remembering_context() -> InviteContext {
        InviteContext::new(Config::for_tests())
            .with_rsvp_store(Arc::new(InMemoryRsvpStore::new()))
            .with_remembered_store(Arc::new(InMemoryRememberedStore::default()))
    }

    #[tokio::test]
    async fn test_submit_remembers_attendee() {
        let ctx = remembering_context();

        ctx.submit_rsvp(&submission(" Aino ", true), Some("c1"))
            .await
            .unwrap();
        assert_eq!(
            ctx.remembered_attendee(Some("c1"), "e1").await,
            Some(RememberedAttendee {
                name: "Aino".to_string(),
                show_name: false
            })
        );
    }

    #[tokio::test]
    async fn test_remembered_attendee_is_private_to_client() {
        let ctx = remembering_context();

        ctx.submit_rsvp(&submission("Secret Sam", true), Some("client-a"))
            .await
            .unwrap();

        assert_eq!(ctx.remembered_attendee(Some("client-b"), "e1").await, None);
        assert_eq!(ctx.remembered_attendee(None, "e1").await, None);
        assert!(ctx
            .remembered_attendee(Some("client-a"), "e1")
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_submit_without_client_id_remembers_nothing() {
        let ctx = remembering_context();

        ctx.submit_rsvp(&submission("Aino", true), None).await.unwrap();
        assert_eq!(ctx.remembered_attendee(Some(""), "e1").await, None);
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_remembered_state() {
        let ctx = remembering_context();

        assert!(ctx.submit_rsvp(&submission("", true), Some("c1")).await.is_err());
        assert_eq!(ctx.remembered_attendee(Some("c1"), "e1").await, None);
    }

    #[tokio::test]
    async fn test_submit_without_store() {
        let ctx = InviteContext::new(Config::for_tests());
        assert!(matches!(
            ctx.submit_rsvp(&submission("Aino", false), None).await,
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_locale_uses_configured_default() {
        let mut config = Config::for_tests();
        config.default_locale = "sv".to_string();
        let ctx = InviteContext::new(config);
        assert_eq!(ctx.locale(None).tag, "sv-SE");
        assert_eq!(ctx.locale(Some("fi")).tag, "fi-FI");
    }
}
