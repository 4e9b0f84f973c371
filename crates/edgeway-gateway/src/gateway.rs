use edgeway_client::{BackendClient, RegistryClient};
use edgeway_common::protocol::error::Result;
use edgeway_common::{
    Acknowledged, CreatedPost, DeletePost, NewPost, PostList, ServiceStatus, UpdatePost,
};
use tracing::info;

use crate::cache::{CacheAside, CacheSource};
use crate::config::GatewayConfig;
use crate::discovery::resolve_instances;
use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::instance::InstanceStatus;

/// Cache key of the full animal-post listing.
pub const ANIMAL_POSTS_KEY: &str = "animalPosts";

/// Everything a gateway request needs: the backend dispatcher, the client it
/// dispatches with, and the read cache.
///
/// Reads go through the cache; writes go straight to the dispatcher and then
/// clear the cache whether or not the backend accepted them.
pub struct Gateway {
    dispatcher: Dispatcher,
    backend: BackendClient,
    cache: CacheAside<PostList>,
}

impl Gateway {
    pub fn new(
        service_name: &str,
        instances: Vec<String>,
        config: DispatcherConfig,
        backend: BackendClient,
    ) -> Result<Self> {
        Ok(Self {
            dispatcher: Dispatcher::new(service_name, instances, config)?,
            backend,
            cache: CacheAside::new(),
        })
    }

    /// Discovers the backend and builds the gateway for `config`.
    pub async fn bootstrap(config: &GatewayConfig, registry: RegistryClient) -> Result<Self> {
        let instances = resolve_instances(config, registry).await?;
        info!(
            "Gateway routing {} to {} instance(s): {:?}",
            config.service_name,
            instances.len(),
            instances
        );

        Self::new(
            &config.service_name,
            instances,
            config.dispatcher.clone(),
            BackendClient::default(),
        )
    }

    pub async fn create_post(&self, post: NewPost) -> Result<CreatedPost> {
        post.validate()?;
        let backend = &self.backend;
        let result = self
            .dispatcher
            .dispatch(|instance| async move { backend.create_post(&instance, &post).await })
            .await;
        self.cache.invalidate(ANIMAL_POSTS_KEY).await;
        result
    }

    pub async fn update_post(&self, update: UpdatePost) -> Result<Acknowledged> {
        update.validate()?;
        let backend = &self.backend;
        let result = self
            .dispatcher
            .dispatch(|instance| async move { backend.update_post(&instance, &update).await })
            .await;
        self.cache.invalidate(ANIMAL_POSTS_KEY).await;
        result
    }

    pub async fn delete_post(&self, post_id: u64) -> Result<Acknowledged> {
        let backend = &self.backend;
        let delete = DeletePost { post_id };
        let result = self
            .dispatcher
            .dispatch(|instance| async move { backend.delete_post(&instance, &delete).await })
            .await;
        self.cache.invalidate(ANIMAL_POSTS_KEY).await;
        result
    }

    /// Lists posts from the cache, filling it from the backend on a miss.
    ///
    /// A cached listing reports `source: "cache"`; a fresh one keeps the
    /// source the backend reported.
    pub async fn list_posts(&self) -> Result<PostList> {
        let backend = &self.backend;
        let dispatcher = &self.dispatcher;
        let (mut list, source) = self
            .cache
            .read_through(ANIMAL_POSTS_KEY, || {
                dispatcher.dispatch(|instance| async move { backend.list_posts(&instance).await })
            })
            .await?;

        if source == CacheSource::Cache {
            list.source = "cache".to_string();
        }
        Ok(list)
    }

    pub async fn service_status(&self) -> Result<ServiceStatus> {
        let backend = &self.backend;
        self.dispatcher
            .dispatch(|instance| async move { backend.check_status(&instance).await })
            .await
    }

    pub async fn instances(&self) -> Vec<InstanceStatus> {
        self.dispatcher.snapshot().await
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn cache(&self) -> &CacheAside<PostList> {
        &self.cache
    }
}
