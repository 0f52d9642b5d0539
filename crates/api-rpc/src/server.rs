//! JSON-RPC Server
//!
//! HTTP JSON-RPC 2.0 on localhost. Method names are versioned
//! (`<area>.<action>.v1`) so a breaking change ships as `.v2` next to it.

use crate::handler::RpcHandler;
use crate::rate_limiter::RateLimiter;
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use sajilo_core::port::{IdProvider, Repositories, TimeProvider};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 9630;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
    /// Token bucket for mutating methods
    pub rate_limit_burst: u32,
    pub rate_limit_per_second: u32,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            rate_limit_burst: 200,
            rate_limit_per_second: 100,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

/// Register a method whose params deserialize into `P`
fn register<P, R, F, Fut>(
    module: &mut RpcModule<()>,
    method: &'static str,
    handler: &Arc<RpcHandler>,
    call: F,
) -> Result<(), String>
where
    P: DeserializeOwned + Send + 'static,
    R: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>, P) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ErrorObjectOwned>> + Send + 'static,
{
    let handler = handler.clone();
    module
        .register_async_method(method, move |params, _, _| {
            let handler = handler.clone();
            let call = call.clone();
            async move {
                let req: P = params.parse()?;
                call(handler, req).await
            }
        })
        .map_err(|e| e.to_string())?;
    Ok(())
}

/// Register a method that takes no params (any supplied are ignored)
fn register_no_params<R, F, Fut>(
    module: &mut RpcModule<()>,
    method: &'static str,
    handler: &Arc<RpcHandler>,
    call: F,
) -> Result<(), String>
where
    R: Serialize + Clone + Send + 'static,
    F: Fn(Arc<RpcHandler>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ErrorObjectOwned>> + Send + 'static,
{
    let handler = handler.clone();
    module
        .register_async_method(method, move |_, _, _| {
            let handler = handler.clone();
            let call = call.clone();
            async move { call(handler).await }
        })
        .map_err(|e| e.to_string())?;
    Ok(())
}

impl RpcServer {
    pub fn new(
        config: RpcServerConfig,
        repos: &Repositories,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        let rate_limiter =
            RateLimiter::new(config.rate_limit_burst, config.rate_limit_per_second);
        Self {
            handler: Arc::new(RpcHandler::new(
                repos,
                id_provider,
                time_provider,
                rate_limiter,
            )),
            config,
        }
    }

    /// Every method, bound to the shared handler
    pub fn module(&self) -> Result<RpcModule<()>, String> {
        let mut m = RpcModule::new(());
        let h = &self.handler;

        // Users
        register(&mut m, "user.sync.v1", h, |h, p| async move { h.sync_user(p).await })?;
        register(&mut m, "user.update_role.v1", h, |h, p| async move {
            h.update_user_role(p).await
        })?;
        register(&mut m, "user.get.v1", h, |h, p| async move { h.get_user(p).await })?;
        register_no_params(&mut m, "user.riders.v1", h, |h| async move { h.riders().await })?;

        // Items
        register(&mut m, "item.create.v1", h, |h, p| async move { h.create_item(p).await })?;
        register(&mut m, "item.get.v1", h, |h, p| async move { h.get_item(p).await })?;
        register_no_params(&mut m, "item.available.v1", h, |h| async move {
            h.available_items().await
        })?;
        register(&mut m, "item.by_user.v1", h, |h, p| async move {
            h.items_by_user(p).await
        })?;
        register(&mut m, "item.for_dealer.v1", h, |h, p| async move {
            h.items_for_dealer(p).await
        })?;
        register(&mut m, "item.for_rider.v1", h, |h, p| async move {
            h.items_for_rider(p).await
        })?;
        register(&mut m, "item.accept.v1", h, |h, p| async move { h.accept_item(p).await })?;
        register(&mut m, "item.assign_rider.v1", h, |h, p| async move {
            h.assign_item_rider(p).await
        })?;
        register(&mut m, "item.pickup.v1", h, |h, p| async move { h.pickup_item(p).await })?;
        register(&mut m, "item.complete.v1", h, |h, p| async move {
            h.complete_item(p).await
        })?;
        register(&mut m, "item.update_status.v1", h, |h, p| async move {
            h.update_item_status(p).await
        })?;
        register(&mut m, "transaction.list.v1", h, |h, p| async move {
            h.transactions(p).await
        })?;

        // Pickup requests
        register(&mut m, "pickup.create.v1", h, |h, p| async move {
            h.create_pickup(p).await
        })?;
        register(&mut m, "pickup.get.v1", h, |h, p| async move { h.get_pickup(p).await })?;
        register(&mut m, "pickup.by_user.v1", h, |h, p| async move {
            h.pickups_by_user(p).await
        })?;
        register_no_params(&mut m, "pickup.pending.v1", h, |h| async move {
            h.pending_pickups().await
        })?;
        register(&mut m, "pickup.for_dealer.v1", h, |h, p| async move {
            h.pickups_for_dealer(p).await
        })?;
        register(&mut m, "pickup.for_rider.v1", h, |h, p| async move {
            h.pickups_for_rider(p).await
        })?;
        register(&mut m, "pickup.offer.v1", h, |h, p| async move { h.make_offer(p).await })?;
        register(&mut m, "pickup.accept_offer.v1", h, |h, p| async move {
            h.accept_offer(p).await
        })?;
        register(&mut m, "pickup.assign_rider.v1", h, |h, p| async move {
            h.assign_pickup_rider(p).await
        })?;
        register(&mut m, "pickup.complete.v1", h, |h, p| async move {
            h.complete_pickup(p).await
        })?;

        // Notifications
        register(&mut m, "notification.list.v1", h, |h, p| async move {
            h.notifications(p).await
        })?;
        register(&mut m, "notification.unread_count.v1", h, |h, p| async move {
            h.unread_count(p).await
        })?;
        register(&mut m, "notification.mark_read.v1", h, |h, p| async move {
            h.mark_read(p).await
        })?;
        register(&mut m, "notification.mark_all_read.v1", h, |h, p| async move {
            h.mark_all_read(p).await
        })?;

        Ok(m)
    }

    /// Start the JSON-RPC server; returns the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), String> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| format!("Failed to build server on {}: {}", addr, e))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| format!("Failed to read bound address: {}", e))?;

        let module = self.module()?;
        let methods = module.method_names().count();

        info!(
            addr = %local_addr,
            methods,
            "JSON-RPC server started"
        );

        Ok((local_addr, server.start(module)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sajilo_core::port::id_provider::mocks::SequentialIdProvider;
    use sajilo_core::port::time_provider::mocks::FixedTimeProvider;

    #[test]
    fn test_all_methods_registered() {
        let server = RpcServer::new(
            RpcServerConfig::default(),
            &Repositories::unconfigured(),
            Arc::new(SequentialIdProvider::new()),
            Arc::new(FixedTimeProvider::new(0)),
        );
        let module = server.module().unwrap();
        let names: Vec<_> = module.method_names().collect();

        assert_eq!(names.len(), 30);
        for name in [
            "user.sync.v1",
            "item.accept.v1",
            "pickup.offer.v1",
            "notification.unread_count.v1",
        ] {
            assert!(names.contains(&name), "{} missing", name);
        }
        assert!(names.iter().all(|n| n.ends_with(".v1")));
    }
}
