/* src/server/adapter/axum/src/lib.rs */

mod error;
mod handler;

use gadget_server::GadgetServer;

/// Re-export gadget-server core for convenience
pub use gadget_server;

/// Extension trait that converts a `GadgetServer` into an Axum router.
pub trait IntoAxumRouter {
  fn into_axum_router(self) -> axum::Router;
  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send;
}

impl IntoAxumRouter for GadgetServer {
  fn into_axum_router(self) -> axum::Router {
    handler::build_router(self.into_parts())
  }

  async fn serve(self, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let router = self.into_axum_router();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, route = handler::RENDER_ROUTE, "gadget server listening");
    axum::serve(listener, router).await?;
    Ok(())
  }
}
