//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! The stdio transport is served by rmcp, which routes `tools/call` through a
//! `ToolRouter`. Every route here forwards to [`ToolRegistry::invoke`], so both
//! transports share one dispatch path.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
};
use serde_json::Value;

use super::invocation::InvocationRequest;
use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    let mut router = ToolRouter::new();
    for descriptor in registry.descriptors() {
        let registry = registry.clone();
        let name = descriptor.name;
        let route = ToolRoute::new_dyn(descriptor.to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let registry = registry.clone();
            async move {
                let request = InvocationRequest::new(Value::Null, name, args);
                Ok::<_, McpError>(registry.invoke(request).await.into_call_tool_result())
            }
            .boxed()
        });
        router = router.with_route(route);
    }
    router
}
