//! Route mounting.
//!
//! Turns a [`ModuleSet`] into an axum [`Router`]: every handler `f` in a
//! module `name` becomes `POST /<name>/<f>`, guarded by the signature
//! gate. Mounting happens once at startup; there is no dynamic reload.
//!
//! ```text
//! startup → mount() → (per request) body capture → verify → gate → handler
//! ```

pub mod registry;

pub use registry::{HandlerModule, MethodHandler, MiddlewareFn, ModuleSet, RESERVED_MODULE};

use axum::{extract::Request, middleware, middleware::Next, routing::post, Router};
use tracing::debug;

use crate::config::Config;
use crate::web::gate::{require_valid_signature, GatewayState};

/// Derive the route path for a handler.
///
/// The module name is truncated at its first `.` so a filesystem-flavored
/// name like `orders.js` still mounts under `/orders`. No URL-encoding and
/// no case normalization: callers are responsible for URL-safe names.
pub fn route_path(module: &str, handler: &str) -> String {
    format!("/{}/{}", module_stem(module), handler)
}

pub(crate) fn module_stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Mount a module set as a gated router.
///
/// Every request to a mounted route passes through the signature gate
/// first, then any registered global middleware in registration order,
/// then the handler. Route paths are not checked for collisions here;
/// the underlying router rejects duplicates when the route is added,
/// which fails startup rather than a live request.
pub fn mount(config: Config, modules: ModuleSet) -> Router {
    let state = GatewayState::new(config);

    let mut router = Router::new();

    for module in modules.modules() {
        if module_stem(module.name()) == RESERVED_MODULE {
            debug!(module = %module.name(), "reserved_module_skipped");
            continue;
        }

        for (handler_name, handler) in module.handlers() {
            let path = route_path(module.name(), handler_name);
            let handler = handler.clone();
            router = router.route(
                &path,
                post(move |request: Request| {
                    let handler = handler.clone();
                    async move { handler(request).await }
                }),
            );
            debug!(path = %path, "route_mounted");
        }
    }

    // Applied in reverse so the first-registered middleware is outermost
    // and runs first.
    for mw in modules.middleware_fns().iter().rev() {
        let mw = mw.clone();
        router = router.layer(middleware::from_fn(
            move |request: Request, next: Next| {
                let mw = mw.clone();
                async move { mw(request, next).await }
            },
        ));
    }

    router.layer(middleware::from_fn_with_state(
        state,
        require_valid_signature,
    ))
}
