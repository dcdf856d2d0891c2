//! Handler module registry.
//!
//! The gateway never scans a filesystem or loads code dynamically; callers
//! register handler modules explicitly. A [`HandlerModule`] stands in for
//! what a loaded module exports: a name plus an ordered set of named
//! handler functions. A [`ModuleSet`] collects the modules to mount along
//! with any global middleware that should run behind the signature gate.

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;

/// Module name reserved for custom middleware; never mounted as routes.
pub const RESERVED_MODULE: &str = "index";

/// A boxed per-route handler.
pub type MethodHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A boxed global middleware function.
pub type MiddlewareFn = Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// A named module of webhook handlers.
///
/// Handler registration order is preserved, so mounting the same module
/// twice produces the same routes in the same order.
pub struct HandlerModule {
    name: String,
    handlers: Vec<(String, MethodHandler)>,
}

impl HandlerModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handlers: Vec::new(),
        }
    }

    /// Register a named handler function.
    pub fn handler<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoResponse,
    {
        let wrapped: MethodHandler = Arc::new(move |request: Request| -> BoxFuture<'static, Response> {
            let fut = f(request);
            Box::pin(async move { fut.await.into_response() })
        });
        self.handlers.push((name.into(), wrapped));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn handlers(&self) -> &[(String, MethodHandler)] {
        &self.handlers
    }
}

/// An ordered collection of handler modules and global middleware.
#[derive(Default)]
pub struct ModuleSet {
    middleware: Vec<MiddlewareFn>,
    modules: Vec<HandlerModule>,
}

impl ModuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a global middleware function.
    ///
    /// Middleware runs after the signature gate and before every handler,
    /// in registration order.
    pub fn middleware<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoResponse,
    {
        let wrapped: MiddlewareFn =
            Arc::new(move |request: Request, next: Next| -> BoxFuture<'static, Response> {
                let fut = f(request, next);
                Box::pin(async move { fut.await.into_response() })
            });
        self.middleware.push(wrapped);
        self
    }

    /// Register a handler module.
    pub fn module(mut self, module: HandlerModule) -> Self {
        self.modules.push(module);
        self
    }

    /// The route paths mounting this set will register, in mount order.
    pub fn route_paths(&self) -> Vec<String> {
        self.modules
            .iter()
            .filter(|m| super::module_stem(m.name()) != RESERVED_MODULE)
            .flat_map(|m| {
                m.handlers()
                    .iter()
                    .map(|(handler, _)| super::route_path(m.name(), handler))
            })
            .collect()
    }

    pub(crate) fn modules(&self) -> &[HandlerModule] {
        &self.modules
    }

    pub(crate) fn middleware_fns(&self) -> &[MiddlewareFn] {
        &self.middleware
    }
}
