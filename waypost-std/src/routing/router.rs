//! Request dispatch.
//!
//! Routes are bucketed by a 32-bit hash of their static prefix. Resolving a
//! request probes the bucket for the request path itself, then the buckets of
//! every registered dynamic prefix the path starts with, longest first.
//! Collisions inside a bucket are resolved by comparing the actual prefix.

use super::{
    route::{Params, Route},
    static_files::FsStaticFiles,
    template::static_prefix,
};
use crate::config::RouterConfig;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
};
use waypost_core::{MethodSet, RouteError, StaticFiles, StaticTarget};

/// How dynamic routes are selected during dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The first dynamic candidate wins, with empty parameters and without
    /// checking its pattern against the request path.
    #[default]
    Legacy,
    /// The first dynamic candidate whose pattern matches wins, with its
    /// captured parameters.
    Verified,
}

/// The outcome of resolving a request.
#[derive(Debug)]
pub enum Resolution<'r, A> {
    /// A route answered the request.
    Matched {
        /// The matching route.
        route: &'r Route<A>,
        /// Parameters captured from the path.
        params: Params,
    },
    /// A concrete file answers the request; route matching was bypassed.
    Static(StaticTarget),
    /// Nothing matched.
    NotFound(&'r A),
}

impl<'r, A> Resolution<'r, A> {
    /// The action to invoke: the route's for a match, the fallback otherwise.
    pub fn action(&self) -> Option<&'r A> {
        match self {
            Resolution::Matched { route, .. } => Some(route.action()),
            Resolution::NotFound(action) => Some(action),
            Resolution::Static(_) => None,
        }
    }

    /// Captured parameters, if a route matched.
    pub fn params(&self) -> Option<&Params> {
        match self {
            Resolution::Matched { params, .. } => Some(params),
            _ => None,
        }
    }

    /// The matching route, if any.
    pub fn route(&self) -> Option<&'r Route<A>> {
        match self {
            Resolution::Matched { route, .. } => Some(route),
            _ => None,
        }
    }

    /// Whether the request fell through to the fallback.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound(_))
    }
}

fn bucket_key(prefix: &str) -> u32 {
    fxhash::hash32(prefix)
}

/// Maps an HTTP method and path to an action.
///
/// Registration goes through `&mut self`, dispatch through `&self`, so a
/// router is filled at startup and then shared read-only.
///
/// # Example
///
/// ```rust,ignore
/// let mut router = Router::new("public", "not_found");
/// router.get("/users/{id:\\d+}", "show_user").named("user");
/// router.add_route(["GET", "POST"], "/login", "login");
///
/// match router.route("GET", "/login") {
///     Resolution::Matched { route, params } => { /* invoke route.action() */ }
///     Resolution::Static(target) => { /* serve target.path() */ }
///     Resolution::NotFound(fallback) => { /* invoke fallback */ }
/// }
/// ```
pub struct Router<A> {
    name: String,
    base_path: PathBuf,
    routes: FxHashMap<u32, Vec<Route<A>>>,
    order: Vec<(u32, usize)>,
    dynamic_prefixes: BTreeSet<usize>,
    not_found: A,
    policy: MatchPolicy,
    static_files: Box<dyn StaticFiles>,
}

impl<A> Router<A> {
    /// Create a router serving static files from `base_path`.
    pub fn new(base_path: impl Into<PathBuf>, not_found: A) -> Self {
        let base_path = base_path.into();
        Self {
            name: String::new(),
            static_files: Box::new(FsStaticFiles::new(base_path.clone())),
            base_path,
            routes: FxHashMap::default(),
            order: Vec::new(),
            dynamic_prefixes: BTreeSet::new(),
            not_found,
            policy: MatchPolicy::default(),
        }
    }

    /// Create a router from configuration.
    pub fn from_config(config: &RouterConfig, not_found: A) -> Self {
        let mut files =
            FsStaticFiles::new(config.base_path.clone()).with_index_file(config.index_file.clone());
        if let Some(script_dir) = &config.script_dir {
            files = files.with_script_dir(script_dir.clone());
        }
        Self::new(config.base_path.clone(), not_found)
            .with_name(config.name.clone())
            .with_policy(config.policy)
            .with_static_files(files)
    }

    /// Set the router's label.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the dynamic route selection policy.
    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the static-file collaborator.
    pub fn with_static_files(mut self, static_files: impl StaticFiles + 'static) -> Self {
        self.static_files = Box::new(static_files);
        self
    }

    /// The router's label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The static-file root.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// The dynamic route selection policy.
    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// The fallback action.
    pub fn not_found(&self) -> &A {
        &self.not_found
    }

    /// Register a route and return it for further configuration.
    pub fn add_route(
        &mut self,
        methods: impl Into<MethodSet>,
        path: impl Into<String>,
        action: A,
    ) -> &mut Route<A> {
        let route = Route::new(methods, path, action);

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(
                router = %self.name,
                methods = %route.methods(),
                path = %route.path(),
                dynamic = route.is_dynamic(),
                "registered route"
            );
            if let Some(reason) = route.pattern_error() {
                tracing::warn!(path = %route.path(), %reason, "route pattern does not compile and will never match");
            }
        }

        if route.is_dynamic() {
            self.dynamic_prefixes.insert(route.static_prefix().len());
        }
        let key = bucket_key(route.static_prefix());
        let bucket = self.routes.entry(key).or_default();
        let index = bucket.len();
        bucket.push(route);
        self.order.push((key, index));
        &mut bucket[index]
    }

    /// Register a `GET` route.
    pub fn get(&mut self, path: impl Into<String>, action: A) -> &mut Route<A> {
        self.add_route("GET", path, action)
    }

    /// Register a `POST` route.
    pub fn post(&mut self, path: impl Into<String>, action: A) -> &mut Route<A> {
        self.add_route("POST", path, action)
    }

    /// Register a `PUT` route.
    pub fn put(&mut self, path: impl Into<String>, action: A) -> &mut Route<A> {
        self.add_route("PUT", path, action)
    }

    /// Register a `PATCH` route.
    pub fn patch(&mut self, path: impl Into<String>, action: A) -> &mut Route<A> {
        self.add_route("PATCH", path, action)
    }

    /// Register a `DELETE` route.
    pub fn delete(&mut self, path: impl Into<String>, action: A) -> &mut Route<A> {
        self.add_route("DELETE", path, action)
    }

    /// Register a route accepting every method.
    pub fn any(&mut self, path: impl Into<String>, action: A) -> &mut Route<A> {
        self.add_route(MethodSet::any(), path, action)
    }

    fn bucket(&self, prefix: &str) -> &[Route<A>] {
        self.routes
            .get(&bucket_key(prefix))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Look up a route by its exact template.
    pub fn get_route(&self, path: &str) -> Option<&Route<A>> {
        self.bucket(static_prefix(path))
            .iter()
            .find(|route| route.path() == path)
    }

    /// Look up a route by name. The first registered route wins.
    pub fn route_by_name(&self, name: &str) -> Option<&Route<A>> {
        self.routes().find(|route| route.name() == Some(name))
    }

    /// Build the path of the route called `name`.
    pub fn url_for(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        self.route_by_name(name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_owned()))?
            .url_for(params)
    }

    /// Iterate over routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route<A>> {
        self.order
            .iter()
            .filter_map(|(key, index)| self.routes.get(key).and_then(|bucket| bucket.get(*index)))
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // Routes that may answer `path`: its own bucket first, then dynamic routes
    // under each shorter registered prefix, longest first.
    fn candidates(&self, method: &str, path: &str) -> Vec<&Route<A>> {
        let prefix = static_prefix(path);
        let mut found: Vec<&Route<A>> = self
            .bucket(prefix)
            .iter()
            .filter(|route| route.static_prefix() == prefix && route.methods().accepts(method))
            .collect();

        for &len in self.dynamic_prefixes.range(..prefix.len()).rev() {
            let Some(probe) = prefix.get(..len) else {
                continue;
            };
            found.extend(self.bucket(probe).iter().filter(|route| {
                route.is_dynamic()
                    && route.static_prefix() == probe
                    && route.methods().accepts(method)
            }));
        }
        found
    }

    /// Resolve a request to an action.
    ///
    /// Never fails: a request nothing answers resolves to the fallback.
    pub fn route(&self, method: &str, path: &str) -> Resolution<'_, A> {
        if let Some(target) = self.static_files.resolve(static_prefix(path)) {
            #[cfg(feature = "tracing")]
            tracing::trace!(router = %self.name, %method, %path, file = ?target, "static file");
            return Resolution::Static(target);
        }

        let candidates = self.candidates(method, path);

        for route in candidates.iter().filter(|route| route.is_dynamic()) {
            match self.policy {
                MatchPolicy::Legacy => {
                    return self.matched(method, path, route, Params::new());
                }
                MatchPolicy::Verified => {
                    if let Some(params) = route.captures(path) {
                        return self.matched(method, path, route, params);
                    }
                }
            }
        }

        for route in candidates.iter().filter(|route| !route.is_dynamic()) {
            if route.matches(path) {
                return self.matched(method, path, route, Params::new());
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(router = %self.name, %method, %path, "no route matched");
        Resolution::NotFound(&self.not_found)
    }

    fn matched<'r>(
        &'r self,
        method: &str,
        path: &str,
        route: &'r Route<A>,
        params: Params,
    ) -> Resolution<'r, A> {
        #[cfg(feature = "tracing")]
        tracing::trace!(router = %self.name, %method, %path, route = %route.path(), "route matched");
        #[cfg(not(feature = "tracing"))]
        let _ = (method, path); // Suppress unused warnings
        Resolution::Matched { route, params }
    }
}

impl<A> fmt::Debug for Router<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("base_path", &self.base_path)
            .field("routes", &self.len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
