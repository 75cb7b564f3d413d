//! Application services - Use case implementations

mod chaos_engine;
mod proxy_service;
mod route_resolver;

pub use chaos_engine::ChaosEngine;
pub use proxy_service::ProxyService;
pub use route_resolver::{
    CollectionRequest, ResolvedRoute, RouteResolver, RouteSource, SandboxQuery, parse_fail_codes,
};
