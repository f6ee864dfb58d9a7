//! Platform-specific helper abstractions used to keep trait bounds aligned with
//! the threading guarantees of each target.
//!
//! Native targets require `Send + Sync` so bridge implementations can be shared
//! freely across async tasks. A worker running inside a browser is confined to a
//! single thread, and the `web_sys` objects backing its caches, clients and
//! notifications cannot satisfy those bounds. The helper traits below make the
//! required bounds conditional without duplicating every trait definition.

#[cfg(not(target_arch = "wasm32"))]
use futures::future::BoxFuture;
#[cfg(target_arch = "wasm32")]
use futures::future::LocalBoxFuture;

/// Marker trait that applies `Send + Sync` on native targets while becoming a
/// no-op on `wasm32`.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSendSync: Send + Sync {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSendSync for T where T: Send + Sync {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSendSync {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSendSync for T {}

/// Marker trait equivalent to `Send` on native targets.
#[cfg(not(target_arch = "wasm32"))]
pub trait PlatformSend: Send {}

#[cfg(not(target_arch = "wasm32"))]
impl<T> PlatformSend for T where T: Send {}

#[cfg(target_arch = "wasm32")]
pub trait PlatformSend {}

#[cfg(target_arch = "wasm32")]
impl<T> PlatformSend for T {}

/// Boxed future handed to a host executor, `Send` where the target allows it.
#[cfg(not(target_arch = "wasm32"))]
pub type PlatformBoxFuture<'a, T> = BoxFuture<'a, T>;

#[cfg(target_arch = "wasm32")]
pub type PlatformBoxFuture<'a, T> = LocalBoxFuture<'a, T>;

/// Box a future with the bounds the current target requires.
#[cfg(not(target_arch = "wasm32"))]
pub fn boxed<'a, F, T>(future: F) -> PlatformBoxFuture<'a, T>
where
    F: std::future::Future<Output = T> + Send + 'a,
{
    Box::pin(future)
}

#[cfg(target_arch = "wasm32")]
pub fn boxed<'a, F, T>(future: F) -> PlatformBoxFuture<'a, T>
where
    F: std::future::Future<Output = T> + 'a,
{
    Box::pin(future)
}
