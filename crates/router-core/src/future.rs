use std::future::Future;
use std::pin::Pin;

/// A boxed, type-erased future, used for the plugin hook function types
/// `router-manager` builds on top of this crate's [`crate::Event`] and
/// [`crate::EventFilter`].
///
/// Plugin hooks are stored as `Arc<dyn Fn(..) -> BoxFuture<'static, T> + Send + Sync>`
/// rather than `async fn` in a trait, so a plugin descriptor stays a plain
/// record of optional function values instead of a trait object
/// hierarchy.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
