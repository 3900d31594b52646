//! Content handlers turn a response into a caller-defined result.

use std::marker::PhantomData;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::error::Error;

/// Interprets a response of type `T`.
///
/// The handler may read as much of the body as it needs; the dispatcher drains
/// whatever is left afterwards. `Error` must absorb the dispatcher's own
/// [`Error`] so both can come out of one call. `anyhow::Error` works as is.
#[async_trait]
pub trait ContentHandler<T: Send>: Send + Sync {
    type Output: Send;
    type Error: From<Error> + Send;

    async fn process_content(&self, response: &mut T) -> Result<Self::Output, Self::Error>;
}

/// Handler built from a closure, see [`from_fn`].
pub struct FnHandler<F, R, E> {
    f: F,
    _marker: PhantomData<fn() -> (R, E)>,
}

/// Wraps a closure returning a boxed future as a [`ContentHandler`].
///
/// ```ignore
/// let handler = from_fn(|response: &mut ReqwestResponse| {
///     Box::pin(async move { Ok::<_, anyhow::Error>(response.text().await?) })
/// });
/// ```
pub fn from_fn<T, F, R, E>(f: F) -> FnHandler<F, R, E>
where
    T: Send,
    F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, Result<R, E>> + Send + Sync,
{
    FnHandler {
        f,
        _marker: PhantomData,
    }
}

#[async_trait]
impl<T, F, R, E> ContentHandler<T> for FnHandler<F, R, E>
where
    T: Send,
    F: for<'a> Fn(&'a mut T) -> BoxFuture<'a, Result<R, E>> + Send + Sync,
    R: Send,
    E: From<Error> + Send,
{
    type Output = R;
    type Error = E;

    async fn process_content(&self, response: &mut T) -> Result<R, E> {
        (self.f)(response).await
    }
}
