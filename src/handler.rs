//! Message handlers and their identity.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::context::TaskContext;
use crate::error::HandlerError;
use crate::message::Message;

/// Something that can process a message.
///
/// Implemented for every async closure
/// `Fn(Arc<Message>, TaskContext) -> impl Future<Output = Result<(), HandlerError>>`,
/// so most handlers are plain closures. Implement it directly for handlers that
/// carry their own dependencies.
pub trait MessageHandler: Send + Sync + 'static {
    fn handle(
        &self,
        message: Arc<Message>,
        context: TaskContext,
    ) -> BoxFuture<'static, Result<(), HandlerError>>;
}

impl<F, Fut> MessageHandler for F
where
    F: Fn(Arc<Message>, TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn handle(
        &self,
        message: Arc<Message>,
        context: TaskContext,
    ) -> BoxFuture<'static, Result<(), HandlerError>> {
        Box::pin(self(message, context))
    }
}

/// Shared reference to a registered handler.
///
/// Clones share identity; two handlers built separately never do, even from
/// the same closure. The dispatcher uses this identity to run a handler at
/// most once per message.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<dyn MessageHandler>,
}

impl Handler {
    pub fn new<H: MessageHandler>(handler: H) -> Self {
        Self {
            inner: Arc::new(handler),
        }
    }

    /// Build a handler from an async closure.
    ///
    /// Unlike [`Handler::new`], the closure's argument and return types are
    /// inferred from this signature.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Message>, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::new(f)
    }

    /// Identity of the underlying handler.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub(crate) fn invoke(
        &self,
        message: Arc<Message>,
        context: TaskContext,
    ) -> BoxFuture<'static, Result<(), HandlerError>> {
        self.inner.handle(message, context)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("id", &format_args!("{:#x}", self.id()))
            .finish()
    }
}
