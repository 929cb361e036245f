//! Corrections: described, deferred remote actions

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

use crate::error::Result;

/// Deferred remote action of a [`Correction`].
pub type CorrectionAction = Box<dyn FnOnce() -> BoxFuture<'static, Result<()>> + Send>;

/// A human-readable message plus an optional action that applies it.
///
/// Building a correction never touches the remote side. The host prints
/// [`msg`](Self::msg) and, once approved, runs the corrections in order.
/// A correction without an action is informational only.
pub struct Correction {
    /// Description shown to the operator.
    pub msg: String,
    action: Option<CorrectionAction>,
}

impl Correction {
    /// Correction whose action runs `f` when executed.
    pub fn new<F, Fut>(msg: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            msg: msg.into(),
            action: Some(Box::new(move || -> BoxFuture<'static, Result<()>> {
                Box::pin(f())
            })),
        }
    }

    /// Informational correction with no action.
    pub fn report(msg: impl Into<String>) -> Self {
        Self {
            msg: msg.into(),
            action: None,
        }
    }

    /// Whether running this correction would do nothing.
    pub fn is_report(&self) -> bool {
        self.action.is_none()
    }

    /// Execute the action. Informational corrections succeed without doing anything.
    pub async fn run(self) -> Result<()> {
        match self.action {
            Some(action) => action().await,
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correction")
            .field("msg", &self.msg)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}
