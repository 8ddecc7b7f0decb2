//! Per-call cancellation and deadlines.

use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation scope for one or more calls.
///
/// A call bound to a context is aborted as soon as the context's token is
/// cancelled or its deadline passes, and fails with [`Error::Cancelled`] or
/// [`Error::Timeout`] respectively. Clones share the same token.
///
/// # Examples
///
/// ```no_run
/// use powermax_api::{Client, ClientOptions, Context};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), powermax_api::Error> {
/// let client = Client::new("https://array.example.com", ClientOptions::default())?;
/// let ctx = Context::with_timeout(Duration::from_secs(10));
/// let arrays: Option<serde_json::Value> = client
///     .get(&ctx, "/sloprovisioning/symmetrix", None)
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// A context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Some(deadline),
        }
    }

    /// A context driven by an existing cancellation token.
    pub fn with_cancellation(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
        }
    }

    /// Adds (or tightens) a deadline on this context.
    pub fn deadline_in(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Cancels every call bound to this context (and its clones).
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The token backing this context.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the error a call would fail with if started now, if any.
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(Error::Timeout),
            _ => None,
        }
    }

    /// Drives `fut` to completion unless the context fires first.
    pub(crate) async fn run<F>(&self, fut: F) -> Result<F::Output>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }

        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Error::Cancelled),
            _ = expired => Err(Error::Timeout),
            output = fut => Ok(output),
        }
    }
}
