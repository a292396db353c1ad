//! Change feed - live, typed snapshots of a collection.
//!
//! Each item is the full current state of the collection, sorted by name.
//! Consumers should treat every emission as authoritative; nothing is
//! replayed across a reconnect. Calling `cancel` (or dropping the feed)
//! releases the underlying subscription.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::document::{Document, DocumentStream, RawDocument};
use crate::error::{CatalogError, Result};

/// Cancellable stream of `Vec<E>` snapshots.
pub struct ChangeFeed<E> {
    inner: Option<DocumentStream>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Document> ChangeFeed<E> {
    pub fn new(stream: DocumentStream) -> Self {
        Self {
            inner: Some(stream),
            _marker: PhantomData,
        }
    }

    /// Stop receiving snapshots. The feed yields `None` from here on.
    pub fn cancel(&mut self) {
        if self.inner.take().is_some() {
            debug!(collection = E::COLLECTION, "change feed cancelled");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.is_none()
    }

    /// Wait for the next snapshot.
    pub async fn next_snapshot(&mut self) -> Option<Result<Vec<E>>> {
        self.next().await
    }
}

impl<E> std::fmt::Debug for ChangeFeed<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("cancelled", &self.inner.is_none())
            .finish()
    }
}

impl<E: Document> Stream for ChangeFeed<E> {
    type Item = Result<Vec<E>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(inner) = this.inner.as_mut() else {
            return Poll::Ready(None);
        };
        inner
            .poll_next_unpin(cx)
            .map(|snapshot| snapshot.map(|docs| decode_snapshot::<E>(&docs)))
    }
}

fn decode_snapshot<E: Document>(docs: &[RawDocument]) -> Result<Vec<E>> {
    let mut entities = docs
        .iter()
        .map(|doc| {
            doc.decode::<E>()
                .map_err(|e| CatalogError::persistence(E::COLLECTION, e))
        })
        .collect::<Result<Vec<E>>>()?;
    entities.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
    Ok(entities)
}
