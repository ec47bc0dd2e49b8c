// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Leaf node kinds backed by headless sprites.

use std::fmt;
use std::future::{Future, ready};

use arbor_core::error::LoadError;
use arbor_core::kind::{LoadFuture, NodeKind};

use crate::scene::{DrawableId, HeadlessBackend};

/// A leaf whose sprite exists as soon as the node is constructed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sprite {
    label: String,
}

impl Sprite {
    /// Creates a sprite kind with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl NodeKind<HeadlessBackend> for Sprite {
    fn build(&mut self, backend: &mut HeadlessBackend) -> Option<DrawableId> {
        Some(backend.create_sprite(self.label.as_str()))
    }
}

/// A leaf whose sprite is built once `source` yields its label.
///
/// Stands in for a remote asset: the node can be attached right away, but it
/// only appears in its parent's container after `source` resolves.
pub struct RemoteSprite<F> {
    backend: HeadlessBackend,
    source: Option<F>,
}

impl<F> fmt::Debug for RemoteSprite<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSprite")
            .field("started", &self.source.is_none())
            .finish_non_exhaustive()
    }
}

impl<F> RemoteSprite<F>
where
    F: Future<Output = Result<String, LoadError>> + 'static,
{
    /// Creates a kind that builds its sprite in `backend` from `source`.
    #[must_use]
    pub fn new(backend: &HeadlessBackend, source: F) -> Self {
        Self {
            backend: backend.clone(),
            source: Some(source),
        }
    }
}

impl<F> NodeKind<HeadlessBackend> for RemoteSprite<F>
where
    F: Future<Output = Result<String, LoadError>> + 'static,
{
    fn create(&mut self) -> LoadFuture<DrawableId> {
        let Some(source) = self.source.take() else {
            return Box::pin(ready(Err(LoadError::failed("load step restarted"))));
        };
        let backend = self.backend.clone();
        Box::pin(async move {
            let label = source.await?;
            Ok(Some(backend.create_sprite(label)))
        })
    }
}
