// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory drawable storage.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use arbor_core::backend::Backend;
use kurbo::Affine;

/// Handle to a drawable owned by a [`HeadlessBackend`].
///
/// Handles are never reused, so a released handle stays released.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableId(pub u32);

impl fmt::Debug for DrawableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Drawable({})", self.0)
    }
}

/// What a drawable renders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A container that can hold other drawables.
    Container,
    /// A leaf sprite, identified by a label.
    Sprite(String),
}

#[derive(Debug)]
struct Element {
    kind: ElementKind,
    transform: Affine,
    parent: Option<DrawableId>,
    children: Vec<DrawableId>,
}

impl Element {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            transform: Affine::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Scene {
    /// Indexed by `DrawableId`; `None` once released.
    elements: Vec<Option<Element>>,
    /// Release calls per drawable, including rejected ones.
    releases: Vec<u32>,
    double_releases: Vec<DrawableId>,
}

impl Scene {
    fn insert(&mut self, kind: ElementKind) -> DrawableId {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "drawable count bounded by u32 for headless runs"
        )]
        let id = DrawableId(self.elements.len() as u32);
        self.elements.push(Some(Element::new(kind)));
        self.releases.push(0);
        id
    }

    fn get_element(&self, id: DrawableId) -> Option<&Element> {
        self.elements.get(id.0 as usize)?.as_ref()
    }

    fn get_element_mut(&mut self, id: DrawableId) -> Option<&mut Element> {
        self.elements.get_mut(id.0 as usize)?.as_mut()
    }

    fn take_element(&mut self, id: DrawableId) -> Option<Element> {
        self.elements.get_mut(id.0 as usize)?.take()
    }

    /// Removes `child` from the child list of its current container.
    fn detach(&mut self, child: DrawableId) {
        let Some(parent) = self.get_element_mut(child).and_then(|e| e.parent.take()) else {
            return;
        };
        if let Some(p) = self.get_element_mut(parent) {
            p.children.retain(|&c| c != child);
        }
    }

    fn is_ancestor_or_self(&self, ancestor: DrawableId, node: DrawableId) -> bool {
        let mut cur = Some(node);
        while let Some(id) = cur {
            if id == ancestor {
                return true;
            }
            cur = self.get_element(id).and_then(|e| e.parent);
        }
        false
    }
}

/// A [`Backend`] that keeps its drawables in memory.
///
/// Clones share the same scene, so node kinds can hold a clone to build
/// drawables from inside their load step while the tree owns another.
///
/// Besides hosting drawables, the backend records every release, which makes
/// it suitable for checking that each drawable is released exactly once.
/// Misuse (mounting a released drawable, releasing twice) is logged and
/// recorded rather than panicking.
#[derive(Clone, Debug, Default)]
pub struct HeadlessBackend {
    scene: Rc<RefCell<Scene>>,
}

impl HeadlessBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sprite drawable.
    pub fn create_sprite(&self, label: impl Into<String>) -> DrawableId {
        let id = self.scene.borrow_mut().insert(ElementKind::Sprite(label.into()));
        log::trace!("created sprite {id:?}");
        id
    }

    /// Returns whether `id` was created and not yet released.
    #[must_use]
    pub fn is_live(&self, id: DrawableId) -> bool {
        self.scene.borrow().get_element(id).is_some()
    }

    /// Returns what a live drawable renders.
    #[must_use]
    pub fn kind(&self, id: DrawableId) -> Option<ElementKind> {
        self.scene.borrow().get_element(id).map(|e| e.kind.clone())
    }

    /// Returns the drawables mounted in `container`, in mount order.
    #[must_use]
    pub fn children(&self, container: DrawableId) -> Vec<DrawableId> {
        self.scene
            .borrow()
            .get_element(container)
            .map(|e| e.children.clone())
            .unwrap_or_default()
    }

    /// Returns the container `id` is mounted in.
    #[must_use]
    pub fn parent(&self, id: DrawableId) -> Option<DrawableId> {
        self.scene.borrow().get_element(id)?.parent
    }

    /// Returns whether `child` is mounted directly in `container`.
    #[must_use]
    pub fn contains(&self, container: DrawableId, child: DrawableId) -> bool {
        self.parent(child) == Some(container)
    }

    /// Returns the local transform of a live drawable.
    #[must_use]
    pub fn transform(&self, id: DrawableId) -> Option<Affine> {
        self.scene.borrow().get_element(id).map(|e| e.transform)
    }

    /// Returns the transform of a live drawable composed with those of every
    /// container above it.
    #[must_use]
    pub fn world_transform(&self, id: DrawableId) -> Option<Affine> {
        let scene = self.scene.borrow();
        let element = scene.get_element(id)?;
        let mut world = element.transform;
        let mut cur = element.parent;
        while let Some(parent) = cur.and_then(|p| scene.get_element(p)) {
            world = parent.transform * world;
            cur = parent.parent;
        }
        Some(world)
    }

    /// Returns the live drawables not mounted anywhere, in creation order.
    #[must_use]
    pub fn roots(&self) -> Vec<DrawableId> {
        let scene = self.scene.borrow();
        (0..scene.elements.len())
            .filter_map(|idx| {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "indices were issued as u32"
                )]
                let id = DrawableId(idx as u32);
                scene
                    .get_element(id)
                    .is_some_and(|e| e.parent.is_none())
                    .then_some(id)
            })
            .collect()
    }

    /// Returns the number of live drawables.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.scene.borrow().elements.iter().flatten().count()
    }

    /// Returns how many times `release` was called for `id`.
    #[must_use]
    pub fn release_count(&self, id: DrawableId) -> u32 {
        self.scene
            .borrow()
            .releases
            .get(id.0 as usize)
            .copied()
            .unwrap_or(0)
    }

    /// Returns the drawables that were released more than once (or never
    /// existed), once per offending call.
    #[must_use]
    pub fn double_releases(&self) -> Vec<DrawableId> {
        self.scene.borrow().double_releases.clone()
    }
}

impl Backend for HeadlessBackend {
    type Drawable = DrawableId;

    fn create_container(&mut self) -> DrawableId {
        let id = self.scene.borrow_mut().insert(ElementKind::Container);
        log::trace!("created container {id:?}");
        id
    }

    fn set_transform(&mut self, drawable: &DrawableId, transform: Affine) {
        match self.scene.borrow_mut().get_element_mut(*drawable) {
            Some(element) => element.transform = transform,
            None => log::warn!("set_transform on released {drawable:?}"),
        }
    }

    fn add_child(&mut self, container: &DrawableId, child: &DrawableId) {
        let (container, child) = (*container, *child);
        let mut scene = self.scene.borrow_mut();
        let is_container = scene
            .get_element(container)
            .is_some_and(|e| e.kind == ElementKind::Container);
        if !is_container || scene.get_element(child).is_none() {
            log::warn!("cannot mount {child:?} into {container:?}");
            return;
        }
        if scene.is_ancestor_or_self(child, container) {
            log::warn!("mounting {child:?} into {container:?} would form a cycle");
            return;
        }
        // Mounting moves a drawable out of its previous container.
        scene.detach(child);
        if let Some(c) = scene.get_element_mut(child) {
            c.parent = Some(container);
        }
        if let Some(p) = scene.get_element_mut(container) {
            p.children.push(child);
        }
    }

    fn release(&mut self, drawable: &DrawableId) {
        let id = *drawable;
        let mut scene = self.scene.borrow_mut();
        if let Some(count) = scene.releases.get_mut(id.0 as usize) {
            *count += 1;
        }
        scene.detach(id);
        let Some(element) = scene.take_element(id) else {
            log::error!("{id:?} released twice");
            scene.double_releases.push(id);
            return;
        };
        for child in element.children {
            if let Some(c) = scene.get_element_mut(child) {
                c.parent = None;
            }
        }
        log::trace!("released {id:?}");
    }
}
