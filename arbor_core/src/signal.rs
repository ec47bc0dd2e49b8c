// Copyright 2026 the Arbor Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-fire notification channel.
//!
//! A [`OneShot`] carries one value from a producer to any number of
//! consumers. It fires at most once: the first [`fire`](OneShot::fire) stores
//! the payload, runs every subscriber callback, wakes every pending
//! [`Listener`], and then the callback list is cleared. Later calls to `fire`
//! are rejected and their payload is dropped.
//!
//! Consumers either register a callback with
//! [`subscribe_once`](OneShot::subscribe_once) or await a
//! [`Listener`]. Both see the payload even when they arrive after the signal
//! fired.
//!
//! The channel is `Rc`-based and meant for single-threaded cooperative
//! scheduling.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::future::Future;
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

struct Inner<T> {
    value: Option<T>,
    callbacks: Vec<Box<dyn FnOnce(&T)>>,
    wakers: Vec<Waker>,
}

/// A value that is published exactly once.
///
/// Cloning a `OneShot` yields another handle to the same channel.
pub struct OneShot<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for OneShot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("OneShot")
            .field("fired", &inner.value.is_some())
            .field("subscribers", &inner.callbacks.len())
            .finish_non_exhaustive()
    }
}

impl<T: Clone + 'static> Default for OneShot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + 'static> OneShot<T> {
    /// Creates a channel that has not fired yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value: None,
                callbacks: Vec::new(),
                wakers: Vec::new(),
            })),
        }
    }

    /// Publishes `value`.
    ///
    /// Returns `false` if the channel had already fired, in which case `value`
    /// is dropped and nobody is notified.
    pub fn fire(&self, value: T) -> bool {
        let (callbacks, wakers) = {
            let mut inner = self.inner.borrow_mut();
            if inner.value.is_some() {
                return false;
            }
            inner.value = Some(value.clone());
            (
                mem::take(&mut inner.callbacks),
                mem::take(&mut inner.wakers),
            )
        };
        // The borrow is released so callbacks may subscribe or peek.
        for callback in callbacks {
            callback(&value);
        }
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Returns whether the channel has fired.
    #[must_use]
    pub fn is_fired(&self) -> bool {
        self.inner.borrow().value.is_some()
    }

    /// Returns a clone of the payload, if the channel has fired.
    #[must_use]
    pub fn peek(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// Runs `callback` once with the payload.
    ///
    /// If the channel already fired, `callback` runs immediately.
    pub fn subscribe_once(&self, callback: impl FnOnce(&T) + 'static) {
        let fired = self.peek();
        match fired {
            Some(value) => callback(&value),
            None => self.inner.borrow_mut().callbacks.push(Box::new(callback)),
        }
    }

    /// Returns a future that resolves to the payload.
    #[must_use]
    pub fn listen(&self) -> Listener<T> {
        Listener {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// A future resolving to a [`OneShot`]'s payload.
///
/// Created by [`OneShot::listen`].
#[must_use = "futures do nothing unless polled"]
pub struct Listener<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("fired", &self.inner.borrow().value.is_some())
            .finish()
    }
}

impl<T: Clone> Listener<T> {
    /// Returns the payload without waiting, if the channel has fired.
    #[must_use]
    pub fn try_get(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }
}

impl<T: Clone> Future for Listener<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut inner = self.inner.borrow_mut();
        if let Some(value) = &inner.value {
            return Poll::Ready(value.clone());
        }
        if !inner.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            inner.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
