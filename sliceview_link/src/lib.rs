// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sliceview Link: cross-view change propagation primitives.
//!
//! Linked slice views keep their centers and zoom levels in sync: a change
//! to one view fans out to its siblings, which copy the value and re-derive
//! their own transforms. Done naively, two mutually linked views feed each
//! other's changes back forever. This crate provides the pieces that make
//! the fan-out safe and testable:
//!
//! - [`ViewChange`]: the message vocabulary, split into *guarded* kinds
//!   (center, zoom, in-plane — the ones linked siblings react to by
//!   mutating themselves) and unguarded kinds that always fan out.
//! - [`LinkBroadcastHub`]: admits or drops broadcasts. A guarded broadcast
//!   occupies a single slot and hands back a [`BroadcastToken`]; any
//!   guarded broadcast arriving while the slot is occupied is dropped,
//!   which cuts A→B→A feedback at one hop.
//! - [`LinkageTable`]: which views are linked at all.
//! - [`SubscriberSet`]: a small publish/subscribe registry keyed by subject
//!   id, with removable subscription handles.
//!
//! The hub deliberately owns no listener callbacks: the caller asks for an
//! admission decision, performs its own delivery loop, and finishes the
//! token. That keeps "who is currently broadcasting" an explicit value
//! threaded through the call rather than ambient state.
//!
//! ## Minimal example
//!
//! ```rust
//! use sliceview_link::{Admission, LinkBroadcastHub, ViewChange};
//!
//! let mut hub = LinkBroadcastHub::new();
//!
//! let Admission::Deliver(Some(token)) = hub.admit(&ViewChange::Center(1_u32)) else {
//!     panic!("first guarded broadcast must be admitted");
//! };
//!
//! // A nested guarded broadcast raised by a listener is dropped.
//! assert!(matches!(
//!     hub.admit(&ViewChange::Center(2_u32)),
//!     Admission::Dropped
//! ));
//!
//! hub.finish(token);
//! assert!(hub.current_origin().is_none());
//! ```

mod hub;
mod linkage;
mod subscribers;

pub use hub::{Admission, BroadcastToken, LinkBroadcastHub, ViewChange};
pub use linkage::LinkageTable;
pub use subscribers::{SubscriberSet, SubscriptionId};
