// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The event router: one entry point for host input, fanning out to
//! crossing, focus, grab, and capture/bubble delivery.
//!
//! ## Overview
//!
//! The router owns no scene of its own. It keys everything by an opaque node
//! type `K` and asks a [`PickSource`] what lies under a point, delivering the
//! results through an [`EventSink`]. Between events it carries only small
//! stacks: where the pointer is, where focus is, what an active button grab
//! or touch sequence pinned.
//!
//! Delivery of one event runs in a fixed order:
//!
//! 1. Crossing: pointer motion, enter, and leave refresh the pointer's
//!    root→leaf stack, and the affected nodes are notified directly.
//! 2. Targeting: the event's stack is chosen. Grabs and touch sequences pin
//!    it; keys follow focus; everything else is picked fresh.
//! 3. Capture: root→leaf along the stack, stopping at the first claim.
//! 4. Bubble: back out from wherever capture stopped, claims ORed.
//! 5. Bookkeeping: claimed presses arm grabs and claimed touch-downs pin
//!    their sequences; releases and touch-ups let them go.
//!
//! Nodes that disappear from the scene mid-flight are tolerated everywhere:
//! delivery proceeds with no local position, and the next pick or
//! [`EventRouter::notify_detached`] call catches the stacks up.
//!
//! ## See Also
//!
//! - [`crate::stack`] for the transition diff used by crossing and focus.
//! - `adapters::stage` (behind the `stage_adapter` feature) for wiring a
//!   scene stage in as the [`PickSource`].

use core::fmt;

use hashbrown::HashMap;
use kurbo::Point;

use crate::stack::{self, Transition};
use crate::types::{
    CrossingEvent, CrossingKind, EventSink, FocusEvent, FocusKind, Handled, InputClass,
    InputEvent, NodeEvent, NodeStack, Phase, PickSource, PointerButton, TouchId,
};

/// An active pointer grab: the stack that took the press, pinned until the
/// same button is released.
struct Grab<K> {
    stack: NodeStack<K>,
    button: PointerButton,
}

/// Routes host input events to scene nodes.
///
/// ## Usage
///
/// - Feed every host event through [`EventRouter::route`], in arrival order.
/// - Move keyboard focus with [`EventRouter::grab_focus`].
/// - Tell the router when the host detaches a node it may be holding, via
///   [`EventRouter::notify_detached`].
///
/// The router is deterministic: the same event sequence over the same scene
/// produces the same deliveries.
pub struct EventRouter<K> {
    /// Root→leaf stack under the pointer, kept current across motion.
    crossing: NodeStack<K>,
    /// Root→leaf stack of the keyboard focus.
    focus: NodeStack<K>,
    /// Active button grab, if any.
    grab: Option<Grab<K>>,
    /// Per-sequence stacks pinned when a touch-down is claimed.
    touches: HashMap<TouchId, NodeStack<K>>,
}

impl<K: Copy + Eq> EventRouter<K> {
    /// A router with no pointer, focus, grab, or touch state.
    pub fn new() -> Self {
        Self {
            crossing: NodeStack::new(),
            focus: NodeStack::new(),
            grab: None,
            touches: HashMap::new(),
        }
    }

    /// The stack currently under the pointer, outermost first.
    pub fn crossing_stack(&self) -> &[K] {
        &self.crossing
    }

    /// The keyboard focus stack, outermost first.
    pub fn focus_stack(&self) -> &[K] {
        &self.focus
    }

    /// The stack pinned by an active button grab, if one is in progress.
    pub fn grab_stack(&self) -> Option<&[K]> {
        self.grab.as_ref().map(|grab| grab.stack.as_slice())
    }

    /// The stack pinned by a touch sequence, if it is still down.
    pub fn touch_stack(&self, touch: TouchId) -> Option<&[K]> {
        self.touches.get(&touch).map(|stack| stack.as_slice())
    }

    /// Drop an active pointer grab without waiting for the release.
    ///
    /// Routing resumes from fresh picks on the next event; the crossing
    /// stack catches up on the next motion.
    pub fn clear_grab(&mut self) {
        self.grab = None;
    }

    /// Route one input event, returning whether any node claimed it.
    ///
    /// Enter and leave events only refresh the crossing stack; they are not
    /// themselves dispatched and always return [`Handled::No`].
    pub fn route<P, S>(&mut self, input: &InputEvent, picker: &P, sink: &mut S) -> Handled
    where
        P: PickSource<K>,
        S: EventSink<K>,
    {
        match input {
            InputEvent::PointerEnter { position } => {
                if self.grab.is_none() {
                    let stack = pick_stack(picker, InputClass::Pointer, *position);
                    self.update_crossing(stack, Some(*position), picker, sink);
                }
                return Handled::No;
            }
            InputEvent::PointerLeave => {
                if self.grab.is_none() {
                    self.update_crossing(NodeStack::new(), None, picker, sink);
                }
                return Handled::No;
            }
            _ => {}
        }

        // Keep the crossing stack current before dispatch. Grabs pin
        // routing, so crossings freeze while one is active.
        let mut picked: Option<NodeStack<K>> = None;
        if self.grab.is_none()
            && let InputEvent::PointerMove { position } | InputEvent::PointerUp { position, .. } =
                input
        {
            let stack = pick_stack(picker, InputClass::Pointer, *position);
            self.update_crossing(stack.clone(), Some(*position), picker, sink);
            picked = Some(stack);
        }

        let stack: NodeStack<K> = match input {
            InputEvent::PointerMove { position }
            | InputEvent::PointerDown { position, .. }
            | InputEvent::PointerUp { position, .. }
            | InputEvent::Scroll { position, .. } => match (&self.grab, picked) {
                (Some(grab), _) => grab.stack.clone(),
                (None, Some(stack)) => stack,
                (None, None) => pick_stack(picker, input.class(), *position),
            },
            InputEvent::KeyDown { .. } | InputEvent::KeyUp { .. } => self.focus.clone(),
            InputEvent::TouchDown { position, .. } => {
                pick_stack(picker, InputClass::Touch, *position)
            }
            InputEvent::TouchMove { touch, .. } | InputEvent::TouchUp { touch, .. } => {
                self.touches.get(touch).cloned().unwrap_or_default()
            }
            InputEvent::PointerEnter { .. } | InputEvent::PointerLeave => NodeStack::new(),
        };

        let handled = self.dispatch(&stack, input, picker, sink);

        match input {
            InputEvent::PointerDown { button, .. } => {
                // The first handled press wins; a second button during a
                // grab routes to the grab without retargeting it.
                if handled.is_yes() && self.grab.is_none() {
                    self.grab = Some(Grab { stack, button: *button });
                }
            }
            InputEvent::PointerUp { position, button } => {
                let released = matches!(&self.grab, Some(grab) if grab.button == *button);
                if released {
                    self.grab = None;
                    // The grab was freezing the crossing stack; catch it up
                    // to wherever the pointer is now.
                    let fresh = pick_stack(picker, InputClass::Pointer, *position);
                    self.update_crossing(fresh, Some(*position), picker, sink);
                }
            }
            InputEvent::TouchDown { touch, .. } => {
                // A sequence pins routing only once a node claims its down;
                // an unclaimed down leaves later moves with no target.
                if handled.is_yes() {
                    self.touches.insert(*touch, stack);
                }
            }
            InputEvent::TouchUp { touch, .. } => {
                self.touches.remove(touch);
            }
            _ => {}
        }

        handled
    }

    /// Move keyboard focus to `node`, or clear it with `None`.
    ///
    /// Focus-out and focus-in notifications go to exactly the nodes whose
    /// membership or leaf-ness changed; ancestors shared by the old and new
    /// focus hear nothing. Granting focus to a node the picker no longer
    /// knows clears focus.
    pub fn grab_focus<P, S>(&mut self, node: Option<K>, picker: &P, sink: &mut S)
    where
        P: PickSource<K>,
        S: EventSink<K>,
    {
        let new = match node {
            Some(node) => picker.ancestors(&node),
            None => NodeStack::new(),
        };
        let old = core::mem::take(&mut self.focus);
        let old_leaf = old.last().copied();
        let new_leaf = new.last().copied();
        stack::diff(&old, &new, |transition, i, obscured| match transition {
            Transition::Leave => sink.focus(
                &old[i],
                &FocusEvent {
                    kind: FocusKind::Out,
                    obscured,
                    related: new_leaf,
                },
            ),
            Transition::Enter => sink.focus(
                &new[i],
                &FocusEvent {
                    kind: FocusKind::In,
                    obscured,
                    related: old_leaf,
                },
            ),
        });
        self.focus = new;
    }

    /// Forget a node the host detached from the scene.
    ///
    /// The crossing and focus stacks truncate at the node, without emitting
    /// leave or focus-out events; the next pick re-enters whatever replaced
    /// it. Grab and touch stacks keep their entries, since a grab outlives
    /// scene changes until its release, and delivery tolerates the stale
    /// nodes.
    pub fn notify_detached(&mut self, node: K) {
        if let Some(i) = self.crossing.iter().position(|n| *n == node) {
            self.crossing.truncate(i);
        }
        if let Some(i) = self.focus.iter().position(|n| *n == node) {
            self.focus.truncate(i);
        }
    }

    /// Capture root→leaf, then bubble back out from where capture stopped.
    fn dispatch<P, S>(&self, stack: &[K], input: &InputEvent, picker: &P, sink: &mut S) -> Handled
    where
        P: PickSource<K>,
        S: EventSink<K>,
    {
        let position = input.position();
        let mut claimed = None;
        for (i, node) in stack.iter().enumerate() {
            let event = NodeEvent {
                phase: Phase::Capture,
                input,
                local: position.and_then(|p| picker.localize(node, p)),
            };
            if sink.event(node, &event).is_yes() {
                claimed = Some(i);
                break;
            }
        }
        // The claiming node sees both legs; bubbling never cuts out early.
        let Some(top) = claimed.or_else(|| stack.len().checked_sub(1)) else {
            return Handled::No;
        };
        let mut handled = if claimed.is_some() {
            Handled::Yes
        } else {
            Handled::No
        };
        for node in stack[..=top].iter().rev() {
            let event = NodeEvent {
                phase: Phase::Bubble,
                input,
                local: position.and_then(|p| picker.localize(node, p)),
            };
            handled = handled.or(sink.event(node, &event));
        }
        handled
    }

    /// Swap in a new crossing stack, notifying the nodes that changed.
    ///
    /// Each notification carries the pointer position in the recipient's own
    /// coordinates.
    fn update_crossing<P, S>(
        &mut self,
        new: NodeStack<K>,
        position: Option<Point>,
        picker: &P,
        sink: &mut S,
    ) where
        P: PickSource<K>,
        S: EventSink<K>,
    {
        let old = core::mem::take(&mut self.crossing);
        let old_leaf = old.last().copied();
        let new_leaf = new.last().copied();
        stack::diff(&old, &new, |transition, i, obscured| match transition {
            Transition::Leave => sink.crossing(
                &old[i],
                &CrossingEvent {
                    kind: CrossingKind::Leave,
                    obscured,
                    related: new_leaf,
                    position: position.and_then(|p| picker.localize(&old[i], p)),
                },
            ),
            Transition::Enter => sink.crossing(
                &new[i],
                &CrossingEvent {
                    kind: CrossingKind::Enter,
                    obscured,
                    related: old_leaf,
                    position: position.and_then(|p| picker.localize(&new[i], p)),
                },
            ),
        });
        self.crossing = new;
    }
}

impl<K: Copy + Eq> Default for EventRouter<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> fmt::Debug for EventRouter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRouter")
            .field("crossing", &self.crossing.len())
            .field("focus", &self.focus.len())
            .field("grabbed", &self.grab.is_some())
            .field("touches", &self.touches.len())
            .finish_non_exhaustive()
    }
}

/// Pick the interest-filtered stack under a point, empty on a miss.
fn pick_stack<K, P: PickSource<K>>(picker: &P, class: InputClass, point: Point) -> NodeStack<K> {
    picker
        .pick(class, point)
        .map(|(stack, _)| stack)
        .unwrap_or_default()
}
