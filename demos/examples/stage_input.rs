// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene input end to end: a stage driven through the event router.
//!
//! This example shows how to combine:
//! - `overstory_stage` for the retained scene tree, damage, and painting,
//! - `overstory_router` (with the `stage_adapter` feature) for crossing,
//!   grabs, focus, and capture/bubble delivery,
//! - a toy compositor that narrates the paint schedule the stage produces.
//!
//! Run:
//! - `cargo run -p overstory_examples --example stage_input`

use std::collections::HashMap;

use kurbo::{Affine, Point, Rect, Size, Vec2};
use overstory_router::router::EventRouter;
use overstory_router::types::{
    CrossingEvent, CrossingKind, EventSink, FocusEvent, FocusKind, Handled, InputEvent, KeyCode,
    NodeEvent, Phase, PointerButton,
};
use overstory_stage::{
    Compositor, DamageRegion, EventMask, NodeId, PaintInfo, PaintTarget, Stage, SurfaceId, Visual,
};

/// Human-readable names for log output.
struct Labels(HashMap<NodeId, &'static str>);

impl Labels {
    fn of(&self, node: NodeId) -> &'static str {
        self.0.get(&node).copied().unwrap_or("?")
    }
}

/// Prints every delivery, and claims presses on the button so a grab forms.
struct Console<'a> {
    labels: &'a Labels,
    button: NodeId,
}

impl EventSink<NodeId> for Console<'_> {
    fn event(&mut self, node: &NodeId, event: &NodeEvent<'_>) -> Handled {
        let local = event
            .local
            .map(|p| format!("({:.0}, {:.0})", p.x, p.y))
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:?} {} <- {} local={}",
            event.phase,
            self.labels.of(*node),
            kind_of(event.input),
            local,
        );
        if *node == self.button
            && event.phase == Phase::Bubble
            && matches!(event.input, InputEvent::PointerDown { .. })
        {
            println!("  -> button claims the press");
            return Handled::Yes;
        }
        Handled::No
    }

    fn crossing(&mut self, node: &NodeId, event: &CrossingEvent<NodeId>) {
        let kind = match event.kind {
            CrossingKind::Enter => "enter",
            CrossingKind::Leave => "leave",
        };
        println!(
            "  {} {} obscured={} related={}",
            kind,
            self.labels.of(*node),
            event.obscured,
            event.related.map_or("-", |n| self.labels.of(n)),
        );
    }

    fn focus(&mut self, node: &NodeId, event: &FocusEvent<NodeId>) {
        let kind = match event.kind {
            FocusKind::In => "focus in",
            FocusKind::Out => "focus out",
        };
        println!(
            "  {} {} obscured={}",
            kind,
            self.labels.of(*node),
            event.obscured,
        );
    }
}

fn kind_of(input: &InputEvent) -> &'static str {
    match input {
        InputEvent::PointerEnter { .. } => "enter",
        InputEvent::PointerMove { .. } => "move",
        InputEvent::PointerDown { .. } => "down",
        InputEvent::PointerUp { .. } => "up",
        InputEvent::PointerLeave => "leave",
        InputEvent::Scroll { .. } => "scroll",
        InputEvent::KeyDown { .. } => "key down",
        InputEvent::KeyUp { .. } => "key up",
        InputEvent::TouchDown { .. } => "touch down",
        InputEvent::TouchMove { .. } => "touch move",
        InputEvent::TouchUp { .. } => "touch up",
    }
}

/// A compositor that narrates the schedule instead of rendering.
struct PrintCompositor;

impl Compositor for PrintCompositor {
    type Canvas = ();
    type Error = std::convert::Infallible;

    fn create_surface(&mut self, surface: SurfaceId, size: Size) -> Result<(), Self::Error> {
        println!("  create {surface:?} {}x{}", size.width, size.height);
        Ok(())
    }

    fn resize_surface(&mut self, surface: SurfaceId, size: Size) -> Result<(), Self::Error> {
        println!("  resize {surface:?} {}x{}", size.width, size.height);
        Ok(())
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        println!("  release {surface:?}");
    }

    fn begin(&mut self, target: PaintTarget, damage: &DamageRegion) -> Result<(), Self::Error> {
        println!("  begin {target:?}, {} dirty rect(s)", damage.len());
        Ok(())
    }

    fn end(&mut self, _target: PaintTarget, _canvas: ()) {}

    fn composite(
        &mut self,
        surface: SurfaceId,
        _onto: &mut (),
        transform: Affine,
    ) -> Result<(), Self::Error> {
        println!("  composite {surface:?} at {:?}", transform.translation());
        Ok(())
    }
}

fn main() {
    // A stage with a clipped panel (which gets its own compositing surface),
    // two widgets inside it, and a sidebar stacked above everything.
    let mut stage = Stage::new(Size::new(400.0, 300.0));

    let panel = stage.create(Visual {
        rect: Rect::new(20.0, 20.0, 300.0, 260.0),
        clipped: true,
        interest: EventMask::POINTER,
        ..Visual::default()
    });
    let button = stage.create(Visual {
        rect: Rect::new(20.0, 30.0, 140.0, 80.0),
        interest: EventMask::POINTER,
        ..Visual::default()
    });
    let field = stage.create(Visual {
        rect: Rect::new(160.0, 30.0, 280.0, 80.0),
        interest: EventMask::POINTER | EventMask::KEYBOARD,
        ..Visual::default()
    });
    let sidebar = stage.create(Visual {
        rect: Rect::new(310.0, 20.0, 390.0, 280.0),
        depth: 1,
        interest: EventMask::POINTER | EventMask::SCROLL,
        ..Visual::default()
    });

    stage.attach(stage.root(), panel).unwrap();
    stage.attach(panel, button).unwrap();
    stage.attach(panel, field).unwrap();
    stage.attach(stage.root(), sidebar).unwrap();

    let labels = Labels(HashMap::from([
        (stage.root(), "root"),
        (panel, "panel"),
        (button, "button"),
        (field, "field"),
        (sidebar, "sidebar"),
    ]));

    println!("== Initial paint ==");
    let _ = stage.paint(&mut PrintCompositor, |node, _canvas, info: &PaintInfo| {
        println!("  paint {} dirty={:?}", labels.of(node), info.dirty);
    });

    let mut router = EventRouter::new();
    let mut console = Console {
        labels: &labels,
        button,
    };

    println!("\n== Pointer enters the button ==");
    router.route(
        &InputEvent::PointerEnter {
            position: Point::new(60.0, 70.0),
        },
        &stage,
        &mut console,
    );
    router.route(
        &InputEvent::PointerMove {
            position: Point::new(70.0, 75.0),
        },
        &stage,
        &mut console,
    );

    println!("\n== Press, drag over the sidebar, release ==");
    router.route(
        &InputEvent::PointerDown {
            position: Point::new(70.0, 75.0),
            button: PointerButton::Primary,
        },
        &stage,
        &mut console,
    );
    if let Some(stack) = router.grab_stack() {
        let names: Vec<&str> = stack.iter().map(|n| labels.of(*n)).collect();
        println!("  grab pinned to {names:?}");
    }
    router.route(
        &InputEvent::PointerMove {
            position: Point::new(350.0, 150.0),
        },
        &stage,
        &mut console,
    );
    router.route(
        &InputEvent::PointerUp {
            position: Point::new(350.0, 150.0),
            button: PointerButton::Primary,
        },
        &stage,
        &mut console,
    );

    println!("\n== Focus the field, then type ==");
    router.grab_focus(Some(field), &stage, &mut console);
    router.route(&InputEvent::KeyDown { key: KeyCode(65) }, &stage, &mut console);

    println!("\n== Scroll over the sidebar ==");
    router.route(
        &InputEvent::Scroll {
            position: Point::new(350.0, 150.0),
            delta: Vec2::new(0.0, -24.0),
        },
        &stage,
        &mut console,
    );

    // Move the button; only the panel's surface and the area it maps to on
    // the root need repainting.
    println!("\n== Move the button and repaint ==");
    stage.set_rect(button, Rect::new(20.0, 100.0, 140.0, 150.0));
    let _ = stage.paint(&mut PrintCompositor, |node, _canvas, info: &PaintInfo| {
        println!("  paint {} dirty={:?}", labels.of(node), info.dirty);
    });

    // Hiding the sidebar damages the root area it covered.
    println!("\n== Hide the sidebar and repaint ==");
    stage.set_visible(sidebar, false);
    let _ = stage.paint(&mut PrintCompositor, |node, _canvas, info: &PaintInfo| {
        println!("  paint {} dirty={:?}", labels.of(node), info.dirty);
    });
}
