use crate::app::session::EditorSession;
use crate::brush_engine::shapes::{constrain_point, draw_shape};
use crate::brush_engine::{Brush, ShapeKind, StrokeState};
use crate::canvas::layer::LayerId;
use crate::canvas::surface::{CompositeMode, Surface};
use crate::error::EditorError;
use crate::selection::PressResult;
use crate::utils::vector::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Brush,
    Eraser,
    Shape(ShapeKind),
    Select,
    Text,
}

impl Tool {
    pub fn label(&self) -> &'static str {
        match self {
            Tool::Brush => "Brush",
            Tool::Eraser => "Eraser",
            Tool::Shape(kind) => kind.label(),
            Tool::Select => "Select",
            Tool::Text => "Text",
        }
    }
}

/// Pointer-bound work in progress for the active tool.
pub(crate) enum ToolOp {
    Stroke {
        layer: LayerId,
        stroke: StrokeState,
    },
    Shape {
        layer: LayerId,
        kind: ShapeKind,
        start: Vec2,
        current: Vec2,
        constrain: bool,
        snapshot: Surface,
        pushed: bool,
    },
    Select {
        pushed: bool,
    },
}

impl EditorSession {
    fn brush(&self) -> Brush {
        let mode = match self.tool {
            Tool::Eraser => CompositeMode::Erase,
            _ => CompositeMode::Paint,
        };
        Brush::new(self.color, self.size, mode)
    }

    /// The active layer if it is raster; otherwise a new raster layer on top.
    fn raster_target(&mut self) -> LayerId {
        let id = self.store.active_id();
        match self.store.get(id) {
            Some(layer) if layer.is_raster() => id,
            _ => {
                let created = self.store.add_layer();
                log::debug!("Drawing on a text layer: created raster layer {created}");
                created
            }
        }
    }

    /// Primary press at `world` for the active tool.
    pub(crate) fn tool_down(&mut self, world: Vec2, shift: bool) {
        match self.tool {
            Tool::Brush | Tool::Eraser => {
                self.commit_selection();
                let layer = self.raster_target();
                self.push_history(Some(layer));
                let brush = self.brush();
                let Some(target) = self.store.get_mut(layer) else {
                    return;
                };
                let local = target.to_local(world);
                if let Some(surface) = target.surface_mut() {
                    let stroke = StrokeState::begin(brush, surface, local);
                    self.op = Some(ToolOp::Stroke { layer, stroke });
                }
            }
            Tool::Shape(kind) => {
                self.commit_selection();
                let layer = self.raster_target();
                let snapshot = match self
                    .store
                    .get(layer)
                    .and_then(|l| l.surface())
                    .map(Surface::try_clone)
                {
                    Some(Ok(snapshot)) => snapshot,
                    Some(Err(err)) => {
                        log::warn!("Shape preview unavailable: {err}");
                        return;
                    }
                    None => return,
                };
                let pushed = self.push_history(Some(layer));
                self.op = Some(ToolOp::Shape {
                    layer,
                    kind,
                    start: world,
                    current: world,
                    constrain: shift,
                    snapshot,
                    pushed,
                });
            }
            Tool::Select => {
                if self.selection.press(world, self.view.scale) == PressResult::Grabbed {
                    self.op = Some(ToolOp::Select { pushed: false });
                    return;
                }
                self.commit_selection();
                let layer = self.store.active_id();
                if !self.store.get(layer).is_some_and(|l| l.is_raster()) {
                    log::debug!("Select ignored: layer {layer} is not raster");
                    return;
                }
                let pushed = self.push_history(Some(layer));
                self.selection.begin_create(layer, world);
                self.op = Some(ToolOp::Select { pushed });
            }
            Tool::Text => self.open_text_editor(world),
        }
        self.request_redraw();
    }

    pub(crate) fn tool_move(&mut self, world: Vec2, shift: bool) {
        let Some(op) = &mut self.op else {
            return;
        };
        match op {
            ToolOp::Stroke { layer, stroke } => {
                let Some(target) = self.store.get_mut(*layer) else {
                    return;
                };
                let local = target.to_local(world);
                if let Some(surface) = target.surface_mut() {
                    stroke.add_point(surface, local);
                }
            }
            ToolOp::Shape {
                current, constrain, ..
            } => {
                *current = world;
                *constrain = shift;
                self.redraw_shape();
            }
            ToolOp::Select { .. } => {
                self.selection.pointer_move(world);
            }
        }
        self.request_redraw();
    }

    /// Restore the pre-shape pixels and draw the shape at its current extent.
    fn redraw_shape(&mut self) -> Option<Result<(), EditorError>> {
        let brush = self.brush();
        let fill = self.shape_fill;
        let Some(ToolOp::Shape {
            layer,
            kind,
            start,
            current,
            constrain,
            snapshot,
            ..
        }) = &self.op
        else {
            return None;
        };
        let target = self.store.get_mut(*layer)?;
        let origin = target.position;
        let surface = target.surface_mut()?;
        surface.restore_from(snapshot);
        let end = if *constrain {
            constrain_point(*kind, *start, *current)
        } else {
            *current
        };
        Some(draw_shape(surface, *kind, *start - origin, end - origin, &brush, fill))
    }

    pub(crate) fn tool_up(&mut self, world: Vec2, shift: bool) {
        if let Some(ToolOp::Shape {
            current, constrain, ..
        }) = &mut self.op
        {
            *current = world;
            *constrain = shift;
        }
        match self.op.take() {
            Some(ToolOp::Stroke { .. }) | None => {}
            Some(op @ ToolOp::Shape { .. }) => {
                self.op = Some(op);
                let result = self.redraw_shape();
                if let Some(ToolOp::Shape { pushed, .. }) = self.op.take() {
                    if matches!(result, Some(Err(EditorError::InvalidGeometry))) && pushed {
                        self.history.discard_latest();
                    }
                }
            }
            Some(ToolOp::Select { pushed }) => {
                let result = self.selection.release(&mut self.store);
                if let Err(err) = result {
                    if pushed {
                        self.history.discard_latest();
                    }
                    if !err.is_silent() {
                        log::warn!("Selection failed: {err}");
                    }
                }
            }
        }
        self.request_redraw();
    }

    /// Abort pointer work (lost capture, blur). Committed pixels are kept.
    pub(crate) fn cancel_tool_op(&mut self) {
        match self.op.take() {
            Some(ToolOp::Shape {
                layer,
                snapshot,
                pushed,
                ..
            }) => {
                if let Ok(surface) = self.store.raster_surface_mut(layer) {
                    surface.restore_from(&snapshot);
                }
                if pushed {
                    self.history.discard_latest();
                }
            }
            Some(ToolOp::Select { pushed }) => {
                if self.selection.is_creating() && pushed {
                    self.history.discard_latest();
                }
                self.selection.cancel_interaction();
            }
            Some(ToolOp::Stroke { .. }) | None => {}
        }
        self.request_redraw();
    }
}
