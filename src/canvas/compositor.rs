use eframe::egui::Color32;
use rayon::prelude::*;

use crate::canvas::layer::{LayerId, TextContent};
use crate::canvas::store::LayerStore;
use crate::canvas::surface::Surface;
use crate::canvas::text::TextRenderer;
use crate::error::EditorResult;
use crate::selection::HandleDir;
use crate::utils::profiler::ScopeTimer;
use crate::utils::vector::{Rect, Vec2};
use crate::viewport::ViewState;

const HANDLE_SIZE: i32 = 8;
const DASH: i32 = 6;
const CENTER_ARM: i32 = 5;

/// Floating selection drawn directly above its owning layer.
#[derive(Clone, Copy)]
pub struct FloatingOverlay<'a> {
    pub layer: LayerId,
    pub buffer: &'a Surface,
    pub rect: Rect,
}

/// Everything one composite pass reads.
pub struct Scene<'a> {
    pub store: &'a LayerStore,
    pub view: &'a ViewState,
    pub fonts: &'a TextRenderer,
    pub floating: Option<FloatingOverlay<'a>>,
    pub marquee: Option<Rect>,
    /// Uncommitted text edit, drawn on top with a dashed box.
    pub pending_text: Option<(&'a TextContent, Vec2)>,
    /// Layer left out of the pass (a text layer being re-edited).
    pub hidden: Option<LayerId>,
}

/// Renders the layer stack through the viewport, at most once per refresh tick.
pub struct Compositor {
    pub background: Color32,
    pub backdrop: Color32,
    pub accent: Color32,
    redraw_requested: bool,
    passes: u64,
    frame: Surface,
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new()
    }
}

impl Compositor {
    pub fn new() -> Self {
        Self {
            background: Color32::WHITE,
            backdrop: Color32::from_rgb(0xe5, 0xe7, 0xeb),
            accent: Color32::from_rgb(0x25, 0x63, 0xeb),
            redraw_requested: true,
            passes: 0,
            frame: Surface::new(0, 0),
        }
    }

    /// Mark the frame stale. Any number of calls before the next tick cost one pass.
    pub fn request_redraw(&mut self) {
        self.redraw_requested = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.redraw_requested
    }

    /// Number of composite passes performed so far.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Last rendered viewport image.
    pub fn frame(&self) -> &Surface {
        &self.frame
    }

    /// Display refresh tick. Returns true when a pass ran.
    pub fn on_refresh(&mut self, scene: &Scene) -> bool {
        if !self.redraw_requested {
            return false;
        }
        self.render_now(scene);
        true
    }

    /// Synchronous pass regardless of the pending flag.
    pub fn render_now(&mut self, scene: &Scene) {
        let _timer = ScopeTimer::new("composite");
        self.redraw_requested = false;
        self.passes += 1;

        let world = self.compose_world(scene);
        let viewport = scene.view.viewport_size();
        let (vw, vh) = (viewport.x.max(0.0) as usize, viewport.y.max(0.0) as usize);
        if self.frame.width() != vw || self.frame.height() != vh {
            self.frame = Surface::new(vw, vh);
        }
        if vw == 0 || vh == 0 {
            return;
        }

        let view = scene.view;
        let backdrop = self.backdrop;
        let (ww, wh) = (world.width() as i32, world.height() as i32);
        let src = world.pixels();
        self.frame
            .pixels_mut()
            .par_chunks_mut(vw)
            .enumerate()
            .for_each(|(sy, row)| {
                for (sx, px) in row.iter_mut().enumerate() {
                    let p = view.screen_to_world(Vec2::new(sx as f32 + 0.5, sy as f32 + 0.5));
                    let (wx, wy) = (p.x.floor() as i32, p.y.floor() as i32);
                    *px = if wx >= 0 && wy >= 0 && wx < ww && wy < wh {
                        src[(wy * ww + wx) as usize]
                    } else {
                        backdrop
                    };
                }
            });

        self.draw_decorations(scene);
    }

    /// World-sized composite over the opaque background, floating selection included.
    pub fn flatten(
        &self,
        store: &LayerStore,
        floating: Option<FloatingOverlay<'_>>,
        fonts: &TextRenderer,
    ) -> EditorResult<Surface> {
        let mut out = Surface::try_new(store.width(), store.height())?;
        out.fill(self.background);
        draw_layers(&mut out, store, floating, fonts, None);
        Ok(out)
    }

    fn compose_world(&self, scene: &Scene) -> Surface {
        let store = scene.store;
        let mut out = Surface::filled(store.width(), store.height(), self.background);
        draw_layers(&mut out, store, scene.floating, scene.fonts, scene.hidden);
        if let Some((content, origin)) = scene.pending_text {
            scene.fonts.draw(content, &mut out, origin);
        }
        out
    }

    fn draw_decorations(&mut self, scene: &Scene) {
        let view = scene.view;
        let accent = self.accent;
        if let Some(marquee) = scene.marquee {
            dashed_rect(&mut self.frame, &screen_rect(view, &marquee), accent);
        }
        if let Some(floating) = scene.floating {
            let rect = screen_rect(view, &floating.rect);
            dashed_rect(&mut self.frame, &rect, accent);
            for dir in HandleDir::ALL {
                let p = dir.position(&rect);
                let (x, y) = (p.x.round() as i32 - HANDLE_SIZE / 2, p.y.round() as i32 - HANDLE_SIZE / 2);
                let size = HANDLE_SIZE as usize;
                self.frame.fill_rect(x, y, size, size, accent);
                self.frame.fill_rect(x + 1, y + 1, size - 2, size - 2, Color32::WHITE);
            }
            let c = rect.center();
            let (cx, cy) = (c.x.round() as i32, c.y.round() as i32);
            let arm = (CENTER_ARM * 2 + 1) as usize;
            self.frame.fill_rect(cx - CENTER_ARM, cy, arm, 1, accent);
            self.frame.fill_rect(cx, cy - CENTER_ARM, 1, arm, accent);
        }
        if let Some((content, origin)) = scene.pending_text {
            let bounds = scene.fonts.bounds(content, origin);
            let bounds = Rect::new(bounds.x, bounds.y, bounds.w.max(content.style.size * 0.5), bounds.h);
            dashed_rect(&mut self.frame, &screen_rect(view, &bounds), accent);
        }
    }
}

/// Visible layers bottom to top, each at its position; the floating buffer goes right above its owner.
fn draw_layers(
    out: &mut Surface,
    store: &LayerStore,
    floating: Option<FloatingOverlay<'_>>,
    fonts: &TextRenderer,
    hidden: Option<LayerId>,
) {
    for layer in store.layers() {
        if !layer.visible || Some(layer.id) == hidden {
            continue;
        }
        layer.draw_onto(out, layer.position, fonts);
        if let Some(f) = floating.filter(|f| f.layer == layer.id) {
            let (x, y, w, h) = f.rect.to_pixels();
            out.draw_surface_scaled(f.buffer, x, y, w, h);
        }
    }
}

fn screen_rect(view: &ViewState, world: &Rect) -> Rect {
    let a = view.world_to_screen(Vec2::new(world.x, world.y));
    let b = view.world_to_screen(Vec2::new(world.right(), world.bottom()));
    Rect::from_corners(a, b)
}

fn dashed_rect(target: &mut Surface, rect: &Rect, color: Color32) {
    let x0 = rect.x.round() as i32;
    let y0 = rect.y.round() as i32;
    let x1 = rect.right().round() as i32;
    let y1 = rect.bottom().round() as i32;
    for x in x0..=x1 {
        if (x - x0) / DASH % 2 == 0 {
            target.set(x, y0, color);
            target.set(x, y1, color);
        }
    }
    for y in y0..=y1 {
        if (y - y0) / DASH % 2 == 0 {
            target.set(x0, y, color);
            target.set(x1, y, color);
        }
    }
}
