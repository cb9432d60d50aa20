use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use eframe::egui::Color32;

use crate::app::clipboard::{ClipboardBackend, JobOutput, JobQueue, JobResult};
use crate::app::input_handler::Capture;
use crate::app::state::EditorConfig;
use crate::app::text_edit::TextEdit;
use crate::app::tools::{Tool, ToolOp};
use crate::canvas::compositor::{Compositor, FloatingOverlay, Scene};
use crate::canvas::history::History;
use crate::canvas::layer::{LayerId, LayerKind, TextContent, TextStyle};
use crate::canvas::store::LayerStore;
use crate::canvas::surface::Surface;
use crate::canvas::text::TextRenderer;
use crate::error::{EditorError, EditorResult};
use crate::selection::SelectionEngine;
use crate::utils::color::Color;
use crate::utils::exporter::{save_surface, ExportFormat};
use crate::utils::vector::Vec2;
use crate::viewport::ViewState;

/// Result of a control-panel intent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub succeeded: bool,
    pub message: Option<String>,
}

impl Outcome {
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            message: None,
        }
    }

    pub fn ok_with(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: Some(message.into()),
        }
    }

    /// Silent failures carry no message.
    pub fn failed(err: &EditorError) -> Self {
        Self {
            succeeded: false,
            message: (!err.is_silent()).then(|| err.to_string()),
        }
    }
}

impl<T> From<EditorResult<T>> for Outcome {
    fn from(result: EditorResult<T>) -> Self {
        match result {
            Ok(_) => Outcome::ok(),
            Err(err) => Outcome::failed(&err),
        }
    }
}

/// The single owned editor state. Every operation goes through it.
pub struct EditorSession {
    pub(crate) config: EditorConfig,
    pub(crate) store: LayerStore,
    pub(crate) history: History,
    pub(crate) view: ViewState,
    pub(crate) selection: SelectionEngine,
    pub(crate) compositor: Compositor,
    pub(crate) fonts: TextRenderer,
    pub(crate) tool: Tool,
    pub(crate) color: Color32,
    pub(crate) size: f32,
    pub(crate) shape_fill: bool,
    pub(crate) text_style: TextStyle,
    pub(crate) text_edit: Option<TextEdit>,
    pub(crate) capture: Capture,
    pub(crate) op: Option<ToolOp>,
    pub(crate) space_held: bool,
    jobs: JobQueue,
    notices: VecDeque<String>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, clipboard: Box<dyn ClipboardBackend>) -> Self {
        let store = LayerStore::new(config.world_width, config.world_height);
        let mut history = History::new(
            config.history.min_entries,
            config.history.max_entries,
            config.history.budget_bytes,
        );
        history.fit_to_world(store.world_pixels());
        let mut view = ViewState::new(
            config.view.min_scale,
            config.view.max_scale,
            config.view.overflow_margin,
        );
        let world = Vec2::new(store.width() as f32, store.height() as f32);
        view.resize(world, world);
        let selection = SelectionEngine::new(
            config.selection.min_size,
            config.selection.handle_radius,
            config.selection.handle_margin,
            config.selection.resize_floor,
        );
        let mut text_style = config.text_style.clone();
        text_style.color = config.color;
        log::info!(
            "Session started: world {}x{}, history {} entries",
            store.width(),
            store.height(),
            history.capacity()
        );
        Self {
            color: config.color,
            size: config.brush_size,
            config,
            store,
            history,
            view,
            selection,
            compositor: Compositor::new(),
            fonts: TextRenderer::new(),
            tool: Tool::Brush,
            shape_fill: false,
            text_style,
            text_edit: None,
            capture: Capture::None,
            op: None,
            space_held: false,
            jobs: JobQueue::new(clipboard),
            notices: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn selection(&self) -> &SelectionEngine {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn fonts(&self) -> &TextRenderer {
        &self.fonts
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn shape_fill(&self) -> bool {
        self.shape_fill
    }

    pub fn text_style(&self) -> &TextStyle {
        &self.text_style
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Last rendered viewport frame.
    pub fn frame(&self) -> &Surface {
        self.compositor.frame()
    }

    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.notices.iter().map(String::as_str)
    }

    pub fn take_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }

    pub(crate) fn notify(&mut self, message: impl Into<String>) {
        while self.notices.len() >= self.config.max_notices.max(1) {
            self.notices.pop_front();
        }
        self.notices.push_back(message.into());
    }

    /// Turn an internal result into an intent outcome, recording any notice.
    pub(crate) fn report<T>(&mut self, what: &str, result: EditorResult<T>) -> Outcome {
        let outcome = Outcome::from(result);
        if let Some(msg) = &outcome.message {
            log::warn!("{what} rejected: {msg}");
            self.notify(msg.clone());
        }
        outcome
    }

    pub(crate) fn request_redraw(&mut self) {
        self.compositor.request_redraw();
    }

    /// Record the state of `layer` (active when `None`) before mutating it.
    /// A failed snapshot is skipped and drawing proceeds. Returns whether an entry was pushed.
    pub(crate) fn push_history(&mut self, layer: Option<LayerId>) -> bool {
        match self.history.push(&self.store, layer) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("History snapshot skipped: {err}");
                false
            }
        }
    }

    /// Write the floating selection back into its layer.
    pub(crate) fn commit_selection(&mut self) {
        if self.selection.is_active() {
            self.selection.commit(&mut self.store);
            self.request_redraw();
        } else if self.selection.is_creating() {
            self.selection.discard();
        }
    }

    pub(crate) fn scene(&self) -> Scene<'_> {
        let floating = self.selection.active().map(|sel| FloatingOverlay {
            layer: sel.layer,
            buffer: &sel.buffer,
            rect: sel.rect,
        });
        Scene {
            store: &self.store,
            view: &self.view,
            fonts: &self.fonts,
            floating,
            marquee: self.selection.marquee(),
            pending_text: self.text_edit.as_ref().map(|e| (&e.content, e.anchor)),
            hidden: self.text_edit.as_ref().and_then(|e| e.target),
        }
    }

    /// Display refresh tick: runs at most one composite pass. Returns true if the frame changed.
    pub fn tick(&mut self) -> bool {
        if !self.compositor.needs_redraw() {
            return false;
        }
        let mut compositor = std::mem::take(&mut self.compositor);
        let ran = compositor.on_refresh(&self.scene());
        self.compositor = compositor;
        ran
    }

    /// Guaranteed fresh frame, bypassing the per-tick coalescing.
    pub fn render_now(&mut self) {
        let mut compositor = std::mem::take(&mut self.compositor);
        compositor.render_now(&self.scene());
        self.compositor = compositor;
    }

    // ----- control-panel intents -----

    pub fn set_tool(&mut self, tool: Tool) -> Outcome {
        if tool == self.tool {
            return Outcome::ok();
        }
        self.cancel_interaction();
        if self.tool == Tool::Text && self.text_edit.is_some() {
            self.close_text_editor(true);
        }
        if self.tool == Tool::Select {
            self.commit_selection();
        }
        log::debug!("Tool {} -> {}", self.tool.label(), tool.label());
        self.tool = tool;
        self.request_redraw();
        Outcome::ok()
    }

    /// Changing color while erasing switches back to the brush.
    pub fn set_color(&mut self, color: Color32) -> Outcome {
        self.color = color;
        self.text_style.color = color;
        if let Some(edit) = &mut self.text_edit {
            edit.content.style.color = color;
            self.compositor.request_redraw();
        }
        if self.tool == Tool::Eraser {
            self.tool = Tool::Brush;
        }
        Outcome::ok()
    }

    pub fn set_color_hex(&mut self, hex: &str) -> Outcome {
        match Color::from_hex(hex) {
            Some(c) => self.set_color(c.to_color32()),
            None => {
                let msg = format!("Invalid color {hex:?}");
                self.notify(msg.clone());
                Outcome {
                    succeeded: false,
                    message: Some(msg),
                }
            }
        }
    }

    pub fn set_size(&mut self, size: f32) -> Outcome {
        if !size.is_finite() {
            return Outcome::failed(&EditorError::InvalidGeometry);
        }
        self.size = size.clamp(1.0, 200.0);
        Outcome::ok()
    }

    pub fn set_shape_fill(&mut self, fill: bool) -> Outcome {
        self.shape_fill = fill;
        Outcome::ok()
    }

    /// Font attributes for new text; an open editor previews them live.
    pub fn set_text_style(&mut self, mut style: TextStyle) -> Outcome {
        style.size = style.size.clamp(4.0, 400.0);
        style.weight = style.weight.clamp(100, 900);
        self.color = style.color;
        if let Some(edit) = &mut self.text_edit {
            edit.content.style = style.clone();
            self.compositor.request_redraw();
        }
        self.text_style = style;
        Outcome::ok()
    }

    pub fn select_layer(&mut self, id: LayerId) -> Outcome {
        if !self.store.contains(id) {
            return self.report("select layer", Err::<(), _>(EditorError::UnknownLayer(id)));
        }
        if id != self.store.active_id() {
            self.close_text_editor(true);
            self.commit_selection();
        }
        let result = self.store.set_active(id);
        self.request_redraw();
        self.report("select layer", result)
    }

    pub fn reorder_layers(&mut self, id: LayerId, to_index: usize) -> Outcome {
        let result = self.store.reorder(id, to_index);
        self.request_redraw();
        self.report("reorder layers", result)
    }

    pub fn add_layer(&mut self) -> Outcome {
        self.close_text_editor(true);
        self.commit_selection();
        self.store.add_layer();
        self.request_redraw();
        Outcome::ok()
    }

    pub fn delete_layer(&mut self) -> Outcome {
        if self.store.len() > 1 {
            self.close_text_editor(true);
            self.commit_selection();
        }
        let result = self.store.delete_active();
        self.request_redraw();
        self.report("delete layer", result)
    }

    pub fn merge_layers(&mut self, ids: &[LayerId]) -> Outcome {
        self.close_text_editor(true);
        self.commit_selection();
        let result = self.store.merge(ids, &self.fonts);
        self.request_redraw();
        self.report("merge layers", result)
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> Outcome {
        let result = self.store.set_visible(id, visible);
        self.request_redraw();
        self.report("toggle visibility", result)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: &str) -> Outcome {
        let result = self.store.rename(id, name);
        self.report("rename layer", result)
    }

    /// Undo the latest change. An open text edit or floating selection is dropped first.
    pub fn undo(&mut self) -> Outcome {
        self.cancel_interaction();
        self.close_text_editor(false);
        self.selection.discard();
        let restored = self.history.undo(&mut self.store);
        self.request_redraw();
        match restored {
            Some(id) => {
                log::debug!("Undo restored layer {id}");
                Outcome::ok()
            }
            None => Outcome::ok_with("Nothing to undo"),
        }
    }

    /// Clear the active layer to transparent (text layers lose their text).
    pub fn clear_active(&mut self) -> Outcome {
        self.cancel_interaction();
        self.close_text_editor(true);
        self.commit_selection();
        self.push_history(None);
        let id = self.store.active_id();
        let Some(layer) = self.store.get_mut(id) else {
            return self.report("clear", Err::<(), _>(EditorError::UnknownLayer(id)));
        };
        match &mut layer.kind {
            LayerKind::Raster(surface) => surface.clear(),
            LayerKind::Text(content) => content.text.clear(),
        }
        self.request_redraw();
        Outcome::ok()
    }

    /// World-sized composite for export and copy. Forces a synchronous pass.
    pub fn flatten(&mut self) -> EditorResult<Surface> {
        self.close_text_editor(true);
        self.render_now();
        let floating = self.selection.active().map(|sel| FloatingOverlay {
            layer: sel.layer,
            buffer: &sel.buffer,
            rect: sel.rect,
        });
        self.compositor.flatten(&self.store, floating, &self.fonts)
    }

    pub fn export(&mut self, path: &Path) -> Outcome {
        let format = ExportFormat::from_path(path);
        let result = self.flatten().and_then(|img| save_surface(&img, path, format));
        match result {
            Ok(()) => {
                let msg = format!("Saved to {}", path.display());
                log::info!("{msg}");
                self.notify(msg.clone());
                Outcome::ok_with(msg)
            }
            Err(err) => self.report("export", Err::<(), _>(err)),
        }
    }

    /// Copy the floating selection (over white), or the whole composite, to the clipboard.
    pub fn copy(&mut self) -> Outcome {
        if let Some(sel) = self.selection.active() {
            let mut image = Surface::filled(sel.buffer.width(), sel.buffer.height(), Color32::WHITE);
            image.draw_surface(&sel.buffer, 0, 0);
            self.jobs.copy(image, true);
            return Outcome::ok();
        }
        match self.flatten() {
            Ok(image) => {
                self.jobs.copy(image, false);
                Outcome::ok()
            }
            Err(err) => self.report("copy", Err::<(), _>(err)),
        }
    }

    /// Read an image from the clipboard; it arrives through `poll_jobs`.
    pub fn paste(&mut self) -> Outcome {
        self.jobs.paste();
        Outcome::ok()
    }

    /// Decode a pasted or dropped blob; it arrives through `poll_jobs`.
    pub fn paste_bytes(&mut self, bytes: Vec<u8>) -> Outcome {
        self.jobs.decode(bytes);
        Outcome::ok()
    }

    /// Place an image on a new layer, centered in the viewport at native size, as a floating selection.
    pub fn place_image(&mut self, image: Surface) -> Outcome {
        self.cancel_interaction();
        self.close_text_editor(true);
        self.commit_selection();
        let id = self.store.add_layer();
        self.push_history(Some(id));
        let center = self.view.screen_to_world(self.view.viewport_size() * 0.5);
        let origin = center - Vec2::new(image.width() as f32, image.height() as f32) * 0.5;
        let result = self.selection.float_image(&self.store, id, image, origin);
        if result.is_ok() && self.tool != Tool::Select {
            self.tool = Tool::Select;
        }
        self.request_redraw();
        self.report("paste", result)
    }

    /// Apply finished clipboard and decode jobs. Targets are resolved now, not when the job started.
    pub fn poll_jobs(&mut self) -> Vec<Outcome> {
        let done = self.jobs.drain();
        self.apply_jobs(done)
    }

    /// Block until pending jobs finish (or `timeout`), then apply them.
    pub fn wait_for_jobs(&mut self, timeout: Duration) -> Vec<Outcome> {
        let done = self.jobs.wait(timeout);
        self.apply_jobs(done)
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.pending()
    }

    fn apply_jobs(&mut self, done: Vec<JobResult>) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(done.len());
        for JobResult { ticket, output } in done {
            log::debug!("Job {ticket} finished");
            let outcome = match output {
                Ok(JobOutput::Copied { selection }) => {
                    let msg = if selection {
                        "Selection copied to clipboard"
                    } else {
                        "Canvas copied to clipboard"
                    };
                    self.notify(msg);
                    Outcome::ok_with(msg)
                }
                Ok(JobOutput::Image(image)) => self.place_image(image),
                Ok(JobOutput::NoImage) => {
                    let msg = "The clipboard holds no image";
                    self.notify(msg);
                    Outcome {
                        succeeded: false,
                        message: Some(msg.to_string()),
                    }
                }
                Err(err) => self.report("clipboard", Err::<(), _>(err)),
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Viewport changed size. The world grows to cover it and the minimum zoom is recomputed.
    pub fn resize_viewport(&mut self, width: f32, height: f32) {
        let viewport = Vec2::new(width.max(0.0), height.max(0.0));
        let needed_w = viewport.x.ceil() as usize;
        let needed_h = viewport.y.ceil() as usize;
        if needed_w > self.store.width() || needed_h > self.store.height() {
            self.cancel_interaction();
            self.close_text_editor(true);
            self.commit_selection();
            if self.store.grow_world(needed_w, needed_h) {
                self.history.fit_to_world(self.store.world_pixels());
            }
        }
        let world = Vec2::new(self.store.width() as f32, self.store.height() as f32);
        self.view.resize(viewport, world);
        self.request_redraw();
    }

    // ----- text editing -----

    /// Open an empty editor at `world` (clamped inside the world).
    pub fn open_text_editor(&mut self, world: Vec2) {
        self.commit_selection();
        self.close_text_editor(true);
        let bounds = Vec2::new(self.store.width() as f32, self.store.height() as f32);
        let anchor = crate::app::text_edit::clamp_anchor(world, bounds, self.text_style.size);
        self.text_edit = Some(TextEdit::new(anchor, self.text_style.clone()));
        self.request_redraw();
    }

    /// Reopen the topmost visible text layer under `world`, restoring its style.
    pub fn reopen_text_at(&mut self, world: Vec2) -> bool {
        let hit = self.store.layers().iter().rev().find_map(|layer| {
            let content = layer.text()?;
            (layer.visible && self.fonts.bounds(content, layer.position).contains(world))
                .then(|| (layer.id, layer.position, content.clone()))
        });
        let Some((id, position, content)) = hit else {
            return false;
        };
        self.close_text_editor(true);
        self.commit_selection();
        if let Err(err) = self.store.set_active(id) {
            log::warn!("Text reopen failed: {err}");
            return false;
        }
        self.text_style = content.style.clone();
        self.color = content.style.color;
        self.text_edit = Some(TextEdit::reopen(id, position, content));
        self.request_redraw();
        true
    }

    pub fn text_input(&mut self, input: &str) {
        if let Some(edit) = &mut self.text_edit {
            edit.insert(input);
            self.compositor.request_redraw();
        }
    }

    /// Close the editor. Confirming writes a new or edited text layer; empty text writes nothing.
    pub fn close_text_editor(&mut self, commit: bool) {
        let Some(edit) = self.text_edit.take() else {
            return;
        };
        self.request_redraw();
        let Some(text) = edit.committed_text().filter(|_| commit).map(str::to_string) else {
            return;
        };
        let content = TextContent {
            text,
            style: edit.content.style.clone(),
        };
        match edit.target.filter(|id| self.store.contains(*id)) {
            Some(id) => {
                self.push_history(Some(id));
                if let Some(layer) = self.store.get_mut(id) {
                    if let Some(current) = layer.text_mut() {
                        *current = content;
                    }
                }
                log::debug!("Text layer {id} edited");
            }
            None => {
                let empty = TextContent {
                    text: String::new(),
                    style: content.style.clone(),
                };
                let id = self.store.add_text_layer(empty, edit.anchor);
                self.push_history(Some(id));
                if let Some(current) = self.store.get_mut(id).and_then(|l| l.text_mut()) {
                    *current = content;
                }
                log::debug!("Text layer {id} created");
            }
        }
    }
}
