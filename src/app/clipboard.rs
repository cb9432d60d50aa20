use std::borrow::Cow;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use image::RgbaImage;

use crate::canvas::surface::Surface;
use crate::error::{EditorError, EditorResult};
use crate::utils::exporter::decode_image;

/// Host clipboard access. Calls may block; they only ever run on job threads.
pub trait ClipboardBackend: Send {
    fn write_image(&mut self, image: &RgbaImage) -> EditorResult<()>;
    /// `Ok(None)` when the clipboard holds no image.
    fn read_image(&mut self) -> EditorResult<Option<RgbaImage>>;
}

/// System clipboard through `arboard`. A fresh handle is opened per call.
#[derive(Default)]
pub struct ArboardClipboard;

fn map_arboard(err: arboard::Error) -> EditorError {
    match err {
        arboard::Error::ClipboardNotSupported => EditorError::UnsupportedCapability("Clipboard access"),
        other => EditorError::PermissionDenied(other.to_string()),
    }
}

impl ClipboardBackend for ArboardClipboard {
    fn write_image(&mut self, image: &RgbaImage) -> EditorResult<()> {
        let mut clip = arboard::Clipboard::new().map_err(map_arboard)?;
        let data = arboard::ImageData {
            width: image.width() as usize,
            height: image.height() as usize,
            bytes: Cow::Borrowed(image.as_raw()),
        };
        clip.set_image(data).map_err(map_arboard)
    }

    fn read_image(&mut self) -> EditorResult<Option<RgbaImage>> {
        let mut clip = arboard::Clipboard::new().map_err(map_arboard)?;
        match clip.get_image() {
            Ok(data) => Ok(RgbaImage::from_raw(
                data.width as u32,
                data.height as u32,
                data.bytes.into_owned(),
            )),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => Err(map_arboard(err)),
        }
    }
}

/// In-process clipboard. Clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryClipboard {
    slot: Arc<Mutex<Option<RgbaImage>>>,
    failure: Arc<Mutex<Option<EditorError>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<RgbaImage> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_contents(&self, image: Option<RgbaImage>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = image;
    }

    /// Make every following call fail with `err` (or succeed again with `None`).
    pub fn fail_with(&self, err: Option<EditorError>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = err;
    }

    fn check(&self) -> EditorResult<()> {
        match self.failure.lock().unwrap_or_else(PoisonError::into_inner).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn write_image(&mut self, image: &RgbaImage) -> EditorResult<()> {
        self.check()?;
        self.set_contents(Some(image.clone()));
        Ok(())
    }

    fn read_image(&mut self) -> EditorResult<Option<RgbaImage>> {
        self.check()?;
        Ok(self.contents())
    }
}

/// What a finished job produced.
#[derive(Debug)]
pub enum JobOutput {
    Copied { selection: bool },
    Image(Surface),
    NoImage,
}

#[derive(Debug)]
pub struct JobResult {
    pub ticket: u64,
    pub output: EditorResult<JobOutput>,
}

/// Runs clipboard and decode work off the event thread and hands results back in order.
pub struct JobQueue {
    backend: Arc<Mutex<Box<dyn ClipboardBackend>>>,
    tx: mpsc::Sender<JobResult>,
    rx: mpsc::Receiver<JobResult>,
    next_ticket: u64,
    pending: usize,
}

impl JobQueue {
    pub fn new(backend: Box<dyn ClipboardBackend>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            backend: Arc::new(Mutex::new(backend)),
            tx,
            rx,
            next_ticket: 1,
            pending: 0,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    fn spawn<F>(&mut self, name: &str, work: F) -> u64
    where
        F: FnOnce(&mut dyn ClipboardBackend) -> EditorResult<JobOutput> + Send + 'static,
    {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending += 1;
        let tx = self.tx.clone();
        let backend = Arc::clone(&self.backend);
        log::debug!("Job {ticket} ({name}) started");
        thread::spawn(move || {
            let output = {
                let mut guard = backend.lock().unwrap_or_else(PoisonError::into_inner);
                work(guard.as_mut())
            };
            let _ = tx.send(JobResult { ticket, output });
        });
        ticket
    }

    /// Put `surface` on the clipboard.
    pub fn copy(&mut self, surface: Surface, selection: bool) -> u64 {
        self.spawn("copy", move |backend| {
            backend.write_image(&surface.to_rgba_image())?;
            Ok(JobOutput::Copied { selection })
        })
    }

    /// Read an image from the clipboard.
    pub fn paste(&mut self) -> u64 {
        self.spawn("paste", |backend| {
            Ok(match backend.read_image()? {
                Some(img) => JobOutput::Image(Surface::from_rgba_image(&img)),
                None => JobOutput::NoImage,
            })
        })
    }

    /// Decode a pasted or dropped image blob.
    pub fn decode(&mut self, bytes: Vec<u8>) -> u64 {
        self.spawn("decode", move |_| decode_image(&bytes).map(JobOutput::Image))
    }

    /// Completed jobs, without blocking.
    pub fn drain(&mut self) -> Vec<JobResult> {
        let done: Vec<JobResult> = self.rx.try_iter().collect();
        self.pending = self.pending.saturating_sub(done.len());
        done
    }

    /// Block until every pending job finished or `timeout` elapsed.
    pub fn wait(&mut self, timeout: Duration) -> Vec<JobResult> {
        let deadline = Instant::now() + timeout;
        let mut done = Vec::new();
        while self.pending > 0 {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(result) => {
                    self.pending -= 1;
                    done.push(result);
                }
                Err(_) => break,
            }
        }
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;

    #[test]
    fn copy_then_paste_through_memory_clipboard() {
        let clip = MemoryClipboard::new();
        let mut jobs = JobQueue::new(Box::new(clip.clone()));
        jobs.copy(Surface::filled(2, 2, Color32::RED), false);
        let done = jobs.wait(Duration::from_secs(5));
        assert!(matches!(done[0].output, Ok(JobOutput::Copied { selection: false })));
        assert_eq!(clip.contents().map(|i| i.dimensions()), Some((2, 2)));

        jobs.paste();
        let done = jobs.wait(Duration::from_secs(5));
        match &done[0].output {
            Ok(JobOutput::Image(s)) => assert_eq!(s.get(1, 1), Some(Color32::RED)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn failures_are_reported() {
        let clip = MemoryClipboard::new();
        clip.fail_with(Some(EditorError::PermissionDenied("denied".into())));
        let mut jobs = JobQueue::new(Box::new(clip));
        let ticket = jobs.paste();
        let done = jobs.wait(Duration::from_secs(5));
        assert_eq!(done[0].ticket, ticket);
        assert!(matches!(done[0].output, Err(EditorError::PermissionDenied(_))));
        assert_eq!(jobs.pending(), 0);
    }
}
