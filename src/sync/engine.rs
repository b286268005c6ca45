use crate::clipboard::{ClipboardBackend, find_image_mime};
use crate::error::{CommandError, SyncError};
use crate::focus::{FocusReading, FocusSource, WindowClassifier};
use crate::models::{Representation, TrackedImage, fingerprint};
use crate::storage::ImageStore;

/// Something the engine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// An image offering whose bytes differ from the tracked image
    NewImage {
        data: Vec<u8>,
        mime_type: String,
        fingerprint: u64,
    },
    /// No image offered while an image is tracked; carries the plain text
    TextSeen(String),
    /// The focused window descriptor changed
    FocusChanged(String),
}

/// Keeps the clipboard holding the right form of the last captured image
/// for whichever window has focus.
///
/// Owns the only tracked image and remembers which representation was last
/// written, so a write happens only when the desired form actually changes.
pub struct SyncEngine {
    clipboard: Box<dyn ClipboardBackend>,
    focus: Box<dyn FocusSource>,
    classifier: WindowClassifier,
    store: ImageStore,
    tracked: Option<TrackedImage>,
    representation: Representation,
    last_window: String,
}

impl SyncEngine {
    pub fn new(
        clipboard: Box<dyn ClipboardBackend>,
        focus: Box<dyn FocusSource>,
        classifier: WindowClassifier,
        store: ImageStore,
    ) -> Self {
        SyncEngine {
            clipboard,
            focus,
            classifier,
            store,
            tracked: None,
            representation: Representation::Unset,
            last_window: String::new(),
        }
    }

    pub fn tracked(&self) -> Option<&TrackedImage> {
        self.tracked.as_ref()
    }

    pub fn representation(&self) -> Representation {
        self.representation
    }

    pub fn last_window(&self) -> &str {
        &self.last_window
    }

    /// One poll cycle: clipboard content first, then focus, so a fresh
    /// capture is never overridden by a focus read taken before it
    pub fn poll(&mut self) {
        if let Some(event) = self.observe_clipboard() {
            self.handle(event);
        }
        if let Some(event) = self.observe_focus() {
            self.handle(event);
        }
    }

    /// Dispatch an event, logging instead of propagating any failure
    pub fn handle(&mut self, event: SyncEvent) {
        if let Err(e) = self.dispatch(event) {
            log::warn!("{}", e);
        }
    }

    /// Look at the clipboard offerings and build the matching content event.
    /// Empty or unreadable clipboards yield nothing.
    pub fn observe_clipboard(&self) -> Option<SyncEvent> {
        let mime_types = match self.clipboard.list_mime_types() {
            Ok(types) => types,
            Err(source) => {
                // wl-paste exits non-zero when nothing is copied
                log::trace!("{}", SyncError::ClipboardRead { source });
                return None;
            }
        };

        if let Some(mime_type) = find_image_mime(&mime_types) {
            let data = match self.clipboard.read(mime_type) {
                Ok(data) => data,
                Err(source) => {
                    log::debug!("{}", SyncError::ClipboardRead { source });
                    return None;
                }
            };
            if data.is_empty() {
                return None;
            }

            let fingerprint = fingerprint(&data);
            if self
                .tracked
                .as_ref()
                .is_some_and(|image| image.fingerprint == fingerprint)
            {
                return None;
            }

            return Some(SyncEvent::NewImage {
                data,
                mime_type: mime_type.to_string(),
                fingerprint,
            });
        }

        if self.tracked.is_none() || mime_types.is_empty() {
            return None;
        }

        match self.clipboard.read_text() {
            Ok(text) => Some(SyncEvent::TextSeen(text)),
            // wl-paste exits non-zero when no text is offered (files, rich content),
            // which counts as empty text
            Err(source @ CommandError::Failed { .. }) => {
                log::debug!("{}", SyncError::ClipboardRead { source });
                Some(SyncEvent::TextSeen(String::new()))
            }
            Err(source) => {
                log::debug!("{}", SyncError::ClipboardRead { source });
                None
            }
        }
    }

    /// Query focus and build a change event when the descriptor moved
    pub fn observe_focus(&self) -> Option<SyncEvent> {
        match self.focus.focused_window() {
            FocusReading::Focused(window) if window != self.last_window => {
                Some(SyncEvent::FocusChanged(window))
            }
            _ => None,
        }
    }

    pub fn dispatch(&mut self, event: SyncEvent) -> Result<(), SyncError> {
        match event {
            SyncEvent::NewImage {
                data,
                mime_type,
                fingerprint,
            } => self.on_new_image(&data, mime_type, fingerprint),
            SyncEvent::TextSeen(text) => {
                self.on_text(&text);
                Ok(())
            }
            SyncEvent::FocusChanged(window) => self.on_focus_changed(window),
        }
    }

    fn on_new_image(
        &mut self,
        data: &[u8],
        mime_type: String,
        fingerprint: u64,
    ) -> Result<(), SyncError> {
        if self
            .tracked
            .as_ref()
            .is_some_and(|image| image.fingerprint == fingerprint)
        {
            return Ok(());
        }

        let path = self.store.save(data, &mime_type)?;
        log::info!("Saved: {}", path.display());

        self.tracked = Some(TrackedImage::new(path, mime_type, fingerprint));
        self.representation = Representation::Unset;

        // Without focus detection the image stays an image
        let initial = match self.focus.focused_window() {
            FocusReading::Focused(window) => {
                Representation::for_window(self.classifier.classify(&window))
            }
            FocusReading::Unavailable => Representation::Image,
        };
        self.apply(initial)
    }

    fn on_text(&mut self, text: &str) {
        let Some(image) = &self.tracked else {
            return;
        };
        // Our own path write read back
        if image.is_own_path(text) {
            return;
        }

        log::info!("Different text copied - clearing image tracking");
        self.tracked = None;
        self.representation = Representation::Unset;
    }

    fn on_focus_changed(&mut self, window: String) -> Result<(), SyncError> {
        if self.tracked.is_some() {
            let desired = Representation::for_window(self.classifier.classify(&window));
            if desired != self.representation {
                // On failure the window isn't recorded, so the next poll retries
                self.apply(desired)?;
            }
        }

        self.last_window = window;
        Ok(())
    }

    /// Write the tracked image to the clipboard in the given form
    fn apply(&mut self, desired: Representation) -> Result<(), SyncError> {
        let Some(image) = &self.tracked else {
            return Ok(());
        };

        match desired {
            Representation::Path => {
                let path = image.saved_path.to_string_lossy();
                self.clipboard
                    .write_text(&path)
                    .map_err(|source| SyncError::ClipboardWrite {
                        representation: desired,
                        source,
                    })?;
                log::info!("→ Path mode: {}", path);
            }
            Representation::Image => {
                let data = self.store.load(&image.saved_path)?;
                self.clipboard
                    .write_binary(&image.mime_type, &data)
                    .map_err(|source| SyncError::ClipboardWrite {
                        representation: desired,
                        source,
                    })?;
                log::info!("→ Image mode");
            }
            Representation::Unset => return Ok(()),
        }

        self.representation = desired;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::{ClipboardWrite, MemoryBackend};
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfirst";
    const OTHER_PNG: &[u8] = b"\x89PNG\r\n\x1a\nsecond";

    /// Focus source whose answer the test controls
    #[derive(Clone)]
    struct ScriptedFocus(Arc<Mutex<FocusReading>>);

    impl ScriptedFocus {
        fn new(reading: FocusReading) -> Self {
            ScriptedFocus(Arc::new(Mutex::new(reading)))
        }

        fn focus(&self, window: &str) {
            *self.0.lock().unwrap() = FocusReading::Focused(window.to_string());
        }

        fn lose(&self) {
            *self.0.lock().unwrap() = FocusReading::Unavailable;
        }
    }

    impl FocusSource for ScriptedFocus {
        fn focused_window(&self) -> FocusReading {
            self.0.lock().unwrap().clone()
        }
    }

    struct Harness {
        engine: SyncEngine,
        clipboard: MemoryBackend,
        focus: ScriptedFocus,
        dir: TempDir,
    }

    fn harness(reading: FocusReading) -> Harness {
        let dir = tempdir().unwrap();
        let clipboard = MemoryBackend::new();
        let focus = ScriptedFocus::new(reading);
        let engine = SyncEngine::new(
            Box::new(clipboard.clone()),
            Box::new(focus.clone()),
            WindowClassifier::default(),
            ImageStore::new(dir.path().to_path_buf()),
        );
        Harness {
            engine,
            clipboard,
            focus,
            dir,
        }
    }

    fn saved_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    fn tracked_path(engine: &SyncEngine) -> String {
        engine
            .tracked()
            .unwrap()
            .saved_path
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_new_image_without_focus_detection_is_image() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);

        h.engine.poll();

        let tracked = h.engine.tracked().unwrap();
        assert_eq!(tracked.mime_type, "image/png");
        assert_eq!(tracked.fingerprint, fingerprint(PNG));
        assert_eq!(std::fs::read(&tracked.saved_path).unwrap(), PNG);
        assert_eq!(h.engine.representation(), Representation::Image);
        assert_eq!(
            h.clipboard.writes(),
            vec![ClipboardWrite::Binary {
                mime_type: "image/png".to_string(),
                data: PNG.to_vec(),
            }]
        );
    }

    #[test]
    fn test_new_image_in_terminal_is_path() {
        let mut h = harness(FocusReading::Focused("kitty nvim".to_string()));
        h.clipboard.copy_image("image/png", PNG);

        h.engine.poll();

        let path = tracked_path(&h.engine);
        assert_eq!(h.engine.representation(), Representation::Path);
        assert_eq!(h.clipboard.writes(), vec![ClipboardWrite::Text(path)]);
        // The focus poll in the same cycle agrees, so nothing else is written
        assert_eq!(h.engine.last_window(), "kitty nvim");
    }

    #[test]
    fn test_same_image_twice_is_ignored() {
        let mut h = harness(FocusReading::Focused("firefox".to_string()));
        h.clipboard.copy_image("image/png", PNG);

        h.engine.poll();
        h.engine.poll();
        // Source app offers the same bytes again
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();

        assert_eq!(h.clipboard.writes().len(), 1);
        assert_eq!(saved_files(h.dir.path()).len(), 1);

        let event = SyncEvent::NewImage {
            data: PNG.to_vec(),
            mime_type: "image/png".to_string(),
            fingerprint: fingerprint(PNG),
        };
        h.engine.dispatch(event).unwrap();
        assert_eq!(h.clipboard.writes().len(), 1);
    }

    #[test]
    fn test_different_image_replaces_tracking() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();

        h.clipboard.copy_image("image/jpeg", OTHER_PNG);
        h.engine.poll();

        let tracked = h.engine.tracked().unwrap();
        assert_eq!(tracked.fingerprint, fingerprint(OTHER_PNG));
        assert_eq!(tracked.mime_type, "image/jpeg");
        assert_eq!(h.clipboard.writes().len(), 2);
    }

    #[test]
    fn test_focus_to_other_window_writes_image_once() {
        let mut h = harness(FocusReading::Focused("ghostty shell".to_string()));
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Path);

        h.engine
            .dispatch(SyncEvent::FocusChanged("firefox github".to_string()))
            .unwrap();
        assert_eq!(h.engine.representation(), Representation::Image);
        assert_eq!(h.clipboard.writes().len(), 2);
        assert!(matches!(
            h.clipboard.writes()[1],
            ClipboardWrite::Binary { .. }
        ));

        h.engine
            .dispatch(SyncEvent::FocusChanged("org.gimp.gimp".to_string()))
            .unwrap();
        assert_eq!(h.engine.representation(), Representation::Image);
        assert_eq!(h.clipboard.writes().len(), 2);
    }

    #[test]
    fn test_focus_polling_follows_window() {
        let mut h = harness(FocusReading::Focused("firefox".to_string()));
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Image);

        h.focus.focus("alacritty zsh");
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Path);

        // Clipboard now holds our path; reading it back must not clear tracking
        h.engine.poll();
        assert!(h.engine.tracked().is_some());

        h.focus.focus("firefox");
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Image);
        assert_eq!(h.clipboard.writes().len(), 3);
    }

    #[test]
    fn test_own_path_text_keeps_tracking() {
        let mut h = harness(FocusReading::Focused("foot".to_string()));
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();
        let path = tracked_path(&h.engine);

        h.engine.dispatch(SyncEvent::TextSeen(path)).unwrap();

        assert!(h.engine.tracked().is_some());
        assert_eq!(h.engine.representation(), Representation::Path);
    }

    #[test]
    fn test_unrelated_text_clears_tracking() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();

        h.clipboard.copy_text("hello");
        h.engine.poll();

        assert!(h.engine.tracked().is_none());
        assert_eq!(h.engine.representation(), Representation::Unset);
        // The user's text is left alone
        assert_eq!(h.clipboard.writes().len(), 1);
        assert_eq!(h.clipboard.read_text().unwrap(), "hello");
    }

    #[test]
    fn test_focus_change_without_image_is_noop() {
        let mut h = harness(FocusReading::Focused("kitty".to_string()));

        h.engine.poll();

        assert!(h.engine.tracked().is_none());
        assert!(h.clipboard.writes().is_empty());
        assert_eq!(h.engine.last_window(), "kitty");
    }

    #[test]
    fn test_text_without_image_produces_no_event() {
        let h = harness(FocusReading::Unavailable);
        h.clipboard.copy_text("hello");
        assert_eq!(h.engine.observe_clipboard(), None);
    }

    #[test]
    fn test_empty_clipboard_keeps_tracking() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();

        h.clipboard.clear();
        assert_eq!(h.engine.observe_clipboard(), None);
        h.engine.poll();
        assert!(h.engine.tracked().is_some());
    }

    #[test]
    fn test_non_text_offering_clears_tracking() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();

        h.clipboard.copy_offer("text/uri-list", b"file:///tmp/notes.txt");
        assert_eq!(
            h.engine.observe_clipboard(),
            Some(SyncEvent::TextSeen(String::new()))
        );
        h.engine.poll();
        assert!(h.engine.tracked().is_none());
    }

    #[test]
    fn test_timed_out_text_read_keeps_tracking() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();

        h.clipboard.copy_text("hello");
        h.clipboard.set_fail_reads(true);
        assert_eq!(h.engine.observe_clipboard(), None);
        h.engine.poll();
        assert!(h.engine.tracked().is_some());

        h.clipboard.set_fail_reads(false);
        h.engine.poll();
        assert!(h.engine.tracked().is_none());
    }

    #[test]
    fn test_unavailable_focus_produces_no_event() {
        let mut h = harness(FocusReading::Focused("kitty".to_string()));
        h.engine.poll();

        h.focus.lose();
        assert_eq!(h.engine.observe_focus(), None);
        assert_eq!(h.engine.last_window(), "kitty");
    }

    #[test]
    fn test_save_failure_leaves_state_untouched() {
        let mut h = harness(FocusReading::Unavailable);
        h.clipboard.copy_image("image/png", PNG);
        std::fs::remove_dir(h.dir.path()).unwrap();

        let event = h.engine.observe_clipboard().unwrap();
        let err = h.engine.dispatch(event).unwrap_err();
        assert!(matches!(err, SyncError::CaptureIo { .. }));

        h.engine.poll();
        assert!(h.engine.tracked().is_none());
        assert_eq!(h.engine.representation(), Representation::Unset);
        assert!(h.clipboard.writes().is_empty());
    }

    #[test]
    fn test_failed_write_is_retried_on_next_focus_poll() {
        let mut h = harness(FocusReading::Focused("firefox".to_string()));
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Image);

        h.clipboard.set_fail_writes(true);
        h.focus.focus("kitty");
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Image);
        assert_eq!(h.engine.last_window(), "firefox");

        h.clipboard.set_fail_writes(false);
        h.engine.poll();
        assert_eq!(h.engine.representation(), Representation::Path);
        assert_eq!(h.engine.last_window(), "kitty");
    }

    #[test]
    fn test_missing_saved_file_fails_image_write() {
        let mut h = harness(FocusReading::Focused("kitty".to_string()));
        h.clipboard.copy_image("image/png", PNG);
        h.engine.poll();
        std::fs::remove_file(h.engine.tracked().unwrap().saved_path.clone()).unwrap();

        let err = h
            .engine
            .dispatch(SyncEvent::FocusChanged("firefox".to_string()))
            .unwrap_err();
        assert!(matches!(err, SyncError::ImageRead { .. }));
        assert_eq!(h.engine.representation(), Representation::Path);
    }
}
