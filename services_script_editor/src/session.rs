//! Script editing session
//!
//! One open script: the editor core plus its title, file path, timestamps
//! and autosave state. Hosts own as many sessions as they like; nothing here
//! is global.

use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use script_core::{
    export_lines, plan_print, CoreOutcome, ElementType, ExportLine, Key, PrintPage,
    ScriptBuffer, ScriptEditorCore,
};
use thiserror::Error;

use crate::autosave::AutosaveDebouncer;
use crate::config::EditorConfig;
use crate::container::{ContainerError, ScriptContainer, APPLICATION, FILE_EXTENSION};
use crate::store::{ScriptStore, StoreError};

/// Session error
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Container error: {0}")]
    Container(#[from] ContainerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Script has no file path yet")]
    NoFilePath,
}

/// Session result
pub type SessionResult<T> = Result<T, SessionError>;

/// Notifications for the host window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TitleChanged(String),
    DirtyChanged(bool),
}

pub struct ScriptSession {
    config: EditorConfig,
    editor: ScriptEditorCore,
    title: String,
    created: DateTime<Utc>,
    file_path: Option<PathBuf>,
    autosave: AutosaveDebouncer,
    events: Vec<SessionEvent>,
    announced_title: String,
    announced_dirty: bool,
}

impl ScriptSession {
    /// Start a session on the canned starter script
    pub fn new(config: EditorConfig) -> Self {
        let mut editor = ScriptEditorCore::with_metrics(config.layout);
        editor.load_lines(ScriptBuffer::starter().lines().to_vec());

        let mut session = Self {
            autosave: AutosaveDebouncer::new(config.autosave_delay()),
            title: config.default_title.clone(),
            config,
            editor,
            created: Utc::now(),
            file_path: None,
            events: Vec::new(),
            announced_title: String::new(),
            announced_dirty: false,
        };
        session.announced_title = session.window_title();
        session
    }

    /// Discard the current script and start over from the starter.
    /// Also clears the autosave entry.
    pub fn new_script(&mut self, store: &mut dyn ScriptStore) -> SessionResult<()> {
        self.editor.load_lines(ScriptBuffer::starter().lines().to_vec());
        self.title = self.config.default_title.clone();
        self.created = Utc::now();
        self.file_path = None;
        self.autosave.cancel();
        self.sync_events();

        store.remove(&self.config.storage_key)?;
        info!("started new script");
        Ok(())
    }

    // Editing

    pub fn apply_key(&mut self, key: Key, now: Instant) -> CoreOutcome {
        self.edit(now, |editor| editor.apply_key(key))
    }

    pub fn paste(&mut self, text: &str, now: Instant) -> CoreOutcome {
        self.edit(now, |editor| editor.paste(text))
    }

    pub fn set_element_type(&mut self, ty: ElementType, now: Instant) -> CoreOutcome {
        self.edit(now, |editor| editor.set_element_type(ty))
    }

    pub fn insert_scene_heading(&mut self, prefix: &str, now: Instant) -> CoreOutcome {
        self.edit(now, |editor| editor.insert_scene_heading(prefix))
    }

    pub fn insert_transition(&mut self, label: &str, now: Instant) -> CoreOutcome {
        self.edit(now, |editor| editor.insert_transition(label))
    }

    fn edit(
        &mut self,
        now: Instant,
        op: impl FnOnce(&mut ScriptEditorCore) -> CoreOutcome,
    ) -> CoreOutcome {
        let revision = self.editor.revision();
        let outcome = op(&mut self.editor);
        if self.editor.revision() != revision {
            self.autosave.note_change(now);
        }
        self.sync_events();
        outcome
    }

    // Navigation

    pub fn go_to_page(&mut self, number: usize) -> CoreOutcome {
        self.editor.go_to_page(number)
    }

    pub fn next_page(&mut self) -> CoreOutcome {
        self.editor.next_page()
    }

    pub fn prev_page(&mut self) -> CoreOutcome {
        self.editor.prev_page()
    }

    // Files

    /// Open a `.szaarc` file. On error the current script is untouched.
    pub fn open_path(&mut self, path: impl AsRef<Path>) -> SessionResult<()> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        self.load_container_str(&json, Some(path))
    }

    /// Replace the script with a decoded container
    pub fn load_container_str(&mut self, json: &str, path: Option<&Path>) -> SessionResult<()> {
        let container = ScriptContainer::decode(json, Utc::now()).map_err(|err| {
            warn!("rejected script container: {}", err);
            err
        })?;

        self.editor.load_lines(container.lines());
        self.title = container.title;
        self.created = container.created;
        self.file_path = path.map(Path::to_path_buf);
        self.autosave.cancel();
        self.sync_events();

        info!(
            "loaded {:?}: {} lines on {} pages",
            self.display_title(),
            self.editor.lines().len(),
            self.editor.page_count()
        );
        Ok(())
    }

    /// Save to the file the script came from
    pub fn save(&mut self, now: DateTime<Utc>) -> SessionResult<()> {
        let path = self.file_path.clone().ok_or(SessionError::NoFilePath)?;
        self.save_to_path(path, now)
    }

    /// Write the script to `path` under the file's name. Only a successful
    /// write marks the script clean and adopts the path and title.
    pub fn save_to_path(&mut self, path: impl AsRef<Path>, now: DateTime<Utc>) -> SessionResult<()> {
        let path = path.as_ref();
        let mut container = self.to_container(now);
        if let Some(title) = file_title(path) {
            container.title = title;
        }
        let json = container.encode()?;
        if let Err(err) = fs::write(path, json) {
            warn!("saving to {} failed: {}", path.display(), err);
            return Err(err.into());
        }

        self.editor.mark_saved();
        self.title = container.title;
        self.file_path = Some(path.to_path_buf());
        self.sync_events();

        info!("saved {}", path.display());
        Ok(())
    }

    pub fn to_container(&self, now: DateTime<Utc>) -> ScriptContainer {
        ScriptContainer::new(self.title.clone(), self.editor.lines(), self.created)
            .with_counts(self.editor.word_count(), self.editor.page_count())
            .touched(now)
    }

    // Autosave

    /// Write the autosave entry if the quiet window has elapsed.
    ///
    /// Returns whether a write happened. Failures are logged, returned and
    /// retried one quiet window later; the dirty flag is never changed here.
    pub fn poll_autosave(&mut self, store: &mut dyn ScriptStore, now: Instant) -> SessionResult<bool> {
        if !self.autosave.take_due(now) {
            return Ok(false);
        }

        let json = self.to_container(Utc::now()).encode()?;
        if let Err(err) = store.set(&self.config.storage_key, &json) {
            warn!("autosave failed, retrying: {}", err);
            self.autosave.note_change(now);
            return Err(err.into());
        }

        debug!("autosaved under {:?}", self.config.storage_key);
        Ok(true)
    }

    /// Load the autosave entry, if there is one. The restored script has
    /// no file path and counts as unsaved.
    pub fn restore_autosave(&mut self, store: &dyn ScriptStore) -> SessionResult<bool> {
        let Some(json) = store.get(&self.config.storage_key)? else {
            return Ok(false);
        };
        self.load_container_str(&json, None)?;
        self.editor.mark_dirty();
        self.sync_events();
        info!("restored autosave");
        Ok(true)
    }

    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    // Export

    pub fn export_lines(&self) -> Vec<ExportLine> {
        export_lines(self.editor.lines(), self.editor.metrics())
    }

    pub fn plan_print(&self) -> Vec<PrintPage> {
        plan_print(self.editor.lines(), self.editor.metrics())
    }

    // Titles and events

    /// Title shown to the user: the file name once saved or opened,
    /// otherwise the script's own title
    pub fn display_title(&self) -> String {
        self.file_path
            .as_deref()
            .and_then(file_title)
            .unwrap_or_else(|| self.title.clone())
    }

    /// `ScreenPlayzaarc - <title>`, with `*` while unsaved
    pub fn window_title(&self) -> String {
        let marker = if self.editor.dirty() { "*" } else { "" };
        format!("{APPLICATION} - {}{marker}", self.display_title())
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.sync_events();
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    fn sync_events(&mut self) {
        let dirty = self.editor.dirty();
        if dirty != self.announced_dirty {
            self.announced_dirty = dirty;
            self.events.push(SessionEvent::DirtyChanged(dirty));
        }

        let title = self.window_title();
        if title != self.announced_title {
            self.events.push(SessionEvent::TitleChanged(title.clone()));
            self.announced_title = title;
        }
    }

    // Accessors

    pub fn editor(&self) -> &ScriptEditorCore {
        &self.editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    pub fn is_dirty(&self) -> bool {
        self.editor.dirty()
    }
}

impl Default for ScriptSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

/// File name without the `.szaarc` extension
fn file_title(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let title = name
        .strip_suffix(FILE_EXTENSION)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(name);
    Some(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::time::Duration;

    const DEFAULT_KEY: &str = crate::config::DEFAULT_STORAGE_KEY;

    struct FailingStore;

    impl ScriptStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("quota exceeded".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn test_new_session_starter() {
        let session = ScriptSession::default();
        let texts: Vec<&str> = session
            .editor()
            .lines()
            .iter()
            .map(|line| line.text.as_str())
            .collect();
        assert_eq!(
            texts,
            ["FADE IN:", "INT. LOCATION - TIME", "Enter your story description here."]
        );
        assert!(!session.is_dirty());
        assert_eq!(session.window_title(), "ScreenPlayzaarc - Untitled Script");
    }

    #[test]
    fn test_first_edit_announces_dirty_once() {
        let mut session = ScriptSession::default();
        let now = Instant::now();
        session.apply_key(Key::Char('x'), now);
        session.apply_key(Key::Char('y'), now);

        assert_eq!(
            session.drain_events(),
            [
                SessionEvent::DirtyChanged(true),
                SessionEvent::TitleChanged("ScreenPlayzaarc - Untitled Script*".to_string()),
            ]
        );
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_movement_does_not_schedule_autosave() {
        let mut session = ScriptSession::default();
        session.apply_key(Key::Down, Instant::now());
        assert!(!session.autosave_pending());
        session.apply_key(Key::Char('a'), Instant::now());
        assert!(session.autosave_pending());
    }

    #[test]
    fn test_autosave_after_quiet_window() {
        let mut session = ScriptSession::default();
        let mut store = MemoryStore::new();
        let start = Instant::now();

        session.apply_key(Key::Char('a'), start);
        assert!(!session
            .poll_autosave(&mut store, start + Duration::from_millis(1000))
            .unwrap());
        assert!(session
            .poll_autosave(&mut store, start + Duration::from_millis(2000))
            .unwrap());

        let saved = store.get(DEFAULT_KEY).unwrap().unwrap();
        let container = ScriptContainer::decode(&saved, Utc::now()).unwrap();
        assert_eq!(container.content[0].text, "aFADE IN:");
        // Autosave does not count as saving
        assert!(session.is_dirty());
    }

    #[test]
    fn test_autosave_failure_is_reported_and_harmless() {
        let mut session = ScriptSession::default();
        let start = Instant::now();
        session.apply_key(Key::Char('a'), start);

        let result = session.poll_autosave(&mut FailingStore, start + Duration::from_secs(5));
        assert!(matches!(result, Err(SessionError::Store(StoreError::Unavailable(_)))));
        assert!(session.is_dirty());
        assert_eq!(session.editor().lines()[0].text, "aFADE IN:");
    }

    #[test]
    fn test_failed_autosave_is_retried() {
        let mut session = ScriptSession::default();
        let start = Instant::now();
        session.apply_key(Key::Char('a'), start);

        let failed_at = start + Duration::from_secs(5);
        assert!(session.poll_autosave(&mut FailingStore, failed_at).is_err());
        assert!(session.autosave_pending());

        let mut store = MemoryStore::new();
        assert!(!session
            .poll_autosave(&mut store, failed_at + Duration::from_millis(1999))
            .unwrap());
        assert!(session
            .poll_autosave(&mut store, failed_at + Duration::from_millis(2000))
            .unwrap());
        assert!(store.get(DEFAULT_KEY).unwrap().is_some());
        assert!(!session.autosave_pending());
    }

    #[test]
    fn test_restore_autosave() {
        let mut store = MemoryStore::new();
        let mut first = ScriptSession::default();
        let start = Instant::now();
        first.paste("EXT. PIER - DUSK", start);
        first.set_title("Harbour");
        first
            .poll_autosave(&mut store, start + Duration::from_secs(3))
            .unwrap();

        let mut second = ScriptSession::default();
        assert!(second.restore_autosave(&store).unwrap());
        assert_eq!(second.title(), "Harbour");
        assert_eq!(second.editor().lines().len(), 4);
        assert_eq!(second.editor().lines()[1].text, "EXT. PIER - DUSK");
        assert_eq!(second.editor().lines()[1].element_type, ElementType::SceneHeading);
        assert!(second.is_dirty());
        assert_eq!(second.window_title(), "ScreenPlayzaarc - Harbour*");

        let mut empty = ScriptSession::default();
        assert!(!empty.restore_autosave(&MemoryStore::new()).unwrap());
    }

    #[test]
    fn test_new_script_clears_autosave() {
        let mut store = MemoryStore::new();
        store.set(DEFAULT_KEY, "{}").unwrap();

        let mut session = ScriptSession::default();
        session.apply_key(Key::Char('z'), Instant::now());
        session.new_script(&mut store).unwrap();

        assert!(store.is_empty());
        assert!(!session.is_dirty());
        assert!(!session.autosave_pending());
        assert_eq!(session.editor().lines()[0].text, "FADE IN:");
    }

    #[test]
    fn test_bad_container_leaves_script_alone() {
        let mut session = ScriptSession::default();
        session.apply_key(Key::Char('q'), Instant::now());
        let before = session.editor().snapshot();

        let err = session
            .load_container_str(r#"{"format": "docx", "content": []}"#, None)
            .unwrap_err();
        assert!(matches!(err, SessionError::Container(ContainerError::InvalidFormat(_))));
        assert_eq!(session.editor().snapshot(), before);
    }

    #[test]
    fn test_file_title() {
        assert_eq!(file_title(Path::new("/tmp/Heist.szaarc")).as_deref(), Some("Heist"));
        assert_eq!(file_title(Path::new("notes.txt")).as_deref(), Some("notes.txt"));
    }

    #[test]
    fn test_save_without_path() {
        let mut session = ScriptSession::default();
        assert!(matches!(session.save(Utc::now()), Err(SessionError::NoFilePath)));
    }
}
