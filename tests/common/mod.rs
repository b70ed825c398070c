#![allow(dead_code)]

use anyhow::Result;
use multitimer::app::App;
use multitimer::config::AppConfig;
use multitimer::storage::SettingsManager;
use multitimer::timers::AlarmSound;
use multitimer::ui::{Console, NotificationSink, Settings, Theme};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Test utilities for creating temporary test environments
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub settings_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let settings_path = temp_dir.path().join("settings.txt");
        Ok(Self {
            temp_dir,
            settings_path,
        })
    }

    pub fn config(&self) -> AppConfig {
        AppConfig {
            settings_path: self.settings_path.clone(),
            sound_dir: self.temp_dir.path().to_path_buf(),
            desktop_notifications: false,
            ..Default::default()
        }
    }

    pub fn settings_file(&self) -> String {
        std::fs::read_to_string(&self.settings_path).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Ended(String, AlarmSound),
    Info(String, String),
    Warning(String, String),
}

/// Sink that records everything it is asked to show
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingSink {
    pub fn all(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn ended(&self) -> Vec<(String, AlarmSound)> {
        self.all()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Ended(name, alarm) => Some((name, alarm)),
                _ => None,
            })
            .collect()
    }

    pub fn warnings(&self) -> Vec<(String, String)> {
        self.all()
            .into_iter()
            .filter_map(|notice| match notice {
                Notice::Warning(title, message) => Some((title, message)),
                _ => None,
            })
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    fn timer_ended(&self, name: &str, alarm: AlarmSound) {
        self.notices.lock().unwrap().push(Notice::Ended(name.to_string(), alarm));
    }

    fn show_info(&self, title: &str, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Info(title.to_string(), message.to_string()));
    }

    fn show_warning(&self, title: &str, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(Notice::Warning(title.to_string(), message.to_string()));
    }
}

/// In-memory console output
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Build an app wired to recording doubles
pub fn create_test_app(env: &TestEnvironment, config: AppConfig) -> (App, RecordingSink, SharedBuffer) {
    let sink = RecordingSink::default();
    let buffer = SharedBuffer::default();
    let console = Console::new(Box::new(buffer.clone()), Theme::LIGHT);
    let app = App::new(
        config,
        Settings::default(),
        SettingsManager::new(env.settings_path.clone()),
        console,
        Box::new(sink.clone()),
    );
    (app, sink, buffer)
}
