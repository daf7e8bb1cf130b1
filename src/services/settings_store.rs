//! 操作员设置与回复计数的持久化
//!
//! 设置文件为 TOML，键名与操作界面保持一致：
//! `apiUrl` / `apiKey` / `modelName` / `systemPrompt` / `isRunning` / `totalReplies`

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppResult, ConfigError};
use crate::models::PersonaConfig;
use crate::services::StatusReporter;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "你是一个真实网友，用简短自然的语气发表评论，8-20词，0-2个emoji，不要像机器人。";

/// 持久化设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub api_url: String,
    pub api_key: String,
    pub model_name: String,
    pub system_prompt: String,
    pub is_running: bool,
    pub total_replies: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model_name: crate::models::generation::DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            is_running: false,
            total_replies: 0,
        }
    }
}

impl Settings {
    pub fn persona(&self) -> PersonaConfig {
        PersonaConfig {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model_name.clone(),
            system_prompt: self.system_prompt.clone(),
        }
    }
}

/// 设置存储
///
/// 内存中保存当前值，每次修改后整体写回文件；`path` 为空时只保存在内存中
#[derive(Debug)]
pub struct SettingsStore {
    path: Option<PathBuf>,
    current: Mutex<Settings>,
}

impl SettingsStore {
    /// 打开设置文件；文件不存在时使用默认值
    pub fn open(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = load_settings(&path)?;
        debug!("已加载设置: {}", path.display());
        Ok(Self {
            path: Some(path),
            current: Mutex::new(settings),
        })
    }

    /// 仅内存的设置存储
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            current: Mutex::new(settings),
        }
    }

    pub fn snapshot(&self) -> Settings {
        self.lock().clone()
    }

    /// 从文件重新读取（操作员可能在外部编辑了设置）
    pub fn reload(&self) -> AppResult<Settings> {
        let Some(path) = &self.path else {
            return Ok(self.snapshot());
        };
        let settings = load_settings(path)?;
        *self.lock() = settings.clone();
        Ok(settings)
    }

    /// 修改设置并写回
    ///
    /// 写文件失败时内存中的值仍然生效，错误返回给调用方
    pub fn update(&self, apply: impl FnOnce(&mut Settings)) -> AppResult<Settings> {
        let updated = {
            let mut guard = self.lock();
            apply(&mut guard);
            guard.clone()
        };
        self.persist(&updated)?;
        Ok(updated)
    }

    fn persist(&self, settings: &Settings) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let content = toml::to_string_pretty(settings).map_err(ConfigError::from)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Settings> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_settings(path: &Path) -> AppResult<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let settings = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    Ok(settings)
}

/// 回复计数
///
/// 每次确认发送成功加 1，写入 `totalReplies` 并对外通知
#[derive(Debug, Clone)]
pub struct ReplyCounter {
    store: Arc<SettingsStore>,
    reporter: StatusReporter,
}

impl ReplyCounter {
    pub fn new(store: Arc<SettingsStore>, reporter: StatusReporter) -> Self {
        Self { store, reporter }
    }

    pub fn current(&self) -> u64 {
        self.store.snapshot().total_replies
    }

    /// 计数加 1，返回新值
    pub fn increment(&self) -> u64 {
        let count = match self.store.update(|s| s.total_replies += 1) {
            Ok(settings) => settings.total_replies,
            Err(e) => {
                warn!("保存回复计数失败: {}", e);
                self.current()
            }
        };
        self.reporter.publish(count);
        count
    }

    /// 不改变计数，只对外通知当前值
    pub fn announce(&self) {
        self.reporter.publish(self.current());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(dir.path().join("settings.toml")).unwrap();
        assert_eq!(store.snapshot(), Settings::default());
    }

    #[test]
    fn test_update_persists_camel_case_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let store = SettingsStore::open(&path).unwrap();
        store
            .update(|s| {
                s.api_key = "sk-test".into();
                s.is_running = true;
                s.total_replies = 3;
            })
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("apiKey = \"sk-test\""));
        assert!(content.contains("isRunning = true"));
        assert!(content.contains("totalReplies = 3"));

        let reopened = SettingsStore::open(&path).unwrap();
        assert_eq!(reopened.snapshot().total_replies, 3);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "apiKey = \"k\"\n").unwrap();
        let settings = SettingsStore::open(&path).unwrap().snapshot();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_counter_increments_and_notifies() {
        let store = Arc::new(SettingsStore::in_memory(Settings::default()));
        let reporter = StatusReporter::default();
        let mut rx = reporter.subscribe();
        let counter = ReplyCounter::new(store, reporter);

        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(rx.try_recv().unwrap().count, 1);
        assert_eq!(rx.try_recv().unwrap().count, 2);
    }
}
