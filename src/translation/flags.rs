//! 功能开关
//!
//! 开关在引擎启动时从 [`FlagStore`] 读取一次，之后只通过菜单切换修改。

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::translation::error::{I18nError, I18nResult};

/// 开关键名，与持久化存储中的键一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKey {
    EnableRegExp,
    EnableTransDesc,
}

impl FlagKey {
    pub const ALL: [FlagKey; 2] = [FlagKey::EnableRegExp, FlagKey::EnableTransDesc];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagKey::EnableRegExp => "enable_RegExp",
            FlagKey::EnableTransDesc => "enable_transDesc",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.as_str() == key)
    }

    /// 菜单显示名
    pub fn label(&self) -> &'static str {
        match self {
            FlagKey::EnableRegExp => "正则功能",
            FlagKey::EnableTransDesc => "描述翻译",
        }
    }
}

impl fmt::Display for FlagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 当前生效的开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    pub enable_regexp: bool,
    pub enable_trans_desc: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_regexp: true,
            enable_trans_desc: true,
        }
    }
}

impl FeatureFlags {
    /// 从存储读取，缺失的键使用 `defaults`
    pub fn load(store: &dyn FlagStore, defaults: FeatureFlags) -> Self {
        Self {
            enable_regexp: store.get(FlagKey::EnableRegExp, defaults.enable_regexp),
            enable_trans_desc: store.get(FlagKey::EnableTransDesc, defaults.enable_trans_desc),
        }
    }

    pub fn get(&self, key: FlagKey) -> bool {
        match key {
            FlagKey::EnableRegExp => self.enable_regexp,
            FlagKey::EnableTransDesc => self.enable_trans_desc,
        }
    }

    pub fn set(&mut self, key: FlagKey, value: bool) {
        match key {
            FlagKey::EnableRegExp => self.enable_regexp = value,
            FlagKey::EnableTransDesc => self.enable_trans_desc = value,
        }
    }
}

/// 开关持久化存储
pub trait FlagStore {
    fn get(&self, key: FlagKey, default: bool) -> bool;
    fn set(&mut self, key: FlagKey, value: bool) -> I18nResult<()>;
}

/// 仅保存在内存中的开关
#[derive(Debug, Default, Clone)]
pub struct MemoryFlagStore {
    values: HashMap<FlagKey, bool>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: FlagKey, value: bool) -> Self {
        self.values.insert(key, value);
        self
    }
}

impl FlagStore for MemoryFlagStore {
    fn get(&self, key: FlagKey, default: bool) -> bool {
        self.values.get(&key).copied().unwrap_or(default)
    }

    fn set(&mut self, key: FlagKey, value: bool) -> I18nResult<()> {
        self.values.insert(key, value);
        Ok(())
    }
}

/// 保存在 JSON 文件中的开关，每次修改立即写盘
#[derive(Debug)]
pub struct JsonFlagStore {
    path: PathBuf,
    values: BTreeMap<String, bool>,
}

impl JsonFlagStore {
    /// 打开存储文件，文件不存在时视为空
    pub fn open(path: impl AsRef<Path>) -> I18nResult<Self> {
        let path = path.as_ref().to_path_buf();
        let values = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content).map_err(|e| {
                I18nError::ConfigError(format!("解析开关文件 {} 失败: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> I18nResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.values)
            .map_err(|e| I18nError::ConfigError(format!("序列化开关失败: {}", e)))?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

impl FlagStore for JsonFlagStore {
    fn get(&self, key: FlagKey, default: bool) -> bool {
        self.values.get(key.as_str()).copied().unwrap_or(default)
    }

    fn set(&mut self, key: FlagKey, value: bool) -> I18nResult<()> {
        self.values.insert(key.as_str().to_string(), value);
        self.persist()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_flag_keys() {
        assert_eq!(FlagKey::EnableRegExp.as_str(), "enable_RegExp");
        assert_eq!(FlagKey::from_key("enable_transDesc"), Some(FlagKey::EnableTransDesc));
        assert_eq!(FlagKey::from_key("enable_regexp"), None);
    }

    #[test]
    fn test_load_uses_defaults_for_missing_keys() {
        let store = MemoryFlagStore::new().with(FlagKey::EnableRegExp, false);
        let flags = FeatureFlags::load(&store, FeatureFlags::default());
        assert!(!flags.enable_regexp);
        assert!(flags.enable_trans_desc);
    }

    #[test]
    fn test_json_store_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("flags.json");

        let mut store = JsonFlagStore::open(&path).unwrap();
        assert!(store.get(FlagKey::EnableTransDesc, true));
        store.set(FlagKey::EnableTransDesc, false).unwrap();

        let reopened = JsonFlagStore::open(&path).unwrap();
        assert!(!reopened.get(FlagKey::EnableTransDesc, true));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"enable_transDesc\": false"));
    }

    #[test]
    fn test_json_store_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("flags.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(JsonFlagStore::open(&path), Err(I18nError::ConfigError(_))));
    }
}
