//! 引擎配置管理模块
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::translation::error::{I18nError, I18nResult};

/// 引擎常量
pub mod constants {
    /// 目标语言
    pub const LANG: &str = "zh-CN";

    /// 被第三方脚本重置时需要纠正的源语言
    pub const SOURCE_LANG: &str = "en";

    /// 站点域名 -> 类型映射
    pub const PAGE_MAP: &[(&str, &str)] = &[
        ("gist.github.com", "gist"),
        ("www.githubstatus.com", "status"),
        ("skills.github.com", "skills"),
        ("education.github.com", "education"),
    ];

    /// 需要特殊处理的站点类型
    pub const SPECIAL_SITES: &[&str] = &["gist", "status", "skills", "education"];

    /// 简介 css 筛选器规则
    pub const DESC_SELECTORS: &[(&str, &str)] = &[
        ("repository", ".f4.my-3"),
        ("gist", ".gist-content [itemprop='about']"),
    ];

    /// 监视的属性
    pub const OBSERVED_ATTRIBUTES: &[&str] = &["value", "placeholder", "aria-label", "data-confirm"];

    /// 文本节点长度上限（UTF-16 码元）
    pub const MAX_TEXT_NODE_LENGTH: usize = 500;

    /// settle() 最多执行的事件循环轮次
    pub const MAX_PUMP_TURNS: usize = 32;

    /// 描述翻译按钮
    pub const TRANSLATE_BUTTON_ID: &str = "translate-me";
    pub const TRANSLATE_BUTTON_LABEL: &str = "翻译";
    pub const TRANSLATE_BUTTON_STYLE: &str =
        "color: rgb(27, 149, 224); font-size: small; cursor: pointer";

    /// 描述翻译服务
    pub const IFLYREC_ENDPOINT: &str =
        "https://fanyi.iflyrec.com/TJHZTranslationService/v2/textAutoTranslation";
    pub const IFLYREC_ORIGIN: &str = "https://fanyi.iflyrec.com";
    pub const TRANSLATE_PROVIDER_NAME: &str = "讯飞听见";
    pub const TRANSLATE_PROVIDER_URL: &str = "https://fanyi.iflyrec.com/text-translate";
    pub const TRANSLATE_PROVIDER_STYLE: &str = "color:rgb(27, 149, 224);";

    pub const CONFIG_PATHS: &[&str] = &[
        "page-i18n.toml",
        ".page-i18n.toml",
        "~/.config/page-i18n/config.toml",
        "/etc/page-i18n/config.toml",
    ];

    pub const DEFAULT_DICTIONARY_PATH: &str = "locals.json";
}

/// 根据页面类型查找描述元素选择器
pub fn description_selector(page_type: &str) -> Option<&'static str> {
    constants::DESC_SELECTORS
        .iter()
        .find(|(ty, _)| *ty == page_type)
        .map(|(_, selector)| *selector)
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 强制设置到 `<html lang>` 的目标语言
    pub lang: String,
    /// 词库文件路径
    pub dictionary_path: String,
    /// 持久化功能开关的文件；为空时只保存在内存中
    pub flags_file: Option<String>,
    /// 功能开关默认值
    pub enable_regexp: bool,
    pub enable_trans_desc: bool,
    /// settle() 的轮次上限
    pub max_pump_turns: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lang: constants::LANG.to_string(),
            dictionary_path: constants::DEFAULT_DICTIONARY_PATH.to_string(),
            flags_file: None,
            enable_regexp: true,
            enable_trans_desc: true,
            max_pump_turns: constants::MAX_PUMP_TURNS,
        }
    }
}

impl EngineConfig {
    /// 验证配置
    pub fn validate(&self) -> I18nResult<()> {
        if self.lang.trim().is_empty() {
            return Err(I18nError::ConfigError("目标语言不能为空".to_string()));
        }

        if self.max_pump_turns == 0 {
            return Err(I18nError::ConfigError("事件循环轮次上限不能为0".to_string()));
        }

        if self.dictionary_path.trim().is_empty() {
            return Err(I18nError::ConfigError("词库路径不能为空".to_string()));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{i18n, EnvVar};

        if let Ok(lang) = i18n::Lang::get() {
            self.lang = lang;
        }

        if let Ok(path) = i18n::Dictionary::get() {
            tracing::info!("环境变量覆盖词库路径: {}", path);
            self.dictionary_path = path;
        }

        if let Ok(path) = i18n::FlagsFile::get() {
            self.flags_file = Some(path);
        }

        if let Ok(enabled) = i18n::EnableRegExp::get() {
            self.enable_regexp = enabled;
        }

        if let Ok(enabled) = i18n::EnableTransDesc::get() {
            self.enable_trans_desc = enabled;
        }
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: EngineConfig,
}

impl ConfigManager {
    /// 按搜索路径加载配置，应用环境变量并校验
    pub fn new() -> I18nResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件加载配置
    pub fn from_file(path: &str) -> I18nResult<Self> {
        Self::load_dotenv();
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    pub fn get_config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_config(self) -> EngineConfig {
        self.config
    }

    fn load_config() -> I18nResult<EngineConfig> {
        Self::load_dotenv();

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(EngineConfig::default())
    }

    fn load_from_file(path: &str) -> I18nResult<EngineConfig> {
        let expanded_path = shellexpand::tilde(path);
        let content = std::fs::read_to_string(expanded_path.as_ref())
            .map_err(|e| I18nError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| I18nError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| I18nError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }
}
