//! 翻译模块
//!
//! 基于词库的增量页面翻译，采用清晰的模块化架构：
//! - **dictionary**: 词库加载与规则编译
//! - **classifier** / **context**: 页面分类与合并词表
//! - **resolver** / **filters**: 单条文本的查词
//! - **watcher** / **time_element**: 突变观察与时间元素
//! - **passes** / **describe**: 导航完成后的一次性处理和描述翻译按钮
//! - **flags** / **config** / **error**: 开关、配置和错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use page_i18n::translation::{DictionaryStore, PageContext, PageType, FeatureFlags, resolve};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DictionaryStore::load("locals.json")?;
//! let context = PageContext::build(PageType::from("repository/issues"), &store);
//! let translated = resolve("  New issue  ", &context, FeatureFlags::default());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 页面分类器 - 由 URL 和 DOM 标记推导页面类型
pub mod classifier;

/// 配置管理模块 - 常量、引擎配置和配置文件加载
pub mod config;

/// 页面上下文 - 一个页面类型的合并词表
pub mod context;

/// 描述翻译按钮和外部翻译服务接口
pub mod describe;

/// 词库存储 - 静态词表、正则规则、选择器规则和全局配置
pub mod dictionary;

/// 错误处理模块 - 统一的错误类型
pub mod error;

/// 文本过滤器 - 跳过判断和规范化
pub mod filters;

/// 功能开关与持久化
pub mod flags;

/// 标题和选择器一次性处理
pub mod passes;

/// 文本解析器
pub mod resolver;

/// 时间元素处理
pub mod time_element;

/// 突变观察者
pub mod watcher;

// ============================================================================
// 核心API导出
// ============================================================================

pub use classifier::{classify, PageSignals};
pub use config::{constants, ConfigManager, EngineConfig};
pub use context::{PageContext, PageType};
pub use describe::{DescriptionTranslator, NETWORK_FAILED, TRANSLATE_FAILED};
pub use dictionary::{DictionaryEntry, DictionaryStore, GlobalRuleSet, RegexRule, SelectorOverride};
pub use error::{ErrorSeverity, I18nError, I18nResult};
pub use flags::{FeatureFlags, FlagKey, FlagStore, JsonFlagStore, MemoryFlagStore};
pub use resolver::{resolve, resolve_title};
pub use watcher::{BatchReport, MutationWatcher, WatcherState};

#[cfg(feature = "translate-desc")]
pub use describe::IflyrecTranslator;
