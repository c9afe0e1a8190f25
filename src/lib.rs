//! # page-i18n
//!
//! 基于词库的网页增量翻译引擎：对页面分类、选出对应词表，
//! 整树翻译一次后持续观察 DOM 变化，只翻译发生变化的部分。
//!
//! ## 模块组织
//!
//! - `core` - 翻译引擎，连接分类、上下文、观察者和一次性处理
//! - `env` - 环境变量
//! - `parsers` - HTML 解析、活动文档模型和选择器
//! - `translation` - 词库、查词、分类、观察者和开关

pub mod core;
pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use crate::core::{Engine, TurnReport};
pub use parsers::*;
pub use translation::{
    DictionaryStore, EngineConfig, FeatureFlags, FlagKey, I18nError, I18nResult, PageContext,
    PageType,
};
