//! 翻译模块统一错误处理
//!
//! 提供结构化错误类型。词条未命中不属于错误（返回 `None`），
//! 这里只收录需要记录或向调用方报告的故障。

use std::fmt;

use thiserror::Error;

/// 翻译引擎错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum I18nError {
    /// 页面类型未匹配或词库缺失
    #[error("页面类型未匹配或词库缺失: {0}")]
    ClassificationMiss(String),

    /// 单个节点翻译失败
    #[error("节点翻译失败: {0}")]
    TranslatorFault(String),

    /// 网络请求失败（描述翻译）
    #[error("网络请求失败: {0}")]
    NetworkFault(String),

    /// 词库加载或编译错误
    #[error("词库错误: {0}")]
    DictionaryError(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// CSS 选择器解析错误
    #[error("选择器错误: {0}")]
    SelectorError(String),

    /// 文件读写错误
    #[error("IO错误: {0}")]
    IoError(String),
}

impl I18nError {
    /// 错误发生后引擎是否仍可继续工作
    pub fn is_recoverable(&self) -> bool {
        match self {
            I18nError::ClassificationMiss(_) => true,
            I18nError::TranslatorFault(_) => true,
            I18nError::NetworkFault(_) => true,
            I18nError::DictionaryError(_) => false,
            I18nError::ConfigError(_) => false,
            I18nError::SelectorError(_) => false,
            I18nError::IoError(_) => false,
        }
    }

    /// 获取错误的严重程度
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            I18nError::ClassificationMiss(_) => ErrorSeverity::Warning,
            I18nError::TranslatorFault(_) => ErrorSeverity::Error,
            I18nError::NetworkFault(_) => ErrorSeverity::Warning,
            I18nError::DictionaryError(_) => ErrorSeverity::Critical,
            I18nError::ConfigError(_) => ErrorSeverity::Critical,
            I18nError::SelectorError(_) => ErrorSeverity::Critical,
            I18nError::IoError(_) => ErrorSeverity::Error,
        }
    }
}

impl From<std::io::Error> for I18nError {
    fn from(err: std::io::Error) -> Self {
        I18nError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for I18nError {
    fn from(err: serde_json::Error) -> Self {
        I18nError::DictionaryError(format!("JSON解析失败: {}", err))
    }
}

impl From<toml::de::Error> for I18nError {
    fn from(err: toml::de::Error) -> Self {
        I18nError::DictionaryError(format!("TOML解析失败: {}", err))
    }
}

impl From<regex::Error> for I18nError {
    fn from(err: regex::Error) -> Self {
        I18nError::DictionaryError(format!("正则表达式无效: {}", err))
    }
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// 翻译结果类型
pub type I18nResult<T> = Result<T, I18nError>;
