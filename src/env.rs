//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "PAGE_I18N_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 翻译引擎相关环境变量
///
/// 这些变量只在显式设置时覆盖配置文件，所以都没有默认值。
pub mod i18n {
    use super::*;

    /// 目标语言
    pub struct Lang;
    impl EnvVar<String> for Lang {
        const NAME: &'static str = "PAGE_I18N_LANG";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Locale forced onto <html lang>, e.g. zh-CN";

        fn parse(value: &str) -> EnvResult<String> {
            let lang = value.trim();
            let valid = !lang.is_empty()
                && lang
                    .split('-')
                    .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric()));
            if valid {
                Ok(lang.to_string())
            } else {
                Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("Invalid language tag '{}'", value),
                })
            }
        }
    }

    /// 词库文件路径
    pub struct Dictionary;
    impl EnvVar<String> for Dictionary {
        const NAME: &'static str = "PAGE_I18N_DICTIONARY";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Path to the dictionary file (.json or .toml)";

        fn parse(value: &str) -> EnvResult<String> {
            parse_path(value, Self::NAME)
        }
    }

    /// 功能开关持久化文件
    pub struct FlagsFile;
    impl EnvVar<String> for FlagsFile {
        const NAME: &'static str = "PAGE_I18N_FLAGS_FILE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "JSON file persisting feature flags between runs";

        fn parse(value: &str) -> EnvResult<String> {
            parse_path(value, Self::NAME)
        }
    }

    /// 正则翻译开关
    pub struct EnableRegExp;
    impl EnvVar<bool> for EnableRegExp {
        const NAME: &'static str = "PAGE_I18N_ENABLE_REGEXP";
        const DEFAULT: Option<bool> = None;
        const DESCRIPTION: &'static str = "Default for the regex fallback feature flag";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }

    /// 描述翻译开关
    pub struct EnableTransDesc;
    impl EnvVar<bool> for EnableTransDesc {
        const NAME: &'static str = "PAGE_I18N_ENABLE_TRANS_DESC";
        const DEFAULT: Option<bool> = None;
        const DESCRIPTION: &'static str = "Default for the description translate feature flag";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

fn parse_path(value: &str, var_name: &str) -> EnvResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: "Path must not be empty".to_string(),
        });
    }
    Ok(shellexpand::tilde(trimmed).into_owned())
}

/// 生成环境变量文档
pub fn generate_env_docs() -> String {
    let entries: [(&str, &str); 6] = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION),
        (i18n::Lang::NAME, i18n::Lang::DESCRIPTION),
        (i18n::Dictionary::NAME, i18n::Dictionary::DESCRIPTION),
        (i18n::FlagsFile::NAME, i18n::FlagsFile::DESCRIPTION),
        (i18n::EnableRegExp::NAME, i18n::EnableRegExp::DESCRIPTION),
        (i18n::EnableTransDesc::NAME, i18n::EnableTransDesc::DESCRIPTION),
    ];

    let mut docs = String::from("# Environment Variables\n\n");
    for (name, description) in entries {
        docs.push_str(&format!("- `{}`: {}\n", name, description));
    }
    docs
}
