//! 文本过滤器模块
//!
//! 在查词之前判断文本是否值得翻译，并生成规范化的查词键

use std::sync::OnceLock;

use regex::Regex;

static WHITESPACE_RUN: OnceLock<Regex> = OnceLock::new();

fn whitespace_run() -> &'static Regex {
    // \s 已包含 U+00A0，这里显式列出以免依赖 unicode 表的细节
    WHITESPACE_RUN.get_or_init(|| Regex::new(r"[\s\u{00A0}]+").expect("静态正则"))
}

/// 判断文本是否应跳过翻译
///
/// 以下任一条件成立即跳过：
/// - 只有空白和数字（包括空串）
/// - 全部是 CJK 统一表意文字（U+4E00–U+9FA5），即已经是中文
/// - 不含任何拉丁字母、逗号或句点
pub fn should_skip(text: &str) -> bool {
    if text.chars().all(|c| c.is_whitespace() || c.is_ascii_digit()) {
        return true;
    }

    if text.chars().all(|c| ('\u{4e00}'..='\u{9fa5}').contains(&c)) {
        return true;
    }

    !text
        .chars()
        .any(|c| c.is_ascii_alphabetic() || c == ',' || c == '.')
}

/// 去掉首尾空白并把内部空白折叠为单个空格
pub fn normalize(text: &str) -> String {
    whitespace_run().replace_all(text.trim(), " ").into_owned()
}

/// UTF-16 码元长度，与 DOM 的 `length` 一致
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}
