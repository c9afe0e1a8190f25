//! 文本解析器
//!
//! 把一段文本解析为译文或"未命中"。未命中是正常情况，不记录日志。

use crate::translation::context::PageContext;
use crate::translation::dictionary::DictionaryStore;
use crate::translation::filters::{normalize, should_skip};
use crate::translation::flags::FeatureFlags;

/// 解析文本
///
/// 先做跳过判断，再用规范化后的键依次查静态表和正则规则。
/// 命中时把译文替换回原文中第一次出现的去首尾空白片段，保留原有的首尾空白；
/// 译文为空或与查词键相同视为未命中，因此对已翻译文本再次解析总是返回 `None`。
/// 静态表中的空译文不会再退回正则规则。
pub fn resolve(text: &str, context: &PageContext, flags: FeatureFlags) -> Option<String> {
    if should_skip(text) {
        return None;
    }

    let trimmed = text.trim();
    let key = normalize(text);
    let translated = lookup(&key, context, flags)?;
    if translated.is_empty() || translated == key {
        return None;
    }

    Some(text.replacen(trimmed, &translated, 1))
}

fn lookup(key: &str, context: &PageContext, flags: FeatureFlags) -> Option<String> {
    if let Some(hit) = context.lookup_static(key) {
        return Some(hit.to_string());
    }

    if flags.enable_regexp {
        for rule in context.regexp_rules() {
            let replaced = rule.apply(key);
            if replaced != key {
                return Some(replaced.into_owned());
            }
        }
    }

    None
}

/// 解析页面标题
///
/// 使用 `title` 词条：先查静态表，再按顺序尝试正则规则。不做跳过判断。
/// 未命中或结果为空时返回 `None`，调用方保持标题不变。
pub fn resolve_title(title: &str, store: &DictionaryStore) -> Option<String> {
    let entry = store.title()?;

    let translated = match entry.static_dict.get(title) {
        Some(hit) => hit.clone(),
        None => entry
            .regexp
            .iter()
            .map(|rule| rule.apply(title))
            .find(|replaced| replaced != title)?
            .into_owned(),
    };

    (!translated.is_empty() && translated != title).then_some(translated)
}
