//! 词库存储
//!
//! 词库在启动时一次性加载并编译，之后只读。文件结构（JSON 或 TOML）：
//!
//! ```json
//! {
//!   "version": "1.9.3",
//!   "conf": {
//!     "ignoreMutationSelectorPage": { "*": [".markdown-body"] },
//!     "ignoreSelectorPage": { "*": ["pre", "code"] },
//!     "characterDataPage": ["repository/pulls"],
//!     "rePagePathRepo": "^/[^/]+/[^/]+/(issues|pulls)",
//!     "rePagePathOrg": "^/orgs/[^/]+/(people|teams)",
//!     "rePagePath": "^/(settings|notifications)"
//!   },
//!   "public": { "static": { "Sign in": "登录" }, "regexp": [["^(\\d+) commits?$", "$1 次提交"]] },
//!   "title": { "static": {}, "regexp": [] },
//!   "repository/issues": { "static": { "New issue": "新建议题" } }
//! }
//! ```
//!
//! `public` 合并进所有页面类型，`title` 只用于页面标题。

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::parsers::html::selector::SelectorList;
use crate::translation::error::{I18nError, I18nResult};

/// 合并进每个页面类型的全局词条
pub const PUBLIC_ENTRY: &str = "public";
/// 页面标题词条
pub const TITLE_ENTRY: &str = "title";
/// 所有页面类型共享的忽略规则键
pub const WILDCARD_PAGE: &str = "*";

#[derive(Debug, Deserialize)]
struct RawStore {
    #[serde(default)]
    version: Option<String>,
    conf: RawConf,
    #[serde(flatten)]
    pages: HashMap<String, RawEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConf {
    #[serde(default)]
    ignore_mutation_selector_page: HashMap<String, Vec<String>>,
    #[serde(default)]
    ignore_selector_page: HashMap<String, Vec<String>>,
    #[serde(default)]
    character_data_page: Vec<String>,
    re_page_path_repo: String,
    re_page_path_org: String,
    re_page_path: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawEntry {
    #[serde(default, rename = "static")]
    static_dict: HashMap<String, String>,
    #[serde(default)]
    regexp: Vec<RawRule>,
    #[serde(default)]
    selector: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawRule {
    WithFlags(String, String, String),
    Pair(String, String),
    Object {
        pattern: String,
        replacement: String,
        #[serde(default)]
        flags: String,
    },
}

impl RawRule {
    fn into_parts(self) -> (String, String, String) {
        match self {
            RawRule::WithFlags(pattern, replacement, flags) => (pattern, replacement, flags),
            RawRule::Pair(pattern, replacement) => (pattern, replacement, String::new()),
            RawRule::Object {
                pattern,
                replacement,
                flags,
            } => (pattern, replacement, flags),
        }
    }
}

/// 编译后的正则规则
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: Regex,
    replacement: String,
    global: bool,
}

impl RegexRule {
    /// 编译规则；`flags` 支持 `g`、`i`、`m`、`s`
    pub fn new(pattern: &str, replacement: &str, flags: &str) -> I18nResult<Self> {
        let mut builder = RegexBuilder::new(pattern);
        let mut global = false;
        for flag in flags.chars() {
            match flag {
                'g' => global = true,
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                other => {
                    return Err(I18nError::DictionaryError(format!(
                        "规则 {:?} 含有不支持的标志 {:?}",
                        pattern, other
                    )))
                }
            }
        }
        let pattern = builder.build()?;
        let replacement = normalize_replacement(replacement, pattern.captures_len());

        Ok(Self {
            pattern,
            replacement,
            global,
        })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// 相当于 JS 的 `text.replace(pattern, replacement)`
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        if self.global {
            self.pattern.replace_all(text, self.replacement.as_str())
        } else {
            self.pattern.replacen(text, 1, self.replacement.as_str())
        }
    }
}

/// 把 JS 风格的替换串（`$1`、`$&`、`$<name>`）改写为 regex crate 的 `${1}` 形式，
/// 其余 `$` 按字面量转义。超出分组数的 `$n` 同样保持字面量。
fn normalize_replacement(replacement: &str, captures_len: usize) -> String {
    let chars: Vec<char> = replacement.chars().collect();
    let mut out = String::with_capacity(replacement.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '$' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        match chars.get(i + 1) {
            Some('$') => {
                out.push_str("$$");
                i += 2;
            }
            Some('&') => {
                out.push_str("${0}");
                i += 2;
            }
            Some(d) if d.is_ascii_digit() => {
                let one = d.to_digit(10).unwrap_or(0) as usize;
                let two = chars
                    .get(i + 2)
                    .and_then(|c| c.to_digit(10))
                    .map(|d2| one * 10 + d2 as usize);
                match two {
                    Some(group) if group >= 1 && group < captures_len => {
                        out.push_str(&format!("${{{}}}", group));
                        i += 3;
                    }
                    _ if one >= 1 && one < captures_len => {
                        out.push_str(&format!("${{{}}}", one));
                        i += 2;
                    }
                    // 不存在的分组保持字面量
                    _ => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            Some('<') => {
                let rest: String = chars[i + 2..].iter().collect();
                match rest.find('>') {
                    Some(end) => {
                        out.push_str(&format!("${{{}}}", &rest[..end]));
                        i += 2 + rest[..end].chars().count() + 1;
                    }
                    None => {
                        out.push_str("$$");
                        i += 1;
                    }
                }
            }
            _ => {
                out.push_str("$$");
                i += 1;
            }
        }
    }

    out
}

/// 选择器覆盖规则
#[derive(Debug, Clone)]
pub struct SelectorOverride {
    pub selector: SelectorList,
    pub text: String,
}

/// 单个页面类型的词条
#[derive(Debug, Clone, Default)]
pub struct DictionaryEntry {
    pub static_dict: HashMap<String, String>,
    pub regexp: Vec<RegexRule>,
    pub selector: Vec<SelectorOverride>,
}

impl DictionaryEntry {
    fn compile(page_type: &str, raw: RawEntry) -> I18nResult<Self> {
        let regexp = raw
            .regexp
            .into_iter()
            .map(|rule| {
                let (pattern, replacement, flags) = rule.into_parts();
                RegexRule::new(&pattern, &replacement, &flags).map_err(|e| {
                    I18nError::DictionaryError(format!("页面类型 {}: {}", page_type, e))
                })
            })
            .collect::<I18nResult<Vec<_>>>()?;

        let selector = raw
            .selector
            .into_iter()
            .map(|(selector, text)| {
                Ok(SelectorOverride {
                    selector: SelectorList::parse(&selector)?,
                    text,
                })
            })
            .collect::<I18nResult<Vec<_>>>()?;

        Ok(Self {
            static_dict: raw.static_dict,
            regexp,
            selector,
        })
    }
}

/// 全局规则：忽略选择器、字符数据监视页面和页面路径正则
#[derive(Debug, Clone)]
pub struct GlobalRuleSet {
    pub ignore_mutation_selector_page: HashMap<String, Vec<SelectorList>>,
    pub ignore_selector_page: HashMap<String, Vec<SelectorList>>,
    pub character_data_page: HashSet<String>,
    pub re_page_path_repo: Regex,
    pub re_page_path_org: Regex,
    pub re_page_path: Regex,
}

impl GlobalRuleSet {
    fn compile(raw: RawConf) -> I18nResult<Self> {
        Ok(Self {
            ignore_mutation_selector_page: compile_selector_map(raw.ignore_mutation_selector_page)?,
            ignore_selector_page: compile_selector_map(raw.ignore_selector_page)?,
            character_data_page: raw.character_data_page.into_iter().collect(),
            re_page_path_repo: Regex::new(&raw.re_page_path_repo)?,
            re_page_path_org: Regex::new(&raw.re_page_path_org)?,
            re_page_path: Regex::new(&raw.re_page_path)?,
        })
    }

    /// 通配规则在前，页面规则在后
    pub fn ignore_mutation_selectors(&self, page_type: &str) -> Vec<SelectorList> {
        merged_selectors(&self.ignore_mutation_selector_page, page_type)
    }

    pub fn ignore_selectors(&self, page_type: &str) -> Vec<SelectorList> {
        merged_selectors(&self.ignore_selector_page, page_type)
    }

    pub fn watches_character_data(&self, page_type: &str) -> bool {
        self.character_data_page.contains(page_type)
    }
}

fn compile_selector_map(
    raw: HashMap<String, Vec<String>>,
) -> I18nResult<HashMap<String, Vec<SelectorList>>> {
    raw.into_iter()
        .map(|(page_type, selectors)| {
            let compiled = selectors
                .iter()
                .map(|s| SelectorList::parse(s))
                .collect::<I18nResult<Vec<_>>>()?;
            Ok((page_type, compiled))
        })
        .collect()
}

fn merged_selectors(map: &HashMap<String, Vec<SelectorList>>, page_type: &str) -> Vec<SelectorList> {
    let wildcard = map.get(WILDCARD_PAGE).into_iter().flatten();
    let specific = if page_type == WILDCARD_PAGE {
        None
    } else {
        map.get(page_type)
    };
    wildcard.chain(specific.into_iter().flatten()).cloned().collect()
}

/// 只读词库
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    version: Option<String>,
    conf: GlobalRuleSet,
    pages: HashMap<String, DictionaryEntry>,
}

impl DictionaryStore {
    pub fn from_json_str(content: &str) -> I18nResult<Self> {
        Self::compile(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> I18nResult<Self> {
        Self::compile(toml::from_str(content)?)
    }

    /// 按扩展名加载词库文件
    pub fn load(path: impl AsRef<Path>) -> I18nResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            I18nError::IoError(format!("读取词库 {} 失败: {}", path.display(), e))
        })?;

        let store = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content)?,
            _ => Self::from_json_str(&content)?,
        };

        tracing::info!(
            "已加载词库 {} (版本 {}, {} 个页面类型)",
            path.display(),
            store.version().unwrap_or("unknown"),
            store.pages.len()
        );
        Ok(store)
    }

    fn compile(raw: RawStore) -> I18nResult<Self> {
        let conf = GlobalRuleSet::compile(raw.conf)?;
        let pages = raw
            .pages
            .into_iter()
            .map(|(page_type, entry)| {
                let compiled = DictionaryEntry::compile(&page_type, entry)?;
                Ok((page_type, compiled))
            })
            .collect::<I18nResult<HashMap<_, _>>>()?;

        Ok(Self {
            version: raw.version,
            conf,
            pages,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn conf(&self) -> &GlobalRuleSet {
        &self.conf
    }

    pub fn entry(&self, page_type: &str) -> Option<&DictionaryEntry> {
        self.pages.get(page_type)
    }

    pub fn has_page(&self, page_type: &str) -> bool {
        self.pages.contains_key(page_type)
    }

    pub fn public(&self) -> Option<&DictionaryEntry> {
        self.entry(PUBLIC_ENTRY)
    }

    pub fn title(&self) -> Option<&DictionaryEntry> {
        self.entry(TITLE_ENTRY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r##"{
        "version": "test",
        "conf": {
            "ignoreMutationSelectorPage": { "*": [".markdown-body"], "repository": ["table.files"] },
            "ignoreSelectorPage": { "*": ["pre"] },
            "characterDataPage": ["repository/pulls"],
            "rePagePathRepo": "^/[^/]+/[^/]+/(issues|pulls)",
            "rePagePathOrg": "^/orgs/[^/]+/(people)",
            "rePagePath": "^/(settings)"
        },
        "public": {
            "static": { "Issues": "议题" },
            "regexp": [
                ["^(\\d+) commits?$", "$1 次提交"],
                ["^Edited (\\d+)x$", "已编辑 $1 次", "i"],
                { "pattern": "foo", "replacement": "bar", "flags": "g" }
            ],
            "selector": [["#repo-title", "仓库"]]
        },
        "repository": { "static": {} }
    }"##;

    #[test]
    fn test_load_minimal_store() {
        let store = DictionaryStore::from_json_str(MINIMAL).unwrap();
        assert_eq!(store.version(), Some("test"));
        assert!(store.has_page("public"));
        assert!(store.has_page("repository"));
        assert!(!store.has_page("conf"));

        let public = store.public().unwrap();
        assert_eq!(public.regexp.len(), 3);
        assert_eq!(public.selector[0].text, "仓库");
        assert!(store.conf().watches_character_data("repository/pulls"));
    }

    #[test]
    fn test_selector_merge_order() {
        let store = DictionaryStore::from_json_str(MINIMAL).unwrap();
        let merged = store.conf().ignore_mutation_selectors("repository");
        let sources: Vec<&str> = merged.iter().map(|s| s.as_str()).collect();
        assert_eq!(sources, vec![".markdown-body", "table.files"]);
        assert_eq!(store.conf().ignore_mutation_selectors("dashboard").len(), 1);
    }

    #[test]
    fn test_rule_flags_and_replacement() {
        let rule = RegexRule::new("^(\\d+) commits?$", "$1 次提交", "").unwrap();
        assert_eq!(rule.apply("3 commits"), "3 次提交");
        assert_eq!(rule.apply("0 commit"), "0 次提交");

        let insensitive = RegexRule::new("^edited (\\d+)x$", "已编辑 $1 次", "i").unwrap();
        assert_eq!(insensitive.apply("Edited 2x"), "已编辑 2 次");

        let first_only = RegexRule::new("o", "0", "").unwrap();
        assert_eq!(first_only.apply("foo"), "f0o");
        let global = RegexRule::new("o", "0", "g").unwrap();
        assert_eq!(global.apply("foo"), "f00");
    }

    #[test]
    fn test_replacement_normalization() {
        assert_eq!(normalize_replacement("$1abc", 2), "${1}abc");
        assert_eq!(normalize_replacement("$12", 2), "${1}2");
        assert_eq!(normalize_replacement("$12", 13), "${12}");
        assert_eq!(normalize_replacement("[$&]", 1), "[${0}]");
        assert_eq!(normalize_replacement("$<n> $$ $x", 2), "${n} $$ $$x");
        assert_eq!(normalize_replacement("$1-$5 $0", 2), "${1}-$$5 $$0");
    }

    #[test]
    fn test_missing_group_stays_literal() {
        let rule = RegexRule::new("^(a)b$", "$1-$5", "").unwrap();
        assert_eq!(rule.apply("ab"), "a-$5");

        let no_groups = RegexRule::new("^Sponsor$", "$1 赞助", "").unwrap();
        assert_eq!(no_groups.apply("Sponsor"), "$1 赞助");
    }

    #[test]
    fn test_invalid_rules_are_rejected() {
        assert!(RegexRule::new("(", "", "").is_err());
        assert!(RegexRule::new("a", "", "y").is_err());

        let bad_selector = MINIMAL.replace("\"#repo-title\"", "\"div >\"");
        assert!(matches!(
            DictionaryStore::from_json_str(&bad_selector),
            Err(I18nError::SelectorError(_))
        ));
    }
}
