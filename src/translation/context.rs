//! 页面上下文
//!
//! 一个页面类型对应的合并词表。上下文构建后不可变，页面类型变化时整体替换。

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::parsers::html::selector::SelectorList;
use crate::translation::dictionary::{DictionaryStore, RegexRule, SelectorOverride};

/// 页面类型标签，如 `repository/issues`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageType(String);

impl PageType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// 当前页面类型的合并词表
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    page_type: Option<PageType>,
    static_dict: HashMap<String, String>,
    regexp_rules: Vec<RegexRule>,
    ignore_mutation_selectors: Vec<SelectorList>,
    ignore_selectors: Vec<SelectorList>,
    watch_character_data: bool,
    tran_selectors: Vec<SelectorOverride>,
}

impl PageContext {
    /// 没有页面类型的上下文：不翻译任何内容
    pub fn inert() -> Self {
        Self::default()
    }

    /// 由页面类型和词库构建上下文
    ///
    /// `public` 词条在前，页面词条在后：静态表中页面词条覆盖同名键，
    /// 正则规则按 `public`、页面的顺序拼接。
    pub fn build(page_type: PageType, store: &DictionaryStore) -> Self {
        let mut static_dict = HashMap::new();
        let mut regexp_rules = Vec::new();
        let mut tran_selectors = Vec::new();

        let entries = [store.public(), store.entry(page_type.as_str())];
        for entry in entries.into_iter().flatten() {
            static_dict.extend(
                entry
                    .static_dict
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
            regexp_rules.extend(entry.regexp.iter().cloned());
            tran_selectors.extend(entry.selector.iter().cloned());
        }

        let conf = store.conf();
        Self {
            static_dict,
            regexp_rules,
            ignore_mutation_selectors: conf.ignore_mutation_selectors(page_type.as_str()),
            ignore_selectors: conf.ignore_selectors(page_type.as_str()),
            watch_character_data: conf.watches_character_data(page_type.as_str()),
            tran_selectors,
            page_type: Some(page_type),
        }
    }

    /// 按新的分类结果更新上下文
    ///
    /// 页面类型未变化时返回同一个 `Rc`，不重建。
    pub fn update(
        current: &Rc<PageContext>,
        page_type: Option<PageType>,
        store: &DictionaryStore,
    ) -> Rc<PageContext> {
        if current.page_type == page_type {
            return Rc::clone(current);
        }

        tracing::debug!(
            "页面类型变化: {:?} -> {:?}",
            current.page_type.as_ref().map(PageType::as_str),
            page_type.as_ref().map(PageType::as_str)
        );

        Rc::new(match page_type {
            Some(page_type) => Self::build(page_type, store),
            None => Self::inert(),
        })
    }

    pub fn page_type(&self) -> Option<&PageType> {
        self.page_type.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.page_type.is_some()
    }

    pub fn lookup_static(&self, key: &str) -> Option<&str> {
        self.static_dict.get(key).map(String::as_str)
    }

    pub fn regexp_rules(&self) -> &[RegexRule] {
        &self.regexp_rules
    }

    pub fn ignore_mutation_selectors(&self) -> &[SelectorList] {
        &self.ignore_mutation_selectors
    }

    pub fn ignore_selectors(&self) -> &[SelectorList] {
        &self.ignore_selectors
    }

    pub fn watch_character_data(&self) -> bool {
        self.watch_character_data
    }

    pub fn tran_selectors(&self) -> &[SelectorOverride] {
        &self.tran_selectors
    }
}
