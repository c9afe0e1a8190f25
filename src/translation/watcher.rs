//! 突变观察者
//!
//! 状态机 `Idle → Active`。挂载后观察整个 `<body>`，每个批次：
//!
//! 1. 与上一批次比较 URL，变化时由引擎重新分类
//! 2. 没有有效页面类型时丢弃批次
//! 3. 把记录展平为候选节点
//! 4. 过滤掉位于忽略区域内的候选
//! 5. 逐个交给节点翻译器，单个节点失败只记录日志

use markup5ever_rcdom::Handle;
use url::Url;

use crate::parsers::html::document::{Document, MutationKind, MutationRecord, ObserverId, ObserverInit};
use crate::parsers::html::dom::get_parent_element;
use crate::parsers::html::selector::SelectorList;
use crate::parsers::html::walker::NodeTranslator;
use crate::translation::config::constants::OBSERVED_ATTRIBUTES;

/// 观察者状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatcherState {
    Idle,
    Active {
        observer: ObserverId,
        previous_url: Url,
    },
}

/// 一个待处理批次
#[derive(Debug)]
pub struct MutationBatch {
    pub records: Vec<MutationRecord>,
    /// 自上一批次以来 URL 是否变化
    pub url_changed: bool,
}

/// 批次处理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    pub candidates: usize,
    pub ignored: usize,
    pub faults: usize,
}

/// `<body>` 突变观察者
#[derive(Debug)]
pub struct MutationWatcher {
    state: WatcherState,
}

impl Default for MutationWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MutationWatcher {
    pub fn new() -> Self {
        Self {
            state: WatcherState::Idle,
        }
    }

    pub fn state(&self) -> &WatcherState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, WatcherState::Active { .. })
    }

    /// 开始观察 `<body>`；已挂载或文档没有 body 时不做任何事
    pub fn attach(&mut self, document: &Document) -> bool {
        if self.is_active() {
            return true;
        }

        let Some(body) = document.body() else {
            tracing::warn!("文档没有 <body>，无法挂载突变观察者");
            return false;
        };

        let observer = document.observe(
            &body,
            ObserverInit {
                child_list: true,
                subtree: true,
                character_data: true,
                attributes: true,
                attribute_filter: Some(OBSERVED_ATTRIBUTES.iter().map(|a| a.to_string()).collect()),
            },
        );

        self.state = WatcherState::Active {
            observer,
            previous_url: document.url(),
        };
        tracing::debug!("突变观察者已挂载");
        true
    }

    /// 取出下一个批次；没有待处理记录时返回 `None`
    pub fn next_batch(&mut self, document: &Document) -> Option<MutationBatch> {
        let WatcherState::Active {
            observer,
            previous_url,
        } = &mut self.state
        else {
            return None;
        };

        let records = document.take_records(*observer);
        if records.is_empty() {
            return None;
        }

        let current_url = document.url();
        let url_changed = current_url != *previous_url;
        if url_changed {
            *previous_url = current_url;
        }

        Some(MutationBatch {
            records,
            url_changed,
        })
    }
}

/// 把批次展平为候选节点
///
/// 子节点变化只贡献新增节点，属性变化贡献目标节点，
/// 字符数据变化只在页面类型开启字符数据监视时贡献目标节点。
pub fn collect_candidates(records: &[MutationRecord], watch_character_data: bool) -> Vec<Handle> {
    records
        .iter()
        .flat_map(|record| match record.kind {
            MutationKind::ChildList => record.added_nodes.clone(),
            MutationKind::Attributes => vec![record.target.clone()],
            MutationKind::CharacterData if watch_character_data => vec![record.target.clone()],
            MutationKind::CharacterData => Vec::new(),
        })
        .collect()
}

/// 候选节点的父元素（或其祖先）是否匹配忽略选择器
pub fn is_in_ignored_region(node: &Handle, selectors: &[SelectorList]) -> bool {
    let Some(parent) = get_parent_element(node) else {
        return false;
    };
    selectors
        .iter()
        .any(|selector| selector.closest(&parent).is_some())
}

/// 处理一批候选节点
pub fn process_candidates(
    translator: &NodeTranslator<'_>,
    candidates: &[Handle],
    ignore_mutation_selectors: &[SelectorList],
) -> BatchReport {
    let mut report = BatchReport {
        candidates: candidates.len(),
        ..Default::default()
    };

    for node in candidates {
        if is_in_ignored_region(node, ignore_mutation_selectors) {
            report.ignored += 1;
            continue;
        }

        if let Err(e) = translator.translate(node) {
            report.faults += 1;
            tracing::error!("突变节点翻译失败 [{}]: {}", e.severity(), e);
        }
    }

    report
}
