//! 时间元素处理
//!
//! `relative-time` 的文本渲染在 shadow root 里，页面脚本会不断刷新。
//! 这里去掉文本开头的 `on`，并在 shadow root 上挂一个只看子节点变化的轻量观察者。

use std::cell::RefCell;
use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::parsers::html::document::{Document, ObserverId, ObserverInit};

const LEADING_TOKEN: &str = "on";

/// 去掉时间文本开头的 `on`
///
/// 有子节点时取最后一个子节点的文本，否则取自身文本；结果变化时整体写回。
pub fn trans_time_element(document: &Document, element: &Handle) {
    let last_child = element.children.borrow().last().cloned();
    let text = match last_child {
        Some(child) => document.text_content(&child),
        None => document.text_content(element),
    };

    if let Some(stripped) = text.strip_prefix(LEADING_TOKEN) {
        document.set_text_content(element, stripped);
    }
}

/// 所有 shadow root 观察者
#[derive(Default)]
pub struct TimeElementWatchers {
    watchers: RefCell<Vec<(Handle, ObserverId)>>,
}

impl TimeElementWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为 shadow root 注册观察者，同一个 shadow root 只注册一次
    pub fn watch(&self, document: &Document, shadow_root: &Handle) {
        let mut watchers = self.watchers.borrow_mut();
        if watchers.iter().any(|(root, _)| Rc::ptr_eq(root, shadow_root)) {
            return;
        }

        let id = document.observe(
            shadow_root,
            ObserverInit {
                child_list: true,
                ..Default::default()
            },
        );
        watchers.push((shadow_root.clone(), id));
    }

    pub fn len(&self) -> usize {
        self.watchers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.borrow().is_empty()
    }

    /// 投递一轮记录：每个批次只处理第一条记录的第一个新增节点
    ///
    /// 返回处理过的批次数。
    pub fn pump(&self, document: &Document) -> usize {
        let ids: Vec<ObserverId> = self.watchers.borrow().iter().map(|(_, id)| *id).collect();
        let mut batches = 0;

        for id in ids {
            let records = document.take_records(id);
            let Some(first) = records.first() else {
                continue;
            };
            batches += 1;
            if let Some(node) = first.added_nodes.first() {
                trans_time_element(document, node);
            }
        }

        batches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::find_nodes;
    use url::Url;

    fn setup() -> (Document, Handle) {
        let url = Url::parse("https://github.com/").unwrap();
        let doc = Document::parse(b"<relative-time></relative-time>", "utf-8", url).unwrap();
        let host = find_nodes(&doc.root(), &["relative-time"]).remove(0);
        let shadow = doc.attach_shadow(&host);
        (doc, shadow)
    }

    #[test]
    fn test_strip_leading_on() {
        let (doc, shadow) = setup();
        doc.set_text_content(&shadow, "on Jan 5");
        trans_time_element(&doc, &shadow);
        assert_eq!(doc.text_content(&shadow), " Jan 5");

        trans_time_element(&doc, &shadow);
        assert_eq!(doc.text_content(&shadow), " Jan 5");
    }

    #[test]
    fn test_watcher_strips_rerendered_text_once_per_root() {
        let (doc, shadow) = setup();
        let watchers = TimeElementWatchers::new();
        watchers.watch(&doc, &shadow);
        watchers.watch(&doc, &shadow);
        assert_eq!(watchers.len(), 1);

        doc.set_text_content(&shadow, "on Feb 1");
        assert_eq!(watchers.pump(&doc), 1);
        assert_eq!(doc.text_content(&shadow), " Feb 1");

        // 写回只改文本节点内容，不再产生子节点记录
        assert_eq!(watchers.pump(&doc), 0);
    }
}
