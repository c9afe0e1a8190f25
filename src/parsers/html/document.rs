//! 页面文档模型
//!
//! 在没有浏览器的环境里模拟一个"活"的页面：
//!
//! - 一棵 rcdom DOM 树和当前页面 URL
//! - 挂在宿主元素上的 shadow root（其内部变化对普通观察者不可见）
//! - 类似 MutationObserver 的观察者注册表：所有写操作（包括翻译引擎自己的写入）
//!   都会生成突变记录，并按注册条件投递到各观察者的待处理队列
//!
//! 宿主脚本（测试、CLI、嵌入方）通过本模块的写方法修改页面，
//! 再由引擎按"事件循环轮次"取出记录进行处理。

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};
use url::Url;

use super::dom::{
    detach, find_nodes, get_child_node_by_name, get_node_attr, get_parent_node,
    html_to_dom, insert_child_at, is_inclusive_ancestor, new_element, new_text, set_node_attr,
    text_content,
};
use crate::translation::error::I18nResult;

/// 观察者标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(usize);

/// 突变类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// 一条突变记录
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: Handle,
    pub added_nodes: Vec<Handle>,
    pub removed_nodes: Vec<Handle>,
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    fn child_list(target: &Handle, added_nodes: Vec<Handle>, removed_nodes: Vec<Handle>) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target: target.clone(),
            added_nodes,
            removed_nodes,
            attribute_name: None,
        }
    }

    fn attribute(target: &Handle, name: &str) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target: target.clone(),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.to_string()),
        }
    }

    fn character_data(target: &Handle) -> Self {
        Self {
            kind: MutationKind::CharacterData,
            target: target.clone(),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: None,
        }
    }
}

/// 观察选项
#[derive(Debug, Clone, Default)]
pub struct ObserverInit {
    pub child_list: bool,
    pub subtree: bool,
    pub character_data: bool,
    pub attributes: bool,
    /// 仅观察列出的属性；设置后隐含 `attributes`
    pub attribute_filter: Option<Vec<String>>,
}

impl ObserverInit {
    fn accepts(&self, record: &MutationRecord) -> bool {
        match record.kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes => match &self.attribute_filter {
                Some(filter) => record
                    .attribute_name
                    .as_ref()
                    .is_some_and(|name| filter.iter().any(|f| f == name)),
                None => self.attributes,
            },
        }
    }
}

struct Registration {
    id: ObserverId,
    target: Handle,
    init: ObserverInit,
    pending: Vec<MutationRecord>,
}

/// 活动页面文档
pub struct Document {
    dom: RcDom,
    url: RefCell<Url>,
    shadow_roots: RefCell<Vec<(Handle, Handle)>>,
    observers: RefCell<Vec<Registration>>,
    next_observer: Cell<usize>,
}

impl Document {
    /// 解析 HTML 字节并绑定页面 URL
    pub fn parse(data: &[u8], encoding: &str, url: Url) -> I18nResult<Self> {
        Ok(Self::from_dom(html_to_dom(data, encoding)?, url))
    }

    pub fn from_dom(dom: RcDom, url: Url) -> Self {
        Self {
            dom,
            url: RefCell::new(url),
            shadow_roots: RefCell::new(Vec::new()),
            observers: RefCell::new(Vec::new()),
            next_observer: Cell::new(0),
        }
    }

    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    /// 文档根节点
    pub fn root(&self) -> Handle {
        self.dom.document.clone()
    }

    pub fn url(&self) -> Url {
        self.url.borrow().clone()
    }

    /// 客户端路由跳转（history.pushState），不产生突变记录
    pub fn set_url(&self, url: Url) {
        *self.url.borrow_mut() = url;
    }

    pub fn html_element(&self) -> Option<Handle> {
        get_child_node_by_name(&self.dom.document, "html")
    }

    pub fn head(&self) -> Option<Handle> {
        find_nodes(&self.dom.document, &["html", "head"]).into_iter().next()
    }

    pub fn body(&self) -> Option<Handle> {
        find_nodes(&self.dom.document, &["html", "body"]).into_iter().next()
    }

    /// 获取（必要时创建）元素的 shadow root
    pub fn attach_shadow(&self, host: &Handle) -> Handle {
        if let Some(root) = self.shadow_root(host) {
            return root;
        }
        let root = Node::new(NodeData::Document);
        self.shadow_roots
            .borrow_mut()
            .push((host.clone(), root.clone()));
        root
    }

    pub fn shadow_root(&self, host: &Handle) -> Option<Handle> {
        self.shadow_roots
            .borrow()
            .iter()
            .find(|(h, _)| Rc::ptr_eq(h, host))
            .map(|(_, root)| root.clone())
    }

    /// 注册观察者
    pub fn observe(&self, target: &Handle, init: ObserverInit) -> ObserverId {
        let id = ObserverId(self.next_observer.get());
        self.next_observer.set(id.0 + 1);
        self.observers.borrow_mut().push(Registration {
            id,
            target: target.clone(),
            init,
            pending: Vec::new(),
        });
        id
    }

    /// 取出观察者的全部待处理记录（一个批次）
    pub fn take_records(&self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .borrow_mut()
            .iter_mut()
            .find(|reg| reg.id == id)
            .map(|reg| std::mem::take(&mut reg.pending))
            .unwrap_or_default()
    }

    pub fn has_pending_records(&self) -> bool {
        self.observers
            .borrow()
            .iter()
            .any(|reg| !reg.pending.is_empty())
    }

    fn queue_record(&self, record: MutationRecord) {
        for reg in self.observers.borrow_mut().iter_mut() {
            if !reg.init.accepts(&record) {
                continue;
            }
            let in_scope = Rc::ptr_eq(&reg.target, &record.target)
                || (reg.init.subtree && is_inclusive_ancestor(&reg.target, &record.target));
            if in_scope {
                reg.pending.push(record.clone());
            }
        }
    }

    pub fn get_attribute(&self, node: &Handle, name: &str) -> Option<String> {
        get_node_attr(node, name)
    }

    pub fn set_attribute(&self, node: &Handle, name: &str, value: &str) {
        set_node_attr(node, name, Some(value.to_string()));
        self.queue_record(MutationRecord::attribute(node, name));
    }

    /// 修改文本节点内容（characterData）
    pub fn set_text_data(&self, node: &Handle, value: &str) {
        if let NodeData::Text { contents } = &node.data {
            let mut contents = contents.borrow_mut();
            contents.clear();
            contents.push_slice(value);
        } else {
            return;
        }
        self.queue_record(MutationRecord::character_data(node));
    }

    /// 设置 textContent：文本节点改内容，其它节点替换全部子节点
    pub fn set_text_content(&self, node: &Handle, text: &str) {
        if matches!(node.data, NodeData::Text { .. }) {
            self.set_text_data(node, text);
            return;
        }

        let removed: Vec<Handle> = node.children.borrow_mut().drain(..).collect();
        for child in &removed {
            child.parent.set(None);
        }

        let mut added = Vec::new();
        if !text.is_empty() {
            let text_node = new_text(text);
            insert_child_at(node, 0, &text_node);
            added.push(text_node);
        }
        self.queue_record(MutationRecord::child_list(node, added, removed));
    }

    pub fn text_content(&self, node: &Handle) -> String {
        text_content(node)
    }

    pub fn create_element(&self, tag: &str, attrs: &[(&str, &str)]) -> Handle {
        new_element(tag, attrs)
    }

    pub fn create_text(&self, text: &str) -> Handle {
        new_text(text)
    }

    pub fn append_child(&self, parent: &Handle, child: &Handle) {
        let index = parent.children.borrow().len();
        self.insert_child(parent, index, child);
    }

    /// 在参考节点之后插入新节点（insertAdjacent "afterend"）
    pub fn insert_after(&self, reference: &Handle, new_node: &Handle) -> bool {
        let Some(parent) = get_parent_node(reference) else {
            return false;
        };
        let index = parent
            .children
            .borrow()
            .iter()
            .position(|child| Rc::ptr_eq(child, reference))
            .map_or(0, |i| i + 1);
        self.insert_child(&parent, index, new_node);
        true
    }

    fn insert_child(&self, parent: &Handle, index: usize, child: &Handle) {
        if let Some(old_parent) = detach(child) {
            self.queue_record(MutationRecord::child_list(
                &old_parent,
                Vec::new(),
                vec![child.clone()],
            ));
        }
        insert_child_at(parent, index, child);
        self.queue_record(MutationRecord::child_list(parent, vec![child.clone()], Vec::new()));
    }

    pub fn remove(&self, node: &Handle) {
        if let Some(parent) = detach(node) {
            self.queue_record(MutationRecord::child_list(&parent, Vec::new(), vec![node.clone()]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(html: &str) -> Document {
        let url = Url::parse("https://github.com/").unwrap();
        Document::parse(html.as_bytes(), "utf-8", url).unwrap()
    }

    fn subtree_init() -> ObserverInit {
        ObserverInit {
            child_list: true,
            subtree: true,
            character_data: true,
            attribute_filter: Some(vec!["title".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_records_are_queued_for_subtree_observer() {
        let doc = document("<div id=\"a\"><span>x</span></div>");
        let body = doc.body().unwrap();
        let id = doc.observe(&body, subtree_init());

        let span = find_nodes(&doc.root(), &["span"]).remove(0);
        doc.set_attribute(&span, "title", "hello");
        doc.set_attribute(&span, "class", "ignored-by-filter");
        doc.append_child(&span, &doc.create_text("y"));

        let records = doc.take_records(id);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, MutationKind::Attributes);
        assert_eq!(records[1].kind, MutationKind::ChildList);
        assert_eq!(records[1].added_nodes.len(), 1);
        assert!(doc.take_records(id).is_empty());
    }

    #[test]
    fn test_shadow_root_mutations_are_not_seen_by_body_observer() {
        let doc = document("<relative-time></relative-time>");
        let body = doc.body().unwrap();
        let id = doc.observe(&body, subtree_init());

        let host = find_nodes(&doc.root(), &["relative-time"]).remove(0);
        let shadow = doc.attach_shadow(&host);
        assert!(Rc::ptr_eq(&shadow, &doc.attach_shadow(&host)));
        doc.set_text_content(&shadow, "on Jan 5");

        assert!(doc.take_records(id).is_empty());
        assert_eq!(doc.text_content(&shadow), "on Jan 5");
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let doc = document("<p>a<b>b</b></p>");
        let p = find_nodes(&doc.root(), &["p"]).remove(0);
        let id = doc.observe(&p, subtree_init());

        doc.set_text_content(&p, "new");
        let records = doc.take_records(id);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].removed_nodes.len(), 2);
        assert_eq!(doc.text_content(&p), "new");
    }

    #[test]
    fn test_insert_after_places_node_next_to_reference() {
        let doc = document("<div><p>a</p><p>c</p></div>");
        let first = find_nodes(&doc.root(), &["p"]).remove(0);
        let b = doc.create_element("p", &[("id", "b")]);
        doc.append_child(&b, &doc.create_text("b"));
        assert!(doc.insert_after(&first, &b));

        let div = find_nodes(&doc.root(), &["div"]).remove(0);
        assert_eq!(doc.text_content(&div), "abc");
    }
}
