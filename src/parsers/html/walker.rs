//! DOM遍历器模块
//!
//! 节点翻译器：对一个节点按元素种类翻译属性，再递归处理子节点。
//! 初次加载时对 `<body>` 整体调用一次，之后每个相关的突变节点各调用一次。
//!
//! # 幂等性
//!
//! 每次尝试都是"读取 → 解析 → 仅在结果不同时写回"。译文再次解析总是未命中，
//! 所以对同一节点翻译两次与翻译一次的结果逐字节相同，
//! 自身写入产生的突变记录再次进入观察者时也不会造成循环。
//!
//! # 使用示例
//!
//! ```rust,ignore
//! let translator = NodeTranslator::new(&document, &context, flags, &time_watchers);
//! translator.translate(&document.body().unwrap())?;
//! ```

use markup5ever_rcdom::Handle;

use crate::translation::context::PageContext;
use crate::translation::error::{I18nError, I18nResult};
use crate::translation::filters::utf16_len;
use crate::translation::flags::FeatureFlags;
use crate::translation::resolver::resolve;
use crate::translation::time_element::{trans_time_element, TimeElementWatchers};
use crate::translation::config::constants::MAX_TEXT_NODE_LENGTH;

use super::document::Document;
use super::dom::{get_node_attr, get_text_data, is_text};
use super::element_handlers::{active_steps, ElementKind};

/// 节点翻译器
///
/// 只持有借用：上下文在一次批处理中不会变化，换页时由引擎构造新的翻译器。
pub struct NodeTranslator<'a> {
    document: &'a Document,
    context: &'a PageContext,
    flags: FeatureFlags,
    time_watchers: &'a TimeElementWatchers,
}

impl<'a> NodeTranslator<'a> {
    pub fn new(
        document: &'a Document,
        context: &'a PageContext,
        flags: FeatureFlags,
        time_watchers: &'a TimeElementWatchers,
    ) -> Self {
        Self {
            document,
            context,
            flags,
            time_watchers,
        }
    }

    /// 翻译节点及其子树
    ///
    /// 只有节点自身无法处理时返回错误；子树中的故障记录日志后跳过，不影响兄弟节点。
    pub fn translate(&self, node: &Handle) -> I18nResult<()> {
        if self.is_ignored(node) {
            return Ok(());
        }

        if is_text(node) {
            self.translate_text(node);
            return Ok(());
        }

        let Some(kind) = ElementKind::of(node) else {
            return Ok(());
        };

        if kind.is_terminal() {
            return self.translate_time_element(node);
        }

        for attr in active_steps(kind, node) {
            self.translate_attribute(node, attr);
        }

        let children: Vec<Handle> = node.children.borrow().iter().cloned().collect();
        for child in &children {
            if let Err(e) = self.translate(child) {
                tracing::error!("翻译子节点失败: {}", e);
            }
        }

        Ok(())
    }

    fn is_ignored(&self, node: &Handle) -> bool {
        self.context
            .ignore_selectors()
            .iter()
            .any(|selector| selector.matches(node))
    }

    fn translate_attribute(&self, node: &Handle, attr: &str) {
        let Some(current) = get_node_attr(node, attr).filter(|value| !value.is_empty()) else {
            return;
        };

        if let Some(translated) = resolve(&current, self.context, self.flags) {
            if translated != current {
                self.document.set_attribute(node, attr, &translated);
            }
        }
    }

    fn translate_text(&self, node: &Handle) {
        let Some(current) = get_text_data(node).filter(|text| !text.is_empty()) else {
            return;
        };

        if utf16_len(&current) > MAX_TEXT_NODE_LENGTH {
            return;
        }

        if let Some(translated) = resolve(&current, self.context, self.flags) {
            if translated != current {
                self.document.set_text_data(node, &translated);
            }
        }
    }

    fn translate_time_element(&self, node: &Handle) -> I18nResult<()> {
        let shadow_root = self.document.shadow_root(node).ok_or_else(|| {
            I18nError::TranslatorFault("relative-time 元素没有 shadow root".to_string())
        })?;

        trans_time_element(self.document, &shadow_root);
        self.time_watchers.watch(self.document, &shadow_root);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::find_nodes;
    use crate::translation::context::PageType;
    use crate::translation::dictionary::DictionaryStore;
    use url::Url;

    const STORE: &str = r##"{
        "conf": {
            "ignoreSelectorPage": { "*": ["pre", ".no-translate"] },
            "rePagePathRepo": "x", "rePagePathOrg": "y", "rePagePath": "z"
        },
        "public": {
            "static": {
                "Issues": "议题",
                "Search": "搜索",
                "Delete": "删除",
                "Are you sure?": "确定吗？",
                "Copy": "复制"
            }
        },
        "repository": {}
    }"##;

    fn setup(html: &str) -> (Document, PageContext) {
        let url = Url::parse("https://github.com/").unwrap();
        let doc = Document::parse(html.as_bytes(), "utf-8", url).unwrap();
        let store = DictionaryStore::from_json_str(STORE).unwrap();
        let ctx = PageContext::build(PageType::from("repository"), &store);
        (doc, ctx)
    }

    fn run(doc: &Document, ctx: &PageContext) -> I18nResult<()> {
        let watchers = TimeElementWatchers::new();
        NodeTranslator::new(doc, ctx, FeatureFlags::default(), &watchers).translate(&doc.body().unwrap())
    }

    fn attr(doc: &Document, tag: &str, name: &str) -> Option<String> {
        get_node_attr(&find_nodes(&doc.root(), &[tag]).remove(0), name)
    }

    #[test]
    fn test_text_and_attributes() {
        let (doc, ctx) = setup(
            "<a title=\"Issues\" aria-label=\"Search\">Issues</a>\
             <input placeholder=\"Search\" value=\"Search\">\
             <button data-confirm=\"Are you sure?\" aria-label=\"Delete\">Delete</button>",
        );
        run(&doc, &ctx).unwrap();

        assert_eq!(attr(&doc, "a", "title").as_deref(), Some("议题"));
        assert_eq!(attr(&doc, "a", "aria-label").as_deref(), Some("搜索"));
        assert_eq!(attr(&doc, "input", "placeholder").as_deref(), Some("搜索"));
        assert_eq!(attr(&doc, "input", "value").as_deref(), Some("Search"));
        assert_eq!(attr(&doc, "button", "data-confirm").as_deref(), Some("确定吗？"));
        // 没有 tooltipped 样式
        assert_eq!(attr(&doc, "button", "aria-label").as_deref(), Some("Delete"));
        assert_eq!(doc.text_content(&doc.body().unwrap()), "议题删除");
    }

    #[test]
    fn test_ignored_elements_skip_subtree() {
        let (doc, ctx) = setup("<pre>Issues<span>Copy</span></pre><div class=\"no-translate x\">Copy</div><p>Copy</p>");
        run(&doc, &ctx).unwrap();
        assert_eq!(doc.text_content(&doc.body().unwrap()), "IssuesCopyCopy复制");
    }

    #[test]
    fn test_long_text_nodes_are_skipped() {
        let long = format!("Issues{}", " ".repeat(600));
        let (doc, ctx) = setup(&format!("<p>{}</p><p> Issues </p>", long));
        run(&doc, &ctx).unwrap();
        let paragraphs = find_nodes(&doc.root(), &["p"]);
        assert_eq!(doc.text_content(&paragraphs[0]), long);
        assert_eq!(doc.text_content(&paragraphs[1]), " 议题 ");
    }

    #[test]
    fn test_time_element_without_shadow_root_is_contained() {
        let (doc, ctx) = setup("<relative-time>on Jan 5</relative-time><p>Issues</p>");
        assert!(run(&doc, &ctx).is_ok());
        assert_eq!(doc.text_content(&doc.body().unwrap()), "on Jan 5议题");

        let time = find_nodes(&doc.root(), &["relative-time"]).remove(0);
        let watchers = TimeElementWatchers::new();
        let result = NodeTranslator::new(&doc, &ctx, FeatureFlags::default(), &watchers).translate(&time);
        assert!(matches!(result, Err(I18nError::TranslatorFault(_))));
    }

    #[test]
    fn test_time_element_with_shadow_root() {
        let (doc, ctx) = setup("<relative-time>light</relative-time>");
        let time = find_nodes(&doc.root(), &["relative-time"]).remove(0);
        let shadow = doc.attach_shadow(&time);
        doc.set_text_content(&shadow, "on Mar 3");

        let watchers = TimeElementWatchers::new();
        NodeTranslator::new(&doc, &ctx, FeatureFlags::default(), &watchers)
            .translate(&time)
            .unwrap();
        assert_eq!(doc.text_content(&shadow), " Mar 3");
        assert_eq!(doc.text_content(&time), "light");
        assert_eq!(watchers.len(), 1);
    }

    #[test]
    fn test_translate_twice_is_identical() {
        let (doc, ctx) = setup("<span title=\"Issues\"> Issues </span>");
        run(&doc, &ctx).unwrap();
        let once = doc.text_content(&doc.body().unwrap());
        run(&doc, &ctx).unwrap();
        assert_eq!(doc.text_content(&doc.body().unwrap()), once);
        assert_eq!(attr(&doc, "span", "title").as_deref(), Some("议题"));
    }
}
