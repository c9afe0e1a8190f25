//! 每次页面导航完成时运行的一次性处理：页面标题和选择器覆盖

use crate::parsers::html::document::Document;
use crate::parsers::html::metadata::{get_title, set_title};
use crate::translation::context::PageContext;
use crate::translation::dictionary::DictionaryStore;
use crate::translation::resolver::resolve_title;

/// 翻译页面标题，未命中时保持原样。返回是否写入
pub fn translate_title(document: &Document, store: &DictionaryStore) -> bool {
    let Some(title) = get_title(&document.root()) else {
        return false;
    };

    match resolve_title(&title, store) {
        Some(translated) => set_title(document, &translated),
        None => false,
    }
}

/// 按选择器整体替换元素文本，每条规则只替换第一个匹配元素。返回替换数量
pub fn apply_selector_overrides(document: &Document, context: &PageContext) -> usize {
    let root = document.root();
    let mut applied = 0;

    for rule in context.tran_selectors() {
        if let Some(element) = rule.selector.query_selector(&root) {
            document.set_text_content(&element, &rule.text);
            applied += 1;
        }
    }

    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::find_nodes;
    use crate::translation::context::PageType;
    use url::Url;

    const STORE: &str = r##"{
        "conf": { "rePagePathRepo": "x", "rePagePathOrg": "y", "rePagePath": "z" },
        "public": { "selector": [["#title", "标题"], [".missing", "无"]] },
        "title": { "static": { "Notifications": "通知" } },
        "repository": { "selector": [["h2.head", "<b>仓库</b>"]] }
    }"##;

    fn setup(html: &str) -> (Document, DictionaryStore) {
        let url = Url::parse("https://github.com/").unwrap();
        let doc = Document::parse(html.as_bytes(), "utf-8", url).unwrap();
        (doc, DictionaryStore::from_json_str(STORE).unwrap())
    }

    #[test]
    fn test_title_is_kept_when_unmatched() {
        let (doc, store) = setup("<title>Some page</title>");
        assert!(!translate_title(&doc, &store));
        assert_eq!(get_title(&doc.root()).as_deref(), Some("Some page"));

        let (doc, store) = setup("<title>Notifications</title>");
        assert!(translate_title(&doc, &store));
        assert_eq!(get_title(&doc.root()).as_deref(), Some("通知"));
    }

    #[test]
    fn test_selector_overrides_replace_first_match() {
        let (doc, store) = setup(
            "<h1 id=\"title\">Old <i>markup</i></h1><h2 class=\"head\">a</h2><h2 class=\"head\">b</h2>",
        );
        let ctx = PageContext::build(PageType::from("repository"), &store);

        assert_eq!(apply_selector_overrides(&doc, &ctx), 2);
        let h1 = find_nodes(&doc.root(), &["h1"]).remove(0);
        assert_eq!(doc.text_content(&h1), "标题");
        assert!(find_nodes(&doc.root(), &["i"]).is_empty());

        let headings = find_nodes(&doc.root(), &["h2"]);
        // 文本按字面量写入，不解析为标记
        assert_eq!(doc.text_content(&headings[0]), "<b>仓库</b>");
        assert_eq!(doc.text_content(&headings[1]), "b");
    }
}
