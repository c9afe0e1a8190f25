//! HTML 文档元数据处理模块
//!
//! 此模块提供页面分类和翻译所需的元数据读写功能，包括：
//! - 提取和修改文档标题
//! - 读取 `<meta name="...">` 标签内容
//! - 读取 `<body>` 的 class 标记
//! - 读取和强制设置 `<html lang>`
//!
//! 写操作都经过 [`Document`]，以便像真实页面一样产生突变记录。

use markup5ever_rcdom::Handle;

use super::document::Document;
use super::dom::{find_nodes, get_node_attr, get_text_data, is_text};

/// 获取文档标题
///
/// 从 HTML 文档的 `<title>` 标签中提取文本内容。
/// 只返回第一个 title 标签的文本内容。
///
/// # 参数
///
/// * `node` - HTML 文档的根节点句柄
///
/// # 返回值
///
/// * `Some(String)` - 如果找到 title 标签且包含文本，返回标题文本
/// * `None` - 如果没有找到 title 标签或标签为空
///
/// # 示例
///
/// ```ignore
/// // 对于包含 <title>Issues · octocat/Hello-World</title> 的文档
/// let title = get_title(&document_handle);
/// assert_eq!(title, Some("Issues · octocat/Hello-World".to_string()));
/// ```
pub fn get_title(node: &Handle) -> Option<String> {
    for title_node in find_nodes(node, &["html", "head", "title"]).iter() {
        for child_node in title_node.children.borrow().iter() {
            if let Some(text) = get_text_data(child_node) {
                return Some(text);
            }
        }
    }

    None
}

/// 设置文档标题
///
/// 修改第一个 `<title>` 标签的文本；如果文档没有 title 标签，
/// 会在 `<head>` 中新建一个。没有 `<head>` 时返回 `false`。
pub fn set_title(document: &Document, title: &str) -> bool {
    if let Some(title_node) = find_nodes(&document.root(), &["html", "head", "title"])
        .into_iter()
        .next()
    {
        let text_node = title_node
            .children
            .borrow()
            .iter()
            .find(|child| is_text(child))
            .cloned();
        match text_node {
            Some(text_node) => document.set_text_data(&text_node, title),
            None => document.set_text_content(&title_node, title),
        }
        return true;
    }

    match document.head() {
        Some(head) => {
            let title_node = document.create_element("title", &[]);
            document.append_child(&title_node, &document.create_text(title));
            document.append_child(&head, &title_node);
            true
        }
        None => false,
    }
}

/// 获取 meta 标签内容
///
/// 查找 `<meta name="..." content="...">` 并返回第一个匹配标签的 content。
///
/// # 示例
///
/// ```ignore
/// // <meta name="analytics-location" content="/<user-name>/<repo-name>">
/// let location = get_meta_content(&document_handle, "analytics-location");
/// ```
pub fn get_meta_content(handle: &Handle, name: &str) -> Option<String> {
    for meta_node in find_nodes(handle, &["html", "head", "meta"]).iter() {
        if get_node_attr(meta_node, "name")
            .unwrap_or_default()
            .eq_ignore_ascii_case(name)
        {
            return get_node_attr(meta_node, "content");
        }
    }

    None
}

/// 获取 `<body>` 上的所有 class
pub fn get_body_classes(handle: &Handle) -> Vec<String> {
    find_nodes(handle, &["html", "body"])
        .first()
        .and_then(|body| get_node_attr(body, "class"))
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// 获取 `<html lang>`
pub fn get_document_lang(handle: &Handle) -> Option<String> {
    find_nodes(handle, &["html"])
        .first()
        .and_then(|html| get_node_attr(html, "lang"))
}

/// 设置 `<html lang>`，值未变化时不写入
pub fn set_document_lang(document: &Document, lang: &str) {
    if let Some(html) = document.html_element() {
        if get_node_attr(&html, "lang").as_deref() != Some(lang) {
            document.set_attribute(&html, "lang", lang);
        }
    }
}
