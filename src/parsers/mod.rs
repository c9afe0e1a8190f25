//! # 解析器模块
//!
//! 页面模型和 HTML 处理：
//!
//! - HTML解析和DOM操作
//! - 模拟浏览器的活动文档（突变记录、shadow root）
//! - CSS 选择器匹配
//!
//! # 模块组织
//!
//! - `html` - HTML文档解析、DOM操作、元数据处理、节点翻译器

pub mod html;

// Re-export commonly used items for convenience
pub use html::{
    find_nodes, get_node_attr, get_title, html_to_dom, serialize_document, Document,
    NodeTranslator, SelectorList,
};
