//! HTML解析和处理模块
//!
//! 这个模块被拆分为多个子模块：
//!
//! - `dom`: 基础DOM操作
//! - `document`: 活动页面模型（URL、shadow root、突变观察者）
//! - `selector`: CSS 选择器匹配
//! - `metadata`: 文档元数据处理
//! - `serializer`: 序列化功能
//! - `element_handlers`: 按元素种类的翻译计划
//! - `walker`: 节点翻译器

pub mod document;
pub mod dom;
pub mod element_handlers;
pub mod metadata;
pub mod selector;
pub mod serializer;
pub mod walker;

pub use document::{Document, MutationKind, MutationRecord, ObserverId, ObserverInit};
pub use dom::{
    find_nodes, get_child_node_by_name, get_node_attr, get_node_name, get_parent_node, html_to_dom,
    set_node_attr,
};
pub use element_handlers::{AttrStep, ElementKind};
pub use metadata::{get_body_classes, get_document_lang, get_meta_content, get_title, set_title};
pub use selector::SelectorList;
pub use serializer::serialize_document;
pub use walker::NodeTranslator;
