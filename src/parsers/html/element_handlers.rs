//! HTML 元素翻译计划模块
//!
//! 本模块按元素种类给出需要尝试翻译的属性列表。
//! 元素种类是一个封闭集合，每个种类对应一张静态的属性步骤表，
//! 遍历器按表中顺序逐个尝试翻译，然后（除时间元素外）递归处理子节点。
//!
//! # 种类与属性
//!
//! | 种类 | 属性 |
//! |------|------|
//! | `relative-time` | 不翻译属性，处理 shadow root 文本 |
//! | 按钮类 `input`/`textarea` | `data-confirm`, `value` |
//! | 其它 `input`/`textarea` | `placeholder` |
//! | `button` | `aria-label`*, `title`, `data-confirm`, `data-confirm-text`, `data-confirm-cancel-text`, `cancel-confirm-text`, `data-disable-with` |
//! | `optgroup` | `label` |
//! | `a` | `title`, `aria-label` |
//! | `span` | `title`, `aria-label`*, `data-visible-text` |
//! | 其它元素 | `aria-label`* |
//!
//! 标 * 的属性只在元素 class 含有 `tooltipped` 时翻译。

use markup5ever_rcdom::Handle;

use super::dom::{get_node_attr, get_node_name};

/// 提示样式标记
pub const TOOLTIP_MARKER: &str = "tooltipped";

/// 表单按钮类型
const BUTTON_INPUT_TYPES: &[&str] = &["button", "submit", "reset"];

/// 单个属性翻译步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrStep {
    pub attr: &'static str,
    /// 只有带提示样式的元素才翻译该属性
    pub tooltipped_only: bool,
}

const fn always(attr: &'static str) -> AttrStep {
    AttrStep {
        attr,
        tooltipped_only: false,
    }
}

const fn tooltipped(attr: &'static str) -> AttrStep {
    AttrStep {
        attr,
        tooltipped_only: true,
    }
}

const FORM_BUTTON_PLAN: &[AttrStep] = &[always("data-confirm"), always("value")];

const FORM_FIELD_PLAN: &[AttrStep] = &[always("placeholder")];

const BUTTON_PLAN: &[AttrStep] = &[
    tooltipped("aria-label"),
    always("title"),
    always("data-confirm"),
    always("data-confirm-text"),
    always("data-confirm-cancel-text"),
    always("cancel-confirm-text"),
    always("data-disable-with"),
];

const OPTGROUP_PLAN: &[AttrStep] = &[always("label")];

const ANCHOR_PLAN: &[AttrStep] = &[always("title"), always("aria-label")];

const SPAN_PLAN: &[AttrStep] = &[
    always("title"),
    tooltipped("aria-label"),
    always("data-visible-text"),
];

const OTHER_PLAN: &[AttrStep] = &[tooltipped("aria-label")];

/// 元素种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    RelativeTime,
    FormButton,
    FormField,
    Button,
    OptGroup,
    Anchor,
    Span,
    Other,
}

impl ElementKind {
    /// 判断元素种类，非元素节点返回 `None`
    pub fn of(node: &Handle) -> Option<Self> {
        let kind = match get_node_name(node)? {
            "relative-time" => ElementKind::RelativeTime,
            "input" | "textarea" => {
                let input_type = get_node_attr(node, "type")
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                if BUTTON_INPUT_TYPES.contains(&input_type.as_str()) {
                    ElementKind::FormButton
                } else {
                    ElementKind::FormField
                }
            }
            "button" => ElementKind::Button,
            "optgroup" => ElementKind::OptGroup,
            "a" => ElementKind::Anchor,
            "span" => ElementKind::Span,
            _ => ElementKind::Other,
        };
        Some(kind)
    }

    /// 按顺序尝试的属性步骤
    pub fn plan(&self) -> &'static [AttrStep] {
        match self {
            ElementKind::RelativeTime => &[],
            ElementKind::FormButton => FORM_BUTTON_PLAN,
            ElementKind::FormField => FORM_FIELD_PLAN,
            ElementKind::Button => BUTTON_PLAN,
            ElementKind::OptGroup => OPTGROUP_PLAN,
            ElementKind::Anchor => ANCHOR_PLAN,
            ElementKind::Span => SPAN_PLAN,
            ElementKind::Other => OTHER_PLAN,
        }
    }

    /// 终止种类不递归子节点
    pub fn is_terminal(&self) -> bool {
        matches!(self, ElementKind::RelativeTime)
    }
}

/// 元素的 class 中是否含有提示样式标记（子串匹配）
pub fn is_tooltipped(node: &Handle) -> bool {
    get_node_attr(node, "class").is_some_and(|class| class.contains(TOOLTIP_MARKER))
}

/// 过滤出对该元素生效的属性步骤
pub fn active_steps(kind: ElementKind, node: &Handle) -> impl Iterator<Item = &'static str> {
    let tooltipped = is_tooltipped(node);
    kind.plan()
        .iter()
        .filter(move |step| !step.tooltipped_only || tooltipped)
        .map(|step| step.attr)
}
