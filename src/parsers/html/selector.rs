//! CSS 选择器解析与匹配
//!
//! 词库中的忽略规则和选择器覆盖规则都以 CSS 选择器书写。本模块使用 cssparser
//! 的词法器把选择器解析为一个小型 AST，并在 rcdom 节点上实现 `matches`、
//! `closest` 和 `query_selector`。
//!
//! 支持的语法：
//!
//! - 类型选择器、通配符 `*`、`#id`、`.class`
//! - 属性选择器 `[a]`、`[a=v]`、`[a~=v]`、`[a|=v]`、`[a^=v]`、`[a$=v]`、`[a*=v]`
//! - 伪类 `:first-child`、`:last-child`、`:not(<复合选择器>)`
//! - 后代组合符（空白）与子代组合符 `>`，以及逗号分隔的选择器列表

use std::fmt;

use cssparser::{ParseError, Parser, ParserInput, Token};
use markup5ever_rcdom::{Handle, NodeData};

use super::dom::{get_node_attr, get_node_name, get_parent_element, get_parent_node, is_element};
use crate::translation::error::{I18nError, I18nResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOperator {
    Equal,
    Includes,
    DashMatch,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    operation: Option<(AttrOperator, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PseudoClass {
    FirstChild,
    LastChild,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    universal: bool,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    pseudo: Vec<PseudoClass>,
    negations: Vec<Compound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// 单个复杂选择器：`compounds[i]` 与 `compounds[i + 1]` 之间由 `combinators[i]` 连接
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    compounds: Vec<Compound>,
    combinators: Vec<Combinator>,
}

/// 解析后的选择器列表
#[derive(Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    selectors: Vec<Complex>,
}

impl fmt::Debug for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SelectorList({:?})", self.source)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl SelectorList {
    /// 解析选择器文本
    pub fn parse(source: &str) -> I18nResult<Self> {
        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);

        let selectors = parse_selector_list(&mut parser).map_err(|e| {
            I18nError::SelectorError(format!(
                "无法解析选择器 {:?} (第{}列): {:?}",
                source, e.location.column, e.kind
            ))
        })?;

        Ok(Self {
            source: source.to_string(),
            selectors,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Element.matches
    pub fn matches(&self, node: &Handle) -> bool {
        is_element(node) && self.selectors.iter().any(|complex| complex.matches(node))
    }

    /// Element.closest：自身或最近的匹配祖先元素
    pub fn closest(&self, node: &Handle) -> Option<Handle> {
        let mut current = Some(node.clone()).filter(is_element);
        while let Some(element) = current {
            if self.matches(&element) {
                return Some(element);
            }
            current = get_parent_element(&element);
        }
        None
    }

    /// querySelector：按文档顺序返回第一个匹配的后代元素
    pub fn query_selector(&self, root: &Handle) -> Option<Handle> {
        for child in root.children.borrow().iter() {
            if self.matches(child) {
                return Some(child.clone());
            }
            if let Some(found) = self.query_selector(child) {
                return Some(found);
            }
        }
        None
    }
}

impl Complex {
    fn matches(&self, node: &Handle) -> bool {
        self.matches_at(self.compounds.len() - 1, node)
    }

    fn matches_at(&self, index: usize, node: &Handle) -> bool {
        if !self.compounds[index].matches(node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => {
                get_parent_element(node).is_some_and(|parent| self.matches_at(index - 1, &parent))
            }
            Combinator::Descendant => {
                let mut ancestor = get_parent_element(node);
                while let Some(element) = ancestor {
                    if self.matches_at(index - 1, &element) {
                        return true;
                    }
                    ancestor = get_parent_element(&element);
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        *self == Compound::default()
    }

    fn matches(&self, node: &Handle) -> bool {
        let Some(name) = get_node_name(node) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if get_node_attr(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        if !self.classes.is_empty() {
            let class_attr = get_node_attr(node, "class").unwrap_or_default();
            let has_all = self
                .classes
                .iter()
                .all(|class| class_attr.split_ascii_whitespace().any(|c| c == class));
            if !has_all {
                return false;
            }
        }

        if !self.attrs.iter().all(|attr| attr.matches(node)) {
            return false;
        }

        if !self.pseudo.iter().all(|pseudo| pseudo.matches(node)) {
            return false;
        }

        self.negations.iter().all(|negation| !negation.matches(node))
    }
}

impl AttrSelector {
    fn matches(&self, node: &Handle) -> bool {
        let Some(value) = get_node_attr(node, &self.name) else {
            return false;
        };
        let Some((operator, expected)) = &self.operation else {
            return true;
        };
        let expected = expected.as_str();

        match operator {
            AttrOperator::Equal => value == expected,
            AttrOperator::Includes => value.split_ascii_whitespace().any(|v| v == expected),
            AttrOperator::DashMatch => {
                value == expected || value.starts_with(&format!("{}-", expected))
            }
            AttrOperator::Prefix => !expected.is_empty() && value.starts_with(expected),
            AttrOperator::Suffix => !expected.is_empty() && value.ends_with(expected),
            AttrOperator::Substring => !expected.is_empty() && value.contains(expected),
        }
    }
}

impl PseudoClass {
    fn matches(&self, node: &Handle) -> bool {
        let Some(parent) = get_parent_node(node) else {
            return false;
        };
        let siblings = parent.children.borrow();
        let mut elements = siblings
            .iter()
            .filter(|n| matches!(n.data, NodeData::Element { .. }));
        let candidate = match self {
            PseudoClass::FirstChild => elements.next(),
            PseudoClass::LastChild => elements.last(),
        };
        candidate.is_some_and(|c| std::rc::Rc::ptr_eq(c, node))
    }
}

type SelectorParseError<'i> = ParseError<'i, ()>;

fn parse_selector_list<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<Vec<Complex>, SelectorParseError<'i>> {
    let mut selectors = Vec::new();
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut current = Compound::default();

    loop {
        let token = match parser.next_including_whitespace() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::WhiteSpace(_) => {
                if !current.is_empty() {
                    compounds.push(std::mem::take(&mut current));
                    combinators.push(Combinator::Descendant);
                }
            }
            Token::Delim('>') => {
                if !current.is_empty() {
                    compounds.push(std::mem::take(&mut current));
                    combinators.push(Combinator::Child);
                } else if let Some(last) = combinators.last_mut() {
                    *last = Combinator::Child;
                } else {
                    return Err(parser.new_unexpected_token_error(token));
                }
            }
            Token::Comma => {
                selectors.push(finish_complex(
                    parser,
                    &mut compounds,
                    &mut combinators,
                    &mut current,
                )?);
            }
            other => parse_simple_selector(parser, other, &mut current)?,
        }
    }

    selectors.push(finish_complex(
        parser,
        &mut compounds,
        &mut combinators,
        &mut current,
    )?);
    Ok(selectors)
}

fn finish_complex<'i>(
    parser: &Parser<'i, '_>,
    compounds: &mut Vec<Compound>,
    combinators: &mut Vec<Combinator>,
    current: &mut Compound,
) -> Result<Complex, SelectorParseError<'i>> {
    if current.is_empty() {
        // 末尾空白已被当作后代组合符压栈，这里撤回
        match compounds.pop() {
            Some(last) if combinators.last() == Some(&Combinator::Descendant) => {
                combinators.pop();
                *current = last;
            }
            _ => return Err(parser.new_custom_error(())),
        }
    }

    compounds.push(std::mem::take(current));
    Ok(Complex {
        compounds: std::mem::take(compounds),
        combinators: std::mem::take(combinators),
    })
}

fn parse_simple_selector<'i>(
    parser: &mut Parser<'i, '_>,
    token: Token<'i>,
    current: &mut Compound,
) -> Result<(), SelectorParseError<'i>> {
    match token {
        Token::Ident(name) => current.tag = Some(name.to_ascii_lowercase()),
        Token::Delim('*') => current.universal = true,
        Token::IDHash(id) => current.id = Some(id.to_string()),
        Token::Delim('.') => match parser.next_including_whitespace()?.clone() {
            Token::Ident(class) => current.classes.push(class.to_string()),
            other => return Err(parser.new_unexpected_token_error(other)),
        },
        Token::SquareBracketBlock => {
            let attr = parser.parse_nested_block(parse_attribute_selector)?;
            current.attrs.push(attr);
        }
        Token::Colon => match parser.next_including_whitespace()?.clone() {
            Token::Ident(name) if name.eq_ignore_ascii_case("first-child") => {
                current.pseudo.push(PseudoClass::FirstChild)
            }
            Token::Ident(name) if name.eq_ignore_ascii_case("last-child") => {
                current.pseudo.push(PseudoClass::LastChild)
            }
            Token::Function(name) if name.eq_ignore_ascii_case("not") => {
                let negation = parser.parse_nested_block(|p| {
                    let mut inner = Compound::default();
                    while let Ok(token) = p.next().cloned() {
                        parse_simple_selector(p, token, &mut inner)?;
                    }
                    if inner.is_empty() {
                        return Err(p.new_custom_error(()));
                    }
                    Ok(inner)
                })?;
                current.negations.push(negation);
            }
            other => return Err(parser.new_unexpected_token_error(other)),
        },
        other => return Err(parser.new_unexpected_token_error(other)),
    }
    Ok(())
}

fn parse_attribute_selector<'i>(
    parser: &mut Parser<'i, '_>,
) -> Result<AttrSelector, SelectorParseError<'i>> {
    let name = parser.expect_ident()?.to_ascii_lowercase();

    let operator = match parser.next() {
        Err(_) => {
            return Ok(AttrSelector {
                name,
                operation: None,
            })
        }
        Ok(Token::Delim('=')) => AttrOperator::Equal,
        Ok(Token::IncludeMatch) => AttrOperator::Includes,
        Ok(Token::DashMatch) => AttrOperator::DashMatch,
        Ok(Token::PrefixMatch) => AttrOperator::Prefix,
        Ok(Token::SuffixMatch) => AttrOperator::Suffix,
        Ok(Token::SubstringMatch) => AttrOperator::Substring,
        Ok(other) => {
            let other = other.clone();
            return Err(parser.new_unexpected_token_error(other));
        }
    };

    let value = parser.expect_ident_or_string()?.to_string();
    parser.expect_exhausted()?;

    Ok(AttrSelector {
        name,
        operation: Some((operator, value)),
    })
}
