//! 仓库描述翻译按钮
//!
//! 在描述元素后面插入一个"翻译"按钮。点击后把描述文本交给外部翻译服务，
//! 隐藏按钮并在描述后插入来源说明和译文。
//! 翻译服务失败时返回固定的提示文本，同样作为译文显示，不会产生错误。

use markup5ever_rcdom::Handle;

use crate::parsers::html::document::Document;
use crate::parsers::html::selector::SelectorList;
use crate::translation::config::constants::{
    TRANSLATE_BUTTON_ID, TRANSLATE_BUTTON_LABEL, TRANSLATE_BUTTON_STYLE, TRANSLATE_PROVIDER_NAME,
    TRANSLATE_PROVIDER_STYLE, TRANSLATE_PROVIDER_URL,
};
use crate::translation::error::I18nResult;

/// 服务返回异常
pub const TRANSLATE_FAILED: &str = "翻译失败";
/// 网络请求失败
pub const NETWORK_FAILED: &str = "网络请求失败";

/// 描述翻译服务
///
/// 返回译文或失败提示文本（[`TRANSLATE_FAILED`]、[`NETWORK_FAILED`]）。
pub trait DescriptionTranslator {
    fn translate(&self, text: &str) -> String;
}

impl<F> DescriptionTranslator for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, text: &str) -> String {
        self(text)
    }
}

fn find_button(document: &Document) -> I18nResult<Option<Handle>> {
    let selector = SelectorList::parse(&format!("#{}", TRANSLATE_BUTTON_ID))?;
    Ok(selector.query_selector(&document.root()))
}

fn find_description(document: &Document, selector: &str) -> I18nResult<Option<Handle>> {
    Ok(SelectorList::parse(selector)?.query_selector(&document.root()))
}

/// 在描述元素后插入翻译按钮
///
/// 描述元素不存在或按钮已存在时返回 `false`。
pub fn offer(document: &Document, selector: &str) -> I18nResult<bool> {
    let Some(element) = find_description(document, selector)? else {
        return Ok(false);
    };
    if find_button(document)?.is_some() {
        return Ok(false);
    }

    let button = document.create_element(
        "div",
        &[("id", TRANSLATE_BUTTON_ID), ("style", TRANSLATE_BUTTON_STYLE)],
    );
    document.append_child(&button, &document.create_text(TRANSLATE_BUTTON_LABEL));
    Ok(document.insert_after(&element, &button))
}

/// 移除翻译按钮
pub fn withdraw(document: &Document) -> I18nResult<bool> {
    match find_button(document)? {
        Some(button) => {
            document.remove(&button);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// 点击翻译按钮
///
/// 描述为空、按钮不存在时什么也不做，返回 `None`；否则返回显示的译文。
pub fn activate(
    document: &Document,
    selector: &str,
    translator: &dyn DescriptionTranslator,
) -> I18nResult<Option<String>> {
    let (Some(element), Some(button)) = (find_description(document, selector)?, find_button(document)?)
    else {
        return Ok(None);
    };

    let description = document.text_content(&element).trim().to_string();
    if description.is_empty() {
        return Ok(None);
    }

    let translated = translator.translate(&description);
    tracing::info!("描述翻译完成: {} 字符", translated.chars().count());

    let style = document.get_attribute(&button, "style").unwrap_or_default();
    document.set_attribute(&button, "style", &format!("{}; display: none", style));

    // 依次插在描述元素之后，最终顺序为 说明、换行、译文
    document.insert_after(&element, &document.create_text(&translated));
    document.insert_after(&element, &document.create_element("br", &[]));
    document.insert_after(&element, &attribution(document));

    Ok(Some(translated))
}

fn attribution(document: &Document) -> Handle {
    let span = document.create_element("span", &[("style", "font-size: small")]);
    let link = document.create_element(
        "a",
        &[
            ("target", "_blank"),
            ("style", TRANSLATE_PROVIDER_STYLE),
            ("href", TRANSLATE_PROVIDER_URL),
        ],
    );
    document.append_child(&link, &document.create_text(TRANSLATE_PROVIDER_NAME));

    document.append_child(&span, &document.create_text("由 "));
    document.append_child(&span, &link);
    document.append_child(&span, &document.create_text(" 翻译👇"));
    span
}

#[cfg(feature = "translate-desc")]
pub use iflyrec::IflyrecTranslator;

#[cfg(feature = "translate-desc")]
mod iflyrec {
    use std::time::Duration;

    use reqwest::blocking::Client;
    use reqwest::header::{CONTENT_TYPE, ORIGIN};
    use serde_json::{json, Value};

    use super::{DescriptionTranslator, NETWORK_FAILED, TRANSLATE_FAILED};
    use crate::translation::config::constants::{IFLYREC_ENDPOINT, IFLYREC_ORIGIN};
    use crate::translation::error::{I18nError, I18nResult};

    /// 讯飞听见文本翻译（英译中）
    pub struct IflyrecTranslator {
        client: Client,
        endpoint: String,
    }

    impl IflyrecTranslator {
        pub fn new() -> I18nResult<Self> {
            Self::with_endpoint(IFLYREC_ENDPOINT)
        }

        pub fn with_endpoint(endpoint: &str) -> I18nResult<Self> {
            let client = Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .map_err(|e| I18nError::NetworkFault(e.to_string()))?;
            Ok(Self {
                client,
                endpoint: endpoint.to_string(),
            })
        }

        fn request(&self, text: &str) -> Result<Option<String>, reqwest::Error> {
            let body = json!({
                "from": 2,
                "to": 1,
                "type": 1,
                "contents": [{ "text": text }],
            });

            let response = self
                .client
                .post(&self.endpoint)
                .header(CONTENT_TYPE, "application/json")
                .header(ORIGIN, IFLYREC_ORIGIN)
                .json(&body)
                .send()?;

            if !response.status().is_success() {
                tracing::warn!("描述翻译服务返回 {}", response.status());
                return Ok(None);
            }

            let value: Value = response.json()?;
            Ok(extract_translation(&value))
        }
    }

    pub(super) fn extract_translation(value: &Value) -> Option<String> {
        value
            .pointer("/biz/0/sectionResult/0/dst")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    impl DescriptionTranslator for IflyrecTranslator {
        fn translate(&self, text: &str) -> String {
            match self.request(text) {
                Ok(Some(translated)) => translated,
                Ok(None) => TRANSLATE_FAILED.to_string(),
                Err(e) if e.is_decode() => {
                    tracing::error!("{}: {}", TRANSLATE_FAILED, e);
                    TRANSLATE_FAILED.to_string()
                }
                Err(e) => {
                    tracing::error!("{}: {}", NETWORK_FAILED, e);
                    NETWORK_FAILED.to_string()
                }
            }
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::find_nodes;
    use url::Url;

    const SELECTOR: &str = ".f4.my-3";

    fn document(html: &str) -> Document {
        let url = Url::parse("https://github.com/octocat/Hello-World").unwrap();
        Document::parse(html.as_bytes(), "utf-8", url).unwrap()
    }

    #[test]
    fn test_offer_once() {
        let doc = document("<div><p class=\"f4 my-3\">A demo repo</p><p>after</p></div>");
        assert!(offer(&doc, SELECTOR).unwrap());
        assert!(!offer(&doc, SELECTOR).unwrap());

        let div = find_nodes(&doc.root(), &["div"]).remove(0);
        assert_eq!(doc.text_content(&div), "A demo repo翻译after");
    }

    #[test]
    fn test_offer_without_description() {
        let doc = document("<p>nothing</p>");
        assert!(!offer(&doc, SELECTOR).unwrap());
    }

    #[test]
    fn test_withdraw() {
        let doc = document("<p class=\"f4 my-3\">A demo repo</p>");
        offer(&doc, SELECTOR).unwrap();
        assert!(withdraw(&doc).unwrap());
        assert!(!withdraw(&doc).unwrap());
    }

    #[test]
    fn test_activate_inserts_result_after_description() {
        let doc = document("<div><p class=\"f4 my-3\">  A demo repo  </p></div>");
        offer(&doc, SELECTOR).unwrap();

        let translator = |text: &str| {
            assert_eq!(text, "A demo repo");
            "演示仓库".to_string()
        };
        let shown = activate(&doc, SELECTOR, &translator).unwrap();
        assert_eq!(shown.as_deref(), Some("演示仓库"));

        let div = find_nodes(&doc.root(), &["div"]).remove(0);
        assert_eq!(
            doc.text_content(&div),
            "  A demo repo  由 讯飞听见 翻译👇演示仓库翻译"
        );
        let button = find_button(&doc).unwrap().unwrap();
        assert!(doc
            .get_attribute(&button, "style")
            .unwrap()
            .ends_with("display: none"));
        assert_eq!(find_nodes(&doc.root(), &["br"]).len(), 1);
    }

    #[test]
    fn test_activate_with_empty_description() {
        let doc = document("<p class=\"f4 my-3\">   </p>");
        offer(&doc, SELECTOR).unwrap();
        let translator = |_: &str| -> String { panic!("不应调用翻译服务") };
        assert_eq!(activate(&doc, SELECTOR, &translator).unwrap(), None);
    }

    #[test]
    fn test_failure_marker_is_displayed() {
        let doc = document("<p class=\"f4 my-3\">desc</p>");
        offer(&doc, SELECTOR).unwrap();
        let translator = |_: &str| NETWORK_FAILED.to_string();
        assert_eq!(
            activate(&doc, SELECTOR, &translator).unwrap().as_deref(),
            Some(NETWORK_FAILED)
        );
        assert!(doc.text_content(&doc.body().unwrap()).contains(NETWORK_FAILED));
    }
}
