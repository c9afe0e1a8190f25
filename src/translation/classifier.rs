//! 页面分类器
//!
//! 根据 URL 和少量 DOM 标记推导页面类型。除日志外没有副作用。

use regex::{Captures, Regex};
use url::Url;

use crate::parsers::html::document::Document;
use crate::parsers::html::metadata::{get_body_classes, get_meta_content};
use crate::translation::config::constants;
use crate::translation::context::PageType;
use crate::translation::dictionary::DictionaryStore;

const SESSION_CLASS: &str = "session-authentication";
const PROFILE_CLASS: &str = "page-profile";
const LOGGED_IN_CLASS: &str = "logged-in";
const ANALYTICS_LOCATION: &str = "analytics-location";
const DEFAULT_SITE: &str = "github";

/// 分类所需的 DOM 信号
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    pub body_classes: Vec<String>,
    pub analytics_location: Option<String>,
}

impl PageSignals {
    pub fn from_document(document: &Document) -> Self {
        let root = document.root();
        Self {
            body_classes: get_body_classes(&root),
            analytics_location: get_meta_content(&root, ANALYTICS_LOCATION),
        }
    }

    pub fn has_body_class(&self, class: &str) -> bool {
        self.body_classes.iter().any(|c| c == class)
    }

    pub fn is_logged_in(&self) -> bool {
        self.has_body_class(LOGGED_IN_CLASS)
    }

    fn location(&self) -> &str {
        self.analytics_location.as_deref().unwrap_or_default()
    }
}

/// 站点域名对应的基础类型，未列出的域名属于主站
fn site_of(host: &str) -> &'static str {
    constants::PAGE_MAP
        .iter()
        .find(|(h, _)| *h == host)
        .map(|(_, site)| *site)
        .unwrap_or(DEFAULT_SITE)
}

/// 取第一个捕获组，为空时取最后一个组
fn capture_name(caps: &Captures<'_>) -> Option<String> {
    caps.get(1)
        .filter(|m| !m.as_str().is_empty())
        .or_else(|| caps.get(caps.len() - 1))
        .map(|m| m.as_str().to_string())
}

fn first_capture(regex: &Regex, path: &str) -> Option<String> {
    regex.captures(path).as_ref().and_then(capture_name)
}

/// 推导页面类型（不校验词库）
fn derive(url: &Url, signals: &PageSignals, store: &DictionaryStore) -> Option<String> {
    let site = site_of(url.host_str().unwrap_or_default());
    let path = url.path();
    let location = signals.location();
    let conf = store.conf();

    if signals.has_body_class(SESSION_CLASS) {
        return Some(SESSION_CLASS.to_string());
    }

    if constants::SPECIAL_SITES.contains(&site) {
        return Some(site.to_string());
    }

    if signals.has_body_class(PROFILE_CLASS) || location == "/<user-name>" {
        let tab = url
            .query_pairs()
            .find(|(key, _)| key == "tab")
            .map(|(_, value)| value.into_owned())
            .filter(|value| !value.is_empty());

        // stars 是路径判断，必须先于 tab 查询参数
        return Some(if path.contains("/stars") {
            "page-profile/stars".to_string()
        } else if let Some(tab) = tab {
            format!("page-profile/{}", tab)
        } else {
            PROFILE_CLASS.to_string()
        });
    }

    if path == "/" && site == DEFAULT_SITE {
        return Some(if signals.is_logged_in() {
            "dashboard".to_string()
        } else {
            "homepage".to_string()
        });
    }

    if location.contains("/<user-name>/<repo-name>") {
        return Some(match first_capture(&conf.re_page_path_repo, path) {
            Some(section) => format!("repository/{}", section),
            None => "repository".to_string(),
        });
    }

    if location.contains("/<org-login>")
        || path.starts_with("/orgs")
        || path.starts_with("/organizations")
    {
        return Some(match first_capture(&conf.re_page_path_org, path) {
            Some(section) => format!("orgs/{}", section),
            None => "orgs".to_string(),
        });
    }

    first_capture(&conf.re_page_path, path)
}

/// 对页面分类
///
/// 返回 `None` 表示未匹配，或匹配到的类型在词库中没有对应词条。
///
/// # 示例
///
/// ```ignore
/// let url = Url::parse("https://github.com/octocat/Hello-World/issues")?;
/// let signals = PageSignals::from_document(&document);
/// assert_eq!(classify(&url, &signals, &store).unwrap().as_str(), "repository/issues");
/// ```
pub fn classify(url: &Url, signals: &PageSignals, store: &DictionaryStore) -> Option<PageType> {
    match derive(url, signals, store) {
        Some(tag) if store.has_page(&tag) => {
            tracing::debug!("页面类型: {} ({})", tag, url);
            Some(PageType::new(tag))
        }
        other => {
            tracing::warn!("页面类型未匹配或词库缺失: {:?} ({})", other, url);
            None
        }
    }
}
