// 集成测试公共模块
//
// 提供测试词库、页面构造和引擎构造工具

use std::path::PathBuf;

use markup5ever_rcdom::Handle;
use url::Url;

use page_i18n::parsers::html::{find_nodes, Document};
use page_i18n::translation::{DictionaryStore, EngineConfig, MemoryFlagStore};
use page_i18n::Engine;

/// 测试词库
pub const DICTIONARY: &str = r##"{
    "version": "1.9.3",
    "conf": {
        "ignoreMutationSelectorPage": {
            "repository/issues": [".js-live-region"]
        },
        "ignoreSelectorPage": {
            "*": ["pre", "code"]
        },
        "characterDataPage": ["repository/pulls"],
        "rePagePathRepo": "^/[^/]+/[^/]+/(issues|pulls|settings)",
        "rePagePathOrg": "^/orgs/[^/]+/(people|teams)",
        "rePagePath": "^/(notifications|settings|search)"
    },
    "title": {
        "static": { "Notifications": "通知" },
        "regexp": [["^Issues · (.+)$", "议题 · $1"]]
    },
    "public": {
        "static": {
            "Issues": "议题",
            "Pull requests": "拉取请求",
            "Code": "代码"
        },
        "regexp": [
            ["^Issues$", "问题"],
            ["^(\\d+) commits?$", "$1 次提交"]
        ]
    },
    "repository": {
        "static": { "About": "关于" }
    },
    "repository/issues": {
        "static": { "New issue": "新建议题", "Labels": "标签" }
    },
    "repository/pulls": {
        "static": { "Open": "打开" }
    },
    "page-profile": {
        "static": { "Follow": "关注", "Repositories": "仓库" }
    },
    "notifications": {
        "static": { "Inbox": "收件箱" },
        "selector": [["#inbox-title", "通知"]]
    }
}"##;

pub const REPO_URL: &str = "https://github.com/octocat/Hello-World";
pub const ISSUES_URL: &str = "https://github.com/octocat/Hello-World/issues";
pub const PULLS_URL: &str = "https://github.com/octocat/Hello-World/pulls";
pub const PROFILE_URL: &str = "https://github.com/octocat";
pub const NOTIFICATIONS_URL: &str = "https://github.com/notifications";

pub const REPO_LOCATION: &str = "/<user-name>/<repo-name>";
pub const PROFILE_LOCATION: &str = "/<user-name>";

pub fn store() -> DictionaryStore {
    DictionaryStore::from_json_str(DICTIONARY).unwrap()
}

/// 构造完整页面
pub fn page_html(title: &str, location: Option<&str>, body: &str) -> String {
    let meta = location
        .map(|location| format!("<meta name=\"analytics-location\" content=\"{}\">", location))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><title>{}</title>{}</head><body>{}</body></html>",
        title, meta, body
    )
}

pub fn document(url: &str, location: Option<&str>, body: &str) -> Document {
    let html = page_html("GitHub", location, body);
    Document::parse(html.as_bytes(), "utf-8", Url::parse(url).unwrap()).unwrap()
}

pub fn engine_for(document: Document) -> Engine {
    Engine::new(
        document,
        store(),
        EngineConfig::default(),
        Box::new(MemoryFlagStore::new()),
    )
}

/// 构造并启动引擎
pub fn started(url: &str, location: Option<&str>, body: &str) -> Engine {
    let mut engine = engine_for(document(url, location, body));
    engine.start();
    engine
}

/// 第一个匹配路径的节点
pub fn node(document: &Document, path: &[&str]) -> Handle {
    find_nodes(&document.root(), path).remove(0)
}

pub fn body_text(engine: &Engine) -> String {
    let document = engine.document();
    document.text_content(&document.body().unwrap())
}

/// 页面脚本插入一个带文本的元素
pub fn inject(document: &Document, parent: &Handle, tag: &str, text: &str) -> Handle {
    let element = document.create_element(tag, &[]);
    document.append_child(&element, &document.create_text(text));
    document.append_child(parent, &element);
    element
}

/// 客户端路由：修改 URL 和分析位置
pub fn navigate(document: &Document, url: &str, location: &str) {
    document.set_url(Url::parse(url).unwrap());
    let meta = node(document, &["html", "head", "meta"]);
    document.set_attribute(&meta, "content", location);
}

/// 把测试词库写到临时目录
pub fn write_dictionary(dir: &tempfile::TempDir) -> PathBuf {
    let path = dir.path().join("locals.json");
    std::fs::write(&path, DICTIONARY).unwrap();
    path
}
