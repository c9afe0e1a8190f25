//! 翻译引擎
//!
//! 把分类器、页面上下文、节点翻译器和突变观察者连接起来：
//!
//! - `start`：设置 `<html lang>`，分类，整树翻译，挂载观察者
//! - `pump` / `settle`：模拟事件循环，投递突变批次
//! - `navigation_complete`：客户端路由完成后的标题、选择器和描述按钮处理
//! - `toggle_flag` / `feature_flag_changed`：菜单开关
//!
//! 引擎单线程运行。页面上下文是 `Rc<PageContext>`，只会整体替换，不会部分修改。

use std::rc::Rc;

use markup5ever_rcdom::Handle;

use crate::parsers::html::document::{Document, ObserverId, ObserverInit};
use crate::parsers::html::metadata::{get_document_lang, set_document_lang};
use crate::parsers::html::walker::NodeTranslator;
use crate::translation::classifier::{classify, PageSignals};
use crate::translation::config::constants::SOURCE_LANG;
use crate::translation::config::{description_selector, EngineConfig};
use crate::translation::context::{PageContext, PageType};
use crate::translation::describe::{self, DescriptionTranslator};
use crate::translation::dictionary::DictionaryStore;
use crate::translation::error::I18nResult;
use crate::translation::flags::{FeatureFlags, FlagKey, FlagStore, JsonFlagStore, MemoryFlagStore};
use crate::translation::passes::{apply_selector_overrides, translate_title};
use crate::translation::time_element::TimeElementWatchers;
use crate::translation::watcher::{
    collect_candidates, process_candidates, BatchReport, MutationWatcher, WatcherState,
};

const ANSI_COLOR_RED: &str = "\x1b[31m";
const ANSI_COLOR_RESET: &str = "\x1b[0m";

/// 一轮事件循环的处理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TurnReport {
    /// 主观察者批次（没有记录时为 `None`）
    pub batch: Option<BatchReport>,
    /// 本轮是否重新分类过
    pub reclassified: bool,
    /// 时间元素观察者处理的批次数
    pub time_batches: usize,
    /// 是否纠正了 `<html lang>`
    pub lang_resynced: bool,
    lang_batch: bool,
}

impl TurnReport {
    /// 本轮没有任何观察者收到记录
    pub fn is_idle(&self) -> bool {
        self.batch.is_none() && self.time_batches == 0 && !self.lang_batch
    }
}

/// 页面翻译引擎
pub struct Engine {
    document: Document,
    store: DictionaryStore,
    config: EngineConfig,
    flag_store: Box<dyn FlagStore>,
    flags: FeatureFlags,
    context: Rc<PageContext>,
    watcher: MutationWatcher,
    time_watchers: TimeElementWatchers,
    lang_observer: Option<ObserverId>,
    describer: Option<Box<dyn DescriptionTranslator>>,
}

impl Engine {
    /// 创建引擎，功能开关从存储中读取一次
    pub fn new(
        document: Document,
        store: DictionaryStore,
        config: EngineConfig,
        flag_store: Box<dyn FlagStore>,
    ) -> Self {
        let defaults = FeatureFlags {
            enable_regexp: config.enable_regexp,
            enable_trans_desc: config.enable_trans_desc,
        };
        let flags = FeatureFlags::load(flag_store.as_ref(), defaults);

        Self {
            document,
            store,
            config,
            flag_store,
            flags,
            context: Rc::new(PageContext::inert()),
            watcher: MutationWatcher::new(),
            time_watchers: TimeElementWatchers::new(),
            lang_observer: None,
            describer: None,
        }
    }

    /// 按配置加载词库和开关存储
    pub fn from_config(document: Document, config: EngineConfig) -> I18nResult<Self> {
        let store = DictionaryStore::load(&config.dictionary_path)?;
        let flag_store: Box<dyn FlagStore> = match &config.flags_file {
            Some(path) => Box::new(JsonFlagStore::open(path)?),
            None => Box::new(MemoryFlagStore::new()),
        };
        Ok(Self::new(document, store, config, flag_store))
    }

    pub fn with_description_translator(mut self, translator: Box<dyn DescriptionTranslator>) -> Self {
        self.describer = Some(translator);
        self
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn store(&self) -> &DictionaryStore {
        &self.store
    }

    pub fn context(&self) -> Rc<PageContext> {
        Rc::clone(&self.context)
    }

    pub fn page_type(&self) -> Option<&PageType> {
        self.context.page_type()
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    pub fn watcher_state(&self) -> &WatcherState {
        self.watcher.state()
    }

    pub fn time_watchers(&self) -> &TimeElementWatchers {
        &self.time_watchers
    }

    /// 页面加载完成
    pub fn start(&mut self) {
        set_document_lang(&self.document, &self.config.lang);
        if let Some(html) = self.document.html_element() {
            self.lang_observer = Some(self.document.observe(
                &html,
                ObserverInit {
                    attribute_filter: Some(vec!["lang".to_string()]),
                    ..Default::default()
                },
            ));
        }

        self.refresh_context();
        tracing::info!(
            "开始 pageType= {}",
            self.page_type().map_or("<none>", PageType::as_str)
        );

        if self.context.is_active() {
            self.translate_body();
        }

        self.watcher.attach(&self.document);
    }

    /// 重新分类；页面类型不变时保留原上下文
    fn refresh_context(&mut self) {
        let signals = PageSignals::from_document(&self.document);
        let page_type = classify(&self.document.url(), &signals, &self.store);
        self.context = PageContext::update(&self.context, page_type, &self.store);
    }

    /// 整树翻译 `<body>`
    pub fn translate_body(&self) {
        if let Some(body) = self.document.body() {
            self.translate_node(&body);
        }
    }

    /// 翻译任意节点，故障只记录日志
    pub fn translate_node(&self, node: &Handle) {
        let translator = NodeTranslator::new(
            &self.document,
            &self.context,
            self.flags,
            &self.time_watchers,
        );
        if let Err(e) = translator.translate(node) {
            tracing::error!("节点翻译失败: {}", e);
        }
    }

    /// 一轮事件循环：主观察者、时间元素观察者、lang 观察者依次投递
    pub fn pump(&mut self) -> TurnReport {
        let mut report = TurnReport::default();

        if let Some(batch) = self.watcher.next_batch(&self.document) {
            if batch.url_changed {
                self.refresh_context();
                report.reclassified = true;
                tracing::info!(
                    "DOM变化触发: 链接变化 pageType= {}",
                    self.page_type().map_or("<none>", PageType::as_str)
                );
            }

            report.batch = Some(if self.context.is_active() {
                let candidates =
                    collect_candidates(&batch.records, self.context.watch_character_data());
                let translator = NodeTranslator::new(
                    &self.document,
                    &self.context,
                    self.flags,
                    &self.time_watchers,
                );
                process_candidates(
                    &translator,
                    &candidates,
                    self.context.ignore_mutation_selectors(),
                )
            } else {
                BatchReport::default()
            });
        }

        report.time_batches = self.time_watchers.pump(&self.document);

        if let Some(observer) = self.lang_observer {
            if !self.document.take_records(observer).is_empty() {
                report.lang_batch = true;
                if get_document_lang(&self.document.root()).as_deref() == Some(SOURCE_LANG) {
                    set_document_lang(&self.document, &self.config.lang);
                    report.lang_resynced = true;
                }
            }
        }

        report
    }

    /// 反复投递直到没有记录，返回执行的轮数
    pub fn settle(&mut self) -> usize {
        let mut turns = 0;
        while turns < self.config.max_pump_turns {
            if self.pump().is_idle() {
                return turns;
            }
            turns += 1;
        }

        if self.document.has_pending_records() {
            tracing::warn!("事件循环 {} 轮后仍有未处理的突变记录", turns);
        }
        turns
    }

    /// 客户端路由完成（turbo:load）
    pub fn navigation_complete(&mut self) {
        if !self.context.is_active() {
            return;
        }

        translate_title(&self.document, &self.store);
        apply_selector_overrides(&self.document, &self.context);

        if self.flags.enable_trans_desc {
            if let Some(selector) = self.description_selector() {
                self.offer_description(selector);
            }
        }
    }

    fn description_selector(&self) -> Option<&'static str> {
        self.page_type()
            .and_then(|page_type| description_selector(page_type.as_str()))
    }

    fn offer_description(&self, selector: &str) {
        if let Err(e) = describe::offer(&self.document, selector) {
            tracing::error!("插入描述翻译按钮失败: {}", e);
        }
    }

    /// 开关变化通知
    pub fn feature_flag_changed(&mut self, key: FlagKey, value: bool) {
        self.flags.set(key, value);

        match key {
            FlagKey::EnableRegExp => {
                if value && self.context.is_active() {
                    self.translate_body();
                }
            }
            FlagKey::EnableTransDesc => match self.description_selector() {
                Some(selector) if value => self.offer_description(selector),
                _ => {
                    if let Err(e) = describe::withdraw(&self.document) {
                        tracing::error!("移除描述翻译按钮失败: {}", e);
                    }
                }
            },
        }
    }

    /// 菜单切换：写入存储并通知，返回新值
    pub fn toggle_flag(&mut self, key: FlagKey) -> I18nResult<bool> {
        let value = !self.flags.get(key);
        self.flag_store.set(key, value)?;
        tracing::info!("{}已{}", key.label(), if value { "启用" } else { "禁用" });
        self.feature_flag_changed(key, value);
        Ok(value)
    }

    /// 点击描述翻译按钮
    pub fn activate_description(&self) -> I18nResult<Option<String>> {
        let Some(translator) = self.describer.as_deref() else {
            tracing::warn!("未配置描述翻译服务");
            return Ok(None);
        };
        let Some(selector) = self.description_selector() else {
            return Ok(None);
        };

        describe::activate(&self.document, selector, translator)
    }
}

/// Prints an error message to stderr
pub fn print_error_message(msg: &str) {
    eprintln!("{ANSI_COLOR_RED}{msg}{ANSI_COLOR_RESET}");
}

/// Prints an info message to stdout
pub fn print_info_message(msg: &str) {
    println!("{msg}");
}
