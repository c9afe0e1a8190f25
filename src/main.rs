//! page-i18n 命令行入口
//!
//! 读取保存下来的页面，按给定 URL 分类并翻译，输出翻译后的 HTML。

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use url::Url;

use page_i18n::core::{print_error_message, print_info_message, Engine};
use page_i18n::env::{core::LogLevel, generate_env_docs, EnvVar};
use page_i18n::parsers::html::{serialize_document, Document};
use page_i18n::translation::{ConfigManager, EngineConfig, I18nResult};

const STDIN_INPUT: &str = "-";
const DEFAULT_ENCODING: &str = "utf-8";

/// 用词库翻译保存下来的 GitHub 页面
#[derive(Parser, Debug)]
#[command(name = "page-i18n")]
#[command(version, about)]
struct Cli {
    /// 输入文件，`-` 表示标准输入
    #[arg(default_value = STDIN_INPUT)]
    input: String,

    /// 页面 URL，用于页面分类
    #[arg(short, long)]
    url: Option<String>,

    /// 词库文件（.json 或 .toml）
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 关闭正则翻译
    #[arg(long)]
    no_regexp: bool,

    /// 给 <body> 加上 logged-in 标记
    #[arg(long)]
    logged_in: bool,

    /// 输出文件，缺省写到标准输出
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 点击描述翻译按钮（需要 translate-desc 功能）
    #[cfg(feature = "translate-desc")]
    #[arg(long)]
    translate_description: bool,

    /// 打印支持的环境变量后退出
    #[arg(long)]
    env_docs: bool,
}

fn init_tracing() {
    let level = LogLevel::get()
        .ok()
        .and_then(|level| tracing::Level::from_str(&level).ok())
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> I18nResult<EngineConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(&path.to_string_lossy())?,
        None => ConfigManager::new()?,
    };
    let mut config = manager.into_config();

    if let Some(dictionary) = &cli.dictionary {
        config.dictionary_path = dictionary.to_string_lossy().into_owned();
    }
    if cli.no_regexp {
        config.enable_regexp = false;
    }
    config.validate()?;
    Ok(config)
}

fn read_input(input: &str) -> io::Result<Vec<u8>> {
    let mut data = Vec::new();
    if input == STDIN_INPUT {
        io::stdin().read_to_end(&mut data)?;
    } else {
        data = fs::read(input)?;
    }
    Ok(data)
}

fn run(cli: Cli) -> Result<(), String> {
    let url = match &cli.url {
        Some(url) => Url::parse(url).map_err(|e| format!("无效的 URL {}: {}", url, e))?,
        None => return Err("必须通过 --url 指定页面 URL".to_string()),
    };

    let config = load_config(&cli).map_err(|e| e.to_string())?;
    let data = read_input(&cli.input).map_err(|e| format!("读取 {} 失败: {}", cli.input, e))?;
    let document = Document::parse(&data, DEFAULT_ENCODING, url).map_err(|e| e.to_string())?;

    if cli.logged_in {
        if let Some(body) = document.body() {
            let classes = document.get_attribute(&body, "class").unwrap_or_default();
            document.set_attribute(&body, "class", format!("{} logged-in", classes).trim());
        }
    }

    let mut engine = Engine::from_config(document, config).map_err(|e| e.to_string())?;

    #[cfg(feature = "translate-desc")]
    if cli.translate_description {
        let translator =
            page_i18n::translation::IflyrecTranslator::new().map_err(|e| e.to_string())?;
        engine = engine.with_description_translator(Box::new(translator));
    }

    engine.start();
    engine.navigation_complete();

    #[cfg(feature = "translate-desc")]
    if cli.translate_description {
        engine.activate_description().map_err(|e| e.to_string())?;
    }

    engine.settle();

    let page_type = engine.page_type().map(|t| t.to_string());
    let output = serialize_document(engine.document(), DEFAULT_ENCODING).map_err(|e| e.to_string())?;

    match &cli.output {
        Some(path) => {
            fs::write(path, &output).map_err(|e| format!("写入 {} 失败: {}", path.display(), e))?;
            print_info_message(&format!(
                "{} ({})",
                path.display(),
                page_type.as_deref().unwrap_or("未分类")
            ));
        }
        None => {
            io::stdout()
                .write_all(&output)
                .map_err(|e| format!("写入标准输出失败: {}", e))?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.env_docs {
        print!("{}", generate_env_docs());
        return;
    }

    init_tracing();

    if let Err(message) = run(cli) {
        print_error_message(&message);
        process::exit(1);
    }
}
