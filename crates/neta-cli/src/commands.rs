//! Command implementations for blog-neta.
//!
//! Handles:
//! - trends: fetch popular articles and show the aggregated tags
//! - topics: synthesize a topic catalog
//! - ideas: stream proposals for one topic
//! - search: run one search adapter
//! - interactive: the full pick-a-topic loop

use std::io::Write;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use neta_search::{
    format_qiita_results_for_blog, format_search_results_for_blog, qiita_search, WebSearch,
};
use neta_synth::{
    generate_tech_categories, ApiGenerator, ApiGeneratorConfig, BlogSession, CategorySynthesizer,
    IdeaEvent, IdeaProposer, TextGenerator, TraceContext,
};
use neta_trends::{collect_trend_signal, ArticleSource, QiitaClient, QiitaClientConfig, TrendSignal};
use neta_types::{Settings, TopicCatalog, TracingConfig};

use crate::cli::SearchCommands;

/// Load settings, apply CLI overrides and install the log subscriber.
pub fn init(config_path: Option<&str>, log_level_override: Option<&str>) -> Result<Settings> {
    let mut settings = Settings::load(config_path).context("Failed to load configuration")?;

    if let Some(log_level) = log_level_override {
        settings.log_level = log_level.to_string();
    }

    // stdout carries results; logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let tracing = TracingConfig::from_settings(&settings.tracing);
    if let Some(endpoint) = tracing.otlp_endpoint() {
        info!(endpoint = %endpoint, "Trace tagging enabled");
    }

    Ok(settings)
}

/// Clients built once from settings.
pub struct App {
    settings: Settings,
    tracing: TracingConfig,
    qiita: Arc<QiitaClient>,
    web: WebSearch,
}

impl App {
    pub fn new(settings: Settings) -> Result<Self> {
        let qiita = QiitaClient::new(QiitaClientConfig::from_settings(&settings.qiita))
            .context("Failed to build Qiita client")?;
        let web = WebSearch::from_settings(&settings.search);
        let tracing = TracingConfig::from_settings(&settings.tracing);

        Ok(Self {
            settings,
            tracing,
            qiita: Arc::new(qiita),
            web,
        })
    }

    fn articles(&self) -> Arc<dyn ArticleSource> {
        self.qiita.clone()
    }

    /// Generator for the given model, or `None` without an API key.
    fn generator(&self, model: &str) -> Result<Option<Arc<dyn TextGenerator>>> {
        let config = match ApiGeneratorConfig::from_settings(&self.settings.generation, model) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Text generation unavailable");
                return Ok(None);
            }
        };
        let generator = ApiGenerator::new(config).context("Failed to build generation client")?;
        Ok(Some(Arc::new(generator)))
    }

    fn synthesizer(&self) -> Result<CategorySynthesizer> {
        let model = self.settings.generation.category_model.clone();
        Ok(CategorySynthesizer::new(self.generator(&model)?))
    }

    fn proposer(&self) -> Result<IdeaProposer> {
        let model = self.settings.generation.idea_model.clone();
        let generator = self.generator(&model)?.ok_or_else(|| {
            anyhow!("Generation API key not configured. Please set ANTHROPIC_API_KEY or OPENAI_API_KEY.")
        })?;
        Ok(IdeaProposer::new(generator, self.articles(), self.web.clone()))
    }
}

/// Show the trend signal.
pub async fn show_trends(app: &App, json: bool) -> Result<()> {
    let signal = collect_trend_signal(app.qiita.as_ref()).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&signal)?);
    } else {
        print!("{}", render_signal(&signal));
    }
    Ok(())
}

/// Generate and print a topic catalog.
pub async fn show_topics(app: &App, count: usize, custom: Option<&str>, json: bool) -> Result<()> {
    let session_id = ulid_string();
    let synthesizer = app
        .synthesizer()?
        .with_trace(TraceContext::for_config(&app.tracing, &session_id, None));

    let mut catalog = generate_tech_categories(app.qiita.as_ref(), &synthesizer, count).await;
    if let Some(name) = custom {
        catalog = catalog.with_custom_topic(name);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
    } else {
        print!("{}", render_catalog(&catalog));
    }
    Ok(())
}

/// Stream ideas for one topic to stdout.
pub async fn propose_ideas(app: &App, topic: &str, keywords: &[String]) -> Result<()> {
    let keywords = if keywords.is_empty() {
        vec![topic.to_string()]
    } else {
        keywords.to_vec()
    };

    let proposer = app.proposer()?;
    let session_id = ulid_string();
    let trace = TraceContext::for_config(&app.tracing, &session_id, Some(&ulid_string()));

    eprintln!("🔍 「{topic}」のブログネタを生成中...");
    proposer
        .propose(topic, &keywords, trace, print_event)
        .await
        .context("Failed to generate blog ideas")?;
    println!();
    Ok(())
}

/// Run one search adapter.
pub async fn run_search(app: &App, command: SearchCommands) -> Result<()> {
    let output = match command {
        SearchCommands::Web { query, num } => {
            format_search_results_for_blog(&app.web.web_search(&query, num).await)
        }
        SearchCommands::Tavily {
            query,
            num,
            advanced,
        } => format_search_results_for_blog(&app.web.tavily_search(&query, num, advanced).await),
        SearchCommands::Qiita { query, num } => {
            format_qiita_results_for_blog(&qiita_search(app.qiita.as_ref(), &query, num).await)
        }
    };
    println!("{output}");
    Ok(())
}

/// Line-driven session: number = select, `s` = shuffle, `r` = reset,
/// `q` = quit, anything else = custom topic.
pub async fn run_interactive(app: &App, count: usize) -> Result<()> {
    let mut session = BlogSession::new(
        app.articles(),
        app.synthesizer()?,
        app.proposer()?,
        app.tracing.clone(),
    )
    .with_desired_count(count);

    info!(session = %session.session_id(), "Interactive session started");

    eprintln!("🎲 Qiitaの最新トレンドからカテゴリを生成中...");
    session.shuffle().await;
    print_menu(session.catalog());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "q" | "quit" | "exit" => break,
            "s" | "shuffle" => {
                eprintln!("🎲 Qiitaの最新トレンドからカテゴリを生成中...");
                session.shuffle().await;
                print_menu(session.catalog());
                continue;
            }
            "r" | "reset" => {
                session.reset_selection();
                print_menu(session.catalog());
                continue;
            }
            _ => {}
        }

        let selected = match input.parse::<usize>() {
            Ok(n) => match n.checked_sub(1).and_then(|i| session.catalog().nth(i)) {
                Some(topic) => {
                    let name = topic.name.clone();
                    session.select(&name)
                }
                None => {
                    eprintln!("番号は1〜{}で指定してください。", session.catalog().len());
                    false
                }
            },
            Err(_) => session.select_custom(input),
        };
        if !selected {
            continue;
        }

        let topic = session.selected().unwrap_or_default().to_string();
        eprintln!("\n🔍 「{topic}」のブログネタを生成中...");
        match session.propose(print_event).await {
            Ok(_) => println!("\n\n✨ 「{topic}」のブログネタ提案は以上です。"),
            Err(e) => eprintln!("\nエラーが発生しました: {e}"),
        }
        print_menu(session.catalog());
    }

    Ok(())
}

fn print_event(event: IdeaEvent) {
    match event {
        IdeaEvent::Status(message) => eprintln!("{message}"),
        IdeaEvent::Text(chunk) => {
            print!("{chunk}");
            let _ = std::io::stdout().flush();
        }
    }
}

fn print_menu(catalog: &TopicCatalog) {
    println!("\n🎯 興味のある技術分野を選択してください");
    print!("{}", render_catalog(catalog));
    println!("番号で選択 / 自由入力で検索 / s: シャッフル / r: リセット / q: 終了");
}

fn ulid_string() -> String {
    ulid::Ulid::new().to_string()
}

/// Numbered two-column listing of a catalog.
pub fn render_catalog(catalog: &TopicCatalog) -> String {
    let width = catalog
        .iter()
        .map(|t| t.label().chars().count())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for (r, row) in catalog.rows(2).iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, topic)| {
                let label = topic.label();
                let pad = width.saturating_sub(label.chars().count());
                format!("{:>2}. {}{}", r * 2 + c + 1, label, " ".repeat(pad))
            })
            .collect();
        out.push_str(cells.join("   ").trim_end());
        out.push('\n');
    }
    out
}

/// Human-readable trend summary.
pub fn render_signal(signal: &TrendSignal) -> String {
    if signal.is_empty() {
        return "Qiitaのトレンド情報を取得できませんでした。\n".to_string();
    }

    let mut out = String::from("## Qiitaの人気タグ\n");
    for tag in &signal.top_counts {
        out.push_str(&format!("- {} ({})\n", tag.name, tag.count));
    }

    out.push_str("\n## カテゴリ別\n");
    for (bucket, tags) in signal.categorized.iter() {
        if !tags.is_empty() {
            out.push_str(&format!("- {}: {}\n", bucket.display_name(), tags.join(", ")));
        }
    }
    out
}
