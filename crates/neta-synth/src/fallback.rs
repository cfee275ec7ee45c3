//! Built-in topic catalog used whenever synthesis cannot produce one.

use neta_types::{Topic, TopicCatalog};

/// The fixed fallback catalog, in display order.
pub fn fallback_catalog() -> TopicCatalog {
    TopicCatalog::from_topics([
        Topic::new("AI/機械学習", ["LLM", "深層学習", "自然言語処理", "画像認識"], "🤖"),
        Topic::new("Web開発", ["React", "Next.js", "Vue.js", "TypeScript"], "🌐"),
        Topic::new("クラウド/インフラ", ["AWS", "GCP", "Kubernetes", "Docker"], "☁️"),
        Topic::new("セキュリティ", ["ゼロトラスト", "脆弱性診断", "暗号化"], "🔒"),
    ])
}
