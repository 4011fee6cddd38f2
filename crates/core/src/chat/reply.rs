//! WhatsApp reply texts.

use crate::domain::client::Client;
use crate::domain::recommendation::Recommendation;
use crate::news::analysis::{RecommendationAnalysis, TechnicalOutcome};
use crate::news::sentiment::NewsDigest;
use std::fmt::Write as _;

/// WhatsApp rejects longer text messages.
pub const MAX_MESSAGE_CHARS: usize = 4000;

const LATEST_ARTICLES: usize = 3;
const TITLE_CHARS: usize = 80;

pub const MENU: &str = "Você está interessado em investimentos! Por favor escolha uma opção e responda com o número:\n\n\
1. Ver cotações atualizadas\n\
2. Ver minha carteira\n\
3. Ver recomendações";

pub const GREETING: &str = "Oi! Responda com a palavra \"investimento\" para continuar.";

pub const INVALID_OPTION: &str = "Opção inválida. Por favor, responda com '1', '2' ou '3'.";

pub const RECOMMENDATIONS_WAIT: &str =
    "Estou preparando suas recomendações personalizadas. Isso pode levar um momento...";

pub const INTERNAL_ERROR: &str =
    "Desculpe, não consegui concluir sua solicitação agora. Tente novamente em instantes.";

pub fn quotes_intro(tickers: &[String]) -> String {
    format!(
        "Buscando notícias para as ações mais populares ({})...",
        tickers.join(", ")
    )
}

pub fn news_unavailable(reason: &str) -> String {
    format!("Não foi possível buscar as notícias no momento: {reason}")
}

pub fn client_not_found(client_id: &str) -> String {
    format!("Cliente {client_id} não encontrado.")
}

pub fn portfolio(client: &Client) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}: {}", client.id, client.name);
    let _ = writeln!(out, "Perfil: {}", client.profile);
    let _ = writeln!(out, "Carteira com {} ativos:", client.portfolio.len());
    for h in &client.portfolio.holdings {
        let _ = writeln!(out, "  {} - {}", h.ticker, format_quantity(h.quantity));
    }
    out.trim_end().to_string()
}

/// Digest header, per-ticker stats for `focus` when present, then the latest articles.
pub fn news_summary(digest: &NewsDigest, focus: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📰 RESUMO DE NOTÍCIAS");
    let _ = writeln!(out, "📊 Total de notícias: {}", digest.articles.len());
    let _ = writeln!(
        out,
        "🏷️ Tickers analisados: {}",
        digest.tickers().collect::<Vec<_>>().join(", ")
    );

    if let Some(ticker) = focus {
        if let Some(stats) = digest.stats(ticker) {
            let _ = writeln!(out, "\n🎯 ANÁLISE DE SENTIMENTO PARA {ticker}:");
            let _ = writeln!(out, "   📈 Total de notícias: {}", stats.article_count);
            let _ = writeln!(out, "   💹 Sentimento médio: {:.3}", stats.mean_score);
            let _ = writeln!(out, "   📊 Sentimento principal: {}", stats.dominant_label);
            let _ = writeln!(out, "   🔗 Relevância média: {:.3}", stats.mean_relevance);
            if !stats.distribution.is_empty() {
                let dist = stats
                    .distribution
                    .iter()
                    .map(|(label, n)| format!("{label}: {n}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(out, "   📋 Distribuição: {dist}");
            }
        }
    }

    if !digest.articles.is_empty() {
        let _ = writeln!(out, "\n📝 ÚLTIMAS NOTÍCIAS:");
        for (i, article) in digest.articles.iter().take(LATEST_ARTICLES).enumerate() {
            let _ = writeln!(out, "   {}. {}", i + 1, truncate_chars(&article.title, TITLE_CHARS));
            let _ = writeln!(
                out,
                "      Sentimento: {} | Fonte: {}",
                article.overall_label, article.source
            );
        }
    }

    out.trim_end().to_string()
}

pub fn recommendations(
    client: &Client,
    rec: &Recommendation,
    analysis: Option<&RecommendationAnalysis>,
) -> String {
    if rec.is_empty() {
        return format!(
            "Não encontrei ações para recomendar para {} no momento.",
            client.name
        );
    }

    let mut out = String::new();
    let _ = writeln!(out, "🎯 Recomendações para {} (perfil {}):", client.name, client.profile);
    for item in &rec.items {
        let _ = writeln!(out, "{}. {} (similaridade {:.3})", item.rank, item.ticker, item.score);
    }

    let Some(analysis) = analysis else {
        return out.trim_end().to_string();
    };

    let _ = writeln!(out, "\n📈 ANÁLISE TÉCNICA:");
    for (symbol, outcome) in &analysis.technical {
        match outcome {
            TechnicalOutcome::Available { summary } => {
                let _ = writeln!(
                    out,
                    "{symbol}: US$ {:.2} ({:+.2}%) | Tendência: {}",
                    summary.last_close,
                    summary.change_pct,
                    summary.trend.label_pt()
                );
                if let (Some(m7), Some(m30)) = (summary.mean_7d, summary.mean_30d) {
                    let _ = writeln!(out, "   Média 7d: {m7:.2} | Média 30d: {m30:.2}");
                }
            }
            TechnicalOutcome::Unavailable { reason } => {
                let _ = writeln!(out, "{symbol}: dados indisponíveis ({reason})");
            }
        }
    }

    match (&analysis.news, &analysis.news_error) {
        (Some(digest), _) => {
            let _ = writeln!(out, "\n📰 SENTIMENTO DAS NOTÍCIAS:");
            for item in &rec.items {
                match digest.stats(&item.ticker) {
                    Some(stats) => {
                        let _ = writeln!(
                            out,
                            "{}: {} (média {:.3}, {} notícias)",
                            item.ticker, stats.dominant_label, stats.mean_score, stats.article_count
                        );
                    }
                    None => {
                        let _ = writeln!(out, "{}: sem notícias recentes", item.ticker);
                    }
                }
            }
        }
        (None, Some(reason)) => {
            let _ = writeln!(out, "\n{}", news_unavailable(reason));
        }
        (None, None) => {}
    }

    out.trim_end().to_string()
}

/// Splits `text` into chunks of at most `max_chars` characters, breaking on
/// line boundaries where possible. Lines longer than the limit are cut.
/// Blank lines that fall on a chunk boundary are dropped, so no chunk starts
/// or ends with one.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in text.split('\n') {
        let blank = line.trim().is_empty();
        if current.is_empty() && blank {
            continue;
        }

        let line_len = line.chars().count();
        let needed = if current.is_empty() {
            line_len
        } else {
            current_len + 1 + line_len
        };
        if needed <= max_chars {
            current.push(line);
            current_len = needed;
            continue;
        }

        flush_chunk(&mut chunks, &mut current);
        current_len = 0;
        if blank {
            continue;
        }

        if line_len <= max_chars {
            current.push(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
        }
    }

    flush_chunk(&mut chunks, &mut current);
    chunks
}

fn flush_chunk(chunks: &mut Vec<String>, lines: &mut Vec<&str>) {
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if !lines.is_empty() {
        chunks.push(lines.join("\n"));
    }
    lines.clear();
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}

fn format_quantity(q: f64) -> String {
    if q.fract() == 0.0 {
        format!("{q:.0}")
    } else {
        format!("{q}")
    }
}
