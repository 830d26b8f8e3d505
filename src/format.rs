use crate::source::{AssetQuote, PriceSnapshot, ASSETS};
use chrono::{DateTime, Utc};

pub const FETCH_ERROR_MESSAGE: &str = "❌ Error fetching prices";

const HEADER: &str = "🚀 *Crypto Prices Update* 🚀";
const FOOTER: &str = "📢 Channel: @pulse_updates | ✉️ Contact: @pulse_admin";

/// Grouped-digit decimal: thousands separators, two fraction digits only when
/// the value has cents after rounding.
pub fn format_grouped(v: f64) -> String {
    let cents = (v * 100.0).round() as i64;
    let grouped = group_thousands(cents / 100);
    let frac = cents % 100;
    if frac == 0 {
        grouped
    } else {
        format!("{}.{:02}", grouped, frac)
    }
}

/// Abbreviate a market cap into T/B/M units, two decimals. Boundary values
/// take the larger unit; below 1e6 falls back to grouped decimal.
pub fn format_market_cap(v: f64) -> String {
    if v >= 1e12 {
        format!("${:.2}T", v / 1e12)
    } else if v >= 1e9 {
        format!("${:.2}B", v / 1e9)
    } else if v >= 1e6 {
        format!("${:.2}M", v / 1e6)
    } else {
        format!("${}", format_grouped(v))
    }
}

/// Render the full chat message for one snapshot. Pure: given the same
/// snapshot and clock reading, the output is identical.
pub fn price_update_message(snapshot: Option<&PriceSnapshot>, now: DateTime<Utc>) -> String {
    let Some(snapshot) = snapshot else {
        return FETCH_ERROR_MESSAGE.to_string();
    };

    let mut lines = Vec::with_capacity(ASSETS.len() + 4);
    lines.push(HEADER.to_string());
    lines.push(String::new());
    for (id, label) in ASSETS {
        lines.push(asset_line(label, snapshot.get(id)));
    }
    lines.push(String::new());
    lines.push(format!(
        "⏰ Updated at: {}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(String::new());
    lines.push(FOOTER.to_string());
    lines.join("\n")
}

fn asset_line(label: &str, quote: Option<&AssetQuote>) -> String {
    match quote {
        Some(quote) => {
            let mut line = format!("*{}:* ${}", label, format_grouped(quote.usd));
            if let Some(cap) = quote.usd_market_cap {
                line.push_str(&format!(" | MC: {}", format_market_cap(cap)));
            }
            line
        }
        None => format!("*{}:* n/a", label),
    }
}

fn group_thousands(mut n: i64) -> String {
    let negative = n < 0;
    n = n.abs();
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}
