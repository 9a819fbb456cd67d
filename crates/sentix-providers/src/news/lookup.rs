//! Static symbol tables used to build provider queries.

/// Alpha Vantage ticker for a crypto symbol. Unknown symbols are prefixed verbatim.
pub fn crypto_ticker(symbol: &str) -> String {
    let known = match symbol.to_uppercase().as_str() {
        "BTC" => Some("CRYPTO:BTC"),
        "ETH" => Some("CRYPTO:ETH"),
        "USDT" => Some("CRYPTO:USDT"),
        "BNB" => Some("CRYPTO:BNB"),
        "XRP" => Some("CRYPTO:XRP"),
        "ADA" => Some("CRYPTO:ADA"),
        "DOGE" => Some("CRYPTO:DOGE"),
        "SOL" => Some("CRYPTO:SOL"),
        "DOT" => Some("CRYPTO:DOT"),
        "MATIC" => Some("CRYPTO:MATIC"),
        _ => None,
    };
    known
        .map(str::to_string)
        .unwrap_or_else(|| format!("CRYPTO:{symbol}"))
}

/// Human-readable name for a crypto symbol, used in full-text queries.
pub fn crypto_name(symbol: &str) -> Option<&'static str> {
    match symbol.to_uppercase().as_str() {
        "BTC" => Some("Bitcoin"),
        "ETH" => Some("Ethereum"),
        "USDT" => Some("Tether"),
        "BNB" => Some("Binance Coin"),
        "XRP" => Some("Ripple"),
        "ADA" => Some("Cardano"),
        "DOGE" => Some("Dogecoin"),
        "SOL" => Some("Solana"),
        "DOT" => Some("Polkadot"),
        "MATIC" => Some("Polygon"),
        _ => None,
    }
}

/// A currency pair such as `EURUSD`, split into its ISO codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForexPair {
    pub symbol: String,
    pub base: String,
    pub quote: String,
}

impl ForexPair {
    /// Split a six-letter pair. Separators (`EUR/USD`, `EUR-USD`) are ignored.
    pub fn parse(symbol: &str) -> Option<Self> {
        let letters: String = symbol
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_uppercase();
        if letters.len() != 6 {
            return None;
        }
        Some(Self {
            base: letters[..3].to_string(),
            quote: letters[3..].to_string(),
            symbol: letters,
        })
    }

    /// Topic search term, e.g. `"EUR USD"`.
    pub fn search_term(&self) -> String {
        format!("{} {}", self.base, self.quote)
    }

    /// Whether the article text names this pair: the pair itself, both codes,
    /// or the search term.
    pub fn is_mentioned_in(&self, text: &str) -> bool {
        let text = text.to_lowercase();
        let base = self.base.to_lowercase();
        let quote = self.quote.to_lowercase();
        text.contains(&self.symbol.to_lowercase())
            || (text.contains(&base) && text.contains(&quote))
            || text.contains(&self.search_term().to_lowercase())
    }

    /// Looser match used on untargeted feeds: the pair is named, or the text
    /// talks about currencies and names at least one side of the pair.
    pub fn is_loosely_mentioned_in(&self, text: &str) -> bool {
        const FOREX_KEYWORDS: [&str; 4] = ["forex", "currency", "exchange rate", "fx "];

        let text = text.to_lowercase();
        let base = self.base.to_lowercase();
        let quote = self.quote.to_lowercase();
        let has_codes = text.contains(&self.symbol.to_lowercase())
            || (text.contains(&base) && text.contains(&quote));
        let has_keyword = FOREX_KEYWORDS.iter().any(|k| text.contains(k));
        has_codes || (has_keyword && (text.contains(&base) || text.contains(&quote)))
    }
}
