use config_manager::{KnownTokenConfig, TokenRegistryConfig};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenCategory {
    Memecoin,
    Defi,
    Other,
}

impl TokenCategory {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "defi" => TokenCategory::Defi,
            "other" => TokenCategory::Other,
            _ => TokenCategory::Memecoin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenInfo {
    pub symbol: String,
    pub name: String,
    pub category: TokenCategory,
    pub fallback_price_usd: Option<Decimal>,
}

/// Base asset, stable set and known-token table, injected from configuration.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    base_mint: String,
    stable_mints: HashSet<String>,
    tokens: HashMap<String, TokenInfo>,
}

impl TokenRegistry {
    pub fn new(base_mint: impl Into<String>, stable_mints: impl IntoIterator<Item = String>) -> Self {
        Self {
            base_mint: base_mint.into(),
            stable_mints: stable_mints.into_iter().collect(),
            tokens: HashMap::new(),
        }
    }

    pub fn from_config(config: &TokenRegistryConfig) -> Self {
        let mut registry = Self::new(config.base_mint.clone(), config.stable_mints.iter().cloned());
        for token in &config.known_tokens {
            registry.insert_known(token);
        }
        registry
    }

    fn insert_known(&mut self, token: &KnownTokenConfig) {
        let info = TokenInfo {
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            category: TokenCategory::parse(&token.category),
            fallback_price_usd: token.fallback_price_usd.and_then(Decimal::from_f64),
        };
        self.tokens.insert(token.mint.clone(), info);
    }

    pub fn with_token(mut self, mint: impl Into<String>, info: TokenInfo) -> Self {
        self.tokens.insert(mint.into(), info);
        self
    }

    pub fn base_mint(&self) -> &str {
        &self.base_mint
    }

    pub fn is_base(&self, mint: &str) -> bool {
        self.base_mint == mint
    }

    pub fn is_stable(&self, mint: &str) -> bool {
        self.stable_mints.contains(mint)
    }

    /// Base or stable: the "cash" leg of a swap.
    pub fn is_cash(&self, mint: &str) -> bool {
        self.is_base(mint) || self.is_stable(mint)
    }

    pub fn info(&self, mint: &str) -> Option<&TokenInfo> {
        self.tokens.get(mint)
    }

    /// Unknown tokens are assumed to be memecoins.
    pub fn category(&self, mint: &str) -> TokenCategory {
        self.tokens
            .get(mint)
            .map(|info| info.category)
            .unwrap_or(TokenCategory::Memecoin)
    }

    /// Known symbol, else the first six characters of the mint.
    pub fn symbol(&self, mint: &str) -> String {
        match self.tokens.get(mint) {
            Some(info) => info.symbol.clone(),
            None => mint.chars().take(6).collect(),
        }
    }

    pub fn fallback_price(&self, mint: &str) -> Option<Decimal> {
        self.tokens.get(mint).and_then(|info| info.fallback_price_usd)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::from_config(&TokenRegistryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_manager::WRAPPED_SOL_MINT;
    use rust_decimal_macros::dec;

    const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
    const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    #[test]
    fn test_cash_classification() {
        let registry = TokenRegistry::default();
        assert!(registry.is_base(WRAPPED_SOL_MINT));
        assert!(registry.is_stable(USDC));
        assert!(registry.is_cash(USDC));
        assert!(!registry.is_cash(BONK));
    }

    #[test]
    fn test_unknown_token_defaults() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.category("NewMint999"), TokenCategory::Memecoin);
        assert_eq!(registry.symbol("NewMint999"), "NewMin");
        assert_eq!(registry.fallback_price("NewMint999"), None);
    }

    #[test]
    fn test_known_token_metadata() {
        let registry = TokenRegistry::default();
        assert_eq!(registry.symbol(BONK), "BONK");
        assert_eq!(registry.category(BONK), TokenCategory::Memecoin);
        assert_eq!(registry.category(USDC), TokenCategory::Defi);
        assert_eq!(registry.fallback_price(WRAPPED_SOL_MINT), Some(dec!(180)));
    }

    #[test]
    fn test_fixture_registry() {
        let registry = TokenRegistry::new("BASE", vec!["STABLE".to_string()]).with_token(
            "LP",
            TokenInfo {
                symbol: "LP".to_string(),
                name: "Some LP".to_string(),
                category: TokenCategory::Other,
                fallback_price_usd: None,
            },
        );
        assert!(registry.is_cash("BASE"));
        assert!(registry.is_cash("STABLE"));
        assert_eq!(registry.category("LP"), TokenCategory::Other);
    }
}
