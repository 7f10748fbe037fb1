use crate::token_registry::TokenRegistry;
use crate::types::{SwapEvent, TokenPosition};
use std::collections::HashMap;
use tracing::debug;

/// Which side of a position a swap falls on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapSide {
    /// Cash went in, this token came out
    Acquisition(String),
    /// This token went out
    Disposal(String),
}

impl SwapSide {
    pub fn token(&self) -> &str {
        match self {
            SwapSide::Acquisition(token) | SwapSide::Disposal(token) => token,
        }
    }

    pub fn is_acquisition(&self) -> bool {
        matches!(self, SwapSide::Acquisition(_))
    }
}

/// A swap spending base or stable is an acquisition of `token_out`. Every
/// other swap, token-to-token included, is a disposal of `token_in`.
pub fn classify_swap(token_in: &str, token_out: &str, registry: &TokenRegistry) -> SwapSide {
    if registry.is_cash(token_in) {
        SwapSide::Acquisition(token_out.to_string())
    } else {
        SwapSide::Disposal(token_in.to_string())
    }
}

/// Group swaps into one position per non-cash token.
pub fn build_positions(
    swaps: &[SwapEvent],
    registry: &TokenRegistry,
) -> HashMap<String, TokenPosition> {
    let mut positions: HashMap<String, TokenPosition> = HashMap::new();

    for swap in swaps {
        let side = classify_swap(&swap.token_in, &swap.token_out, registry);
        let position = positions
            .entry(side.token().to_string())
            .or_insert_with(|| TokenPosition::new(side.token()));

        match side {
            SwapSide::Acquisition(_) => {
                position.total_acquired = position.total_acquired.saturating_add(swap.amount_out);
                position.acquisitions.push(swap.clone());
            }
            SwapSide::Disposal(_) => {
                position.total_disposed = position.total_disposed.saturating_add(swap.amount_in);
                position.disposals.push(swap.clone());
            }
        }
    }

    debug!(
        "Matched {} swaps into {} token positions",
        swaps.len(),
        positions.len()
    );

    positions
}
