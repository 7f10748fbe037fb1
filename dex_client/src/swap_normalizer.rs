use crate::types::{HeliusNativeIO, HeliusSwapEvent, HeliusTokenIO, HeliusTransaction};
use config_manager::WRAPPED_SOL_MINT;
use pnl_core::SwapEvent;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

const LAMPORTS_SCALE: u32 = 9;

fn scaled(raw: &str, decimals: u32) -> Option<Decimal> {
    let raw: i128 = raw.trim().parse().ok()?;
    Decimal::try_from_i128_with_scale(raw, decimals).ok()
}

fn native_leg(io: &HeliusNativeIO) -> Option<(String, Decimal)> {
    if matches!(io.amount.trim(), "" | "0") {
        return None;
    }
    scaled(&io.amount, LAMPORTS_SCALE).map(|amount| (WRAPPED_SOL_MINT.to_string(), amount))
}

fn token_leg(io: &HeliusTokenIO) -> Option<(String, Decimal)> {
    if io.mint.is_empty() {
        return None;
    }
    let raw = io.raw_token_amount.as_ref()?;
    scaled(&raw.token_amount, raw.decimals).map(|amount| (io.mint.clone(), amount))
}

/// Native SOL when present and non-zero, else the first token entry.
fn pick_leg(native: Option<&HeliusNativeIO>, tokens: &[HeliusTokenIO]) -> Option<(String, Decimal)> {
    match native.filter(|io| !matches!(io.amount.trim(), "" | "0")) {
        Some(io) => native_leg(io),
        None => tokens.first().and_then(token_leg),
    }
}

fn from_swap_event(tx: &HeliusTransaction, event: &HeliusSwapEvent) -> Option<SwapEvent> {
    let (token_in, amount_in) = pick_leg(event.native_input.as_ref(), &event.token_inputs)?;
    let (token_out, amount_out) = pick_leg(event.native_output.as_ref(), &event.token_outputs)?;

    if amount_in <= Decimal::ZERO || amount_out <= Decimal::ZERO {
        return None;
    }

    let timestamp_ms = tx.timestamp.checked_mul(1000)?;

    let program_id = event
        .inner_swaps
        .first()
        .and_then(|inner| inner.program_info.as_ref())
        .map(|info| info.account.clone())
        .filter(|account| !account.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    Some(SwapEvent {
        signature: tx.signature.clone(),
        timestamp_ms,
        token_in,
        token_out,
        amount_in,
        amount_out,
        program_id,
    })
}

fn from_token_transfers(tx: &HeliusTransaction, wallet_address: &str) -> Option<SwapEvent> {
    let sent = tx.token_transfers.iter().find(|t| {
        t.from_user_account.as_deref() == Some(wallet_address) && t.token_amount > 0.0 && !t.mint.is_empty()
    })?;
    let received = tx.token_transfers.iter().find(|t| {
        t.to_user_account.as_deref() == Some(wallet_address) && t.token_amount > 0.0 && !t.mint.is_empty()
    })?;

    let timestamp_ms = tx.timestamp.checked_mul(1000)?;
    let amount_in = Decimal::from_f64(sent.token_amount)?;
    let amount_out = Decimal::from_f64(received.token_amount)?;
    if amount_in <= Decimal::ZERO || amount_out <= Decimal::ZERO {
        return None;
    }

    Some(SwapEvent {
        signature: tx.signature.clone(),
        timestamp_ms,
        token_in: sent.mint.clone(),
        token_out: received.mint.clone(),
        amount_in,
        amount_out,
        program_id: if tx.source.is_empty() {
            "unknown".to_string()
        } else {
            tx.source.clone()
        },
    })
}

/// Normalize one raw Helius record into a swap, or `None` when it is not a
/// usable swap for `wallet_address`.
///
/// The structured swap event is preferred; `SWAP` records without one fall
/// back to the first outgoing and first incoming token transfer.
pub fn parse_swap_transaction(tx: &HeliusTransaction, wallet_address: &str) -> Option<SwapEvent> {
    if let Some(event) = tx.events.as_ref().and_then(|e| e.swap.as_ref()) {
        if let Some(swap) = from_swap_event(tx, event) {
            return Some(swap);
        }
    }

    if tx.transaction_type == "SWAP" && tx.token_transfers.len() >= 2 {
        if let Some(swap) = from_token_transfers(tx, wallet_address) {
            return Some(swap);
        }
    }

    debug!("Skipping non-swap transaction {}", tx.signature);
    None
}

/// Normalize a page of raw records, dropping everything that is not a swap.
pub fn normalize_transactions(transactions: &[HeliusTransaction], wallet_address: &str) -> Vec<SwapEvent> {
    transactions
        .iter()
        .filter_map(|tx| parse_swap_transaction(tx, wallet_address))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HeliusEvents, HeliusTokenTransfer};
    use rust_decimal_macros::dec;

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    fn transfer(from: &str, to: &str, amount: f64, mint: &str) -> HeliusTokenTransfer {
        HeliusTokenTransfer {
            from_user_account: Some(from.to_string()),
            to_user_account: Some(to.to_string()),
            token_amount: amount,
            mint: mint.to_string(),
        }
    }

    #[test]
    fn test_scaled_amounts() {
        assert_eq!(scaled("1500000000", 9), Some(dec!(1.5)));
        assert_eq!(scaled("42", 0), Some(dec!(42)));
        assert_eq!(scaled("not-a-number", 6), None);
        assert_eq!(scaled("1", 40), None);
    }

    #[test]
    fn test_transfer_fallback_for_swap_type() {
        let tx = HeliusTransaction {
            signature: "sig1".to_string(),
            timestamp: 1_700_000_000,
            transaction_type: "SWAP".to_string(),
            source: "RAYDIUM".to_string(),
            token_transfers: vec![
                transfer("pool", WALLET, 250.0, "BonkMint"),
                transfer(WALLET, "pool", 1.25, "UsdcMint"),
            ],
            events: Some(HeliusEvents { swap: None }),
        };

        let swap = parse_swap_transaction(&tx, WALLET).unwrap();
        assert_eq!(swap.token_in, "UsdcMint");
        assert_eq!(swap.token_out, "BonkMint");
        assert_eq!(swap.amount_in, dec!(1.25));
        assert_eq!(swap.amount_out, dec!(250));
        assert_eq!(swap.program_id, "RAYDIUM");
        assert_eq!(swap.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_overflowing_timestamp_is_dropped() {
        let tx = HeliusTransaction {
            signature: "sig-far-future".to_string(),
            timestamp: i64::MAX,
            transaction_type: "SWAP".to_string(),
            token_transfers: vec![
                transfer("pool", WALLET, 250.0, "BonkMint"),
                transfer(WALLET, "pool", 1.25, "UsdcMint"),
            ],
            ..HeliusTransaction::default()
        };
        assert!(parse_swap_transaction(&tx, WALLET).is_none());
    }

    #[test]
    fn test_non_swap_type_without_event_is_dropped() {
        let tx = HeliusTransaction {
            signature: "sig2".to_string(),
            transaction_type: "TRANSFER".to_string(),
            token_transfers: vec![
                transfer("a", WALLET, 1.0, "X"),
                transfer(WALLET, "b", 1.0, "Y"),
            ],
            ..HeliusTransaction::default()
        };
        assert!(parse_swap_transaction(&tx, WALLET).is_none());
    }

    #[test]
    fn test_transfer_fallback_needs_both_directions() {
        let tx = HeliusTransaction {
            signature: "sig3".to_string(),
            transaction_type: "SWAP".to_string(),
            token_transfers: vec![
                transfer("a", WALLET, 1.0, "X"),
                transfer("b", WALLET, 2.0, "Y"),
            ],
            ..HeliusTransaction::default()
        };
        assert!(parse_swap_transaction(&tx, WALLET).is_none());
    }
}
