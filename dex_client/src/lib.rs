// Helius client - wallet swap history from the enhanced-transactions API

pub mod helius_client;
pub mod history_trait_impl;
pub mod swap_normalizer;
pub mod types;

pub use config_manager::HeliusConfig;

pub use helius_client::{
    decode_transaction_page, paginate_swaps, pagination_hint, HeliusClient, HeliusError, PaginationLimits,
};
pub use swap_normalizer::{normalize_transactions, parse_swap_transaction};
pub use types::{
    HeliusErrorBody, HeliusEvents, HeliusInnerSwap, HeliusNativeIO, HeliusProgramInfo,
    HeliusRawTokenAmount, HeliusSwapEvent, HeliusTokenIO, HeliusTokenTransfer, HeliusTransaction,
};
