use serde::{Deserialize, Serialize};

// Helius enhanced-transactions response. Only the fields the swap
// normalizer reads are modelled; everything is optional on the wire.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusTransaction {
    pub signature: String,
    /// Block time, UTC seconds
    #[serde(default)]
    pub timestamp: i64,
    #[serde(rename = "type", default)]
    pub transaction_type: String,
    #[serde(default)]
    pub source: String,
    #[serde(rename = "tokenTransfers", default)]
    pub token_transfers: Vec<HeliusTokenTransfer>,
    #[serde(default)]
    pub events: Option<HeliusEvents>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusTokenTransfer {
    #[serde(rename = "fromUserAccount", default)]
    pub from_user_account: Option<String>,
    #[serde(rename = "toUserAccount", default)]
    pub to_user_account: Option<String>,
    /// Already decimal-scaled by Helius
    #[serde(rename = "tokenAmount", default)]
    pub token_amount: f64,
    #[serde(default)]
    pub mint: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusEvents {
    #[serde(default)]
    pub swap: Option<HeliusSwapEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusSwapEvent {
    #[serde(rename = "nativeInput", default)]
    pub native_input: Option<HeliusNativeIO>,
    #[serde(rename = "nativeOutput", default)]
    pub native_output: Option<HeliusNativeIO>,
    #[serde(rename = "tokenInputs", default)]
    pub token_inputs: Vec<HeliusTokenIO>,
    #[serde(rename = "tokenOutputs", default)]
    pub token_outputs: Vec<HeliusTokenIO>,
    #[serde(rename = "innerSwaps", default)]
    pub inner_swaps: Vec<HeliusInnerSwap>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusNativeIO {
    #[serde(default)]
    pub account: String,
    /// Lamports as a decimal string
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusTokenIO {
    #[serde(rename = "userAccount", default)]
    pub user_account: Option<String>,
    #[serde(default)]
    pub mint: String,
    #[serde(rename = "rawTokenAmount", default)]
    pub raw_token_amount: Option<HeliusRawTokenAmount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusRawTokenAmount {
    #[serde(rename = "tokenAmount", default)]
    pub token_amount: String,
    #[serde(default)]
    pub decimals: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusInnerSwap {
    #[serde(rename = "programInfo", default)]
    pub program_info: Option<HeliusProgramInfo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HeliusProgramInfo {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub account: String,
    #[serde(rename = "programName", default)]
    pub program_name: String,
}

/// Error body returned by Helius on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct HeliusErrorBody {
    pub error: String,
}
