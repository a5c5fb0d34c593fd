use crate::error::ProviderContractError;

/// Normalize a symbol to the canonical upper-case, separator-free form
/// (`btc-usd` -> `BTCUSD`). Empty or non-alphanumeric input is rejected.
pub fn normalize_symbol(raw: &str) -> Result<String, ProviderContractError> {
    let normalized: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '-' && *c != '_')
        .collect::<String>()
        .to_uppercase();

    if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ProviderContractError::InvalidSymbol(raw.to_string()));
    }

    Ok(normalized)
}

/// True if `symbol` is already in canonical form
pub fn is_canonical(symbol: &str) -> bool {
    normalize_symbol(symbol).map_or(false, |s| s == symbol)
}
