//! Recipient resolution: friendly name or raw address -> chain address.
//!
//! Pure, no I/O. The layered fallback tolerates users supplying either a
//! directory name or a raw address for either chain without saying which;
//! unresolved names pass through so the adapter call fails with an
//! adapter-level error instead of being swallowed here.

use std::sync::OnceLock;

use regex::Regex;

use crate::directory::AddressDirectory;

fn ethereum_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid regex"))
}

fn solana_address_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{32,44}$").expect("valid regex"))
}

/// True when `value` has Ethereum address syntax (0x + 40 hex chars).
pub fn is_ethereum_address(value: &str) -> bool {
    ethereum_address_re().is_match(value)
}

/// True when `value` has Solana address syntax (base-58 alphabet, 32-44 chars).
pub fn is_solana_address(value: &str) -> bool {
    solana_address_re().is_match(value)
}

/// Resolve a raw recipient token against a directory.
///
/// Resolution order, first match wins:
/// 1. unset stays unset;
/// 2. case-insensitive display-name reverse lookup;
/// 3. Ethereum address syntax, passed through;
/// 4. Solana address syntax, passed through;
/// 5. a key already present in the directory, passed through;
/// 6. anything else, passed through unresolved.
pub fn resolve_recipient(to: Option<&str>, directory: &AddressDirectory) -> Option<String> {
    let to = to?;

    if let Some(address) = directory.address_for(to) {
        return Some(address.to_string());
    }
    if is_ethereum_address(to) || is_solana_address(to) {
        return Some(to.to_string());
    }
    if directory.contains_address(to) {
        return Some(to.to_string());
    }

    Some(to.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const ETH_ADDR: &str = "0x1f9840a85d5aF5bf1D1762F925BDADdC4201F984";
    const SOL_ADDR: &str = "4Nd1mYvDkmZywJ26oaVvUnqj7DqzeRcVQdZy3oA8Ly2x";

    fn directory() -> AddressDirectory {
        AddressDirectory::from_pairs([(ETH_ADDR, "Ananya"), (SOL_ADDR, "Ravi")])
    }

    #[test]
    fn unset_recipient_stays_unset() {
        assert_eq!(resolve_recipient(None, &directory()), None);
    }

    #[test]
    fn display_name_resolves_case_insensitively() {
        assert_eq!(
            resolve_recipient(Some("ananya"), &directory()).as_deref(),
            Some(ETH_ADDR)
        );
    }

    #[test]
    fn canonical_addresses_round_trip_unchanged() {
        let empty = AddressDirectory::default();
        assert_eq!(
            resolve_recipient(Some(ETH_ADDR), &empty).as_deref(),
            Some(ETH_ADDR)
        );
        assert_eq!(
            resolve_recipient(Some(SOL_ADDR), &empty).as_deref(),
            Some(SOL_ADDR)
        );
    }

    #[test]
    fn name_match_beats_address_passthrough() {
        // A display name that itself has valid address syntax still
        // resolves through the directory first.
        let dir = AddressDirectory::from_pairs([("real-destination", ETH_ADDR)]);
        assert_eq!(
            resolve_recipient(Some(ETH_ADDR), &dir).as_deref(),
            Some("real-destination")
        );
    }

    #[test]
    fn directory_key_passes_through() {
        let dir = AddressDirectory::from_pairs([("opaque-key-not-an-address", "Zoe")]);
        assert_eq!(
            resolve_recipient(Some("opaque-key-not-an-address"), &dir).as_deref(),
            Some("opaque-key-not-an-address")
        );
    }

    #[test]
    fn unresolved_names_pass_through() {
        assert_eq!(
            resolve_recipient(Some("stranger"), &directory()).as_deref(),
            Some("stranger")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let dir = directory();
        let a = resolve_recipient(Some("Ravi"), &dir);
        let b = resolve_recipient(Some("Ravi"), &dir);
        assert_eq!(a, b);
    }

    #[test]
    fn address_syntax_checks() {
        assert!(is_ethereum_address(ETH_ADDR));
        assert!(!is_ethereum_address("0x123"));
        assert!(!is_ethereum_address("1f9840a85d5aF5bf1D1762F925BDADdC4201F984"));
        assert!(is_solana_address(SOL_ADDR));
        // base-58 excludes 0, O, I, l
        assert!(!is_solana_address("0OIl000000000000000000000000000000"));
        assert!(!is_solana_address("tooshort"));
    }
}
