//! RPC endpoint resolution.

use spinup_types::NetworkId;

/// Resolve the RPC endpoint for a network, honoring an explicit override.
pub fn resolve_endpoint(network: NetworkId, override_url: Option<&str>) -> String {
    match override_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => network.default_rpc_url().to_string(),
    }
}
