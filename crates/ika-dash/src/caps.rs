//! dWallet capabilities owned by an address
//!
//! A `DWalletCap` authorizes its owner to sign with one dWallet. Listing
//! walks `suix_getOwnedObjects` page by page until the node reports no
//! further page.

use crate::client::IkaClient;
use crate::client::rpc::object_snapshot;
use ika_dash_common::FetchError;
use serde_json::Value;
use tracing::debug;

/// Objects requested per page
pub const CAPS_PAGE_SIZE: usize = 50;

/// Move struct name of a dWallet capability
pub const DWALLET_CAP_STRUCT: &str = "DWalletCap";

/// Fully qualified capability type within the coordinator package
pub fn dwallet_cap_type(package: &str) -> String {
    format!("{package}::coordinator_inner::{DWALLET_CAP_STRUCT}")
}

/// Check a Move type (`0x..::module::Struct<..>`) names a dWallet capability
pub fn is_dwallet_cap(move_type: &str) -> bool {
    let base = move_type.split('<').next().unwrap_or(move_type);
    base.rsplit("::").next() == Some(DWALLET_CAP_STRUCT)
}

/// List every dWallet capability owned by `owner`.
///
/// With a coordinator `package` the node filters by type; without one all
/// owned objects are listed and non-capabilities skipped here.
pub async fn list_dwallet_caps(
    client: &IkaClient,
    owner: &str,
    package: Option<&str>,
) -> Result<Vec<Value>, FetchError> {
    let struct_type = package.map(dwallet_cap_type);
    let mut caps = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages = 0u32;

    loop {
        let page = client
            .owned_objects_page(owner, struct_type.as_deref(), cursor.as_deref(), CAPS_PAGE_SIZE)
            .await?;
        pages += 1;

        for entry in &page.entries {
            let data = entry.get("data");
            let is_cap = data
                .and_then(|d| d.get("type"))
                .and_then(Value::as_str)
                .is_some_and(is_dwallet_cap);
            if !is_cap {
                continue;
            }
            let id = data
                .and_then(|d| d.get("objectId"))
                .and_then(Value::as_str)
                .unwrap_or_default();
            caps.push(object_snapshot(id, entry)?);
        }

        match page.next() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    debug!(owner, pages, caps = caps.len(), "Listed dWallet caps");
    Ok(caps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dwallet_cap_type() {
        assert_eq!(
            dwallet_cap_type("0xabc"),
            "0xabc::coordinator_inner::DWalletCap"
        );
        assert!(is_dwallet_cap(&dwallet_cap_type("0xabc")));
    }

    #[test]
    fn test_is_dwallet_cap() {
        assert!(is_dwallet_cap("0x3::coordinator_inner::DWalletCap"));
        assert!(!is_dwallet_cap("0x3::coordinator_inner::DWallet"));
        assert!(!is_dwallet_cap("0x2::coin::Coin<0x2::sui::SUI>"));
        assert!(!is_dwallet_cap(""));
    }
}
