use std::collections::HashMap;

use super::*;
use crate::config::NetworkOverride;
use crate::errors::AdminError;

#[test]
fn test_every_identifier_has_one_valid_descriptor() {
    let registry = NetworkRegistry::builtin();
    registry.validate().unwrap();
    assert_eq!(registry.all().len(), NetworkId::ALL.len());

    for id in NetworkId::ALL {
        let descriptor = registry.get(id).unwrap();
        assert_eq!(descriptor.id, id);
        assert_eq!(descriptor.family(), id.family());
    }
}

#[test]
fn test_descriptor_shapes_by_family() {
    let registry = NetworkRegistry::builtin();

    for descriptor in registry.all() {
        match descriptor.id {
            NetworkId::BscTestnet
            | NetworkId::Base
            | NetworkId::Bsc
            | NetworkId::Linea
            | NetworkId::Arbitrum => {
                assert!(descriptor.module_contract.is_some());
                assert!(descriptor.portal_contract.is_some());
                assert!(descriptor.attestation_contract.is_none());
                assert!(descriptor.evm_chain_id.is_some());
            }
            NetworkId::Ethereum => {
                assert!(descriptor.attestation_contract.is_some());
                assert!(descriptor.module_contract.is_none());
                assert_eq!(descriptor.fee_contract(), descriptor.collector_contract());
            }
            NetworkId::Near | NetworkId::Solana | NetworkId::Ton => {
                assert!(descriptor.attestation_contract.is_some());
                assert!(descriptor.evm_chain_id.is_none());
            }
        }
    }
}

#[test]
fn test_lookup_by_identifier() {
    let registry = NetworkRegistry::builtin();

    assert_eq!(registry.lookup("base").unwrap().id, NetworkId::Base);
    assert_eq!(registry.lookup("BSC-Testnet").unwrap().id, NetworkId::BscTestnet);
    assert_eq!(registry.lookup("ton").unwrap().decimals(), 9);
    assert_eq!(registry.lookup("near").unwrap().decimals(), 24);

    assert!(matches!(
        registry.lookup("polygon"),
        Err(AdminError::NotFound(_))
    ));
    assert!(matches!(registry.lookup(""), Err(AdminError::NotFound(_))));
}

#[test]
fn test_identifier_serialization() {
    assert_eq!(
        serde_json::to_string(&NetworkId::BscTestnet).unwrap(),
        "\"bsc-testnet\""
    );
    let id: NetworkId = serde_json::from_str("\"arbitrum\"").unwrap();
    assert_eq!(id, NetworkId::Arbitrum);

    for id in NetworkId::ALL {
        assert_eq!(id.to_string().parse::<NetworkId>().unwrap(), id);
    }
}

#[test]
fn test_fee_and_collector_contracts() {
    let registry = NetworkRegistry::builtin();
    let base = registry.get(NetworkId::Base).unwrap();
    assert_eq!(base.fee_contract(), base.module_contract.as_deref());
    assert_eq!(base.collector_contract(), base.portal_contract.as_deref());

    let explorer = base.explorer_address_url("0xabc").unwrap();
    assert_eq!(explorer, "https://basescan.org/address/0xabc");
}

#[test]
fn test_overrides_replace_deployment_values() {
    let mut overrides = HashMap::new();
    overrides.insert(
        NetworkId::Near,
        NetworkOverride {
            rpc_url: Some("https://rpc.testnet.near.org".to_string()),
            attestation_contract: Some("attestation.testnet".to_string()),
            ..NetworkOverride::default()
        },
    );

    let registry = NetworkRegistry::builtin().with_overrides(&overrides).unwrap();
    let near = registry.get(NetworkId::Near).unwrap();
    assert_eq!(near.rpc_url, "https://rpc.testnet.near.org");
    assert_eq!(near.attestation_contract.as_deref(), Some("attestation.testnet"));

    // Untouched networks keep their built-in values
    let base = registry.get(NetworkId::Base).unwrap();
    assert_eq!(base.rpc_url, "https://mainnet.base.org");
}

#[test]
fn test_override_breaking_shape_is_rejected() {
    let mut overrides = HashMap::new();
    overrides.insert(
        NetworkId::Base,
        NetworkOverride {
            attestation_contract: Some("0x0000000000000000000000000000000000000001".to_string()),
            ..NetworkOverride::default()
        },
    );

    assert!(matches!(
        NetworkRegistry::builtin().with_overrides(&overrides),
        Err(AdminError::Config(_))
    ));

    let mut overrides = HashMap::new();
    overrides.insert(
        NetworkId::Solana,
        NetworkOverride {
            rpc_url: Some("  ".to_string()),
            ..NetworkOverride::default()
        },
    );
    assert!(NetworkRegistry::builtin().with_overrides(&overrides).is_err());
}
