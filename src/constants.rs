/// Default contract addresses per network
pub mod contracts {
    pub mod bsc_testnet {
        pub const MODULE_CONTRACT: &str = "0x3Dba2047c87E9Fa4e14D97Fa11De7f86C959844b";
        pub const PORTAL_CONTRACT: &str = "0x838D82F110F5bdc23732C7Acab5949D067594C39";
    }

    pub mod base {
        pub const MODULE_CONTRACT: &str = "0x3eAE5566344e99A9D9c515332883Fd30b5184701";
        pub const PORTAL_CONTRACT: &str = "0x8d3bc9Ff4e55d09EE547A076D73b50faa4C79C1e";
    }

    pub mod bsc {
        pub const MODULE_CONTRACT: &str = "0x0fEbD23cbefeDF1A65d9FE51a0b6d63C3a477e05";
        pub const PORTAL_CONTRACT: &str = "0x0b4d4fbde2caf7df2bdb1bfe3fe941ab79f2275f";
    }

    pub mod linea {
        pub const MODULE_CONTRACT: &str = "0x5AcF01D27F85DA54d34E18A25731f87528f97506";
        pub const PORTAL_CONTRACT: &str = "0x3853D7CEE9a825A24F48f7e1f6aaEcB91Ba3683f";
    }

    pub mod arbitrum {
        pub const MODULE_CONTRACT: &str = "0xa87B3E7e3bBe0E721309119B610B32683b61db08";
        pub const PORTAL_CONTRACT: &str = "0x96b3B714A4339b12725f1AFefd6BD844F7b40A30";
    }

    /// Deployment-specific; override through `[networks.<id>]` in the config file
    pub mod ethereum {
        pub const ATTESTATION_CONTRACT: &str = "0x4b4ca2e5d8a5bbdd2b0c3f1e0b6d1b2c9e7a3f10";
    }

    /// Deployment-specific; override through `[networks.<id>]` in the config file
    pub mod near {
        pub const ATTESTATION_CONTRACT: &str = "attestation.hapiprotocol.near";
    }

    /// Deployment-specific; override through `[networks.<id>]` in the config file
    pub mod solana {
        pub const ATTESTATION_PROGRAM: &str = "AE53XvWSDo3SZWVLWXSCvhfeq6NMptkMAYvzxfuypVg2";
    }

    /// Deployment-specific; override through `[networks.<id>]` in the config file
    pub mod ton {
        pub const ATTESTATION_CONTRACT: &str =
            "0:90a3f3514815ffe7fa833309db22cd67281e3bfc07e405187680ef4a2714c691";
    }
}

/// EVM contract interface
pub mod evm {
    pub const FEE_MODULE_ABI: &[&str] = &[
        "function createAttestationFee() view returns (uint256)",
        "function updateAttestationFee() view returns (uint256)",
        "function setCreateAttestationFee(uint256 newFee)",
        "function setUpdateAttestationFee(uint256 newFee)",
    ];

    pub const PORTAL_ABI: &[&str] = &["function withdraw(address to, uint256 amount)"];

    pub const CREATE_FEE_GETTER: &str = "createAttestationFee";
    pub const UPDATE_FEE_GETTER: &str = "updateAttestationFee";
    pub const CREATE_FEE_SETTER: &str = "setCreateAttestationFee";
    pub const UPDATE_FEE_SETTER: &str = "setUpdateAttestationFee";
    pub const WITHDRAW: &str = "withdraw";
}

/// NEAR contract interface
pub mod near {
    pub const GET_PRICES: &str = "get_prices";
    pub const UPDATE_COSTS: &str = "update_costs";
    pub const WITHDRAW: &str = "withdraw";

    /// Default `update_costs` argument names
    pub const CREATE_FEE_ARG: &str = "create_fee";
    pub const UPDATE_FEE_ARG: &str = "update_fee";

    /// 100 TGas, the wallet-selector default
    pub const DEFAULT_GAS: u64 = 100_000_000_000_000;

    pub const FINALITY: &str = "final";
}

/// Solana program and SPL constants
pub mod solana {
    pub const STATE_SEED: &[u8] = b"state";

    pub const SET_CREATE_FEE_IX: &str = "set_create_attestation_fee";
    pub const SET_UPDATE_FEE_IX: &str = "set_update_attestation_fee";
    pub const STATE_ACCOUNT: &str = "State";

    /// `max_retries` passed with every sent transaction
    pub const SEND_MAX_RETRIES: usize = 3;
}

/// TON contract interface
pub mod ton {
    pub const GET_CREATE_FEE: &str = "get_create_attestation_fee";
    pub const GET_UPDATE_FEE: &str = "get_update_attestation_fee";

    pub const OP_CHANGE_CREATE_FEE: &str = "change_create_attestation_fee";
    pub const OP_CHANGE_UPDATE_FEE: &str = "change_update_attestation_fee";
    pub const OP_WITHDRAW_FUNDS: &str = "withdraw_funds";

    /// Gas allowance attached to every admin message (0.05 TON)
    pub const DEFAULT_GAS: u128 = 50_000_000;

    /// Wallet request validity window in seconds
    pub const VALIDITY_WINDOW_SECS: i64 = 5 * 60;

    pub const DEFAULT_API_URL: &str = "https://tonapi.io";
}
