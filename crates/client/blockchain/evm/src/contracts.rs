//! Solidity interfaces of the game contracts.
//!
//! Only the functions and events the client touches are declared.

// The sol! macro generates code that we can't document
#![allow(missing_docs)]

use alloy_sol_types::sol;

sol! {
    /// ERC-1155 creature contract with training and PokeCoin linkage.
    #[derive(Debug, PartialEq, Eq)]
    interface IPokemonNFT {
        struct PokemonData {
            string name;
            string pokemonType;
            uint256 level;
            uint256 xp;
            bool isTraining;
            uint256 trainingStartTime;
            uint256 trainingGroundId;
        }

        struct TrainingGroundData {
            string name;
            string requiredType;
            uint256 minLevel;
            uint256 cost;
            bool isActive;
        }

        event TransferSingle(
            address indexed operator,
            address indexed from,
            address indexed to,
            uint256 id,
            uint256 value
        );

        event TrainingStarted(
            uint256 indexed pokemonId,
            address indexed trainer,
            uint256 groundId
        );

        event TrainingCompleted(
            uint256 indexed pokemonId,
            address indexed trainer,
            uint256 xpGained
        );

        function hasStarterPokemon(address owner) external view returns (bool);
        function balanceOf(address account, uint256 id) external view returns (uint256);
        function getPokemonData(uint256 pokemonId) external view returns (PokemonData memory);
        function getTrainingGround(uint256 groundId) external view returns (TrainingGroundData memory);
        function uri(uint256 id) external view returns (string memory);
        function XP_PER_MINUTE() external view returns (uint256);
        function TYPE_BONUS_MULTIPLIER() external view returns (uint256);
        function canCompleteTraining(uint256 pokemonId) external view returns (bool canComplete, string memory reason);

        function mintStarterPokemon(uint256 pokemonId) external;
        function startTraining(uint256 pokemonId, uint256 groundId) external;
        function completeTraining(uint256 pokemonId) external;
        function endTraining(uint256 pokemonId, uint256 groundId) external;
        function setPokeCoinContract(address pokeCoin) external;
        function addMinter(address minter) external;
    }
}

sol! {
    /// Item marketplace, paid in the native currency.
    #[derive(Debug, PartialEq, Eq)]
    interface IMarketplace {
        struct Item {
            string name;
            string itemType;
            uint256 price;
            bool isAvailable;
        }

        function getItem(uint256 itemId) external view returns (Item memory);
        function balanceOf(address account, uint256 id) external view returns (uint256);
        function purchaseItem(uint256 itemId, uint256 amount) external payable;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{U256, keccak256};
    use alloy_sol_types::{SolCall, SolEvent};

    #[test]
    fn selectors_match_canonical_signatures() {
        assert_eq!(
            IPokemonNFT::hasStarterPokemonCall::SELECTOR,
            keccak256("hasStarterPokemon(address)")[..4]
        );
        assert_eq!(
            IPokemonNFT::balanceOfCall::SELECTOR,
            keccak256("balanceOf(address,uint256)")[..4]
        );
        assert_eq!(
            IPokemonNFT::startTrainingCall::SELECTOR,
            keccak256("startTraining(uint256,uint256)")[..4]
        );
        assert_eq!(
            IMarketplace::purchaseItemCall::SELECTOR,
            keccak256("purchaseItem(uint256,uint256)")[..4]
        );
    }

    #[test]
    fn transfer_single_topic_is_erc1155_standard() {
        assert_eq!(
            IPokemonNFT::TransferSingle::SIGNATURE_HASH,
            keccak256("TransferSingle(address,address,address,uint256,uint256)")
        );
    }

    #[test]
    fn mint_calldata_encodes_id() {
        let data = IPokemonNFT::mintStarterPokemonCall {
            pokemonId: U256::from(4),
        }
        .abi_encode();
        assert_eq!(data.len(), 4 + 32);
        assert_eq!(data[35], 4);
    }
}
