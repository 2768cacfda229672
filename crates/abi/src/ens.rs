use alloy::sol;

sol! {
    /// ENS registry, deployed at the same address on mainnet and the major testnets.
    #[sol(rpc)]
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    /// Reverse records resolve `<addr>.addr.reverse` nodes to a primary name.
    #[sol(rpc)]
    interface INameResolver {
        function name(bytes32 node) external view returns (string);
    }

    #[sol(rpc)]
    interface IAddrResolver {
        function addr(bytes32 node) external view returns (address);
    }
}
