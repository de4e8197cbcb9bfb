//! Michelson primitive registry
//!
//! Two views over the primitive set: the ordered keyword table used by the
//! binary codec (the code of a keyword is its index), and the closed set of
//! type primitives used by typing.

/// Keyword table of the binary encoding. The byte code of a keyword is its index.
pub const PRIM_KEYWORDS: [&str; 157] = [
    "parameter", "storage", "code", "False", // 0x00
    "Elt", "Left", "None", "Pair", // 0x04
    "Right", "Some", "True", "Unit", // 0x08
    "PACK", "UNPACK", "BLAKE2B", "SHA256", // 0x0c
    "SHA512", "ABS", "ADD", "AMOUNT", // 0x10
    "AND", "BALANCE", "CAR", "CDR", // 0x14
    "CHECK_SIGNATURE", "COMPARE", "CONCAT", "CONS", // 0x18
    "CREATE_ACCOUNT", "CREATE_CONTRACT", "IMPLICIT_ACCOUNT", "DIP", // 0x1c
    "DROP", "DUP", "EDIV", "EMPTY_MAP", // 0x20
    "EMPTY_SET", "EQ", "EXEC", "FAILWITH", // 0x24
    "GE", "GET", "GT", "HASH_KEY", // 0x28
    "IF", "IF_CONS", "IF_LEFT", "IF_NONE", // 0x2c
    "INT", "LAMBDA", "LE", "LEFT", // 0x30
    "LOOP", "LSL", "LSR", "LT", // 0x34
    "MAP", "MEM", "MUL", "NEG", // 0x38
    "NEQ", "NIL", "NONE", "NOT", // 0x3c
    "NOW", "OR", "PAIR", "PUSH", // 0x40
    "RIGHT", "SIZE", "SOME", "SOURCE", // 0x44
    "SENDER", "SELF", "STEPS_TO_QUOTA", "SUB", // 0x48
    "SWAP", "TRANSFER_TOKENS", "SET_DELEGATE", "UNIT", // 0x4c
    "UPDATE", "XOR", "ITER", "LOOP_LEFT", // 0x50
    "ADDRESS", "CONTRACT", "ISNAT", "CAST", // 0x54
    "RENAME", "bool", "contract", "int", // 0x58
    "key", "key_hash", "lambda", "list", // 0x5c
    "map", "big_map", "nat", "option", // 0x60
    "or", "pair", "set", "signature", // 0x64
    "string", "bytes", "mutez", "timestamp", // 0x68
    "unit", "operation", "address", "SLICE", // 0x6c
    "DIG", "DUG", "EMPTY_BIG_MAP", "APPLY", // 0x70
    "chain_id", "CHAIN_ID", "LEVEL", "SELF_ADDRESS", // 0x74
    "never", "NEVER", "UNPAIR", "VOTING_POWER", // 0x78
    "TOTAL_VOTING_POWER", "KECCAK", "SHA3", "PAIRING_CHECK", // 0x7c
    "bls12_381_g1", "bls12_381_g2", "bls12_381_fr", "sapling_state", // 0x80
    "sapling_transaction_deprecated", "SAPLING_EMPTY_STATE", "SAPLING_VERIFY_UPDATE", "ticket", // 0x84
    "TICKET_DEPRECATED", "READ_TICKET", "SPLIT_TICKET", "JOIN_TICKETS", // 0x88
    "GET_AND_UPDATE", "chest", "chest_key", "OPEN_CHEST", // 0x8c
    "VIEW", "view", "constant", "SUB_MUTEZ", // 0x90
    "tx_rollup_l2_address", "MIN_BLOCK_TIME", "sapling_transaction", "EMIT", // 0x94
    "Lambda_rec", "LAMBDA_REC", "TICKET", "BYTES", // 0x98
    "NAT", // 0x9c
];

/// Returns the binary code of a keyword.
pub fn keyword_code(name: &str) -> Option<u8> {
    PRIM_KEYWORDS
        .iter()
        .position(|keyword| *keyword == name)
        .map(|index| index as u8)
}

/// Returns the keyword for a binary code.
pub fn keyword_name(code: u8) -> Option<&'static str> {
    PRIM_KEYWORDS.get(code as usize).copied()
}

// Data constructors
pub const PAIR: &str = "Pair";
pub const LEFT: &str = "Left";
pub const RIGHT: &str = "Right";
pub const SOME: &str = "Some";
pub const NONE: &str = "None";
pub const TRUE: &str = "True";
pub const FALSE: &str = "False";
pub const UNIT: &str = "Unit";
pub const ELT: &str = "Elt";
pub const LAMBDA_REC: &str = "Lambda_rec";

// Script sections
pub const PARAMETER: &str = "parameter";
pub const STORAGE: &str = "storage";
pub const CODE: &str = "code";
pub const VIEW: &str = "view";

/// Expected number of type arguments of a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Exact(expected) => count == *expected,
            Arity::AtLeast(min) => count >= *min,
        }
    }
}

impl std::fmt::Display for Arity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exact(expected) => write!(f, "{expected}"),
            Arity::AtLeast(min) => write!(f, "at least {min}"),
        }
    }
}

/// The closed set of Michelson type primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypePrim {
    Unit,
    Never,
    Operation,
    String,
    Int,
    Nat,
    Mutez,
    Bool,
    Timestamp,
    Bytes,
    Address,
    Key,
    KeyHash,
    Signature,
    ChainId,
    TxRollupL2Address,
    Bls12381Fr,
    Bls12381G1,
    Bls12381G2,
    Chest,
    ChestKey,
    Contract,
    Pair,
    Or,
    Option,
    List,
    Set,
    Map,
    BigMap,
    Lambda,
    Ticket,
    SaplingState,
    SaplingTransaction,
    SaplingTransactionDeprecated,
    Constant,
}

impl TypePrim {
    pub const ALL: [TypePrim; 35] = [
        TypePrim::Unit,
        TypePrim::Never,
        TypePrim::Operation,
        TypePrim::String,
        TypePrim::Int,
        TypePrim::Nat,
        TypePrim::Mutez,
        TypePrim::Bool,
        TypePrim::Timestamp,
        TypePrim::Bytes,
        TypePrim::Address,
        TypePrim::Key,
        TypePrim::KeyHash,
        TypePrim::Signature,
        TypePrim::ChainId,
        TypePrim::TxRollupL2Address,
        TypePrim::Bls12381Fr,
        TypePrim::Bls12381G1,
        TypePrim::Bls12381G2,
        TypePrim::Chest,
        TypePrim::ChestKey,
        TypePrim::Contract,
        TypePrim::Pair,
        TypePrim::Or,
        TypePrim::Option,
        TypePrim::List,
        TypePrim::Set,
        TypePrim::Map,
        TypePrim::BigMap,
        TypePrim::Lambda,
        TypePrim::Ticket,
        TypePrim::SaplingState,
        TypePrim::SaplingTransaction,
        TypePrim::SaplingTransactionDeprecated,
        TypePrim::Constant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TypePrim::Unit => "unit",
            TypePrim::Never => "never",
            TypePrim::Operation => "operation",
            TypePrim::String => "string",
            TypePrim::Int => "int",
            TypePrim::Nat => "nat",
            TypePrim::Mutez => "mutez",
            TypePrim::Bool => "bool",
            TypePrim::Timestamp => "timestamp",
            TypePrim::Bytes => "bytes",
            TypePrim::Address => "address",
            TypePrim::Key => "key",
            TypePrim::KeyHash => "key_hash",
            TypePrim::Signature => "signature",
            TypePrim::ChainId => "chain_id",
            TypePrim::TxRollupL2Address => "tx_rollup_l2_address",
            TypePrim::Bls12381Fr => "bls12_381_fr",
            TypePrim::Bls12381G1 => "bls12_381_g1",
            TypePrim::Bls12381G2 => "bls12_381_g2",
            TypePrim::Chest => "chest",
            TypePrim::ChestKey => "chest_key",
            TypePrim::Contract => "contract",
            TypePrim::Pair => "pair",
            TypePrim::Or => "or",
            TypePrim::Option => "option",
            TypePrim::List => "list",
            TypePrim::Set => "set",
            TypePrim::Map => "map",
            TypePrim::BigMap => "big_map",
            TypePrim::Lambda => "lambda",
            TypePrim::Ticket => "ticket",
            TypePrim::SaplingState => "sapling_state",
            TypePrim::SaplingTransaction => "sapling_transaction",
            TypePrim::SaplingTransactionDeprecated => "sapling_transaction_deprecated",
            TypePrim::Constant => "constant",
        }
    }

    /// Looks a type primitive up by name. Callers lower-case the name first.
    pub fn from_name(name: &str) -> Option<TypePrim> {
        TypePrim::ALL.iter().copied().find(|prim| prim.name() == name)
    }

    pub fn arity(&self) -> Arity {
        match self {
            TypePrim::Pair => Arity::AtLeast(2),
            TypePrim::Or | TypePrim::Map | TypePrim::BigMap | TypePrim::Lambda => Arity::Exact(2),
            TypePrim::Contract
            | TypePrim::Option
            | TypePrim::List
            | TypePrim::Set
            | TypePrim::Ticket
            | TypePrim::SaplingState
            | TypePrim::SaplingTransaction
            | TypePrim::SaplingTransactionDeprecated
            | TypePrim::Constant => Arity::Exact(1),
            _ => Arity::Exact(0),
        }
    }

    /// Whether values of this primitive have a total order on their own.
    /// `pair`, `or` and `option` are comparable when their children are.
    pub fn is_comparable(&self) -> bool {
        matches!(
            self,
            TypePrim::Unit
                | TypePrim::Never
                | TypePrim::String
                | TypePrim::Int
                | TypePrim::Nat
                | TypePrim::Mutez
                | TypePrim::Bool
                | TypePrim::Timestamp
                | TypePrim::Bytes
                | TypePrim::Address
                | TypePrim::Key
                | TypePrim::KeyHash
                | TypePrim::Signature
                | TypePrim::ChainId
                | TypePrim::TxRollupL2Address
                | TypePrim::Pair
                | TypePrim::Or
                | TypePrim::Option
        )
    }
}

impl std::fmt::Display for TypePrim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_codes_follow_table_order() {
        assert_eq!(keyword_code("parameter"), Some(0x00));
        assert_eq!(keyword_code("Pair"), Some(0x07));
        assert_eq!(keyword_code("bool"), Some(0x59));
        assert_eq!(keyword_code("pair"), Some(0x65));
        assert_eq!(keyword_code("ticket"), Some(0x87));
        assert_eq!(keyword_code("constant"), Some(0x92));
        assert_eq!(keyword_code("NAT"), Some(0x9c));
        assert_eq!(keyword_code("pear"), None);
    }

    #[test]
    fn keyword_names_round_trip() {
        for (code, keyword) in PRIM_KEYWORDS.iter().enumerate() {
            assert_eq!(keyword_name(code as u8), Some(*keyword));
        }
        assert_eq!(keyword_name(0x9d), None);
    }

    #[test]
    fn every_type_prim_is_a_keyword() {
        for prim in TypePrim::ALL {
            assert!(keyword_code(prim.name()).is_some(), "{prim} missing");
            assert_eq!(TypePrim::from_name(prim.name()), Some(prim));
        }
    }

    #[test]
    fn arity_checks() {
        assert!(TypePrim::Pair.arity().accepts(3));
        assert!(!TypePrim::Pair.arity().accepts(1));
        assert!(TypePrim::Map.arity().accepts(2));
        assert!(!TypePrim::Nat.arity().accepts(1));
    }
}
