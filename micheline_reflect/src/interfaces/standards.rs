/* Reference parameter types of token standards and views */

use super::{EntrypointSpec, InterfaceSpec};

pub const FA1: &str = "fa1";
pub const FA1_2: &str = "fa1-2";
pub const FA2: &str = "fa2";
pub const VIEW_ADDRESS: &str = "view_address";
pub const VIEW_BALANCE_OF: &str = "view_balance_of";
pub const VIEW_NAT: &str = "view_nat";

const TRANSFER_FA1: &str = r#"{"prim":"pair","args":[{"prim":"address","annots":[":from"]},{"prim":"pair","args":[{"prim":"address","annots":[":to"]},{"prim":"nat","annots":[":value"]}]}]}"#;

const APPROVE: &str = r#"{"prim":"pair","args":[{"prim":"address","annots":[":spender"]},{"prim":"nat","annots":[":value"]}]}"#;

const GET_ALLOWANCE: &str = r#"{"prim":"pair","args":[{"prim":"pair","args":[{"prim":"address","annots":[":owner"]},{"prim":"address","annots":[":spender"]}]},{"prim":"contract","args":[{"prim":"nat"}]}]}"#;

const GET_BALANCE: &str = r#"{"prim":"pair","args":[{"prim":"address","annots":[":owner"]},{"prim":"contract","args":[{"prim":"nat"}]}]}"#;

const GET_TOTAL_SUPPLY: &str =
    r#"{"prim":"pair","args":[{"prim":"unit"},{"prim":"contract","args":[{"prim":"nat"}]}]}"#;

const TRANSFER_FA2: &str = r#"{"prim":"list","args":[{"prim":"pair","args":[{"prim":"address","annots":["%from_"]},{"prim":"list","args":[{"prim":"pair","args":[{"prim":"address","annots":["%to_"]},{"prim":"pair","args":[{"prim":"nat","annots":["%token_id"]},{"prim":"nat","annots":["%amount"]}]}]}],"annots":["%txs"]}]}]}"#;

const BALANCE_OF_FA2: &str = r#"{"prim":"pair","args":[{"prim":"list","args":[{"prim":"pair","args":[{"prim":"address","annots":["%owner"]},{"prim":"nat","annots":["%token_id"]}]}],"annots":["%requests"]},{"prim":"contract","args":[{"prim":"list","args":[{"prim":"pair","args":[{"prim":"pair","args":[{"prim":"address","annots":["%owner"]},{"prim":"nat","annots":["%token_id"]}],"annots":["%request"]},{"prim":"nat","annots":["%balance"]}]}]}],"annots":["%callback"]}]}"#;

const UPDATE_OPERATORS: &str = r#"{"prim":"list","args":[{"prim":"or","args":[{"prim":"pair","args":[{"prim":"address","annots":["%owner"]},{"prim":"pair","args":[{"prim":"address","annots":["%operator"]},{"prim":"nat","annots":["%token_id"]}]}],"annots":["%add_operator"]},{"prim":"pair","args":[{"prim":"address","annots":["%owner"]},{"prim":"pair","args":[{"prim":"address","annots":["%operator"]},{"prim":"nat","annots":["%token_id"]}]}],"annots":["%remove_operator"]}]}]}"#;

const VIEW_ADDRESS_TYPE: &str =
    r#"{"prim":"pair","args":[{"prim":"unit"},{"prim":"contract","args":[{"prim":"address"}]}]}"#;

const VIEW_BALANCE_OF_TYPE: &str =
    r#"{"prim":"pair","args":[{"prim":"address"},{"prim":"contract","args":[{"prim":"nat"}]}]}"#;

fn interface(tag: &str, entrypoints: &[(&str, &str)]) -> InterfaceSpec {
    InterfaceSpec {
        tag: tag.to_string(),
        entrypoints: entrypoints
            .iter()
            .map(|(name, ty)| EntrypointSpec::new(*name, *ty))
            .collect(),
    }
}

pub fn fa1() -> InterfaceSpec {
    interface(
        FA1,
        &[
            ("transfer", TRANSFER_FA1),
            ("getBalance", GET_BALANCE),
            ("getTotalSupply", GET_TOTAL_SUPPLY),
        ],
    )
}

pub fn fa1_2() -> InterfaceSpec {
    interface(
        FA1_2,
        &[
            ("transfer", TRANSFER_FA1),
            ("approve", APPROVE),
            ("getAllowance", GET_ALLOWANCE),
            ("getBalance", GET_BALANCE),
            ("getTotalSupply", GET_TOTAL_SUPPLY),
        ],
    )
}

pub fn fa2() -> InterfaceSpec {
    interface(
        FA2,
        &[
            ("transfer", TRANSFER_FA2),
            ("balance_of", BALANCE_OF_FA2),
            ("update_operators", UPDATE_OPERATORS),
        ],
    )
}

pub fn view_address() -> InterfaceSpec {
    interface(VIEW_ADDRESS, &[("", VIEW_ADDRESS_TYPE)])
}

pub fn view_balance_of() -> InterfaceSpec {
    interface(VIEW_BALANCE_OF, &[("", VIEW_BALANCE_OF_TYPE)])
}

pub fn view_nat() -> InterfaceSpec {
    interface(VIEW_NAT, &[("", GET_TOTAL_SUPPLY)])
}

pub fn all() -> Vec<InterfaceSpec> {
    vec![
        fa1(),
        fa1_2(),
        fa2(),
        view_address(),
        view_balance_of(),
        view_nat(),
    ]
}
