//! Validated tree representation consumed by the lowering engine.

pub mod ir_display;
pub mod ir_json;
pub mod ir_nodes;
pub mod ir_schema;

#[cfg(test)]
pub(crate) mod tests {
    pub(crate) mod ir_test_support;

    mod ir_json_tests;
    mod ir_nodes_tests;
}
