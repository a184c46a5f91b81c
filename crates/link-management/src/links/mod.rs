//! 短链辅助逻辑：大小写敏感 key 编解码、A/B 测试变体

pub mod case_sensitivity;

pub use ab_test::{AbTestVariants, leads_for, select_winner};
pub use case_sensitivity::{
    CaseSensitivity, decode_key, encode_key, link_constructor_simple,
};
