//! Request-level workflows behind the contract routes.

pub mod contract_pipeline;
pub mod contract_reader;
pub mod upload_form;

pub use contract_pipeline::ContractPipeline;
pub use contract_reader::ContractReader;
pub use upload_form::{read_contract_form, ContractForm};
