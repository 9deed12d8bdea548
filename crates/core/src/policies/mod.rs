//! Policies module - quote conversion, policy versions, and retention.

mod policies_model;
mod policies_service;
mod policies_traits;

#[cfg(test)]
mod policies_service_tests;

pub use policies_model::{
    resolve_policy_details, version_file_name, ConversionOutcome, NewPolicy, NewPolicyVersion,
    Policy, PolicyDetails, PolicyNumberStrategy, PolicyRecord, PolicySnapshot, PolicyUpdate,
    PolicyVersion, PolicyVersionSummary, PolicyView, VersionDocument, VersionedPolicyWrite,
    VersionedUpdateOutcome,
};
pub use policies_service::PolicyService;
pub use policies_traits::{PolicyRepositoryTrait, PolicyServiceTrait};
