//! Backend resource catalog.
//!
//! Each backend collection is described by a [`ResourceSpec`]: its name in
//! the URL, the API version it is served at, and the verbs it supports.
//! The client's per-resource wrapper is built from one of these records
//! instead of a hand-written class per resource.

use std::fmt;

use crate::error::CoreError;

/// Version every resource in the catalog is currently served at.
pub const DEFAULT_API_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    GetCollection,
    Patch,
    Post,
    Delete,
}

impl Verb {
    const fn bit(self) -> u8 {
        match self {
            Self::Get => 1,
            Self::GetCollection => 1 << 1,
            Self::Patch => 1 << 2,
            Self::Post => 1 << 3,
            Self::Delete => 1 << 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::GetCollection => "get_collection",
            Self::Patch => "patch",
            Self::Post => "post",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of [`Verb`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verbs(u8);

impl Verbs {
    pub const READ_ONLY: Verbs = Verbs::of(&[Verb::Get, Verb::GetCollection]);
    pub const RESPONSE: Verbs = Verbs::of(&[Verb::Get, Verb::GetCollection, Verb::Patch, Verb::Post]);
    pub const ALL: Verbs = Verbs::of(&[
        Verb::Get,
        Verb::GetCollection,
        Verb::Patch,
        Verb::Post,
        Verb::Delete,
    ]);

    pub const fn of(verbs: &[Verb]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < verbs.len() {
            bits |= verbs[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, verb: Verb) -> bool {
        self.0 & verb.bit() != 0
    }
}

// ---------------------------------------------------------------------------
// ResourceSpec
// ---------------------------------------------------------------------------

/// Fixed contract for one backend collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpec {
    pub name: &'static str,
    pub api_version: u32,
    pub verbs: Verbs,
}

impl ResourceSpec {
    pub const fn new(name: &'static str, verbs: Verbs) -> Self {
        Self {
            name,
            api_version: DEFAULT_API_VERSION,
            verbs,
        }
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.verbs.contains(verb)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

pub mod catalog {
    use super::{ResourceSpec, Verbs};
    use crate::error::CoreError;

    pub const NEW_ENGAGEMENT_INSTANCES: ResourceSpec =
        ResourceSpec::new("newEngagementInstances", Verbs::RESPONSE);
    pub const INITIAL_SETUP_RESPONSES: ResourceSpec =
        ResourceSpec::new("initialSetupResponses", Verbs::RESPONSE);

    pub const ATTESTATION_RESPONSES: ResourceSpec =
        ResourceSpec::new("attestationResponses", Verbs::RESPONSE);
    pub const FINAL_APPROVAL_RESPONSES: ResourceSpec =
        ResourceSpec::new("finalApprovalResponses", Verbs::RESPONSE);
    pub const GAO_RESPONSES: ResourceSpec = ResourceSpec::new("gaoResponses", Verbs::RESPONSE);
    pub const INDUSTRY_RISK_RESPONSES: ResourceSpec =
        ResourceSpec::new("industryRiskResponses", Verbs::RESPONSE);
    pub const KOC_ALL_CLIENTS_RESPONSES: ResourceSpec =
        ResourceSpec::new("kocAllClientsResponses", Verbs::RESPONSE);
    pub const KOC_NEW_CLIENTS_RESPONSES: ResourceSpec =
        ResourceSpec::new("kocNewClientsResponses", Verbs::RESPONSE);
    pub const NON_ATTEST_ENGAGEMENT_INFO_RESPONSES: ResourceSpec =
        ResourceSpec::new("nonAttestEngagementInfoResponses", Verbs::RESPONSE);
    pub const PM_DETAILS_RESPONSES: ResourceSpec =
        ResourceSpec::new("pmDetailsResponses", Verbs::RESPONSE);
    pub const SEC_RESPONSES: ResourceSpec = ResourceSpec::new("secResponses", Verbs::RESPONSE);
    pub const SUPPLEMENTAL_RISK_RESPONSES: ResourceSpec =
        ResourceSpec::new("supplementalRiskResponses", Verbs::RESPONSE);

    pub const ATTACHMENTS: ResourceSpec = ResourceSpec::new("attachments", Verbs::ALL);
    pub const CLIENT_CONTACTS: ResourceSpec = ResourceSpec::new("clientContacts", Verbs::ALL);
    pub const JOB_ROLES: ResourceSpec = ResourceSpec::new("jobRoles", Verbs::ALL);
    pub const BILLING_SCHEDULES: ResourceSpec = ResourceSpec::new("billingSchedules", Verbs::ALL);

    pub const CLIENTS: ResourceSpec = ResourceSpec::new("clients", Verbs::READ_ONLY);
    pub const USERS: ResourceSpec = ResourceSpec::new("users", Verbs::READ_ONLY);
    pub const ENGAGEMENT_TYPES: ResourceSpec =
        ResourceSpec::new("engagementTypes", Verbs::READ_ONLY);
    pub const OFFICES: ResourceSpec = ResourceSpec::new("offices", Verbs::READ_ONLY);

    /// Every resource the backend exposes.
    pub static ALL: [ResourceSpec; 20] = [
        NEW_ENGAGEMENT_INSTANCES,
        INITIAL_SETUP_RESPONSES,
        ATTESTATION_RESPONSES,
        FINAL_APPROVAL_RESPONSES,
        GAO_RESPONSES,
        INDUSTRY_RISK_RESPONSES,
        KOC_ALL_CLIENTS_RESPONSES,
        KOC_NEW_CLIENTS_RESPONSES,
        NON_ATTEST_ENGAGEMENT_INFO_RESPONSES,
        PM_DETAILS_RESPONSES,
        SEC_RESPONSES,
        SUPPLEMENTAL_RISK_RESPONSES,
        ATTACHMENTS,
        CLIENT_CONTACTS,
        JOB_ROLES,
        BILLING_SCHEDULES,
        CLIENTS,
        USERS,
        ENGAGEMENT_TYPES,
        OFFICES,
    ];

    /// Look up a resource by its URL name.
    pub fn find(name: &str) -> Result<&'static ResourceSpec, CoreError> {
        ALL.iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| CoreError::NotFound {
                entity: "resource",
                id: name.to_string(),
            })
    }
}

/// Reject names that cannot be used as a single URL path segment.
pub fn validate_resource_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.contains(['/', '?', '#']) {
        return Err(CoreError::Validation(format!(
            "Invalid resource name '{name}'"
        )));
    }
    Ok(())
}
