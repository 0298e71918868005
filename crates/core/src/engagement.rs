//! New-engagement payloads and the per-section response catalog.
//!
//! The creation sequence writes one root `newEngagementInstances` entity,
//! one `initialSetupResponses` entity built from the "select client" form,
//! and one entity per [`ResponseSection`]. Every dependent entity references
//! the root through `newEngagementInstanceId`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::resource::{catalog, ResourceSpec};
use crate::types::EntityId;

// ---------------------------------------------------------------------------
// Session snapshot
// ---------------------------------------------------------------------------

/// The signed-in user creating the engagement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: EntityId,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Values collected on the "select client" screen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectClientForm {
    #[serde(default)]
    pub client_id: Option<EntityId>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_number: Option<String>,
    #[serde(default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub tax_payer_identification_number: Option<String>,
    #[serde(default)]
    pub tax_payer_identification_number_masked: Option<String>,
    /// Any further fields collected on the screen, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Client-side state handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSession {
    pub user: CurrentUser,
    pub select_client: SelectClientForm,
}

// ---------------------------------------------------------------------------
// Create payloads
// ---------------------------------------------------------------------------

/// Root create payload. Only the creating user is supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEngagementInstance {
    pub created_by: EntityId,
}

/// Payload for the `initialSetupResponses` entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialSetupResponse {
    pub new_engagement_instance_id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<EntityId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    /// Unmasked TIN when the form has one, otherwise the masked variant.
    pub tax_payer_identification_number: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InitialSetupResponse {
    /// Build the setup payload for `root_id` from the collected form.
    pub fn from_form(root_id: EntityId, form: &SelectClientForm) -> Self {
        let tin = form
            .tax_payer_identification_number
            .as_ref()
            .filter(|tin| !tin.is_empty())
            .or(form.tax_payer_identification_number_masked.as_ref())
            .cloned();

        // `extra` must not shadow the typed keys written above.
        let mut extra = form.extra.clone();
        for key in [
            "newEngagementInstanceId",
            "taxPayerIdentificationNumber",
            "taxPayerIdentificationNumberMasked",
        ] {
            extra.remove(key);
        }

        Self {
            new_engagement_instance_id: root_id,
            client_id: form.client_id,
            client_name: form.client_name.clone(),
            client_number: form.client_number.clone(),
            entity_type: form.entity_type.clone(),
            industry: form.industry.clone(),
            tax_payer_identification_number: tin,
            extra,
        }
    }
}

/// Payload for every fan-out section entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub new_engagement_instance_id: EntityId,
}

/// Body of the workflow-start RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStartRequest {
    pub new_engagement_instance_id: EntityId,
}

// ---------------------------------------------------------------------------
// Response sections
// ---------------------------------------------------------------------------

/// The independent questionnaire sections created once the workflow runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSection {
    Attestation,
    FinalApproval,
    Gao,
    IndustryRisk,
    KnowledgeOfClientAllClients,
    KnowledgeOfClientNewClients,
    NonAttestEngagementInfo,
    PmDetails,
    Sec,
    SupplementalRisk,
}

impl ResponseSection {
    pub const ALL: [ResponseSection; 10] = [
        Self::Attestation,
        Self::FinalApproval,
        Self::Gao,
        Self::IndustryRisk,
        Self::KnowledgeOfClientAllClients,
        Self::KnowledgeOfClientNewClients,
        Self::NonAttestEngagementInfo,
        Self::PmDetails,
        Self::Sec,
        Self::SupplementalRisk,
    ];

    pub fn resource(self) -> &'static ResourceSpec {
        match self {
            Self::Attestation => &catalog::ATTESTATION_RESPONSES,
            Self::FinalApproval => &catalog::FINAL_APPROVAL_RESPONSES,
            Self::Gao => &catalog::GAO_RESPONSES,
            Self::IndustryRisk => &catalog::INDUSTRY_RISK_RESPONSES,
            Self::KnowledgeOfClientAllClients => &catalog::KOC_ALL_CLIENTS_RESPONSES,
            Self::KnowledgeOfClientNewClients => &catalog::KOC_NEW_CLIENTS_RESPONSES,
            Self::NonAttestEngagementInfo => &catalog::NON_ATTEST_ENGAGEMENT_INFO_RESPONSES,
            Self::PmDetails => &catalog::PM_DETAILS_RESPONSES,
            Self::Sec => &catalog::SEC_RESPONSES,
            Self::SupplementalRisk => &catalog::SUPPLEMENTAL_RISK_RESPONSES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Attestation => "Attestation",
            Self::FinalApproval => "Final Approval",
            Self::Gao => "GAO",
            Self::IndustryRisk => "Industry Risk",
            Self::KnowledgeOfClientAllClients => "Knowledge of Client (All Clients)",
            Self::KnowledgeOfClientNewClients => "Knowledge of Client (New Clients)",
            Self::NonAttestEngagementInfo => "Non-Attest Engagement Info",
            Self::PmDetails => "PM Details",
            Self::Sec => "SEC",
            Self::SupplementalRisk => "Supplemental Risk",
        }
    }
}
