//! Service-profile domain model
//!
//! `PolicyDocument` is the payload owned by the network-server. `ServiceProfile`
//! is the aggregate combining it with the locally stored metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grpc;

/// Rate-limit policy applied when a device exceeds its rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RatePolicy {
    /// Drop the packets over the limit
    #[default]
    Drop,
    /// Mark the packets over the limit
    Mark,
}

impl std::fmt::Display for RatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatePolicy::Drop => write!(f, "DROP"),
            RatePolicy::Mark => write!(f, "MARK"),
        }
    }
}

impl std::str::FromStr for RatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DROP" => Ok(RatePolicy::Drop),
            "MARK" => Ok(RatePolicy::Mark),
            _ => Err(format!("Invalid rate policy: {}", s)),
        }
    }
}

impl From<RatePolicy> for grpc::RatePolicy {
    fn from(policy: RatePolicy) -> Self {
        match policy {
            RatePolicy::Drop => grpc::RatePolicy::Drop,
            RatePolicy::Mark => grpc::RatePolicy::Mark,
        }
    }
}

impl From<grpc::RatePolicy> for RatePolicy {
    fn from(policy: grpc::RatePolicy) -> Self {
        match policy {
            grpc::RatePolicy::Drop => RatePolicy::Drop,
            grpc::RatePolicy::Mark => RatePolicy::Mark,
        }
    }
}

/// Quality-of-service policy enforced by the network-server
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyDocument {
    pub ul_rate: u32,
    pub ul_bucket_size: u32,
    pub ul_rate_policy: RatePolicy,
    pub dl_rate: u32,
    pub dl_bucket_size: u32,
    pub dl_rate_policy: RatePolicy,
    pub add_gw_metadata: bool,
    pub dev_status_req_freq: u32,
    pub report_dev_status_battery: bool,
    pub report_dev_status_margin: bool,
    pub dr_min: u32,
    pub dr_max: u32,
    pub pr_allowed: bool,
    pub hr_allowed: bool,
    pub ra_allowed: bool,
    pub nwk_geo_loc: bool,
    /// Target packet error rate, in percent
    pub target_per: u32,
    pub min_gw_diversity: u32,
}

impl PolicyDocument {
    /// Build the wire representation. `id` is omitted on create, where the
    /// network-server mints it.
    pub fn to_proto(&self, id: Option<Uuid>) -> grpc::ServiceProfile {
        grpc::ServiceProfile {
            id: id.map(|id| id.as_bytes().to_vec()).unwrap_or_default(),
            ul_rate: self.ul_rate,
            ul_bucket_size: self.ul_bucket_size,
            ul_rate_policy: grpc::RatePolicy::from(self.ul_rate_policy) as i32,
            dl_rate: self.dl_rate,
            dl_bucket_size: self.dl_bucket_size,
            dl_rate_policy: grpc::RatePolicy::from(self.dl_rate_policy) as i32,
            add_gw_metadata: self.add_gw_metadata,
            dev_status_req_freq: self.dev_status_req_freq,
            report_dev_status_battery: self.report_dev_status_battery,
            report_dev_status_margin: self.report_dev_status_margin,
            dr_min: self.dr_min,
            dr_max: self.dr_max,
            pr_allowed: self.pr_allowed,
            hr_allowed: self.hr_allowed,
            ra_allowed: self.ra_allowed,
            nwk_geo_loc: self.nwk_geo_loc,
            target_per: self.target_per,
            min_gw_diversity: self.min_gw_diversity,
        }
    }

    /// Parse the wire representation, rejecting unknown rate-policy values.
    pub fn from_proto(sp: &grpc::ServiceProfile) -> Result<Self, String> {
        let ul_rate_policy = grpc::RatePolicy::try_from(sp.ul_rate_policy)
            .map_err(|_| format!("unknown uplink rate policy: {}", sp.ul_rate_policy))?;
        let dl_rate_policy = grpc::RatePolicy::try_from(sp.dl_rate_policy)
            .map_err(|_| format!("unknown downlink rate policy: {}", sp.dl_rate_policy))?;

        Ok(Self {
            ul_rate: sp.ul_rate,
            ul_bucket_size: sp.ul_bucket_size,
            ul_rate_policy: ul_rate_policy.into(),
            dl_rate: sp.dl_rate,
            dl_bucket_size: sp.dl_bucket_size,
            dl_rate_policy: dl_rate_policy.into(),
            add_gw_metadata: sp.add_gw_metadata,
            dev_status_req_freq: sp.dev_status_req_freq,
            report_dev_status_battery: sp.report_dev_status_battery,
            report_dev_status_margin: sp.report_dev_status_margin,
            dr_min: sp.dr_min,
            dr_max: sp.dr_max,
            pr_allowed: sp.pr_allowed,
            hr_allowed: sp.hr_allowed,
            ra_allowed: sp.ra_allowed,
            nwk_geo_loc: sp.nwk_geo_loc,
            target_per: sp.target_per,
            min_gw_diversity: sp.min_gw_diversity,
        })
    }
}

/// Parse a 16-byte wire identifier.
pub fn uuid_from_bytes(bytes: &[u8]) -> Result<Uuid, String> {
    Uuid::from_slice(bytes).map_err(|e| format!("invalid service-profile id: {}", e))
}

/// A service profile: local metadata plus the network-server policy
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProfile {
    /// Minted by the network-server on creation; nil before that
    pub id: Uuid,
    pub organization_id: i64,
    pub network_server_id: i64,
    pub name: String,
    pub policy: PolicyDocument,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ServiceProfile {
    pub fn new(
        organization_id: i64,
        network_server_id: i64,
        name: impl Into<String>,
        policy: PolicyDocument,
    ) -> Self {
        Self {
            organization_id,
            network_server_id,
            name: name.into(),
            policy,
            ..Default::default()
        }
    }
}
