//! Zone and record-set helpers built on [`UltraApi`].

use serde::Serialize;

use crate::api::UltraApi;
use crate::error::{Result, UdnsError};
use crate::request::ApiRequest;
use crate::response::{ApiResponse, OutputFormat};

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneProperties {
    pub name: String,
    pub account_name: String,
    #[serde(rename = "type")]
    pub zone_type: String,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryCreateInfo {
    pub force_import: bool,
    pub create_type: String,
}

/// Body of `POST /v3/zones` for a new, empty primary zone.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateZone {
    pub properties: ZoneProperties,
    pub primary_create_info: PrimaryCreateInfo,
    pub change_comment: String,
}

impl CreateZone {
    pub fn primary(domain: &str, account_name: &str) -> Self {
        Self {
            properties: ZoneProperties {
                name: domain.to_string(),
                account_name: account_name.to_string(),
                zone_type: "PRIMARY".to_string(),
            },
            primary_create_info: PrimaryCreateInfo {
                force_import: true,
                create_type: "NEW".to_string(),
            },
            change_comment: format!("Created zone for {} via API", domain),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RRSet {
    pub ttl: u32,
    pub rdata: Vec<String>,
}

pub fn zone_path(domain: &str) -> String {
    format!("/v3/zones/{}", domain)
}

pub fn rrset_path(domain: &str, record_type: &str, owner_name: &str) -> String {
    format!("/v3/zones/{}/rrsets/{}/{}", domain, record_type, owner_name)
}

/// Name of the first account visible to the session. Zone creation needs it.
pub async fn first_account_name(client: &mut UltraApi) -> Result<String> {
    // Always structured, whatever the client's display format is.
    let resp = client
        .execute_as(ApiRequest::get("/accounts"), OutputFormat::Structured)
        .await?;

    let body = resp
        .into_json()
        .ok_or_else(|| UdnsError::UnexpectedBody("/accounts returned no JSON".to_string()))?;

    body.pointer("/accounts/0/accountName")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| UdnsError::UnexpectedBody(body.to_string()))
}

pub async fn create_zone(client: &mut UltraApi, domain: &str) -> Result<ApiResponse> {
    let account_name = first_account_name(client).await?;
    client
        .post("/v3/zones", &CreateZone::primary(domain, &account_name))
        .await
}

pub async fn create_rrset(
    client: &mut UltraApi,
    domain: &str,
    record_type: &str,
    owner_name: &str,
    ttl: u32,
    rdata: Vec<String>,
) -> Result<ApiResponse> {
    client
        .post(&rrset_path(domain, record_type, owner_name), &RRSet { ttl, rdata })
        .await
}

/// Replaces every record of `record_type` at `owner_name` with `rdata`.
pub async fn replace_rrset(
    client: &mut UltraApi,
    domain: &str,
    record_type: &str,
    owner_name: &str,
    ttl: u32,
    rdata: Vec<String>,
) -> Result<ApiResponse> {
    client
        .put(&rrset_path(domain, record_type, owner_name), &RRSet { ttl, rdata })
        .await
}

pub async fn create_a_record(client: &mut UltraApi, domain: &str, address: &str) -> Result<ApiResponse> {
    create_rrset(client, domain, "A", domain, 300, vec![address.to_string()]).await
}

/// Points `www.<domain>` at the zone apex.
pub async fn create_cname_record(client: &mut UltraApi, domain: &str) -> Result<ApiResponse> {
    create_rrset(
        client,
        domain,
        "CNAME",
        &format!("www.{}", domain),
        300,
        vec![domain.to_string()],
    )
    .await
}

pub async fn delete_zone(client: &mut UltraApi, domain: &str) -> Result<ApiResponse> {
    client.delete(&zone_path(domain)).await
}
