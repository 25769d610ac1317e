use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An RDAP domain object (RFC 9083), reduced to the members a lookup uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdapResponse {
    #[serde(default)]
    pub object_class_name: Option<String>,

    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub ldh_name: Option<String>,

    #[serde(default)]
    pub unicode_name: Option<String>,

    #[serde(default)]
    pub status: Vec<String>,

    #[serde(default)]
    pub events: Vec<RdapEvent>,

    #[serde(default)]
    pub entities: Vec<RdapEntity>,

    #[serde(default)]
    pub nameservers: Vec<RdapNameserver>,

    #[serde(default, rename = "secureDNS")]
    pub secure_dns: Option<SecureDns>,

    #[serde(default)]
    pub port43: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdapEvent {
    pub event_action: String,
    #[serde(default)]
    pub event_date: Option<String>,
}

impl RdapEvent {
    /// Strict RFC 3339 parse of the event date.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        let raw = self.event_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdapEntity {
    #[serde(default)]
    pub handle: Option<String>,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(default)]
    pub vcard_array: Option<serde_json::Value>,

    #[serde(default)]
    pub entities: Vec<RdapEntity>,
}

impl RdapEntity {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// The vCard `fn` (formatted name) property, if any.
    pub fn formatted_name(&self) -> Option<String> {
        let props = self.vcard_array.as_ref()?.as_array()?.get(1)?.as_array()?;
        props.iter().find_map(|prop| {
            let prop = prop.as_array()?;
            if prop.len() >= 4 && prop[0].as_str() == Some("fn") {
                prop[3].as_str().map(String::from)
            } else {
                None
            }
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RdapNameserver {
    #[serde(default)]
    pub ldh_name: Option<String>,

    #[serde(default)]
    pub unicode_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureDns {
    #[serde(default)]
    pub delegation_signed: Option<bool>,

    #[serde(default)]
    pub zone_signed: Option<bool>,
}

impl RdapResponse {
    pub fn domain_name(&self) -> Option<&str> {
        self.ldh_name.as_deref().or(self.unicode_name.as_deref())
    }

    /// Handle of the first entity acting as registrar, in response order.
    pub fn registrar_handle(&self) -> Option<String> {
        self.entities
            .iter()
            .find(|e| e.has_role("registrar"))
            .and_then(|e| e.handle.clone())
    }

    /// Date of the last event with the given action, if it parses. A later
    /// duplicate with a bad date hides an earlier good one.
    pub fn event_date(&self, action: &str) -> Option<DateTime<Utc>> {
        self.events
            .iter()
            .rev()
            .find(|e| e.event_action == action)
            .and_then(|e| e.parsed_date())
    }

    pub fn nameserver_names(&self) -> Vec<String> {
        self.nameservers
            .iter()
            .filter_map(|ns| ns.ldh_name.clone().or_else(|| ns.unicode_name.clone()))
            .collect()
    }

    pub fn is_delegation_signed(&self) -> bool {
        self.secure_dns
            .as_ref()
            .and_then(|s| s.delegation_signed)
            .unwrap_or(false)
    }
}
