//! Organization to meeting-link lookup.

use serde::{Deserialize, Serialize};

pub const TE_CONNECTIVITY_LINK: &str = "https://meet.google.com/tec-shrw-iitp";
pub const BSA_PLANT_LINK: &str = "https://meet.google.com/bsa-chkn-iitp";
pub const BELDEN_INDIA_LINK: &str = "https://meet.google.com/bld-indi-iitp";
pub const DEFAULT_MEETING_LINK: &str = "https://meet.google.com/iitp-gen-room";

const MEETING_LINKS: [(&str, &str); 3] = [
    ("TE Connectivity, Shirwal", TE_CONNECTIVITY_LINK),
    ("BSA Plant, Chakan", BSA_PLANT_LINK),
    ("Belden India", BELDEN_INDIA_LINK),
];

/// Meeting link for an organization. The match is exact: case and
/// surrounding whitespace count, anything unlisted gets the default room.
pub fn resolve_meeting_link(organization: &str) -> &'static str {
    MEETING_LINKS
        .iter()
        .find(|(org, _)| *org == organization)
        .map_or(DEFAULT_MEETING_LINK, |(_, link)| *link)
}

/// Body of `POST /api/links/resolve`. Only `organization` decides the link.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub iitp_no: String,
    #[serde(default)]
    pub organization: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResponse {
    pub url: &'static str,
}
