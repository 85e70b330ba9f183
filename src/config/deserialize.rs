// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles group names and server lists in shorthand or detailed form.

use nonempty::NonEmpty;
use serde::Deserialize;

use super::ServerConfig;
use crate::types::GroupName;

pub fn deserialize_group_name<'de, D>(deserializer: D) -> Result<Option<GroupName>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    opt.map(|s| GroupName::new(&s).map_err(serde::de::Error::custom))
        .transpose()
}

pub fn deserialize_servers<'de, D>(deserializer: D) -> Result<NonEmpty<ServerConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<ServerEntry> = Vec::deserialize(deserializer)?;
    let servers = values
        .into_iter()
        .map(ServerEntry::into_server_config)
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)?;

    NonEmpty::from_vec(servers)
        .ok_or_else(|| serde::de::Error::custom("at least one server is required"))
}

pub fn deserialize_servers_option<'de, D>(
    deserializer: D,
) -> Result<Option<NonEmpty<ServerConfig>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<Vec<ServerEntry>> = Option::deserialize(deserializer)?;
    let Some(values) = opt else {
        return Ok(None);
    };

    let servers = values
        .into_iter()
        .map(ServerEntry::into_server_config)
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)?;

    NonEmpty::from_vec(servers)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("destination servers list cannot be empty"))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ServerEntry {
    Simple(String),
    Detailed(ServerConfig),
}

impl ServerEntry {
    fn into_server_config(self) -> Result<ServerConfig, String> {
        match self {
            ServerEntry::Simple(s) => ServerConfig::parse(&s),
            ServerEntry::Detailed(c) => Ok(c),
        }
    }
}
