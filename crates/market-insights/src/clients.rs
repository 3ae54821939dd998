use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use crate::report::Organization;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientProfile {
    pub name: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

#[derive(Debug)]
pub enum ClientDirectoryError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for ClientDirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientDirectoryError::Io(err) => write!(f, "failed to read client roster: {}", err),
            ClientDirectoryError::Csv(err) => write!(f, "invalid client roster CSV: {}", err),
        }
    }
}

impl std::error::Error for ClientDirectoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientDirectoryError::Io(err) => Some(err),
            ClientDirectoryError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ClientDirectoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ClientDirectoryError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientDirectory {
    clients: Vec<ClientProfile>,
}

impl ClientDirectory {
    pub fn load(path: Option<&Path>) -> Result<Self, ClientDirectoryError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ClientDirectoryError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ClientDirectoryError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut seen: HashSet<String> = HashSet::new();
        let mut clients = Vec::new();

        for record in csv_reader.deserialize::<RosterRow>() {
            let row = record?;
            let name = row.client.trim().to_string();
            if name.is_empty() || !seen.insert(name.to_ascii_lowercase()) {
                continue;
            }

            clients.push(ClientProfile {
                display_name: row.display_name.unwrap_or_else(|| name.clone()),
                website: row.website,
                name,
            });
        }

        Ok(Self { clients })
    }

    pub fn clients(&self) -> &[ClientProfile] {
        &self.clients
    }

    pub fn lookup(&self, name: &str) -> Option<&ClientProfile> {
        let wanted = name.trim();
        self.clients
            .iter()
            .find(|client| client.name.eq_ignore_ascii_case(wanted))
    }

    /// Identity for a report. Unknown clients keep their raw name.
    pub fn organization(&self, name: &str) -> Organization {
        match self.lookup(name) {
            Some(profile) => Organization {
                client: profile.name.clone(),
                display_name: profile.display_name.clone(),
            },
            None => Organization {
                client: name.trim().to_string(),
                display_name: name.trim().to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Client")]
    client: String,
    #[serde(
        rename = "Display Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    display_name: Option<String>,
    #[serde(rename = "Website", default, deserialize_with = "empty_string_as_none")]
    website: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
