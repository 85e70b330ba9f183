// ABOUTME: A named or unnamed set of targets that tasks run against.
// ABOUTME: Built from the top-level configuration or one of its destinations.

use nonempty::NonEmpty;

use crate::config::{Config, Target};
use crate::error::Result;
use crate::types::GroupName;

#[derive(Debug, Clone)]
pub struct Group {
    pub name: Option<GroupName>,
    pub targets: NonEmpty<Target>,
}

impl Group {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name: config.name.clone(),
            targets: config.targets(),
        }
    }

    /// The top-level group, or destination `name` when given.
    pub fn select(config: &Config, destination: Option<&str>) -> Result<Self> {
        match destination {
            Some(name) => Ok(Self::from_config(&config.for_destination(name)?)),
            None => Ok(Self::from_config(config)),
        }
    }

    /// The top-level group followed by one group per destination.
    pub fn all(config: &Config) -> Result<Vec<Self>> {
        let mut groups = vec![Self::from_config(config)];
        for name in config.destinations.keys() {
            groups.push(Self::from_config(&config.for_destination(name)?));
        }
        Ok(groups)
    }

    /// `group:` prefix of task names, empty for an unnamed group.
    pub fn prefix(&self) -> String {
        self.name
            .as_ref()
            .map(|name| format!("{name}:"))
            .unwrap_or_default()
    }
}
