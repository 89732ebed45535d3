use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which aspect of the sample a photograph depicts.
///
/// Variant order is the order in which the estimator applies roles; `Ord`
/// derives from it so a `BTreeMap<Role, _>` iterates front → back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Front,
    Side,
    Macro,
    Drape,
    Back,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Front, Role::Side, Role::Macro, Role::Drape, Role::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Front => "front",
            Role::Side => "side",
            Role::Macro => "macro",
            Role::Drape => "drape",
            Role::Back => "back",
        }
    }

    /// Front and side carry the primary estimates; the rest refine them.
    pub fn is_primary(&self) -> bool {
        matches!(self, Role::Front | Role::Side)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Role::Front),
            "side" => Ok(Role::Side),
            "macro" => Ok(Role::Macro),
            "drape" => Ok(Role::Drape),
            "back" => Ok(Role::Back),
            other => Err(format!("unknown photograph role '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn btree_iterates_in_application_order() {
        let mut map = BTreeMap::new();
        for role in [Role::Back, Role::Macro, Role::Front, Role::Drape, Role::Side] {
            map.insert(role, ());
        }
        let order: Vec<Role> = map.keys().copied().collect();
        assert_eq!(order, Role::ALL.to_vec());
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Drape".parse::<Role>().unwrap(), Role::Drape);
        assert!("top".parse::<Role>().is_err());
    }

    #[test]
    fn only_front_and_side_are_primary() {
        let primary: Vec<Role> = Role::ALL.into_iter().filter(Role::is_primary).collect();
        assert_eq!(primary, vec![Role::Front, Role::Side]);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Macro).unwrap(), "\"macro\"");
    }
}
