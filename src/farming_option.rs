use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

////////////////////////////////////////// FarmingOption ///////////////////////////////////////////

/// A crop or activity tag from the fixed farming vocabulary.
///
/// Tags serialize as their upper-case names (`"SOY"`, `"CORN"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FarmingOption {
    /// Soja.
    Soy,
    /// Milho.
    Corn,
    /// Café.
    Coffee,
    /// Algodão.
    Cotton,
    /// Cana de açúcar.
    Sugarcane,
}

impl FarmingOption {
    /// Every member of the vocabulary, in declaration order.
    pub const ALL: [FarmingOption; 5] = [
        FarmingOption::Soy,
        FarmingOption::Corn,
        FarmingOption::Coffee,
        FarmingOption::Cotton,
        FarmingOption::Sugarcane,
    ];

    /// Looks up a tag by its name; `None` if the name is not in the vocabulary.
    pub fn get(name: &str) -> Option<FarmingOption> {
        Self::ALL.into_iter().find(|option| option.name() == name)
    }

    /// The names of every tag, used in validation messages.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|option| option.name()).collect()
    }

    /// The wire name of this tag.
    pub fn name(&self) -> &'static str {
        match self {
            FarmingOption::Soy => "SOY",
            FarmingOption::Corn => "CORN",
            FarmingOption::Coffee => "COFFEE",
            FarmingOption::Cotton => "COTTON",
            FarmingOption::Sugarcane => "SUGARCANE",
        }
    }

    /// The Portuguese label shown to people.
    pub fn label(&self) -> &'static str {
        match self {
            FarmingOption::Soy => "Soja",
            FarmingOption::Corn => "Milho",
            FarmingOption::Coffee => "Café",
            FarmingOption::Cotton => "Algodão",
            FarmingOption::Sugarcane => "Cana de açúcar",
        }
    }
}

impl Display for FarmingOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a string names no farming option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFarmingOption(pub String);

impl Display for UnknownFarmingOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "Wrong farming options value. The options are {:?}",
            FarmingOption::names()
        )
    }
}

impl std::error::Error for UnknownFarmingOption {}

impl FromStr for FarmingOption {
    type Err = UnknownFarmingOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FarmingOption::get(s).ok_or_else(|| UnknownFarmingOption(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_accepts_every_name() {
        for option in FarmingOption::ALL {
            assert_eq!(FarmingOption::get(option.name()), Some(option));
        }
    }

    #[test]
    fn get_is_case_sensitive() {
        assert_eq!(FarmingOption::get("soy"), None);
        assert_eq!(FarmingOption::get("Soja"), None);
    }

    #[test]
    fn names_lists_vocabulary_in_order() {
        assert_eq!(
            FarmingOption::names(),
            vec!["SOY", "CORN", "COFFEE", "COTTON", "SUGARCANE"]
        );
    }

    #[test]
    fn serde_uses_upper_case_names() {
        let json = serde_json::to_string(&FarmingOption::Sugarcane).unwrap();
        assert_eq!(json, "\"SUGARCANE\"");
        let parsed: FarmingOption = serde_json::from_str("\"COFFEE\"").unwrap();
        assert_eq!(parsed, FarmingOption::Coffee);
    }

    #[test]
    fn unknown_option_message_lists_vocabulary() {
        let err = "RICE".parse::<FarmingOption>().unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Wrong farming options value. The options are ["SOY", "CORN", "COFFEE", "COTTON", "SUGARCANE"]"#
        );
    }

    #[test]
    fn labels_are_portuguese() {
        assert_eq!(FarmingOption::Cotton.label(), "Algodão");
        assert_eq!(FarmingOption::Sugarcane.label(), "Cana de açúcar");
    }
}
