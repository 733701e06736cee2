use serde::{Deserialize, Serialize};

/// Lifecycle of a food listing. Transitions move one way:
/// available -> requested -> picked-up. Only the request workflow
/// (and nothing else) writes this field after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodStatus {
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "requested")]
    Requested,
    #[serde(rename = "picked-up")]
    PickedUp,
}

impl FoodStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodStatus::Available => "available",
            FoodStatus::Requested => "requested",
            FoodStatus::PickedUp => "picked-up",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "available" => Some(FoodStatus::Available),
            "requested" => Some(FoodStatus::Requested),
            "picked-up" => Some(FoodStatus::PickedUp),
            _ => None,
        }
    }
}

impl Default for FoodStatus {
    fn default() -> Self {
        FoodStatus::Available
    }
}
