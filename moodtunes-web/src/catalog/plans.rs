//! Subscription plans shown on the pricing page

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    /// Stable identifier sent to the billing collaborator as the tier
    pub id: &'static str,
    pub name: &'static str,
    pub price: &'static str,
    pub period: &'static str,
    pub features: &'static [&'static str],
    /// Highlighted as "Most Popular"
    pub popular: bool,
}

pub const TRIAL_NOTE: &str = "All plans include a 14-day free trial. Cancel anytime.";

pub static PLANS: [Plan; 3] = [
    Plan {
        id: "basic",
        name: "Basic",
        price: "$4.99",
        period: "/month",
        features: &[
            "3 mood playlists per day",
            "Limited skips",
            "Standard audio quality",
            "Basic mood matching",
        ],
        popular: false,
    },
    Plan {
        id: "standard",
        name: "Standard",
        price: "$9.99",
        period: "/month",
        features: &[
            "Unlimited mood playlists",
            "Unlimited skips",
            "High-quality audio",
            "Ad-free experience",
            "Advanced mood analysis",
        ],
        popular: true,
    },
    Plan {
        id: "premium",
        name: "Premium",
        price: "$14.99",
        period: "/month",
        features: &[
            "Everything in Standard",
            "Personalized recommendations",
            "Offline downloads",
            "Early access to new features",
            "Priority customer support",
        ],
        popular: false,
    },
];

/// Find a plan by id or display name (case-insensitive)
pub fn find_plan(key: &str) -> Option<&'static Plan> {
    let key = key.trim();
    PLANS
        .iter()
        .find(|plan| plan.id.eq_ignore_ascii_case(key) || plan.name.eq_ignore_ascii_case(key))
}
