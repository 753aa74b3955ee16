//! Turning a free-text request into a structured search.
//!
//! A [`Planner`] reads something like "cheap vegetarian indian food" and
//! produces a [`SearchPlan`]; [`SearchPlan::into_query`] then pins it to a
//! location. Language-model planners answer with JSON, which
//! [`SearchPlan::parse_response`] accepts (code fences included) and falls
//! back from when it is unusable. [`KeywordPlanner`] works offline.

use std::str::FromStr;

use anyhow::Result;
use async_trait::async_trait;
use places::{BudgetBand, Provider, UserQuery, normalize_tag};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Coarse price preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl BudgetTier {
    /// Price band on the 0..=4 scale
    pub fn band(self) -> BudgetBand {
        match self {
            BudgetTier::Low => BudgetBand::new(1, 2),
            BudgetTier::Medium => BudgetBand::new(2, 3),
            BudgetTier::High => BudgetBand::new(3, 4),
        }
    }
}

/// What to search for, before a location is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPlan {
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub budget: Option<BudgetTier>,
    #[serde(default)]
    pub diet: Option<String>,
    /// Provider names; unknown names are dropped when building a query
    #[serde(rename = "use", default = "default_plan_sources")]
    pub sources: Vec<String>,
}

fn default_plan_sources() -> Vec<String> {
    vec![Provider::Yelp.to_string()]
}

impl Default for SearchPlan {
    fn default() -> Self {
        Self {
            cuisine: None,
            budget: None,
            diet: None,
            sources: default_plan_sources(),
        }
    }
}

impl SearchPlan {
    /// Parse a planner's JSON answer.
    ///
    /// Markdown code fences around the JSON are ignored. Anything that still
    /// does not parse yields the default plan.
    pub fn parse_response(text: &str) -> Self {
        let body = strip_code_fence(text);
        match serde_json::from_str(body) {
            Ok(plan) => plan,
            Err(err) => {
                warn!(error = %err, response = text, "Could not parse plan, using default");
                Self::default()
            }
        }
    }

    /// Attach a center and radius, producing a runnable query.
    ///
    /// Expansion stays enabled and the per-source limit keeps its default.
    /// If no listed source is a known provider, every provider is used.
    pub fn into_query(self, lat: f64, lon: f64, radius_m: u32) -> UserQuery {
        let mut query = UserQuery::new(lat, lon, radius_m);

        if let Some(cuisine) = self.cuisine.as_deref().and_then(normalize_tag) {
            query = query.with_cuisines([cuisine]);
        }
        if let Some(diet) = self.diet.as_deref().and_then(normalize_tag) {
            query = query.with_dietary_restrictions([diet]);
        }
        if let Some(tier) = self.budget {
            query = query.with_budget(tier.band());
        }

        let mut sources = Vec::new();
        for name in &self.sources {
            match Provider::from_str(name.trim()) {
                Ok(provider) if !sources.contains(&provider) => sources.push(provider),
                Ok(_) => {}
                Err(_) => warn!(source = %name, "Unknown source in plan, skipping"),
            }
        }
        if sources.is_empty() {
            warn!("Plan names no known source, using all providers");
        } else {
            query = query.with_sources(sources);
        }
        query
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // the `json` info string may run straight into the body
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Produces search plans from free-text requests.
#[async_trait]
pub trait Planner: Send + Sync {
    async fn plan(&self, request: &str) -> Result<SearchPlan>;
}

const CUISINES: &[&str] = &[
    "american",
    "bbq",
    "burger",
    "chinese",
    "ethiopian",
    "french",
    "greek",
    "indian",
    "italian",
    "japanese",
    "korean",
    "mediterranean",
    "mexican",
    "pizza",
    "ramen",
    "seafood",
    "sushi",
    "thai",
    "vietnamese",
];

const DIETS: &[&str] = &["vegetarian", "vegan", "gluten-free", "halal", "kosher"];

const LOW_WORDS: &[&str] = &["cheap", "affordable", "inexpensive", "budget"];
const MEDIUM_WORDS: &[&str] = &["moderate", "mid-range", "reasonable", "normal"];
const HIGH_WORDS: &[&str] = &["fancy", "expensive", "upscale", "luxury"];

/// Offline planner matching known words in the request.
///
/// The first cuisine and first diet mentioned win. Sources default to Yelp
/// unless the request names a provider explicitly.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordPlanner;

impl KeywordPlanner {
    pub fn plan_request(&self, request: &str) -> SearchPlan {
        let lowered = request.to_lowercase();
        let words = words(&lowered);
        let listed = |list: &[&'static str], word: &str| list.iter().any(|item| *item == word);
        let mentions = |list: &[&'static str]| words.iter().any(|w| listed(list, w));
        let first_of = |list: &[&'static str]| {
            words
                .iter()
                .find(|w| listed(list, w))
                .map(|w| w.to_string())
        };

        let budget = if mentions(HIGH_WORDS) || lowered.contains("fine dining") {
            Some(BudgetTier::High)
        } else if mentions(LOW_WORDS) {
            Some(BudgetTier::Low)
        } else if mentions(MEDIUM_WORDS) {
            Some(BudgetTier::Medium)
        } else {
            None
        };

        let named: Vec<String> = Provider::ALL
            .iter()
            .filter(|p| words.contains(&p.as_str()))
            .map(ToString::to_string)
            .collect();

        SearchPlan {
            cuisine: first_of(CUISINES),
            budget,
            diet: first_of(DIETS),
            sources: if named.is_empty() {
                default_plan_sources()
            } else {
                named
            },
        }
    }
}

#[async_trait]
impl Planner for KeywordPlanner {
    async fn plan(&self, request: &str) -> Result<SearchPlan> {
        Ok(self.plan_request(request))
    }
}

/// Words of a lower-cased request; hyphenated words also yield their parts
fn words(text: &str) -> Vec<&str> {
    let mut words = Vec::new();
    for word in text
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|w| !w.is_empty())
    {
        words.push(word);
        if word.contains('-') {
            words.extend(word.split('-').filter(|part| !part.is_empty()));
        }
    }
    words
}
