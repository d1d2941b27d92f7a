//! Menu catalog: what the bar serves, which teas count as a variety,
//! which drinks sit behind the age gate, and which words end the session.

use crate::config::MenuConfig;
use crate::error::{BarError, BarResult};

/// The bare word that triggers tea disambiguation.
pub const GENERIC_TEA: &str = "tea";

fn normalize(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let s = item.trim().to_lowercase();
        if !s.is_empty() && !out.contains(&s) {
            out.push(s);
        }
    }
    out
}

/// Validated, immutable menu. Construct with [`Menu::from_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct Menu {
    hot: Vec<String>,
    cold: Vec<String>,
    tea: Vec<String>,
    alcohol: Vec<String>,
    rejection: Vec<String>,
}

impl Menu {
    /// Normalise every entry to trimmed lowercase and check that teas and
    /// alcoholic drinks are actually on the menu.
    pub fn from_config(cfg: &MenuConfig) -> BarResult<Self> {
        let menu = Self {
            hot: normalize(&cfg.hot),
            cold: normalize(&cfg.cold),
            tea: normalize(&cfg.tea),
            alcohol: normalize(&cfg.alcohol),
            rejection: normalize(&cfg.rejection),
        };

        if menu.hot.is_empty() && menu.cold.is_empty() {
            return Err(BarError::InvalidMenu("the menu has no drinks".to_string()));
        }
        for tea in &menu.tea {
            if !menu.serves(tea) {
                return Err(BarError::InvalidMenu(format!(
                    "tea variety '{}' is not a hot or cold drink",
                    tea
                )));
            }
        }
        for drink in &menu.alcohol {
            if !menu.serves(drink) {
                return Err(BarError::InvalidMenu(format!(
                    "alcoholic drink '{}' is not a hot or cold drink",
                    drink
                )));
            }
        }
        Ok(menu)
    }

    /// True when `drink` is a hot or cold drink.
    pub fn serves(&self, drink: &str) -> bool {
        self.hot.iter().chain(self.cold.iter()).any(|d| d == drink)
    }

    pub fn is_tea_variety(&self, drink: &str) -> bool {
        self.tea.iter().any(|d| d == drink)
    }

    pub fn hot(&self) -> &[String] {
        &self.hot
    }

    pub fn cold(&self) -> &[String] {
        &self.cold
    }

    pub fn tea(&self) -> &[String] {
        &self.tea
    }

    pub fn alcohol(&self) -> &[String] {
        &self.alcohol
    }

    pub fn rejection_phrases(&self) -> &[String] {
        &self.rejection
    }
}
