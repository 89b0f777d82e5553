use crate::{kpi::Category, mock};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub theme: Theme,
    pub icons: Icons,
    // Pie gauges shown on the overview tab, in order.
    pub gauges: Vec<GaugeConfig>,
    // Series metrics drawn on the overview line chart.
    pub line_metrics: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "AIVS Co. KPI Dashboard".to_string(),
            theme: Theme::default(),
            icons: Icons::default(),
            gauges: vec![GaugeConfig {
                metric: mock::ACTIVE_USERS.to_string(),
                label: "Active Users".to_string(),
                divisor: 5.0,
                min: 0.0,
                max: 100.0,
            }],
            line_metrics: vec![
                mock::CSAT.to_string(),
                mock::NPS.to_string(),
                mock::RESOLUTION_RATE.to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeConfig {
    pub metric: String,
    pub label: String,
    pub divisor: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub operational: String,
    pub financial: String,
    pub customer: String,
    pub ai_model: String,
    pub company_block: String,
    pub project_block: String,
    pub general_block: String,
    // Cycled over the projects in display order.
    pub project_cards: Vec<String>,
    pub text: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            operational: "#636efa".to_string(),
            financial: "#ef553b".to_string(),
            customer: "#00cc96".to_string(),
            ai_model: "#ab63fa".to_string(),
            company_block: "#f0f0f5".to_string(),
            project_block: "#e8f9f3".to_string(),
            general_block: "#f0fff0".to_string(),
            project_cards: vec!["#d9f1ff".to_string(), "#fcebd7".to_string()],
            text: "#333".to_string(),
        }
    }
}

impl Theme {
    pub fn category_color(&self, category: Category) -> &str {
        match category {
            Category::Operational => &self.operational,
            Category::Financial => &self.financial,
            Category::Customer => &self.customer,
            Category::AiModel => &self.ai_model,
        }
    }

    pub fn project_card(&self, index: usize) -> &str {
        match self.project_cards.len() {
            0 => "#ffffff",
            n => self.project_cards[index % n].as_str(),
        }
    }

    fn colors(&self) -> impl Iterator<Item = &String> {
        [
            &self.operational,
            &self.financial,
            &self.customer,
            &self.ai_model,
            &self.company_block,
            &self.project_block,
            &self.general_block,
            &self.text,
        ]
        .into_iter()
        .chain(self.project_cards.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Icons {
    pub search: String,
    pub timeline: String,
    pub projects: String,
    pub overview: String,
    pub company: String,
    pub project: String,
    pub pin: String,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            search: "🔍".to_string(),
            timeline: "📅".to_string(),
            projects: "📂".to_string(),
            overview: "📊".to_string(),
            company: "🏢".to_string(),
            project: "🚀".to_string(),
            pin: "📌".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("dashboard title is empty")]
    EmptyTitle,
    #[error("gauge {0:?} has a zero divisor")]
    ZeroDivisor(String),
    #[error("gauge {0:?} has min greater than max")]
    InvertedBounds(String),
    #[error("invalid color {0:?}, expected #rgb or #rrggbb")]
    InvalidColor(String),
    #[error("error reading config file")]
    Read(#[from] std::io::Error),
    #[error("error parsing config file")]
    Parse(#[from] serde_json::Error),
}

impl DashboardConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: DashboardConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.title.trim().is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        for gauge in &self.gauges {
            if gauge.divisor == 0.0 {
                return Err(ConfigError::ZeroDivisor(gauge.metric.clone()));
            }
            if gauge.min.is_nan() || gauge.max.is_nan() || gauge.min > gauge.max {
                return Err(ConfigError::InvertedBounds(gauge.metric.clone()));
            }
        }
        if let Some(bad) = self.theme.colors().find(|c| !is_hex_color(c)) {
            return Err(ConfigError::InvalidColor(bad.clone()));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

#[cfg(test)]
pub mod tests {
    use super::{is_hex_color, ConfigError, DashboardConfig};
    use crate::kpi::Category;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashboardConfig::default();
        config.validate().unwrap();
        assert_eq!(config.gauges[0].divisor, 5.0);
        assert_eq!(config.theme.category_color(Category::Customer), "#00cc96");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = DashboardConfig::from_json(
            r##"{"title": "Support KPIs", "theme": {"customer": "#123abc"}}"##,
        )
        .unwrap();
        assert_eq!(config.title, "Support KPIs");
        assert_eq!(config.theme.customer, "#123abc");
        assert_eq!(config.theme.financial, "#ef553b");
        assert_eq!(config.gauges.len(), 1);
    }

    #[test]
    fn test_zero_divisor_rejected() {
        let err = DashboardConfig::from_json(
            r#"{"gauges": [{"metric": "active_users", "label": "Users", "divisor": 0, "min": 0, "max": 100}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDivisor(m) if m == "active_users"));
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = DashboardConfig::default();
        config.gauges[0].min = 200.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedBounds(_))
        ));
    }

    #[test]
    fn test_bad_color_rejected() {
        let mut config = DashboardConfig::default();
        config.theme.project_cards.push("red".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor(c)) if c == "red"
        ));
    }

    #[test]
    fn test_empty_title_rejected() {
        let err = DashboardConfig::from_json(r#"{"title": "  "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyTitle));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            DashboardConfig::from_json("{"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#333"));
        assert!(is_hex_color("#D9F1FF"));
        assert!(!is_hex_color("#12345"));
        assert!(!is_hex_color("#ggg"));
        assert!(!is_hex_color("333"));
    }

    #[test]
    fn test_project_card_cycles() {
        let config = DashboardConfig::default();
        assert_eq!(config.theme.project_card(0), "#d9f1ff");
        assert_eq!(config.theme.project_card(3), "#fcebd7");
    }
}
