use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Operational,
    Financial,
    Customer,
    AiModel,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Operational,
        Category::Financial,
        Category::Customer,
        Category::AiModel,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Operational => "Operational",
            Category::Financial => "Financial",
            Category::Customer => "Customer",
            Category::AiModel => "AI Model",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Percent,
    Ratio,
    Minutes,
    Multiplier,
    Currency,
    Score,
    Days,
    Weeks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub name: String,
    pub value: f64,
    pub unit: Unit,
    pub category: Category,
}

impl Kpi {
    pub fn new(name: &str, value: f64, unit: Unit, category: Category) -> Self {
        Self {
            name: name.to_string(),
            value,
            unit,
            category,
        }
    }

    /// Value with its unit, the way the KPI text blocks print it.
    pub fn display_value(&self) -> String {
        match self.unit {
            Unit::Percent => format!("{}%", self.value),
            Unit::Ratio => format!("{:.2}", self.value),
            Unit::Minutes => format!("{} mins", self.value),
            Unit::Multiplier => format!("{}x", self.value),
            Unit::Currency => format!("${}", self.value),
            Unit::Score => format!("{}", self.value),
            Unit::Days => format!("{} days", self.value),
            Unit::Weeks => format!("{} weeks", self.value),
        }
    }
}

impl fmt::Display for Kpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.display_value())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub kpis: Vec<Kpi>,
    /// Short-label version of `kpis` for the overview card.
    pub summary: Vec<Kpi>,
    /// Longer-horizon figures shown on the project breakdown tab.
    pub details: Vec<Kpi>,
}

/// Hardcoded figures the dashboard displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalogue {
    pub company: Vec<Kpi>,
    pub general: Vec<Kpi>,
    pub projects: Vec<Project>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self {
            company: company_kpis(),
            general: general_project_kpis(),
            projects: projects(),
        }
    }
}

impl Catalogue {
    pub fn company_kpi(&self, name: &str) -> Option<&Kpi> {
        self.company.iter().find(|k| k.name == name)
    }
}

pub fn company_kpis() -> Vec<Kpi> {
    use Category::*;
    vec![
        Kpi::new("Automated Resolution Rate", 87.0, Unit::Percent, Operational),
        Kpi::new("First Contact Resolution", 78.0, Unit::Percent, Operational),
        Kpi::new("Average Handling Time", 3.5, Unit::Minutes, Operational),
        Kpi::new("ROI", 1.6, Unit::Multiplier, Financial),
        Kpi::new("Cost per Resolution", 4.2, Unit::Currency, Financial),
        Kpi::new("NPS", 72.0, Unit::Score, Customer),
        Kpi::new("CSAT", 88.0, Unit::Score, Customer),
        Kpi::new("Precision", 0.91, Unit::Ratio, AiModel),
        Kpi::new("Recall", 0.89, Unit::Ratio, AiModel),
        Kpi::new("F1-Score", 0.90, Unit::Ratio, AiModel),
    ]
}

pub fn general_project_kpis() -> Vec<Kpi> {
    vec![
        Kpi::new(
            "Market Penetration Rate",
            22.0,
            Unit::Percent,
            Category::Financial,
        ),
        Kpi::new(
            "Customer Acquisition Cost",
            120.0,
            Unit::Currency,
            Category::Financial,
        ),
    ]
}

pub fn projects() -> Vec<Project> {
    use Category::*;
    vec![
        Project {
            name: "Expert Finder".to_string(),
            kpis: vec![
                Kpi::new("Precision", 0.91, Unit::Ratio, AiModel),
                Kpi::new("Recall", 0.89, Unit::Ratio, AiModel),
                Kpi::new("F1-Score", 0.90, Unit::Ratio, AiModel),
            ],
            summary: vec![
                Kpi::new("Precision", 0.91, Unit::Ratio, AiModel),
                Kpi::new("Recall", 0.89, Unit::Ratio, AiModel),
                Kpi::new("F1", 0.90, Unit::Ratio, AiModel),
            ],
            details: vec![
                Kpi::new("Model Accuracy", 91.0, Unit::Percent, AiModel),
                Kpi::new("Time to Deploy", 2.0, Unit::Weeks, Operational),
            ],
        },
        Project {
            name: "Lead Generator".to_string(),
            kpis: vec![
                Kpi::new("Resolution Time", 2.8, Unit::Minutes, Operational),
                Kpi::new("NPS", 68.0, Unit::Score, Customer),
                Kpi::new("CSAT", 84.0, Unit::Score, Customer),
            ],
            summary: vec![
                Kpi::new("NPS", 68.0, Unit::Score, Customer),
                Kpi::new("CSAT", 84.0, Unit::Score, Customer),
                Kpi::new("Res Time", 2.8, Unit::Minutes, Operational),
            ],
            details: vec![
                Kpi::new("Conversion Rate", 7.2, Unit::Percent, Financial),
                Kpi::new("Avg Lead Time", 1.4, Unit::Days, Operational),
            ],
        },
    ]
}

/// Case-insensitive substring match on KPI names. A blank query matches all.
pub fn search<'a>(kpis: &'a [Kpi], query: &str) -> Vec<&'a Kpi> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return kpis.iter().collect();
    }
    kpis.iter()
        .filter(|k| k.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn filter_projects<'a, S: AsRef<str>>(
    projects: &'a [Project],
    names: &[S],
) -> Vec<&'a Project> {
    if names.is_empty() {
        return projects.iter().collect();
    }
    for name in names {
        let name = name.as_ref();
        if !projects.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
            warn!("ignoring unknown project {:?}", name);
        }
    }
    projects
        .iter()
        .filter(|p| names.iter().any(|n| p.name.eq_ignore_ascii_case(n.as_ref())))
        .collect()
}
