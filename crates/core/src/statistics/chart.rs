//! Chart-ready reshaping of the corpus statistics.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::demographics::DemographicBucket;
use super::CaseStatisticsService;
use crate::{EngineError, EngineResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Outcome,
    Formula,
    Symptom,
    Constitution,
    Age,
    Gender,
    BodyHeat,
    BodyStrength,
}

impl ChartType {
    pub const ALL: [ChartType; 8] = [
        ChartType::Outcome,
        ChartType::Formula,
        ChartType::Symptom,
        ChartType::Constitution,
        ChartType::Age,
        ChartType::Gender,
        ChartType::BodyHeat,
        ChartType::BodyStrength,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Outcome => "outcome",
            ChartType::Formula => "formula",
            ChartType::Symptom => "symptom",
            ChartType::Constitution => "constitution",
            ChartType::Age => "age",
            ChartType::Gender => "gender",
            ChartType::BodyHeat => "body_heat",
            ChartType::BodyStrength => "body_strength",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = EngineError;

    /// Case-insensitive; `-` and `_` are interchangeable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace('-', "_");
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalised)
            .ok_or_else(|| EngineError::UnknownChartType(s.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub chart_type: ChartType,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    fn single(chart_type: ChartType, label: &str, points: Vec<(String, usize)>) -> Self {
        let (labels, data): (Vec<String>, Vec<usize>) = points.into_iter().unzip();
        Self {
            chart_type,
            labels,
            datasets: vec![ChartDataset {
                label: label.to_string(),
                data,
            }],
        }
    }

    fn from_buckets(chart_type: ChartType, buckets: Vec<DemographicBucket>) -> Self {
        let points = buckets.into_iter().map(|b| (b.label, b.count)).collect();
        Self::single(chart_type, "환자 수", points)
    }
}

impl CaseStatisticsService {
    /// Chart data for a chart type given by name.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::UnknownChartType` if `chart_type` names no known chart.
    pub fn chart_data(&self, chart_type: &str) -> EngineResult<ChartData> {
        let chart_type = chart_type.parse::<ChartType>()?;
        Ok(self.chart(chart_type))
    }

    pub fn chart(&self, chart_type: ChartType) -> ChartData {
        match chart_type {
            ChartType::Outcome => {
                let stats = self.comprehensive_statistics();
                let dist = stats.outcome_distribution;
                let points = [
                    ("완치", dist.cured),
                    ("호전", dist.improved),
                    ("불변", dist.no_change),
                    ("악화", dist.worsened),
                ]
                .into_iter()
                .map(|(label, count)| (label.to_string(), count))
                .collect();
                ChartData::single(chart_type, "치료 결과", points)
            }
            ChartType::Formula => {
                let points = self
                    .corpus
                    .statistics()
                    .top_formulas
                    .into_iter()
                    .map(|f| (f.formula, f.count))
                    .collect();
                ChartData::single(chart_type, "처방 빈도", points)
            }
            ChartType::Symptom => {
                let points = self
                    .comprehensive_statistics()
                    .top_symptoms
                    .into_iter()
                    .map(|s| (s.symptom, s.count))
                    .collect();
                ChartData::single(chart_type, "증상 빈도", points)
            }
            ChartType::Constitution => {
                ChartData::from_buckets(chart_type, self.demographic_statistics().constitution)
            }
            ChartType::Age => {
                ChartData::from_buckets(chart_type, self.demographic_statistics().age_groups)
            }
            ChartType::Gender => {
                ChartData::from_buckets(chart_type, self.demographic_statistics().gender)
            }
            ChartType::BodyHeat => {
                ChartData::from_buckets(chart_type, self.demographic_statistics().body_heat)
            }
            ChartType::BodyStrength => {
                ChartData::from_buckets(chart_type, self.demographic_statistics().body_strength)
            }
        }
    }
}
