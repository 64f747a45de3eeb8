//! Aggregation over feedback rows. Every `/stats` request recomputes from a
//! single fetch; there is no caching layer.

use std::collections::BTreeMap;

use anyhow::Result;
use entity::feedback;
use platform_db::DbPool;
use sea_orm::EntityTrait;

use crate::charts::ChartRenderer;

/// The four per-department chart categories. The fifth rating (`overall`)
/// feeds the headline average instead of a chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    WorkEnvironment,
    Management,
    WorkLifeBalance,
    DevelopmentPotential,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::WorkEnvironment,
        Category::Management,
        Category::WorkLifeBalance,
        Category::DevelopmentPotential,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::WorkEnvironment => "Work Environment",
            Category::Management => "Management",
            Category::WorkLifeBalance => "Work-Life Balance",
            Category::DevelopmentPotential => "Development Potential",
        }
    }

    fn value(self, row: &feedback::Model) -> i16 {
        match self {
            Category::WorkEnvironment => row.work_environment,
            Category::Management => row.management,
            Category::WorkLifeBalance => row.work_life_balance,
            Category::DevelopmentPotential => row.development_potential,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sentiment {
    Negative,
    Neutral,
    Positive,
}

impl Sentiment {
    /// Half-open thresholds on the rounded average: [0, 2.5) negative,
    /// [2.5, 3.5) neutral, [3.5, 5] positive.
    pub fn from_average(average: f64) -> Self {
        if average < 2.5 {
            Sentiment::Negative
        } else if average < 3.5 {
            Sentiment::Neutral
        } else {
            Sentiment::Positive
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Positive => "positive",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Sentiment::Negative => "\u{1F641}",
            Sentiment::Neutral => "\u{1F610}",
            Sentiment::Positive => "\u{1F642}",
        }
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean of the `overall` column, 0.0 when there are no rows.
pub fn overall_average(rows: &[feedback::Model]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    let sum: i64 = rows.iter().map(|row| i64::from(row.overall)).sum();
    round2(sum as f64 / rows.len() as f64)
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepartmentAverage {
    pub department: String,
    pub average: f64,
}

/// Mean of one category per department, ascending by department name.
pub fn category_averages(rows: &[feedback::Model], category: Category) -> Vec<DepartmentAverage> {
    let mut grouped: BTreeMap<&str, (i64, u32)> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(row.department.as_str()).or_insert((0, 0));
        entry.0 += i64::from(category.value(row));
        entry.1 += 1;
    }
    grouped
        .into_iter()
        .map(|(department, (sum, count))| DepartmentAverage {
            department: department.to_string(),
            average: round2(sum as f64 / f64::from(count)),
        })
        .collect()
}

pub struct CategoryChart {
    pub title: &'static str,
    /// `data:image/png;base64,` URI, ready for inline embedding.
    pub image: String,
}

pub struct StatsView {
    pub average: f64,
    pub sentiment: Sentiment,
    pub charts: Vec<CategoryChart>,
}

pub async fn build_stats(pool: &DbPool, renderer: &ChartRenderer) -> Result<StatsView> {
    let rows = feedback::Entity::find().all(pool).await?;
    let average = overall_average(&rows);
    let sentiment = Sentiment::from_average(average);
    let mut charts = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        let bars = category_averages(&rows, category);
        let image = renderer.render_bar_chart(category.label(), &bars)?;
        charts.push(CategoryChart {
            title: category.label(),
            image,
        });
    }
    Ok(StatsView {
        average,
        sentiment,
        charts,
    })
}
