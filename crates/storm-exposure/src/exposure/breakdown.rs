use super::classify::StormCategory;
use super::storms::StormRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: StormCategory,
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakdownRow {
    pub year: i32,
    pub counts: Vec<CategoryCount>,
}

impl BreakdownRow {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|entry| entry.count).sum()
    }

    pub fn count(&self, category: StormCategory) -> usize {
        self.counts
            .iter()
            .find(|entry| entry.category == category)
            .map_or(0, |entry| entry.count)
    }
}

/// Per-year storm observation counts by category, feeding the stacked-area chart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<&'static str>,
    pub rows: Vec<BreakdownRow>,
}

impl CategoryBreakdown {
    pub fn from_storms<'a, I>(storms: I) -> Self
    where
        I: IntoIterator<Item = &'a StormRecord>,
    {
        let ordered = StormCategory::ordered();
        let mut by_year: BTreeMap<i32, [usize; 7]> = BTreeMap::new();

        for record in storms {
            let Some(year) = record.year else {
                continue;
            };
            let slot = ordered
                .iter()
                .position(|category| *category == record.category())
                .unwrap_or(ordered.len() - 1);
            by_year.entry(year).or_insert([0; 7])[slot] += 1;
        }

        let rows = by_year
            .into_iter()
            .map(|(year, counts)| BreakdownRow {
                year,
                counts: ordered
                    .iter()
                    .zip(counts)
                    .map(|(category, count)| CategoryCount {
                        category: *category,
                        label: category.label(),
                        count,
                    })
                    .collect(),
            })
            .collect();

        Self {
            categories: ordered.iter().map(|category| category.label()).collect(),
            rows,
        }
    }
}
