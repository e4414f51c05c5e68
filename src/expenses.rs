use crate::schema::{ExpenseCategory, NormalizedRow};
use crate::utils::{percent_of, sum_or_zero};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub amount: f64,
}

/// Expense magnitudes over a set of rows. Amounts are absolute values, so
/// the summary reads the same whichever sign the sheet used for costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExpenseSummary {
    pub gross_income: f64,
    pub categories: Vec<CategoryTotal>,
    pub total_expenses: f64,
    pub net_income: f64,
}

impl ExpenseSummary {
    /// Categories worth drawing in a breakdown chart.
    pub fn nonzero_categories(&self) -> impl Iterator<Item = &CategoryTotal> {
        self.categories.iter().filter(|c| c.amount > 0.0)
    }

    pub fn amount(&self, category: ExpenseCategory) -> f64 {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map_or(0.0, |c| c.amount)
    }

    /// Share of total expenses taken by `category`, in percent.
    pub fn share(&self, category: ExpenseCategory) -> f64 {
        percent_of(self.amount(category), self.total_expenses)
    }

    /// Net income against total expenses, leaving out non-positive parts.
    pub fn income_split(&self) -> Vec<(&'static str, f64)> {
        [
            ("Net Income", self.net_income),
            ("Total Expenses", self.total_expenses),
        ]
        .into_iter()
        .filter(|(_, v)| *v > 0.0)
        .collect()
    }
}

pub fn expense_breakdown(rows: &[NormalizedRow]) -> ExpenseSummary {
    let gross_income = sum_or_zero(rows.iter().map(|r| r.gross.abs()));

    let categories: Vec<CategoryTotal> = ExpenseCategory::ALL
        .into_iter()
        .map(|category| CategoryTotal {
            category,
            amount: sum_or_zero(rows.iter().map(|r| r.expenses.get(category).abs())),
        })
        .collect();

    let total_expenses = sum_or_zero(categories.iter().map(|c| c.amount));

    ExpenseSummary {
        gross_income,
        categories,
        total_expenses,
        net_income: gross_income - total_expenses,
    }
}
