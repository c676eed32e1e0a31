//! Export functions for estimates

use super::{CostLine, Estimate};
use crate::error::{CostctlError, Result};
use crate::utils::{format_cost, format_quantity};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use std::path::Path;

/// Column order consumed by existing report readers
pub const CSV_HEADER: [&str; 7] = [
    "type",
    "count",
    "spec",
    "max_usage",
    "max_cost",
    "projected_usage",
    "projected_cost",
];

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn row(line: &CostLine) -> [String; 7] {
    [
        line.resource_type.clone(),
        line.count.to_string(),
        line.spec.clone(),
        format_quantity(line.max_usage.amount, &line.max_usage.unit),
        format_cost(line.max_cost),
        format_quantity(line.projected_usage.amount, &line.projected_usage.unit),
        format_cost(line.projected_cost),
    ]
}

impl Estimate {
    pub fn to_csv(&self) -> String {
        let mut csv = CSV_HEADER.join(",");
        csv.push('\n');
        for line in &self.lines {
            let fields: Vec<String> = row(line).iter().map(|f| csv_field(f)).collect();
            csv.push_str(&fields.join(","));
            csv.push('\n');
        }
        csv
    }

    pub fn render_table(&self) -> String {
        let max_cost_header = format!("Max cost ({})", self.currency);
        let projected_cost_header = format!("Projected cost ({})", self.currency);
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                "Type",
                "Count",
                "Spec",
                "Max usage",
                max_cost_header.as_str(),
                "Projected usage",
                projected_cost_header.as_str(),
            ]);

        for line in &self.lines {
            let [kind, count, spec, max_usage, max_cost, projected_usage, projected_cost] =
                row(line);
            table.add_row(vec![
                Cell::new(kind),
                Cell::new(count).set_alignment(CellAlignment::Right),
                Cell::new(spec),
                Cell::new(max_usage).set_alignment(CellAlignment::Right),
                Cell::new(max_cost).set_alignment(CellAlignment::Right),
                Cell::new(projected_usage).set_alignment(CellAlignment::Right),
                Cell::new(projected_cost).set_alignment(CellAlignment::Right),
            ]);
        }
        table.add_row(vec![
            Cell::new("Total"),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(format_cost(self.total_max_cost())).set_alignment(CellAlignment::Right),
            Cell::new(""),
            Cell::new(format_cost(self.total_projected_cost()))
                .set_alignment(CellAlignment::Right),
        ]);
        table.to_string()
    }

    /// Render in `format` (table, csv, json)
    pub fn render(&self, format: &str) -> Result<String> {
        match format {
            "table" => Ok(self.render_table()),
            "csv" => Ok(self.to_csv()),
            "json" => Ok(serde_json::to_string_pretty(self)?),
            _ => Err(CostctlError::Validation {
                field: "format".to_string(),
                reason: format!(
                    "Unsupported output format: {}. Use 'table', 'csv' or 'json'",
                    format
                ),
            }),
        }
    }

    /// Write to a file, or stdout when `file` is None
    pub fn export(&self, format: &str, file: Option<&Path>) -> Result<()> {
        let rendered = self.render(format)?;
        if let Some(path) = file {
            std::fs::write(path, rendered)?;
            println!("Exported to {}", path.display());
        } else {
            println!("{}", rendered);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Quantity;
    use chrono::Utc;

    fn estimate() -> Estimate {
        Estimate {
            currency: "USD".to_string(),
            generated_at: Utc::now(),
            lines: vec![
                CostLine {
                    resource_type: "Instance".to_string(),
                    count: 2,
                    spec: "e2-small OnDemand Debian (us-east1)".to_string(),
                    max_usage: Quantity {
                        amount: 1440,
                        unit: "h".to_string(),
                    },
                    max_cost: 24.048,
                    projected_usage: Quantity {
                        amount: 400,
                        unit: "h".to_string(),
                    },
                    projected_cost: 6.68,
                },
                CostLine {
                    resource_type: "Image".to_string(),
                    count: 1,
                    spec: "10GB (us,eu)".to_string(),
                    max_usage: Quantity {
                        amount: 10,
                        unit: "GiBy.mo".to_string(),
                    },
                    max_cost: 0.5,
                    projected_usage: Quantity {
                        amount: 10,
                        unit: "GiBy.mo".to_string(),
                    },
                    projected_cost: 0.5,
                },
            ],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_csv_column_order() {
        let csv = estimate().to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "type,count,spec,max_usage,max_cost,projected_usage,projected_cost"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Instance,2,e2-small OnDemand Debian (us-east1),1440 h,24.05,400 h,6.68"
        );
    }

    #[test]
    fn test_csv_quotes_commas() {
        let csv = estimate().to_csv();
        assert!(csv.contains("Image,1,\"10GB (us,eu)\",10 GiBy.mo,0.50,10 GiBy.mo,0.50"));
    }

    #[test]
    fn test_totals() {
        let e = estimate();
        assert!((e.total_max_cost() - 24.548).abs() < 1e-9);
        assert!((e.total_projected_cost() - 7.18).abs() < 1e-9);
    }

    #[test]
    fn test_render_formats() {
        let e = estimate();
        assert!(e.render("table").unwrap().contains("Total"));
        assert!(e.render("json").unwrap().contains("\"max_usage\""));
        assert!(e.render("yaml").is_err());
    }
}
