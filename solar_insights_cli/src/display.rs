use comfy_table::{presets::NOTHING, *};
use itertools::Itertools;
use polars::prelude::AnyValue;
use solar_insights::{
    aggregate::RankingResult,
    classify::ColumnRoles,
    dashboard::{DatasetInfo, KeyStatistics},
    stats::{BoxplotSummary, SummaryStats},
    table::Table as DataTable,
    COL,
};

fn bold(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn fmt2(value: f64) -> String {
    format!("{value:.2}")
}

fn fmt2_opt(value: Option<f64>) -> String {
    value.map(fmt2).unwrap_or_else(|| "n/a".to_string())
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_style(comfy_table::TableComponent::BottomBorder, '─')
        .set_style(comfy_table::TableComponent::MiddleHeaderIntersections, '─')
        .set_style(comfy_table::TableComponent::HeaderLines, '─')
        .set_style(comfy_table::TableComponent::BottomBorderIntersections, '─')
        .set_style(comfy_table::TableComponent::TopBorder, '─')
        .set_style(comfy_table::TableComponent::TopBorderIntersections, '─');
    table
}

fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        other => other
            .get_str()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{other}")),
    }
}

pub fn render_rows(rows: &DataTable, max_rows: Option<usize>) -> anyhow::Result<String> {
    let frame = rows.frame();
    let n_rows = max_rows.map_or(frame.height(), |max| max.min(frame.height()));
    let mut table = new_table();
    table.set_header(frame.get_column_names().into_iter().map(bold).collect_vec());
    for idx in 0..n_rows {
        let cells = frame
            .get_columns()
            .iter()
            .map(|series| series.get(idx).map(|value| cell_text(&value)))
            .collect::<Result<Vec<String>, _>>()?;
        table.add_row(cells);
    }
    Ok(table.to_string())
}

pub fn display_rows(rows: &DataTable, max_rows: Option<usize>) -> anyhow::Result<()> {
    println!("\n{}", render_rows(rows, max_rows)?);
    Ok(())
}

pub fn display_dataset_info(info: &DatasetInfo, roles: &ColumnRoles) -> anyhow::Result<()> {
    let mut table = new_table();
    table.set_header(vec![bold("Column"), bold("Type"), bold("Kind"), bold("Role")]);
    for column in &info.columns {
        let role = if column.name == roles.location_column {
            "location"
        } else if Some(&column.name) == roles.region_column.as_ref() {
            "region"
        } else if roles.metric_columns.contains(&column.name) {
            "metric"
        } else {
            ""
        };
        table.add_row(vec![
            column.name.clone(),
            column.dtype.clone(),
            column.kind.to_string(),
            role.to_string(),
        ]);
    }
    println!("\nTotal Rows: {}", info.rows);
    println!("Total Columns: {}", info.columns.len());
    println!("\n{}", table);
    println!("\nFirst {} rows preview:", info.preview.height());
    display_rows(&info.preview, None)
}

pub fn display_locations(locations: &[String], location_column: &str) {
    let mut table = new_table();
    table.set_header(vec![bold(location_column)]);
    for location in locations {
        table.add_row(vec![location.as_str()]);
    }
    println!("\n{}", table);
}

pub fn display_key_statistics(stats: &KeyStatistics, location_column: &str) {
    let mut table = new_table();
    table
        .set_header(vec![bold("Key Statistics"), bold(""), bold("")])
        .add_row(vec![
            format!("{location_column}s Selected"),
            stats.selected_locations.to_string(),
            format!("{:.1}% of total", stats.location_share()),
        ])
        .add_row(vec![
            "Total Records".to_string(),
            stats.records.to_string(),
            format!("{:.1}% of dataset", stats.record_share()),
        ])
        .add_row(vec![
            COL::avg_label(&stats.metric),
            fmt2_opt(stats.mean),
            format!("±{}", fmt2_opt(stats.std_dev)),
        ])
        .add_row(vec![
            format!("Max {}", stats.metric),
            fmt2_opt(stats.max),
            String::new(),
        ]);
    if let Some(column) = table.column_mut(0) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    println!("\n{}", table);
}

pub fn display_summary(summary: Option<&SummaryStats>, metric: &str) {
    let Some(summary) = summary else {
        println!("\nNo {metric} values in the selected rows.");
        return;
    };
    let mut table = new_table();
    table.set_header(vec![bold(COL::STAT_METRIC), bold(COL::STAT_VALUE)]);
    for (label, value) in summary.rows() {
        table.add_row(vec![label.to_string(), fmt2(value)]);
    }
    println!("\nStatistics of {metric}\n{}", table);
}

pub fn display_boxplots(boxplots: &[BoxplotSummary], location_column: &str, metric: &str) {
    let mut table = new_table();
    table.set_header(vec![
        bold(location_column),
        bold(COL::BOX_COUNT),
        bold(COL::STAT_MIN),
        bold(COL::BOX_Q1),
        bold(COL::STAT_MEDIAN),
        bold(COL::BOX_Q3),
        bold(COL::STAT_MAX),
    ]);
    for b in boxplots {
        table.add_row(vec![
            b.group.clone(),
            b.count.to_string(),
            fmt2(b.min),
            fmt2(b.q1),
            fmt2(b.median),
            fmt2(b.q3),
            fmt2(b.max),
        ]);
    }
    println!("\n{metric} Distribution by {location_column}\n{}", table);
}

pub fn display_ranking(ranking: &RankingResult, group_column: &str) {
    if ranking.is_empty() {
        println!("\nNo data available for ranking by {group_column}");
        return;
    }
    let mut table = new_table();
    table.set_header(vec![bold(&ranking.group_header), bold(&ranking.value_header)]);
    for entry in &ranking.entries {
        table.add_row(vec![entry.label.clone(), fmt2(entry.average)]);
    }
    println!("\n{}", table);
    if let Some(best) = ranking.best() {
        println!("Best Performing: {} ({})", best.label, fmt2(best.average));
    }
    if let Some(lead) = ranking.lead_over_second() {
        println!("Lead over 2nd: {}", fmt2(lead));
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    #[test]
    fn rows_render_values_and_nulls() {
        let rows: DataTable = df!(
            "Country" => &["Benin", "Togo"],
            "GHI" => &[Some(250.5), None],
        )
        .unwrap()
        .into();
        let rendered = render_rows(&rows, None).unwrap();
        assert!(rendered.contains("Country"));
        assert!(rendered.contains("Benin"));
        assert!(rendered.contains("250.5"));
        assert!(!rendered.contains("null"));
        assert!(!rendered.contains("\"Benin\""));

        let limited = render_rows(&rows, Some(1)).unwrap();
        assert!(!limited.contains("Togo"));
    }
}
