use crm_archive::{AggregatePage, ArchivedRecord, BulkDeleteReport, CompositeId, Outcome};

pub fn print_page(page: &AggregatePage, records: &[ArchivedRecord]) {
    println!(
        "page {}/{} (~{} archived, {} per source, showing {} of {})",
        page.page,
        page.approx_total_pages,
        page.approx_total_items,
        page.limit_per_source,
        records.len(),
        page.records.len()
    );
    if !page.unavailable_sources.is_empty() {
        let names: Vec<_> = page
            .unavailable_sources
            .iter()
            .map(|entity| entity.as_str())
            .collect();
        println!("unavailable sources: {}", names.join(", "));
    }
    println!("{}", "-".repeat(96));
    for record in records {
        let archived_at = record
            .archived_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<28} {:<32} {:<16} {}",
            record.composite_id.to_string(),
            truncate(&record.display_name, 32),
            archived_at,
            record.archived_by_label
        );
        for attribute in &record.attributes {
            println!("    {:<16} {}", attribute.label, attribute.value);
        }
    }
}

pub fn print_outcome(action: &str, id: &CompositeId, outcome: &Outcome) {
    match &outcome.error {
        None => println!("{} {}: ok", action, id),
        Some(error) => println!("{} {}: failed ({:?}) {}", action, id, error.kind, error.message),
    }
}

pub fn print_report(report: &BulkDeleteReport) {
    println!("deleted {} archived records", report.total_deleted);
    for (entity_type, deleted) in &report.per_type_deleted {
        println!("    {:<12} {}", entity_type.as_str(), deleted);
    }
    if report.is_partial() {
        let failed: Vec<_> = report
            .per_type_failures
            .iter()
            .map(|entity| entity.as_str())
            .collect();
        println!("failed: {}", failed.join(", "));
    }
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut shortened: String = value.chars().take(width.saturating_sub(1)).collect();
    shortened.push('…');
    shortened
}
