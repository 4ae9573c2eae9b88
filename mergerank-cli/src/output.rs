/// Output formatting: terminal table and JSON.
use mergerank_core::{Comparison, Item, Progress};
use serde::Serialize;

#[derive(Serialize)]
struct JsonRankedItem<'a> {
    rank: usize,
    position: usize,
    record: &'a str,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    headers: &'a [String],
    items: Vec<JsonRankedItem<'a>>,
    max_pass: usize,
}

#[derive(Serialize)]
struct JsonComparison<'a> {
    path: String,
    left: usize,
    right: usize,
    left_record: &'a str,
    right_record: &'a str,
    stolen: bool,
}

/// Print the final ranking as a formatted terminal table.
pub fn print_table(ranking: &[&Item<String>], headers: &[String], max_pass: usize) {
    let item_title = if headers.is_empty() {
        "Item".to_string()
    } else {
        headers.join(", ")
    };
    let name_width = ranking
        .iter()
        .map(|i| i.record.len())
        .max()
        .unwrap_or(4)
        .max(item_title.len());

    println!("  # | {:<name_width$} | Input #", item_title);
    println!("----|-{}-|--------", "-".repeat(name_width));

    for (i, item) in ranking.iter().enumerate() {
        println!("{:>3} | {:<name_width$} | {:>7}", i + 1, item.record, item.position);
    }

    println!("\n{} items ranked (cutoff {})", ranking.len(), max_pass);
}

/// Print the final ranking as JSON.
pub fn print_json(ranking: &[&Item<String>], headers: &[String], max_pass: usize) {
    let items = ranking
        .iter()
        .enumerate()
        .map(|(i, item)| JsonRankedItem {
            rank: i + 1,
            position: item.position,
            record: &item.record,
        })
        .collect();

    let output = JsonOutput { headers, items, max_pass };
    println!("{}", to_json(&output));
}

/// Print a dispatched comparison for a stateless client.
pub fn print_comparison(c: &Comparison<String>, json: bool) {
    if json {
        let out = JsonComparison {
            path: c.path.to_string(),
            left: c.left.position,
            right: c.right.position,
            left_record: &c.left.record,
            right_record: &c.right.record,
            stolen: c.stolen,
        };
        println!("{}", to_json(&out));
        return;
    }

    println!("path: {:?}{}", c.path.to_string(), if c.stolen { " (stolen)" } else { "" });
    println!("left  #{}: {}", c.left.position, c.left.record);
    println!("right #{}: {}", c.right.position, c.right.record);
}

pub fn print_progress(progress: &Progress, json: bool) {
    if json {
        println!("{}", to_json(progress));
        return;
    }
    println!(
        "{} items, cutoff {}: {} accepted, {} settled, {} queued, {} in flight{}",
        progress.total_items,
        progress.max_pass,
        progress.accepted,
        progress.settled,
        progress.queued,
        progress.in_flight,
        if progress.finished { " (finished)" } else { "" },
    );
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| crate::bail(format!("Failed to encode JSON: {e}")))
}
