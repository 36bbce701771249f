use crate::crawler::ScrapedResult;

/// Formats one result as a single status line
pub fn format_result_line(result: &ScrapedResult) -> String {
    match &result.error {
        None => {
            let title = if result.title.is_empty() {
                "(untitled)"
            } else {
                result.title.as_str()
            };
            format!(
                "[{}] {} - {} ({} bytes)",
                result.status, result.url, title, result.size
            )
        }
        Some(error) => format!("[ERR] {} - {}", result.url, error),
    }
}

/// Prints every result followed by a success count
pub fn print_summary(results: &[ScrapedResult]) {
    println!("=== Results ===\n");
    for result in results {
        println!("  {}", format_result_line(result));
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    println!();
    println!("{} / {} URLs scraped successfully", succeeded, results.len());
}
