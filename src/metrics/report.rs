use crate::metrics::MetricsSnapshot;

/// Prints a metrics snapshot to stdout in a formatted manner
///
/// # Arguments
///
/// * `snapshot` - The metrics to display
pub fn print_metrics(snapshot: &MetricsSnapshot) {
    println!("=== Scraping Metrics ===\n");

    println!("Overview:");
    println!("  Total requests: {}", snapshot.total_requests);
    println!("  Successful: {}", snapshot.successful_requests);
    println!("  Failed: {}", snapshot.failed_requests);
    println!("  Retries: {}", snapshot.retries);
    println!("  Bytes fetched: {}", snapshot.total_bytes);
    println!("  Average response: {:.1}ms", snapshot.avg_response_ms);
    println!(
        "  Elapsed: {:.2}s ({:.2} requests/sec)",
        snapshot.elapsed_seconds, snapshot.requests_per_second
    );
    println!();

    if !snapshot.status_codes.is_empty() {
        println!("Status Codes:");
        for (status, count) in &snapshot.status_codes {
            println!("  {}: {}", status, count);
        }
        println!();
    }

    if !snapshot.domains.is_empty() {
        println!("Domains ({}):", snapshot.domains.len());
        // Busiest domains first
        let mut domains: Vec<_> = snapshot.domains.iter().collect();
        domains.sort_by(|a, b| b.1.requests.cmp(&a.1.requests).then_with(|| a.0.cmp(b.0)));

        for (domain, stats) in domains {
            println!(
                "  - {}: {} requests, {} ok, {} failed, {:.1}ms avg",
                domain, stats.requests, stats.successes, stats.failures, stats.avg_response_ms
            );
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} requests succeeded)",
        snapshot.success_rate,
        snapshot.successful_requests,
        snapshot.successful_requests + snapshot.failed_requests
    );
}
