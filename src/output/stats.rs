//! Statistics reporting.

use console::style;

use crate::download::ArchiveStats;

/// Print statistics for an archive run.
pub fn print_run_stats(target_user_id: &str, stats: &ArchiveStats) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!(
        "{}",
        style(format!("Statistics for {}:", target_user_id)).bold()
    );
    println!(
        "  Posts:    {} ({} with media)",
        stats.posts_seen, stats.posts_with_media
    );
    println!("  Pictures: {}", stats.pic_count);
    println!("  Videos:   {}", stats.vid_count);
    if stats.skipped_count > 0 {
        println!(
            "  Skipped:  {} (no direct URL, see warnings)",
            style(stats.skipped_count).yellow()
        );
    }
    if stats.renamed_count > 0 {
        println!("  Renamed:  {} (timestamp collision)", stats.renamed_count);
    }
    println!(
        "  Total:    {} downloaded, {}",
        stats.total_downloaded(),
        format_bytes(stats.bytes_written)
    );
    println!("{}", style("═".repeat(50)).dim());
}

/// Human readable byte count.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
