//! Output formatting - clean, ASCII-only terminal output

use owo_colors::OwoColorize;
use topicweight_common::{AnalysisResponse, Category, Fact, HealthResponse};

const THIN_SEPARATOR: &str =
    "--------------------------------------------------------------------------------";

/// Display a full analysis
pub fn display_analysis(response: &AnalysisResponse) {
    println!();
    println!(
        "{}  {} hours",
        "[RESEARCH BUDGET]".bright_green(),
        response.total_hours.to_string().bold()
    );
    println!("  {}", response.total_hours_description.dimmed());
    println!();

    for category in &response.weights {
        display_category(category);
    }

    if !response.sources.is_empty() {
        println!("{}", THIN_SEPARATOR.dimmed());
        println!("[SOURCES]");
        for cited in &response.sources {
            println!("  [{}] {}", cited.citation, cited.source.title.cyan());
            println!("      {}", cited.source.link.dimmed());
            if !cited.context.is_empty() {
                println!("      {}", cited.context);
            }
        }
    }
    println!();
}

fn display_category(category: &Category) {
    println!(
        "{} {}",
        format!("[{}/10]", category.weight).yellow(),
        category.name.to_string().bold()
    );
    println!("  {}", category.reasoning);
    for fact in &category.facts {
        println!("  * {}{}", fact.text, citation_markers(fact).cyan());
    }
    println!();
}

/// " [1][3]" for a fact's cited sources, empty if none
fn citation_markers(fact: &Fact) -> String {
    let markers: String = fact
        .sources
        .iter()
        .filter_map(|s| s.citation_id)
        .map(|id| format!("[{}]", id))
        .collect();
    if markers.is_empty() {
        markers
    } else {
        format!(" {}", markers)
    }
}

pub fn display_health(health: &HealthResponse) {
    println!(
        "{}  topicweightd v{} (up {}s, ground truth {})",
        "[OK]".bright_green(),
        health.version,
        health.uptime_seconds,
        if health.ground_truth_enabled { "on" } else { "off" }
    );
}

/// Display an error (ASCII-only)
pub fn display_error(message: &str) {
    eprintln!();
    eprintln!("[ERROR] {}", message.red());
    eprintln!();
}
