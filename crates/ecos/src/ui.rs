use colored::Colorize;
use ecos_cloud::{DestroyPlan, ResourceResult, ResourceStatus};

pub fn print_results(results: &[ResourceResult]) {
    println!();
    for result in results {
        let (mark, status) = match result.status {
            ResourceStatus::Created => ("✓".green(), "created".green()),
            ResourceStatus::Deleted => ("✓".green(), "deleted".green()),
            ResourceStatus::Skipped => ("-".dimmed(), "skipped".dimmed()),
            ResourceStatus::PartiallyCreated => ("⚠".yellow(), "partially created".yellow()),
            ResourceStatus::Failed => ("✗".red(), "failed".red()),
        };
        println!(
            "  {} {} {} ({})",
            mark,
            result.kind,
            result.name.cyan(),
            status
        );
        if let Some(detail) = &result.detail {
            println!("      {}", detail.dimmed());
        }
        if let Some(warning) = &result.warning {
            println!("      {}", warning.yellow());
        }
        if let Some(error) = &result.error {
            println!("      {}", error.red());
        }
    }
}

pub fn print_plan(plan: &DestroyPlan) {
    println!();
    println!("{}", "The following resources will be destroyed:".bold());
    for preview in &plan.previews {
        let ownership = if preview.is_unknown() {
            format!(
                "ownership unknown: {}",
                preview.error.as_deref().unwrap_or_default()
            )
            .yellow()
        } else if preview.managed {
            "managed by ecos".green()
        } else {
            "NOT managed by ecos".red().bold()
        };
        println!("  • {} {} ({})", preview.kind, preview.name.cyan(), ownership);
    }
}

/// Print a positional diff with expected lines red and current lines green.
pub fn print_diff(diff: &str) {
    for line in diff.lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            println!("{}", line.bold());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
}
