// Terminal output; progress lines stay uncolored so they can be parsed
use colored::Colorize;
use merger_metrics::MeshOutcome;

pub fn print_usage(program: &str) {
    println!(
        "{}",
        "Command line error: Prometheus URL and push gateway are required.".red()
    );
    println!("Usage:");
    println!(
        "  {} <Prometheus server URL> <Prometheus push gateway host:port>",
        program
    );
}

pub fn print_outcome(outcome: &MeshOutcome) {
    match outcome {
        MeshOutcome::Merged(report) => {
            for summary in &report.resolutions {
                println!(
                    "{}: {} runs with {} percentiles ({})",
                    report.mesh, summary.runs, summary.percentiles, summary.resolution
                );
            }
        }
        MeshOutcome::Failed { mesh, error } => print_error(&format!("{}: {}", mesh, error)),
    }
}

pub fn print_error(text: &str) {
    println!("{} {}", "✗".red().bold(), text.red());
}
