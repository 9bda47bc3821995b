use umbrella_core::{UmbrellaError, UmbrellaReport};

pub fn print_report(report: &UmbrellaReport) {
    for line in report.verdict.render_lines() {
        println!("{line}");
    }
}

/// Pipeline failures are reported here rather than through the exit code.
pub fn print_error(err: &UmbrellaError) {
    for line in error_lines(err) {
        println!("{line}");
    }
}

fn error_lines(err: &UmbrellaError) -> Vec<String> {
    std::iter::once(err.to_string()).chain(err.diagnostic()).collect()
}
