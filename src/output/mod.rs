pub mod chart;
pub mod markdown;
mod progress;
mod styling;
mod tables;
pub mod terminal;

pub use progress::FetchSpinner;
pub use styling::{bright, bright_green, bright_red, bright_yellow, dim, magenta_bold};

/// Prints the opendigger banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("📈 OpenDigger"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Open source repository health metrics")
    );
}
