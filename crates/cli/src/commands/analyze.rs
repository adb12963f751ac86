use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use nioi_detectors::{
    AnalysisConfig, AnalysisReport, DetectorProvider, ExecutionMode, MockDetectorProvider,
    OpenAiDetectorProvider, SmellAnalyzer,
};

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Python file to analyze
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// YAML configuration file; environment-derived defaults otherwise
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Project name attached to every exported record
    #[arg(long, default_value = "Code")]
    pub project: String,

    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Force sequential detector calls with the given pacing delay
    #[arg(long, value_name = "MILLIS")]
    pub pacing_ms: Option<u64>,

    /// Use the offline mock detector instead of the configured endpoint
    #[arg(long)]
    pub mock: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Records,
}

pub async fn execute(args: AnalyzeArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AnalysisConfig::from_env()?,
    };

    if let Some(pacing_ms) = args.pacing_ms {
        config.execution = ExecutionMode::Sequential { pacing_ms };
    }

    let provider: Arc<dyn DetectorProvider> = if args.mock {
        Arc::new(MockDetectorProvider::new())
    } else {
        Arc::new(
            OpenAiDetectorProvider::new(&config.provider, config.retry_attempts)
                .context("failed to construct detector provider")?,
        )
    };

    let source = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;

    let analyzer = SmellAnalyzer::new(provider, config);
    let report = analyzer
        .analyze(&source, args.input.to_str(), &args.project)
        .await
        .with_context(|| format!("analysis of {} rejected", args.input.display()))?;

    let rendered = match args.format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => report.to_json()?,
        OutputFormat::Records => serde_json::to_string_pretty(&report.records())?,
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn render_text(report: &AnalysisReport) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{}\n",
        format!("{} finding(s)", report.total_findings()).bold()
    ));

    for finding in &report.findings {
        let location = match finding.method_name.as_deref() {
            Some(method) => format!("{}:{} ({})", finding.module_name, finding.location.display(), method),
            None => format!("{}:{}", finding.module_name, finding.location.display()),
        };
        out.push_str(&format!(
            "  {} {} {}\n",
            finding.category.label().yellow(),
            location.cyan(),
            finding.description
        ));
    }

    if !report.counts_by_category.is_empty() {
        out.push_str("\nBy category:\n");
        for (category, count) in &report.counts_by_category {
            out.push_str(&format!("  {:<25} {}\n", category.label(), count));
        }
    }

    if let Some(reason) = &report.parse_error {
        out.push_str(&format!(
            "\n{} source could not be parsed ({}); structural validation was skipped\n",
            "warning:".yellow().bold(),
            reason
        ));
    }

    out.push_str(&format!(
        "\nDetector calls: {} attempted, {} succeeded, {} failed, {} tokens, {:?}\n",
        report.usage.calls_attempted,
        report.usage.calls_succeeded,
        report.usage.calls_failed,
        report.usage.tokens.total_tokens,
        report.usage.elapsed,
    ));

    out
}
