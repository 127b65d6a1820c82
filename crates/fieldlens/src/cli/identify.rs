//! The `fieldlens identify` command.

use anyhow::Context;
use clap::{Args, ValueEnum};
use fieldlens_core::{
    AllowAll, Category, Config, DiscardResults, EntitlementGate, IdentificationClient,
    IdentificationRequest, IdentificationResult, IdentifyError, IdentifyOptions, ImageInput,
    ProviderFactory, ResultSink,
};
use std::path::{Path, PathBuf};

/// Arguments for the `identify` command.
#[derive(Args, Debug)]
pub struct IdentifyArgs {
    /// Path to the photo to identify
    pub image: PathBuf,

    /// Category hint (what the user believes the subject is)
    #[arg(short, long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Override the configured provider ("gemini", "openai", "replicate")
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Override the configured model name
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputArg,

    /// Tag the request as premium/unlimited (audit-only pass-through)
    #[arg(long)]
    pub trial_bypassed: bool,
}

/// Category hint values accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Plant,
    Mammal,
    Bird,
    Reptile,
    Amphibian,
    Insect,
    Fungi,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Plant => Category::Plant,
            CategoryArg::Mammal => Category::Mammal,
            CategoryArg::Bird => Category::Bird,
            CategoryArg::Reptile => Category::Reptile,
            CategoryArg::Amphibian => Category::Amphibian,
            CategoryArg::Insect => Category::Insect,
            CategoryArg::Fungi => Category::Fungi,
        }
    }
}

/// Output format for identification results.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputArg {
    /// Human-readable summary
    Text,
    /// Full result as JSON
    Json,
}

/// Execute the identify command.
pub async fn execute(args: IdentifyArgs, config: Config) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("Failed to read image: {}", args.image.display()))?;
    let image = ImageInput::from_bytes(&bytes, &infer_format(&args.image));

    let client = match &args.provider {
        Some(name) => {
            let provider = ProviderFactory::create(name, &config, args.model.as_deref())
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            IdentificationClient::new(provider, IdentifyOptions::from(&config.identify))
        }
        None => match &args.model {
            Some(model) => {
                let provider =
                    ProviderFactory::create(&config.identify.provider, &config, Some(model))
                        .map_err(|e| anyhow::anyhow!("{e}"))?;
                IdentificationClient::new(provider, IdentifyOptions::from(&config.identify))
            }
            None => IdentificationClient::from_config(&config).map_err(|e| anyhow::anyhow!("{e}"))?,
        },
    };

    let mut request = IdentificationRequest::new(image).with_trial_bypassed(args.trial_bypassed);
    if let Some(category) = args.category {
        request = request.with_hint(category.into());
    }

    // The CLI has no trial tier or history store; the app injects real
    // implementations at these seams.
    let gate = AllowAll;
    let sink = DiscardResults;

    if let Some(0) = gate.remaining_uses().await {
        anyhow::bail!("No identification uses remaining");
    }

    match client.identify(&request).await {
        Ok(result) => {
            gate.record_use().await.map_err(|e| anyhow::anyhow!("{e}"))?;
            sink.store(&result).await.map_err(|e| anyhow::anyhow!("{e}"))?;
            match args.output {
                OutputArg::Json => println!("{}", serde_json::to_string_pretty(&result)?),
                OutputArg::Text => print_summary(&result),
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", failure_hint(&e));
            Err(anyhow::anyhow!("{e}"))
        }
    }
}

/// Infer the image format identifier from the file extension.
fn infer_format(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "jpeg".to_string())
}

fn print_summary(result: &IdentificationResult) {
    let primary = &result.primary;
    println!(
        "{} ({})  —  {:.0}% confidence",
        primary.common_name,
        primary.scientific_name,
        primary.confidence * 100.0
    );
    println!("Category: {}", primary.category);
    if !primary.description.is_empty() {
        println!("{}", primary.description);
    }
    if !primary.habitat.is_empty() {
        println!("Habitat: {}", primary.habitat);
    }
    println!("Edibility: {:?}", primary.edibility);
    if let Some(warning) = &primary.safety_warning {
        println!("⚠ {warning}");
    }

    if !result.alternatives.is_empty() {
        println!("\nAlternatives:");
        for alt in &result.alternatives {
            println!(
                "  - {} ({})  {:.0}%  — {}",
                alt.species.common_name,
                alt.species.scientific_name,
                alt.species.confidence * 100.0,
                alt.rationale
            );
        }
    }
}

/// User-facing guidance per error class.
fn failure_hint(error: &IdentifyError) -> String {
    match error {
        IdentifyError::QuotaExceeded { .. } => {
            "Identification quota exceeded. Upgrade your plan or try again later.".to_string()
        }
        IdentifyError::Timeout { .. } | IdentifyError::Unknown { .. } => {
            "Identification failed transiently. Retrying may succeed.".to_string()
        }
        IdentifyError::Unauthenticated { .. } => {
            "Provider credentials are missing or invalid. Check your API key configuration."
                .to_string()
        }
        IdentifyError::InvalidArgument { .. } => {
            "The request was rejected as malformed. Retrying the same image will not help."
                .to_string()
        }
        IdentifyError::ParseFailure { .. } => {
            "The model returned an unreadable response. Try again with a clearer photo."
                .to_string()
        }
    }
}
