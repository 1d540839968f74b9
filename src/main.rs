use nutrisage::cli::{Cli, Commands, ConfigAction};
use nutrisage::config::Config;
use nutrisage::corpus::CorpusLoader;
use nutrisage::embedding::FastEmbedProvider;
use nutrisage::error::{NutriError, Result};
use nutrisage::index::IndexBuilder;
use nutrisage::responder::emphasize_list_markers;
use nutrisage::NutritionService;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    // Credentials may live in a local .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze { food, raw, json } => {
            cmd_analyze(cli.config, &food, raw, json)?;
        }
        Commands::Ask { question, json } => {
            cmd_ask(cli.config, &question, json)?;
        }
        Commands::Index { corpus } => {
            cmd_index(cli.config, corpus)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "nutrisage=debug" } else { "nutrisage=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().map_err(|e| NutriError::Io {
        source: e,
        context: "Failed to create tokio runtime".to_string(),
    })
}

fn cmd_analyze(config_path: Option<PathBuf>, food: &str, raw: bool, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let service = NutritionService::from_config(&config)?;

    let answer = runtime()?.block_on(service.analyze(food));
    let answer = if raw {
        answer
    } else {
        emphasize_list_markers(&answer)
    };

    if json {
        print_json(&serde_json::json!({
            "food": food,
            "nutrition_info": answer,
        }))?;
    } else {
        println!("{}", answer.trim_start());
    }

    Ok(())
}

fn cmd_ask(config_path: Option<PathBuf>, question: &str, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let service = NutritionService::from_config(&config)?;

    let answer = runtime()?.block_on(service.ask(question));

    if json {
        print_json(&serde_json::json!({
            "question": question,
            "answer": answer,
        }))?;
    } else {
        println!("{}", answer);
    }

    Ok(())
}

fn cmd_index(config_path: Option<PathBuf>, corpus: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let corpus = expand_path(&corpus.unwrap_or_else(|| config.corpus.path.clone()))?;

    let embedder = FastEmbedProvider::new(&config.embedding.model)
        .map_err(|e| NutriError::Config(format!("Embedding model unavailable: {}", e)))?;
    let builder = IndexBuilder::from_config(Arc::new(embedder), &config);

    let index = builder.build(&corpus)?;

    println!("Nutrisage Index");
    println!("===============");
    println!("\nCorpus:      {}", corpus.display());
    println!("Documents:   {}", index.len());
    println!("Model:       {} ({}D)", index.model_name(), index.dimension());
    println!("Backend:     {:?}", index.backend());
    println!("Fingerprint: {}", index.fingerprint());

    if !index.is_empty() {
        println!("\nDocuments:");
        for document in index.documents().iter().take(10) {
            println!("  {}", document.source().display());
        }
        if index.len() > 10 {
            println!("  ... and {} more", index.len() - 10);
        }
    }

    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let rendered = toml::to_string_pretty(&config)?;
            println!("{}", rendered);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);

            // Corpus problems are not config errors, but worth surfacing here
            let corpus = expand_path(&config.corpus.path)?;
            match CorpusLoader::from_config(&config.corpus).fingerprint(&corpus) {
                Ok(fingerprint) => println!("  Corpus: {} ({})", corpus.display(), fingerprint),
                Err(e) => println!("⚠ Corpus not readable: {}", e),
            }
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| NutriError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            Config::default().save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    let mut config = if path.exists() {
        Config::load(&path)?
    } else {
        tracing::warn!(
            "Config file not found, using defaults. Run 'nutrisage config init' to create one."
        );
        let mut config = Config::default();
        config.apply_env_overrides();
        nutrisage::config::ConfigValidator::validate(&config)?;
        config
    };

    config.corpus.path = expand_path(&config.corpus.path)?;
    Ok(config)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(|e| NutriError::Json {
        source: e,
        context: "Failed to serialize response".to_string(),
    })?;
    println!("{}", rendered);
    Ok(())
}

fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path
        .to_str()
        .ok_or_else(|| NutriError::Config("Invalid path encoding".to_string()))?;

    if let Some(stripped) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| NutriError::Config("Cannot determine home directory".to_string()))?;
        Ok(home.join(stripped))
    } else {
        Ok(path.to_path_buf())
    }
}
