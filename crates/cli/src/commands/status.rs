//! `shuttlechat status`: Show the effective configuration.

use shuttlechat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("shuttlechat status");
    println!("==================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  Provider:      {}", config.default_provider);
    println!("  Model:         {}", config.default_model);
    println!("  Temperature:   {}", config.temperature);
    println!("  Max tokens:    {}", config.max_tokens);
    println!("  LLM API key:   {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Gateway:       {}:{}", config.gateway.host, config.gateway.port);
    println!("  Rate limit:    {}/min", config.gateway.rate_limit_per_minute);
    println!("  Session TTL:   {}s (sweep every {}s)", config.session.ttl_secs, config.session.sweep_interval_secs);
    println!("  Language:      {}", config.language.primary.code());
    match &config.knowledge.corpus_path {
        Some(path) => println!("  Corpus:        {}", path.display()),
        None => println!("  Corpus:        built-in"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file; run `shuttlechat init` first");
    }

    Ok(())
}
