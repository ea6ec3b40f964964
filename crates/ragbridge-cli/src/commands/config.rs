//! Config command

use crate::app::OutputFormat;
use anyhow::Result;
use ragbridge_core::RagConfig;

pub fn run(config: &RagConfig, format: OutputFormat) -> Result<()> {
    let masked = config.masked();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        OutputFormat::Cli => {
            println!("RAGFlow:");
            println!("  Base URL:        {}", masked.ragflow_base_url);
            println!("  API key:         {}", display_or_unset(&masked.ragflow_api_key));
            println!("  Datasets:        {}", masked.ragflow_kb_ids.join(", "));
            println!("  Top K:           {}", masked.retrieval.top_k);
            println!("  Threshold:       {}", masked.retrieval.similarity_threshold);
            println!("  Timeout:         {}s", masked.retrieval.timeout_secs);
            println!();
            println!("Injection:         {}", masked.rag_injection_method);
            println!();
            println!("Query rewrite:");
            println!(
                "  Enabled:         {}",
                if masked.enable_query_rewrite { "yes" } else { "no" }
            );
            println!(
                "  Provider:        {}",
                display_or_unset(&masked.query_rewrite_provider_key)
            );
            println!("  Strategy:        {}", masked.query_rewrite_strategy);
            println!(
                "  Max questions:   {}",
                masked.query_rewrite_max_sub_questions
            );

            let mut providers: Vec<&String> = masked.providers.keys().collect();
            providers.sort();
            for key in providers {
                let service = &masked.providers[key];
                println!("  - {}: {} ({})", key, service.model, service.url);
            }
        }
    }
    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "<unset>"
    } else {
        value
    }
}
